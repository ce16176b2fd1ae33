use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{
    Account, AccountId, Category, CategoryId, Cents, Expense, ExpenseId, PaymentMethod, Profile,
    ProfileId, Session, SessionToken, Settlement, SettlementId,
};

use super::{MIGRATION_001_INITIAL, MIGRATION_002_SETTLEMENTS};

/// Repository for persisting and querying the shared-expense ledger.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        sqlx::query(MIGRATION_002_SETTLEMENTS)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 002")?;

        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Account operations
    // ========================

    pub async fn save_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, email, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(account.id.to_string())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save account")?;
        Ok(())
    }

    pub async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, created_at
            FROM accounts
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account by email")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_account(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, created_at
            FROM accounts
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_account(&row)?)),
            None => Ok(None),
        }
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Result<Account> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(Account {
            id: Uuid::parse_str(&id_str).context("Invalid account ID")?,
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            created_at: parse_timestamp(&created_at_str)?,
        })
    }

    // ========================
    // Session operations
    // ========================

    pub async fn save_session(&self, session: &Session) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token, account_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(session.token.to_string())
        .bind(session.account_id.to_string())
        .bind(session.created_at.to_rfc3339())
        .bind(session.expires_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save session")?;
        Ok(())
    }

    pub async fn get_session(&self, token: SessionToken) -> Result<Option<Session>> {
        let row = sqlx::query(
            r#"
            SELECT token, account_id, created_at, expires_at
            FROM sessions
            WHERE token = ?
            "#,
        )
        .bind(token.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch session")?;

        match row {
            Some(row) => {
                let token_str: String = row.get("token");
                let account_id_str: String = row.get("account_id");
                let created_at_str: String = row.get("created_at");
                let expires_at_str: String = row.get("expires_at");

                Ok(Some(Session {
                    token: Uuid::parse_str(&token_str).context("Invalid session token")?,
                    account_id: Uuid::parse_str(&account_id_str).context("Invalid account ID")?,
                    created_at: parse_timestamp(&created_at_str)?,
                    expires_at: parse_timestamp(&expires_at_str)?,
                }))
            }
            None => Ok(None),
        }
    }

    pub async fn delete_session(&self, token: SessionToken) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Drop every session past its expiry.
    pub async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now.to_rfc3339())
            .execute(&self.pool)
            .await
            .context("Failed to purge expired sessions")?;
        Ok(result.rows_affected())
    }

    // ========================
    // Profile operations
    // ========================

    pub async fn save_profile(&self, profile: &Profile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, name, account_id, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(profile.id.to_string())
        .bind(&profile.name)
        .bind(profile.account_id.map(|id| id.to_string()))
        .bind(profile.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save profile")?;
        Ok(())
    }

    pub async fn get_profile(&self, id: ProfileId) -> Result<Option<Profile>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, account_id, created_at
            FROM profiles
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch profile")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_profile(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_profile_by_name(&self, name: &str) -> Result<Option<Profile>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, account_id, created_at
            FROM profiles
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch profile by name")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_profile(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_profile_by_account(&self, account_id: AccountId) -> Result<Option<Profile>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, account_id, created_at
            FROM profiles
            WHERE account_id = ?
            "#,
        )
        .bind(account_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch profile by account")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_profile(&row)?)),
            None => Ok(None),
        }
    }

    /// Attach a login account to an existing (unlinked) profile.
    pub async fn link_profile_account(
        &self,
        profile_id: ProfileId,
        account_id: AccountId,
    ) -> Result<()> {
        sqlx::query("UPDATE profiles SET account_id = ? WHERE id = ?")
            .bind(account_id.to_string())
            .bind(profile_id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to link profile to account")?;
        Ok(())
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, account_id, created_at
            FROM profiles
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list profiles")?;

        rows.iter().map(Self::row_to_profile).collect()
    }

    fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<Profile> {
        let id_str: String = row.get("id");
        let account_id_str: Option<String> = row.get("account_id");
        let created_at_str: String = row.get("created_at");

        Ok(Profile {
            id: Uuid::parse_str(&id_str).context("Invalid profile ID")?,
            name: row.get("name"),
            account_id: account_id_str
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .context("Invalid account ID")?,
            created_at: parse_timestamp(&created_at_str)?,
        })
    }

    // ========================
    // Category operations
    // ========================

    pub async fn save_category(&self, category: &Category) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO expense_categories (id, name, icon, color, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(category.id.to_string())
        .bind(&category.name)
        .bind(&category.icon)
        .bind(&category.color)
        .bind(category.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save category")?;
        Ok(())
    }

    pub async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, icon, color, created_at
            FROM expense_categories
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch category")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_category(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, icon, color, created_at
            FROM expense_categories
            WHERE name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch category by name")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_category(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, icon, color, created_at
            FROM expense_categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list categories")?;

        rows.iter().map(Self::row_to_category).collect()
    }

    /// Delete a category. Expenses referencing it fall back to uncategorized.
    pub async fn delete_category(&self, id: CategoryId) -> Result<()> {
        sqlx::query("UPDATE expenses SET category_id = NULL WHERE category_id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to detach expenses from category")?;

        sqlx::query("DELETE FROM expense_categories WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete category")?;
        Ok(())
    }

    fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(Category {
            id: Uuid::parse_str(&id_str).context("Invalid category ID")?,
            name: row.get("name"),
            icon: row.get("icon"),
            color: row.get("color"),
            created_at: parse_timestamp(&created_at_str)?,
        })
    }

    // ========================
    // Expense operations
    // ========================

    pub async fn save_expense(&self, expense: &Expense) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO expenses (id, description, amount_cents, currency, expense_date, category_id, paid_by, payment_method, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(expense.id.to_string())
        .bind(&expense.description)
        .bind(expense.amount_cents)
        .bind(&expense.currency)
        .bind(expense.expense_date.to_string())
        .bind(expense.category_id.map(|id| id.to_string()))
        .bind(expense.paid_by.map(|id| id.to_string()))
        .bind(expense.payment_method.as_str())
        .bind(expense.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save expense")?;
        Ok(())
    }

    /// Replace the editable fields of an expense in place.
    pub async fn update_expense(&self, expense: &Expense) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE expenses
            SET description = ?, amount_cents = ?, currency = ?, expense_date = ?,
                category_id = ?, paid_by = ?, payment_method = ?
            WHERE id = ?
            "#,
        )
        .bind(&expense.description)
        .bind(expense.amount_cents)
        .bind(&expense.currency)
        .bind(expense.expense_date.to_string())
        .bind(expense.category_id.map(|id| id.to_string()))
        .bind(expense.paid_by.map(|id| id.to_string()))
        .bind(expense.payment_method.as_str())
        .bind(expense.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update expense")?;
        Ok(())
    }

    pub async fn get_expense(&self, id: ExpenseId) -> Result<Option<Expense>> {
        let row = sqlx::query(
            r#"
            SELECT id, description, amount_cents, currency, expense_date, category_id, paid_by, payment_method, created_at
            FROM expenses
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch expense")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_expense(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn delete_expense(&self, id: ExpenseId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete expense")?;
        Ok(result.rows_affected() > 0)
    }

    /// List all expenses, newest first (by expense date, then recording time).
    pub async fn list_expenses(&self) -> Result<Vec<Expense>> {
        let rows = sqlx::query(
            r#"
            SELECT id, description, amount_cents, currency, expense_date, category_id, paid_by, payment_method, created_at
            FROM expenses
            ORDER BY expense_date DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list expenses")?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    pub async fn count_expenses(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM expenses")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count expenses")?;
        Ok(row.get("count"))
    }

    /// Total of all expenses, in cents.
    pub async fn total_expenses_cents(&self) -> Result<Cents> {
        let row = sqlx::query("SELECT COALESCE(SUM(amount_cents), 0) as total FROM expenses")
            .fetch_one(&self.pool)
            .await
            .context("Failed to compute expense total")?;
        Ok(row.get("total"))
    }

    /// Total of expenses dated within [from, to), in cents.
    pub async fn total_expenses_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Cents> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0) as total
            FROM expenses
            WHERE expense_date >= ? AND expense_date < ?
            "#,
        )
        .bind(from.to_string())
        .bind(to.to_string())
        .fetch_one(&self.pool)
        .await
        .context("Failed to compute monthly total")?;
        Ok(row.get("total"))
    }

    fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<Expense> {
        let id_str: String = row.get("id");
        let expense_date_str: String = row.get("expense_date");
        let category_id_str: Option<String> = row.get("category_id");
        let paid_by_str: Option<String> = row.get("paid_by");
        let payment_method_str: String = row.get("payment_method");
        let created_at_str: String = row.get("created_at");

        Ok(Expense {
            id: Uuid::parse_str(&id_str).context("Invalid expense ID")?,
            description: row.get("description"),
            amount_cents: row.get("amount_cents"),
            currency: row.get("currency"),
            expense_date: parse_date(&expense_date_str)?,
            category_id: category_id_str
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .context("Invalid category ID")?,
            paid_by: paid_by_str
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .context("Invalid payer ID")?,
            payment_method: PaymentMethod::from_str(&payment_method_str).ok_or_else(|| {
                anyhow::anyhow!("Invalid payment method: {}", payment_method_str)
            })?,
            created_at: parse_timestamp(&created_at_str)?,
        })
    }

    // ========================
    // Settlement operations
    // ========================

    pub async fn save_settlement(&self, settlement: &Settlement) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settlements (id, from_profile, to_profile, amount_cents, description, settlement_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(settlement.id.to_string())
        .bind(settlement.from_profile.to_string())
        .bind(settlement.to_profile.to_string())
        .bind(settlement.amount_cents)
        .bind(&settlement.description)
        .bind(settlement.settlement_date.to_string())
        .bind(settlement.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save settlement")?;
        Ok(())
    }

    pub async fn delete_settlement(&self, id: SettlementId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM settlements WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete settlement")?;
        Ok(result.rows_affected() > 0)
    }

    /// List all settlements, newest first.
    pub async fn list_settlements(&self) -> Result<Vec<Settlement>> {
        let rows = sqlx::query(
            r#"
            SELECT id, from_profile, to_profile, amount_cents, description, settlement_date, created_at
            FROM settlements
            ORDER BY settlement_date DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list settlements")?;

        rows.iter().map(Self::row_to_settlement).collect()
    }

    fn row_to_settlement(row: &sqlx::sqlite::SqliteRow) -> Result<Settlement> {
        let id_str: String = row.get("id");
        let from_str: String = row.get("from_profile");
        let to_str: String = row.get("to_profile");
        let settlement_date_str: String = row.get("settlement_date");
        let created_at_str: String = row.get("created_at");

        Ok(Settlement {
            id: Uuid::parse_str(&id_str).context("Invalid settlement ID")?,
            from_profile: Uuid::parse_str(&from_str).context("Invalid from_profile ID")?,
            to_profile: Uuid::parse_str(&to_str).context("Invalid to_profile ID")?,
            amount_cents: row.get("amount_cents"),
            description: row.get("description"),
            settlement_date: parse_date(&settlement_date_str)?,
            created_at: parse_timestamp(&created_at_str)?,
        })
    }

    // ========================
    // Settings
    // ========================

    pub async fn get_group_size(&self) -> Result<u32> {
        let row = sqlx::query("SELECT value FROM settings WHERE name = 'group_size'")
            .fetch_one(&self.pool)
            .await
            .context("Failed to fetch group size")?;

        let value: String = row.get("value");
        value.parse().context("Invalid group size setting")
    }

    pub async fn set_group_size(&self, size: u32) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (name, value) VALUES ('group_size', ?)
            ON CONFLICT(name) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(size.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to set group size")?;
        Ok(())
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .context("Invalid timestamp")?
        .with_timezone(&Utc))
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").context("Invalid date")
}
