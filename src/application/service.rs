use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

use crate::domain::{
    Category, CategoryFilter, CategoryId, Cents, Expense, ExpenseFilter, ExpenseId, MemberBalance,
    MonthlyHistory, PaymentMethod, Profile, ProfileId, Settlement, SettlementId, compute_balances,
    filter_expenses, split_by_month,
};
use crate::storage::Repository;

use super::{AppError, DashboardStats, ExpenseDetail, SettlementDetail};

/// Application service providing high-level operations for the shared ledger.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct SplitService {
    repo: Repository,
}

/// Fields accepted when adding or editing an expense. References are by name
/// and resolved against the database.
#[derive(Debug, Clone, Default)]
pub struct ExpenseInput {
    pub description: String,
    pub amount_cents: Cents,
    pub currency: String,
    pub expense_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub paid_by: Option<String>,
    pub payment_method: PaymentMethod,
}

impl SplitService {
    /// Create a new service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    pub(crate) fn repo(&self) -> &Repository {
        &self.repo
    }

    // ========================
    // Profile operations
    // ========================

    /// Create a new group member profile.
    pub async fn create_profile(&self, name: &str) -> Result<Profile, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::MissingField("name"));
        }
        if self.repo.get_profile_by_name(name).await?.is_some() {
            return Err(AppError::ProfileAlreadyExists(name.to_string()));
        }

        let profile = Profile::new(name);
        self.repo.save_profile(&profile).await?;
        Ok(profile)
    }

    /// Get a profile by name.
    pub async fn get_profile(&self, name: &str) -> Result<Profile, AppError> {
        self.repo
            .get_profile_by_name(name)
            .await?
            .ok_or_else(|| AppError::ProfileNotFound(name.to_string()))
    }

    /// List all profiles, ordered by name.
    pub async fn list_profiles(&self) -> Result<Vec<Profile>, AppError> {
        Ok(self.repo.list_profiles().await?)
    }

    // ========================
    // Category operations
    // ========================

    /// Create a new expense category.
    pub async fn create_category(
        &self,
        name: &str,
        icon: &str,
        color: &str,
    ) -> Result<Category, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::MissingField("name"));
        }
        if self.repo.get_category_by_name(name).await?.is_some() {
            return Err(AppError::CategoryAlreadyExists(name.to_string()));
        }

        let category = Category::new(name, icon, color);
        self.repo.save_category(&category).await?;
        Ok(category)
    }

    /// List all categories, ordered by name.
    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.repo.list_categories().await?)
    }

    /// Delete a category by name. Expenses keep running as uncategorized.
    pub async fn delete_category(&self, name: &str) -> Result<Category, AppError> {
        let category = self
            .repo
            .get_category_by_name(name)
            .await?
            .ok_or_else(|| AppError::CategoryNotFound(name.to_string()))?;
        self.repo.delete_category(category.id).await?;
        Ok(category)
    }

    // ========================
    // Expense operations
    // ========================

    async fn resolve_expense_refs(
        &self,
        input: &ExpenseInput,
    ) -> Result<(Option<CategoryId>, Option<ProfileId>), AppError> {
        let category_id = match &input.category {
            Some(name) => Some(
                self.repo
                    .get_category_by_name(name)
                    .await?
                    .ok_or_else(|| AppError::CategoryNotFound(name.clone()))?
                    .id,
            ),
            None => None,
        };
        let payer_id = match &input.paid_by {
            Some(name) => Some(self.get_profile(name).await?.id),
            None => None,
        };
        Ok((category_id, payer_id))
    }

    fn validate_expense_input(input: &ExpenseInput) -> Result<NaiveDate, AppError> {
        if input.description.trim().is_empty() {
            return Err(AppError::MissingField("description"));
        }
        let expense_date = input.expense_date.ok_or(AppError::MissingField("date"))?;
        if input.amount_cents <= 0 {
            return Err(AppError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }
        Ok(expense_date)
    }

    /// Record a new shared expense.
    pub async fn add_expense(&self, input: ExpenseInput) -> Result<Expense, AppError> {
        let expense_date = Self::validate_expense_input(&input)?;
        let (category_id, payer_id) = self.resolve_expense_refs(&input).await?;

        let mut expense = Expense::new(
            input.description.trim(),
            input.amount_cents,
            input.currency.clone(),
            expense_date,
        )
        .with_payment_method(input.payment_method);
        expense.category_id = category_id;
        expense.paid_by = payer_id;

        self.repo.save_expense(&expense).await?;
        Ok(expense)
    }

    /// Replace an existing expense's fields.
    pub async fn update_expense(
        &self,
        id: ExpenseId,
        input: ExpenseInput,
    ) -> Result<Expense, AppError> {
        let existing = self
            .repo
            .get_expense(id)
            .await?
            .ok_or_else(|| AppError::ExpenseNotFound(id.to_string()))?;

        let expense_date = Self::validate_expense_input(&input)?;
        let (category_id, payer_id) = self.resolve_expense_refs(&input).await?;

        let updated = Expense {
            id: existing.id,
            description: input.description.trim().to_string(),
            amount_cents: input.amount_cents,
            currency: input.currency,
            expense_date,
            category_id,
            paid_by: payer_id,
            payment_method: input.payment_method,
            created_at: existing.created_at,
        };

        self.repo.update_expense(&updated).await?;
        Ok(updated)
    }

    /// Delete an expense by id.
    pub async fn delete_expense(&self, id: ExpenseId) -> Result<(), AppError> {
        if !self.repo.delete_expense(id).await? {
            return Err(AppError::ExpenseNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Get an expense with its category and payer expanded.
    pub async fn get_expense_detail(&self, id: ExpenseId) -> Result<ExpenseDetail, AppError> {
        let expense = self
            .repo
            .get_expense(id)
            .await?
            .ok_or_else(|| AppError::ExpenseNotFound(id.to_string()))?;

        let category = match expense.category_id {
            Some(category_id) => self.repo.get_category(category_id).await?,
            None => None,
        };
        let payer = match expense.paid_by {
            Some(profile_id) => self.repo.get_profile(profile_id).await?,
            None => None,
        };

        Ok(ExpenseDetail {
            expense,
            category,
            payer,
        })
    }

    /// List all expenses, newest first.
    pub async fn list_expenses(&self) -> Result<Vec<Expense>, AppError> {
        Ok(self.repo.list_expenses().await?)
    }

    /// List expenses matching a search term and/or category filter.
    pub async fn search_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, AppError> {
        let expenses = self.repo.list_expenses().await?;
        if filter.is_empty() {
            return Ok(expenses);
        }
        let profiles = self.repo.list_profiles().await?;
        Ok(filter_expenses(&expenses, &profiles, filter))
    }

    /// Resolve a category filter from an optional name, where `None` means all.
    pub async fn category_filter(&self, name: Option<&str>) -> Result<CategoryFilter, AppError> {
        match name {
            None => Ok(CategoryFilter::All),
            Some(name) => {
                let category = self
                    .repo
                    .get_category_by_name(name)
                    .await?
                    .ok_or_else(|| AppError::CategoryNotFound(name.to_string()))?;
                Ok(CategoryFilter::Only(category.id))
            }
        }
    }

    // ========================
    // Settlement operations
    // ========================

    /// Record a repayment from one member to another.
    pub async fn record_repayment(
        &self,
        from_name: &str,
        to_name: &str,
        amount_cents: Cents,
        settlement_date: NaiveDate,
        description: Option<String>,
    ) -> Result<Settlement, AppError> {
        if amount_cents <= 0 {
            return Err(AppError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }

        let from = self.get_profile(from_name).await?;
        let to = self.get_profile(to_name).await?;
        if from.id == to.id {
            return Err(AppError::RepaymentToSelf);
        }

        let mut settlement = Settlement::new(from.id, to.id, amount_cents, settlement_date);
        if let Some(desc) = description.filter(|d| !d.trim().is_empty()) {
            settlement = settlement.with_description(desc.trim());
        }

        self.repo.save_settlement(&settlement).await?;
        Ok(settlement)
    }

    /// Record a debt pay-down: a unilateral credit a member applies to their
    /// own tracked debt.
    pub async fn record_pay_down(
        &self,
        profile_name: &str,
        amount_cents: Cents,
        settlement_date: NaiveDate,
        description: Option<String>,
    ) -> Result<Settlement, AppError> {
        if amount_cents <= 0 {
            return Err(AppError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }

        let profile = self.get_profile(profile_name).await?;
        let mut settlement = Settlement::pay_down(profile.id, amount_cents, settlement_date);
        if let Some(desc) = description.filter(|d| !d.trim().is_empty()) {
            settlement = settlement.with_description(desc.trim());
        }

        self.repo.save_settlement(&settlement).await?;
        Ok(settlement)
    }

    /// List settlements with member names resolved, newest first.
    pub async fn list_settlements(&self) -> Result<Vec<SettlementDetail>, AppError> {
        let settlements = self.repo.list_settlements().await?;
        let names: HashMap<ProfileId, String> = self
            .repo
            .list_profiles()
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        Ok(settlements
            .into_iter()
            .map(|settlement| {
                let from_name = names
                    .get(&settlement.from_profile)
                    .cloned()
                    .unwrap_or_else(|| settlement.from_profile.to_string());
                let to_name = names
                    .get(&settlement.to_profile)
                    .cloned()
                    .unwrap_or_else(|| settlement.to_profile.to_string());
                SettlementDetail {
                    settlement,
                    from_name,
                    to_name,
                }
            })
            .collect())
    }

    /// Delete a settlement by id.
    pub async fn delete_settlement(&self, id: SettlementId) -> Result<(), AppError> {
        if !self.repo.delete_settlement(id).await? {
            return Err(AppError::SettlementNotFound(id.to_string()));
        }
        Ok(())
    }

    // ========================
    // Aggregates
    // ========================

    /// Per-member balance summary over the full ledger.
    pub async fn balance_summary(&self) -> Result<Vec<MemberBalance>, AppError> {
        let profiles = self.repo.list_profiles().await?;
        let expenses = self.repo.list_expenses().await?;
        let settlements = self.repo.list_settlements().await?;
        let group_size = self.repo.get_group_size().await?;

        Ok(compute_balances(
            &profiles,
            &expenses,
            &settlements,
            group_size,
        ))
    }

    /// Headline totals for the dashboard, relative to `today`'s month.
    pub async fn dashboard(&self, today: NaiveDate) -> Result<DashboardStats, AppError> {
        let (month_start, next_month) = month_bounds(today);

        let total_cents = self.repo.total_expenses_cents().await?;
        let month_cents = self
            .repo
            .total_expenses_between(month_start, next_month)
            .await?;
        let expense_count = self.repo.count_expenses().await?;
        let group_size = self.repo.get_group_size().await?;

        Ok(DashboardStats {
            total_cents,
            month_cents,
            expense_count,
            per_person_cents: total_cents / group_size as i64,
        })
    }

    /// Filtered expenses partitioned into the current month and grouped
    /// history, relative to `today`.
    pub async fn monthly_history(
        &self,
        filter: &ExpenseFilter,
        today: NaiveDate,
    ) -> Result<MonthlyHistory, AppError> {
        let expenses = self.search_expenses(filter).await?;
        Ok(split_by_month(expenses, today))
    }

    // ========================
    // Group settings
    // ========================

    /// How many ways expenses are split.
    pub async fn group_size(&self) -> Result<u32, AppError> {
        Ok(self.repo.get_group_size().await?)
    }

    /// Change the split divisor. Takes effect for every balance computation,
    /// past expenses included.
    pub async fn set_group_size(&self, size: u32) -> Result<(), AppError> {
        if size < 2 {
            return Err(AppError::InvalidGroupSize(size));
        }
        self.repo.set_group_size(size).await?;
        Ok(())
    }
}

/// First day of `date`'s month and first day of the following month.
fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).unwrap();
    let next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
    .unwrap();
    (start, next)
}
