use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CategoryId, Cents, ProfileId};

pub type ExpenseId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    CreditCard,
    DebitCard,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cash" => Some(PaymentMethod::Cash),
            "credit_card" => Some(PaymentMethod::CreditCard),
            "debit_card" => Some(PaymentMethod::DebitCard),
            "bank_transfer" => Some(PaymentMethod::BankTransfer),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A shared expense paid by one member on behalf of the whole group.
/// Expenses change only through an explicit edit and are deleted by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    /// Amount in cents (always positive)
    pub amount_cents: Cents,
    /// Display currency tag, e.g. "AED"
    pub currency: String,
    /// Calendar day the expense happened
    pub expense_date: NaiveDate,
    /// Category reference; None means uncategorized
    pub category_id: Option<CategoryId>,
    /// Who paid; None means unknown/anonymous
    pub paid_by: Option<ProfileId>,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        description: impl Into<String>,
        amount_cents: Cents,
        currency: impl Into<String>,
        expense_date: NaiveDate,
    ) -> Self {
        assert!(amount_cents > 0, "Expense amount must be positive");
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount_cents,
            currency: currency.into(),
            expense_date,
            category_id: None,
            paid_by: None,
            payment_method: PaymentMethod::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_payer(mut self, profile_id: ProfileId) -> Self {
        self.paid_by = Some(profile_id);
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }
}

/// Sum of all expense amounts.
pub fn total_expenses(expenses: &[Expense]) -> Cents {
    expenses.iter().map(|e| e.amount_cents).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_payment_method_roundtrip() {
        for method in [
            PaymentMethod::Cash,
            PaymentMethod::CreditCard,
            PaymentMethod::DebitCard,
            PaymentMethod::BankTransfer,
        ] {
            assert_eq!(PaymentMethod::from_str(method.as_str()), Some(method));
        }
        assert_eq!(PaymentMethod::from_str("cheque"), None);
    }

    #[test]
    fn test_create_expense() {
        let payer = Uuid::new_v4();
        let expense = Expense::new("Groceries", 4550, "AED", date("2024-07-01"))
            .with_payer(payer)
            .with_payment_method(PaymentMethod::CreditCard);

        assert_eq!(expense.amount_cents, 4550);
        assert_eq!(expense.paid_by, Some(payer));
        assert_eq!(expense.category_id, None);
        assert_eq!(expense.payment_method, PaymentMethod::CreditCard);
    }

    #[test]
    #[should_panic(expected = "Expense amount must be positive")]
    fn test_expense_requires_positive_amount() {
        Expense::new("Nothing", 0, "AED", date("2024-07-01"));
    }

    #[test]
    fn test_total_expenses() {
        let expenses = vec![
            Expense::new("Rent", 300000, "AED", date("2024-07-01")),
            Expense::new("Internet", 29900, "AED", date("2024-07-03")),
        ];
        assert_eq!(total_expenses(&expenses), 329900);
        assert_eq!(total_expenses(&[]), 0);
    }
}
