use serde::{Deserialize, Serialize};

use crate::domain::{Category, Cents, Expense, Profile, Settlement};

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStats {
    /// All-time spending
    pub total_cents: Cents,
    /// Current calendar month spending
    pub month_cents: Cents,
    /// Number of expense records
    pub expense_count: i64,
    /// Equal share of the all-time total per member
    pub per_person_cents: Cents,
}

/// An expense with its references expanded for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseDetail {
    pub expense: Expense,
    pub category: Option<Category>,
    pub payer: Option<Profile>,
}

/// A settlement with member names resolved for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementDetail {
    pub settlement: Settlement,
    pub from_name: String,
    pub to_name: String,
}
