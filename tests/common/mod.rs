// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use roomsplit::application::{ExpenseInput, SplitService};
use roomsplit::domain::PaymentMethod;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(SplitService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = SplitService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a YYYY-MM-DD date string
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Test fixture: the standard three-member group
pub struct StandardGroup;

impl StandardGroup {
    pub const MEMBERS: [&'static str; 3] = ["Alice", "Bob", "Carol"];

    pub async fn create(service: &SplitService) -> Result<()> {
        for name in Self::MEMBERS {
            service.create_profile(name).await?;
        }
        Ok(())
    }
}

/// Record an expense with sensible defaults for tests.
pub async fn add_expense(
    service: &SplitService,
    description: &str,
    amount_cents: i64,
    paid_by: Option<&str>,
    day: &str,
) -> Result<roomsplit::domain::Expense> {
    let expense = service
        .add_expense(ExpenseInput {
            description: description.to_string(),
            amount_cents,
            currency: "AED".to_string(),
            expense_date: Some(date(day)),
            category: None,
            paid_by: paid_by.map(str::to_string),
            payment_method: PaymentMethod::Cash,
        })
        .await?;
    Ok(expense)
}
