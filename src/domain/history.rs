use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{CategoryFilter, Cents, Expense, Profile, ProfileId};

/// Search and category criteria applied to an expense list before display.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    /// Case-insensitive match against description or payer name
    pub search: Option<String>,
    pub category: CategoryFilter,
}

impl ExpenseFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.category == CategoryFilter::All
    }
}

/// Apply search and category filters. The search term matches the expense
/// description or the payer's profile name, both case-insensitively.
pub fn filter_expenses(
    expenses: &[Expense],
    profiles: &[Profile],
    filter: &ExpenseFilter,
) -> Vec<Expense> {
    let names: HashMap<ProfileId, String> = profiles
        .iter()
        .map(|p| (p.id, p.name.to_lowercase()))
        .collect();
    let needle = filter.search.as_ref().map(|s| s.to_lowercase());

    expenses
        .iter()
        .filter(|expense| {
            let matches_search = match &needle {
                None => true,
                Some(needle) => {
                    expense.description.to_lowercase().contains(needle)
                        || expense
                            .paid_by
                            .and_then(|id| names.get(&id))
                            .is_some_and(|name| name.contains(needle))
                }
            };
            matches_search && filter.category.matches(expense.category_id)
        })
        .cloned()
        .collect()
}

/// One historical month of expenses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthGroup {
    /// Sortable key, "YYYY-MM"
    pub key: String,
    /// Display label, e.g. "July 2024"
    pub label: String,
    pub expenses: Vec<Expense>,
    pub total_cents: Cents,
}

/// Partitioned view of an expense list around a reference month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyHistory {
    /// Expenses dated in the reference month, original order preserved
    pub current: Vec<Expense>,
    pub current_total: Cents,
    /// All other months, most recent first
    pub past: Vec<MonthGroup>,
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Partition expenses into the reference date's calendar month and grouped
/// historical months sorted descending (most recent first). An expense lands
/// in exactly one side of the partition.
pub fn split_by_month(expenses: Vec<Expense>, reference: NaiveDate) -> MonthlyHistory {
    let mut current = Vec::new();
    let mut groups: BTreeMap<String, MonthGroup> = BTreeMap::new();

    for expense in expenses {
        if same_month(expense.expense_date, reference) {
            current.push(expense);
            continue;
        }
        let key = expense.expense_date.format("%Y-%m").to_string();
        let group = groups.entry(key.clone()).or_insert_with(|| MonthGroup {
            key,
            label: expense.expense_date.format("%B %Y").to_string(),
            expenses: Vec::new(),
            total_cents: 0,
        });
        group.total_cents += expense.amount_cents;
        group.expenses.push(expense);
    }

    let current_total = current.iter().map(|e| e.amount_cents).sum();
    MonthlyHistory {
        current,
        current_total,
        // BTreeMap iterates ascending by key; reverse for most recent first.
        past: groups.into_values().rev().collect(),
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::domain::Expense;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn expense_on(description: &str, cents: Cents, day: &str) -> Expense {
        Expense::new(description, cents, "AED", date(day))
    }

    #[test]
    fn test_current_month_never_in_history() {
        let expenses = vec![
            expense_on("rent", 300000, "2024-07-01"),
            expense_on("groceries", 4500, "2024-07-15"),
            expense_on("old rent", 300000, "2024-06-01"),
        ];

        let history = split_by_month(expenses, date("2024-07-20"));

        assert_eq!(history.current.len(), 2);
        assert_eq!(history.current_total, 304500);
        assert_eq!(history.past.len(), 1);
        assert!(history.past[0].expenses.iter().all(|e| e.description == "old rent"));
    }

    #[test]
    fn test_history_keys_sort_descending() {
        let expenses = vec![
            expense_on("a", 100, "2024-01-10"),
            expense_on("b", 100, "2024-05-10"),
            expense_on("c", 100, "2023-12-10"),
            expense_on("d", 100, "2024-05-20"),
        ];

        let history = split_by_month(expenses, date("2024-07-01"));
        let keys: Vec<&str> = history.past.iter().map(|g| g.key.as_str()).collect();

        assert_eq!(keys, vec!["2024-05", "2024-01", "2023-12"]);
        for pair in keys.windows(2) {
            assert!(pair[0] > pair[1], "keys must be strictly descending");
        }
    }

    #[test]
    fn test_month_group_totals_and_labels() {
        let expenses = vec![
            expense_on("a", 1000, "2024-05-10"),
            expense_on("b", 2500, "2024-05-20"),
        ];

        let history = split_by_month(expenses, date("2024-07-01"));

        assert_eq!(history.past.len(), 1);
        assert_eq!(history.past[0].total_cents, 3500);
        assert_eq!(history.past[0].label, "May 2024");
        assert_eq!(history.past[0].key, "2024-05");
    }

    #[test]
    fn test_same_month_different_year_is_history() {
        let expenses = vec![expense_on("old july", 100, "2023-07-04")];
        let history = split_by_month(expenses, date("2024-07-01"));

        assert!(history.current.is_empty());
        assert_eq!(history.past.len(), 1);
    }

    #[test]
    fn test_search_matches_description_case_insensitive() {
        let profiles = vec![Profile::new("Alice")];
        let expenses = vec![
            expense_on("Weekly Groceries", 100, "2024-07-01"),
            expense_on("internet", 100, "2024-07-02"),
        ];

        let filter = ExpenseFilter {
            search: Some("GROCER".into()),
            category: CategoryFilter::All,
        };
        let found = filter_expenses(&expenses, &profiles, &filter);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].description, "Weekly Groceries");
    }

    #[test]
    fn test_search_matches_payer_name() {
        let alice = Profile::new("Alice");
        let bob = Profile::new("Bob");
        let expenses = vec![
            expense_on("rent", 100, "2024-07-01").with_payer(alice.id),
            expense_on("rent", 100, "2024-07-02").with_payer(bob.id),
            expense_on("rent", 100, "2024-07-03"),
        ];
        let profiles = vec![alice, bob];

        let filter = ExpenseFilter {
            search: Some("alice".into()),
            category: CategoryFilter::All,
        };
        let found = filter_expenses(&expenses, &profiles, &filter);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].paid_by, Some(profiles[0].id));
    }

    #[test]
    fn test_category_filter_exact_or_all() {
        let wanted = Uuid::new_v4();
        let other = Uuid::new_v4();
        let expenses = vec![
            expense_on("a", 100, "2024-07-01").with_category(wanted),
            expense_on("b", 100, "2024-07-02").with_category(other),
            expense_on("c", 100, "2024-07-03"),
        ];

        let all = filter_expenses(&expenses, &[], &ExpenseFilter::default());
        assert_eq!(all.len(), 3);

        let filter = ExpenseFilter {
            search: None,
            category: CategoryFilter::Only(wanted),
        };
        let only = filter_expenses(&expenses, &[], &filter);
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].category_id, Some(wanted));
    }
}
