use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CategoryId = Uuid;

/// An expense category with a display icon and color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>, icon: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: icon.into(),
            color: color.into(),
            created_at: Utc::now(),
        }
    }
}

/// Category selection for expense filtering. `All` is the pass-everything
/// sentinel from the dashboard dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(CategoryId),
}

impl CategoryFilter {
    pub fn matches(&self, category_id: Option<CategoryId>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => category_id == Some(*wanted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_all_passes_everything() {
        assert!(CategoryFilter::All.matches(None));
        assert!(CategoryFilter::All.matches(Some(Uuid::new_v4())));
    }

    #[test]
    fn test_filter_only_matches_exactly() {
        let wanted = Uuid::new_v4();
        let filter = CategoryFilter::Only(wanted);
        assert!(filter.matches(Some(wanted)));
        assert!(!filter.matches(Some(Uuid::new_v4())));
        assert!(!filter.matches(None));
    }
}
