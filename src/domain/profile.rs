use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AccountId;

pub type ProfileId = Uuid;

/// A member of the expense-sharing group.
/// Profiles exist independently of login accounts; a profile created during
/// sign-up carries a link to the account that owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub name: String,
    pub account_id: Option<AccountId>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            account_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn is_linked(&self) -> bool {
        self.account_id.is_some()
    }
}
