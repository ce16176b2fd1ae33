use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type AccountId = Uuid;
pub type SessionToken = Uuid;

/// A login account. Holds only credentials; the member identity lives in the
/// linked `Profile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    /// PHC-format Argon2 hash, never the raw password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into().to_lowercase(),
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }
}

/// An authenticated session issued at sign-in and revoked at sign-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: SessionToken,
    pub account_id: AccountId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Sessions last 30 days; long enough for a personal tool, bounded so a
    /// leaked token eventually dies.
    pub const TTL_DAYS: i64 = 30;

    pub fn issue(account_id: AccountId) -> Self {
        let now = Utc::now();
        Self {
            token: Uuid::new_v4(),
            account_id,
            created_at: now,
            expires_at: now + Duration::days(Self::TTL_DAYS),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_lowercases_email() {
        let account = Account::new("Alice@Example.COM", "$argon2id$fake");
        assert_eq!(account.email, "alice@example.com");
    }

    #[test]
    fn test_fresh_session_is_not_expired() {
        let session = Session::issue(Uuid::new_v4());
        assert!(!session.is_expired(Utc::now()));
    }

    #[test]
    fn test_session_expires_after_ttl() {
        let session = Session::issue(Uuid::new_v4());
        let later = session.created_at + Duration::days(Session::TTL_DAYS + 1);
        assert!(session.is_expired(later));
    }
}
