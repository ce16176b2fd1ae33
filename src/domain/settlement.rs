use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, ProfileId};

pub type SettlementId = Uuid;

/// A recorded payment against outstanding debt. Two variants share this
/// record:
/// - peer repayment: `from != to`, money moved between two members;
/// - debt pay-down: `from == to`, a unilateral credit a member records
///   against their own tracked debt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub from_profile: ProfileId,
    pub to_profile: ProfileId,
    /// Amount in cents (always positive)
    pub amount_cents: Cents,
    pub description: Option<String>,
    pub settlement_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Settlement {
    pub fn new(
        from_profile: ProfileId,
        to_profile: ProfileId,
        amount_cents: Cents,
        settlement_date: NaiveDate,
    ) -> Self {
        assert!(amount_cents > 0, "Settlement amount must be positive");
        Self {
            id: Uuid::new_v4(),
            from_profile,
            to_profile,
            amount_cents,
            description: None,
            settlement_date,
            created_at: Utc::now(),
        }
    }

    /// A debt pay-down recorded by a member against themselves.
    pub fn pay_down(profile: ProfileId, amount_cents: Cents, settlement_date: NaiveDate) -> Self {
        Self::new(profile, profile, amount_cents, settlement_date)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_self_settlement(&self) -> bool {
        self.from_profile == self.to_profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_peer_repayment() {
        let (from, to) = (Uuid::new_v4(), Uuid::new_v4());
        let settlement =
            Settlement::new(from, to, 3000, date("2024-07-10")).with_description("July rent share");

        assert!(!settlement.is_self_settlement());
        assert_eq!(settlement.amount_cents, 3000);
        assert_eq!(settlement.description.as_deref(), Some("July rent share"));
    }

    #[test]
    fn test_pay_down_is_self_settlement() {
        let profile = Uuid::new_v4();
        let settlement = Settlement::pay_down(profile, 1500, date("2024-07-12"));

        assert!(settlement.is_self_settlement());
        assert_eq!(settlement.from_profile, settlement.to_profile);
    }

    #[test]
    #[should_panic(expected = "Settlement amount must be positive")]
    fn test_settlement_requires_positive_amount() {
        let profile = Uuid::new_v4();
        Settlement::pay_down(profile, 0, date("2024-07-12"));
    }
}
