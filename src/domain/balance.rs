use serde::{Deserialize, Serialize};

use super::{Cents, Expense, Profile, ProfileId, Settlement, total_expenses};

/// Where a member stands after paid amounts, shares, and settlements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    GetsBack,
    Owes,
    Even,
}

impl std::fmt::Display for Standing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Standing::GetsBack => "gets back",
            Standing::Owes => "owes",
            Standing::Even => "even",
        };
        write!(f, "{}", label)
    }
}

/// Per-member balance summary. Derived, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberBalance {
    pub profile_id: ProfileId,
    pub name: String,
    /// Total this member paid for the group
    pub paid: Cents,
    /// Equal share of the group total (identical for every member)
    pub share: Cents,
    /// Sum of this member's debt pay-downs (self-settlements)
    pub settlement_credit: Cents,
    /// Peer repayments this member made to others
    pub repaid: Cents,
    /// Peer repayments others made to this member
    pub received: Cents,
    /// paid - share + settlement_credit - repaid + received
    pub balance: Cents,
}

impl MemberBalance {
    pub fn standing(&self) -> Standing {
        match self.balance {
            b if b > 0 => Standing::GetsBack,
            b if b < 0 => Standing::Owes,
            _ => Standing::Even,
        }
    }
}

/// Compute the balance summary for every member of the group.
///
/// The share is the group total divided by the configured group size, not by
/// the number of profiles present: a member who never paid anything still
/// owes a full share.
///
/// Settlements with `from == to` are unilateral credits, so the sum of all
/// balances equals the sum of self-settlement credits (plus any integer
/// division remainder of the share). Settlements between distinct members
/// cancel out across the group.
pub fn compute_balances(
    profiles: &[Profile],
    expenses: &[Expense],
    settlements: &[Settlement],
    group_size: u32,
) -> Vec<MemberBalance> {
    let total = total_expenses(expenses);
    let share = total / group_size as i64;

    profiles
        .iter()
        .map(|profile| {
            let paid = expenses
                .iter()
                .filter(|e| e.paid_by == Some(profile.id))
                .map(|e| e.amount_cents)
                .sum();

            let (mut settlement_credit, mut repaid, mut received) = (0, 0, 0);
            for settlement in settlements {
                if settlement.is_self_settlement() {
                    if settlement.from_profile == profile.id {
                        settlement_credit += settlement.amount_cents;
                    }
                } else if settlement.from_profile == profile.id {
                    repaid += settlement.amount_cents;
                } else if settlement.to_profile == profile.id {
                    received += settlement.amount_cents;
                }
            }

            let balance = paid - share + settlement_credit - repaid + received;

            MemberBalance {
                profile_id: profile.id,
                name: profile.name.clone(),
                paid,
                share,
                settlement_credit,
                repaid,
                received,
                balance,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::Expense;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn group() -> Vec<Profile> {
        vec![
            Profile::new("Alice"),
            Profile::new("Bob"),
            Profile::new("Carol"),
        ]
    }

    fn expense(payer: &Profile, cents: Cents) -> Expense {
        Expense::new("expense", cents, "AED", date("2024-07-01")).with_payer(payer.id)
    }

    #[test]
    fn test_no_expenses_all_even() {
        let profiles = group();
        let balances = compute_balances(&profiles, &[], &[], 3);

        assert_eq!(balances.len(), 3);
        for member in &balances {
            assert_eq!(member.paid, 0);
            assert_eq!(member.share, 0);
            assert_eq!(member.balance, 0);
            assert_eq!(member.standing(), Standing::Even);
        }
    }

    #[test]
    fn test_single_payer_three_way_split() {
        // Literal case: A pays 90, three members, no settlements.
        let profiles = group();
        let expenses = vec![expense(&profiles[0], 9000)];

        let balances = compute_balances(&profiles, &expenses, &[], 3);

        for member in &balances {
            assert_eq!(member.share, 3000);
        }
        assert_eq!(balances[0].balance, 6000);
        assert_eq!(balances[1].balance, -3000);
        assert_eq!(balances[2].balance, -3000);
        assert_eq!(balances[0].standing(), Standing::GetsBack);
        assert_eq!(balances[1].standing(), Standing::Owes);
    }

    #[test]
    fn test_paid_sums_to_total() {
        let profiles = group();
        let expenses = vec![
            expense(&profiles[0], 9000),
            expense(&profiles[1], 4500),
            expense(&profiles[2], 1500),
            expense(&profiles[0], 600),
        ];

        let balances = compute_balances(&profiles, &expenses, &[], 3);
        let paid_sum: Cents = balances.iter().map(|b| b.paid).sum();

        assert_eq!(paid_sum, total_expenses(&expenses));
    }

    #[test]
    fn test_unattributed_expense_still_counts_in_share() {
        let profiles = group();
        // Nobody recorded as payer: paid stays 0 for everyone but the share grows.
        let expenses = vec![Expense::new("mystery", 9000, "AED", date("2024-07-01"))];

        let balances = compute_balances(&profiles, &expenses, &[], 3);

        for member in &balances {
            assert_eq!(member.paid, 0);
            assert_eq!(member.share, 3000);
            assert_eq!(member.balance, -3000);
        }
    }

    #[test]
    fn test_self_settlement_reduces_debt() {
        let profiles = group();
        let expenses = vec![expense(&profiles[0], 9000)];
        // Bob owes 30 and records a 30 pay-down.
        let settlements = vec![Settlement::pay_down(profiles[1].id, 3000, date("2024-07-02"))];

        let balances = compute_balances(&profiles, &expenses, &settlements, 3);

        assert_eq!(balances[1].settlement_credit, 3000);
        assert_eq!(balances[1].balance, 0);
        assert_eq!(balances[1].standing(), Standing::Even);
        // Untouched members keep their balances.
        assert_eq!(balances[0].balance, 6000);
        assert_eq!(balances[2].balance, -3000);
    }

    #[test]
    fn test_peer_repayment_is_zero_sum() {
        let profiles = group();
        let expenses = vec![expense(&profiles[0], 9000)];
        let settlements = vec![
            Settlement::new(profiles[1].id, profiles[0].id, 3000, date("2024-07-02")),
        ];

        let balances = compute_balances(&profiles, &expenses, &settlements, 3);

        assert_eq!(balances[1].repaid, 3000);
        assert_eq!(balances[0].received, 3000);
        assert_eq!(balances[1].balance, 0);
        assert_eq!(balances[0].balance, 9000);

        let sum: Cents = balances.iter().map(|b| b.balance).sum();
        assert_eq!(sum, 0, "peer repayments must not change the group total");
    }

    #[test]
    fn test_balances_sum_to_self_credits() {
        let profiles = group();
        let expenses = vec![expense(&profiles[0], 9000), expense(&profiles[1], 3000)];
        let settlements = vec![
            Settlement::pay_down(profiles[2].id, 1500, date("2024-07-03")),
            Settlement::new(profiles[1].id, profiles[0].id, 500, date("2024-07-04")),
            Settlement::pay_down(profiles[1].id, 700, date("2024-07-05")),
        ];

        let balances = compute_balances(&profiles, &expenses, &settlements, 3);
        let sum: Cents = balances.iter().map(|b| b.balance).sum();
        let self_credits: Cents = settlements
            .iter()
            .filter(|s| s.is_self_settlement())
            .map(|s| s.amount_cents)
            .sum();

        assert_eq!(sum, self_credits);
    }

    #[test]
    fn test_share_uses_group_size_not_profile_count() {
        // Only two profiles present but the group is configured for four.
        let profiles = vec![Profile::new("Alice"), Profile::new("Bob")];
        let expenses = vec![expense(&profiles[0], 8000)];

        let balances = compute_balances(&profiles, &expenses, &[], 4);

        assert_eq!(balances[0].share, 2000);
        assert_eq!(balances[0].balance, 6000);
        assert_eq!(balances[1].balance, -2000);
    }

    #[test]
    fn test_share_floors_on_uneven_total() {
        let profiles = group();
        let expenses = vec![expense(&profiles[0], 100)];

        let balances = compute_balances(&profiles, &expenses, &[], 3);

        // 100 / 3 floors to 33; the remainder stays with the group.
        assert_eq!(balances[0].share, 33);
        assert_eq!(balances[0].balance, 67);
    }
}
