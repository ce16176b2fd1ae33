mod common;

use anyhow::Result;
use roomsplit::domain::{Cents, Standing};

use common::{StandardGroup, add_expense, date, test_service};

#[tokio::test]
async fn test_paid_sums_to_expense_total() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardGroup::create(&service).await?;

    add_expense(&service, "Rent", 300000, Some("Alice"), "2024-07-01").await?;
    add_expense(&service, "Groceries", 4550, Some("Bob"), "2024-07-05").await?;
    add_expense(&service, "Internet", 29900, Some("Carol"), "2024-07-10").await?;
    add_expense(&service, "Water", 1200, Some("Alice"), "2024-07-12").await?;

    let balances = service.balance_summary().await?;
    let paid_sum: Cents = balances.iter().map(|b| b.paid).sum();

    assert_eq!(paid_sum, 335650);
    Ok(())
}

#[tokio::test]
async fn test_share_is_identical_and_a_third_of_total() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardGroup::create(&service).await?;

    add_expense(&service, "Rent", 300000, Some("Alice"), "2024-07-01").await?;
    add_expense(&service, "Groceries", 60000, Some("Bob"), "2024-07-05").await?;

    let balances = service.balance_summary().await?;
    assert_eq!(balances.len(), 3);
    for member in &balances {
        assert_eq!(member.share, 120000);
    }
    Ok(())
}

#[tokio::test]
async fn test_single_payer_literal_case() -> Result<()> {
    // Expenses [Alice pays 90], members [Alice, Bob, Carol], no settlements:
    // everyone's share is 30, Alice +60, Bob -30, Carol -30.
    let (service, _temp) = test_service().await?;
    StandardGroup::create(&service).await?;

    add_expense(&service, "Dinner", 9000, Some("Alice"), "2024-07-01").await?;

    let balances = service.balance_summary().await?;
    let by_name = |name: &str| balances.iter().find(|b| b.name == name).unwrap();

    assert_eq!(by_name("Alice").share, 3000);
    assert_eq!(by_name("Alice").balance, 6000);
    assert_eq!(by_name("Bob").balance, -3000);
    assert_eq!(by_name("Carol").balance, -3000);
    assert_eq!(by_name("Alice").standing(), Standing::GetsBack);
    assert_eq!(by_name("Bob").standing(), Standing::Owes);
    Ok(())
}

#[tokio::test]
async fn test_pay_down_reduces_debt_by_exact_amount() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardGroup::create(&service).await?;

    add_expense(&service, "Dinner", 9000, Some("Alice"), "2024-07-01").await?;

    let before = service.balance_summary().await?;
    let bob_before = before.iter().find(|b| b.name == "Bob").unwrap().balance;
    assert_eq!(bob_before, -3000);

    service
        .record_pay_down("Bob", 3000, date("2024-07-02"), None)
        .await?;

    let after = service.balance_summary().await?;
    let bob = after.iter().find(|b| b.name == "Bob").unwrap();

    assert_eq!(bob.settlement_credit, 3000);
    assert_eq!(bob.balance, bob_before + 3000);
    assert_eq!(bob.standing(), Standing::Even);
    Ok(())
}

#[tokio::test]
async fn test_peer_repayment_is_zero_sum() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardGroup::create(&service).await?;

    add_expense(&service, "Dinner", 9000, Some("Alice"), "2024-07-01").await?;
    service
        .record_repayment("Bob", "Alice", 3000, date("2024-07-02"), None)
        .await?;

    let balances = service.balance_summary().await?;
    let by_name = |name: &str| balances.iter().find(|b| b.name == name).unwrap();

    assert_eq!(by_name("Bob").repaid, 3000);
    assert_eq!(by_name("Bob").balance, 0);
    assert_eq!(by_name("Alice").received, 3000);
    assert_eq!(by_name("Alice").balance, 9000);

    let sum: Cents = balances.iter().map(|b| b.balance).sum();
    assert_eq!(sum, 0);
    Ok(())
}

#[tokio::test]
async fn test_balances_sum_to_self_credits() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardGroup::create(&service).await?;

    add_expense(&service, "Rent", 9000, Some("Alice"), "2024-07-01").await?;
    add_expense(&service, "Gas", 3000, Some("Bob"), "2024-07-02").await?;
    service
        .record_pay_down("Carol", 1500, date("2024-07-03"), None)
        .await?;
    service
        .record_repayment("Bob", "Alice", 500, date("2024-07-04"), None)
        .await?;
    service
        .record_pay_down("Bob", 700, date("2024-07-05"), None)
        .await?;

    let balances = service.balance_summary().await?;
    let sum: Cents = balances.iter().map(|b| b.balance).sum();

    assert_eq!(sum, 1500 + 700);
    Ok(())
}

#[tokio::test]
async fn test_group_size_changes_share() -> Result<()> {
    let (service, _temp) = test_service().await?;
    StandardGroup::create(&service).await?;
    add_expense(&service, "Rent", 8000, Some("Alice"), "2024-07-01").await?;

    assert_eq!(service.group_size().await?, 3);

    service.set_group_size(4).await?;
    let balances = service.balance_summary().await?;
    for member in &balances {
        assert_eq!(member.share, 2000);
    }
    let alice = balances.iter().find(|b| b.name == "Alice").unwrap();
    assert_eq!(alice.balance, 6000);
    Ok(())
}

#[tokio::test]
async fn test_group_size_below_two_is_rejected() -> Result<()> {
    let (service, _temp) = test_service().await?;

    assert!(service.set_group_size(1).await.is_err());
    assert!(service.set_group_size(0).await.is_err());
    // The stored setting is untouched.
    assert_eq!(service.group_size().await?, 3);
    Ok(())
}
