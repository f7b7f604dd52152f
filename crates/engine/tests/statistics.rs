mod common;

use common::{ALICE, BOB, category, date, engine_with_db, record};
use engine::{DateRange, Money, TransactionKind};
use rust_decimal::Decimal;

#[tokio::test]
async fn summary_without_transactions_is_zero() {
    let (engine, _db) = engine_with_db().await;
    let summary = engine.summary(ALICE, DateRange::default()).await.unwrap();
    assert_eq!(summary.total_income, Money::ZERO);
    assert_eq!(summary.total_expenses, Money::ZERO);
    assert_eq!(summary.balance, Money::ZERO);
    assert_eq!(summary.balance.to_string(), "0.00");
}

#[tokio::test]
async fn summary_range_is_inclusive() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food", TransactionKind::Expense, ALICE).await;
    let salary = category(&engine, "Salary", TransactionKind::Income, ALICE).await;
    record(&engine, &salary, 1000_00, date(2026, 4, 1), None).await;
    record(&engine, &food, 250_25, date(2026, 4, 30), None).await;
    record(&engine, &food, 10_00, date(2026, 5, 1), None).await;

    let bobs = category(&engine, "Food", TransactionKind::Expense, BOB).await;
    record(&engine, &bobs, 77_00, date(2026, 4, 15), None).await;

    let april = engine
        .summary(
            ALICE,
            DateRange {
                start: Some(date(2026, 4, 1)),
                end: Some(date(2026, 4, 30)),
            },
        )
        .await
        .unwrap();
    assert_eq!(april.total_income, Money::new(1000_00));
    assert_eq!(april.total_expenses, Money::new(250_25));
    assert_eq!(april.balance, Money::new(749_75));

    let everything = engine.summary(ALICE, DateRange::default()).await.unwrap();
    assert_eq!(everything.total_expenses, Money::new(260_25));
    assert_eq!(everything.balance, Money::new(739_75));
}

#[tokio::test]
async fn breakdown_is_sorted_and_percentages_add_up() {
    let (engine, _db) = engine_with_db().await;
    let rent = category(&engine, "Rent", TransactionKind::Expense, ALICE).await;
    let food = category(&engine, "Food", TransactionKind::Expense, ALICE).await;
    let fun = category(&engine, "Fun", TransactionKind::Expense, ALICE).await;
    let salary = category(&engine, "Salary", TransactionKind::Income, ALICE).await;
    record(&engine, &rent, 500_00, date(2026, 6, 1), None).await;
    record(&engine, &food, 150_00, date(2026, 6, 2), None).await;
    record(&engine, &food, 100_00, date(2026, 6, 3), None).await;
    record(&engine, &fun, 250_00, date(2026, 6, 4), None).await;
    record(&engine, &salary, 9000_00, date(2026, 6, 5), None).await;

    let breakdown = engine
        .category_breakdown(ALICE, TransactionKind::Expense, DateRange::default())
        .await
        .unwrap();

    let names: Vec<_> = breakdown.iter().map(|b| b.category_name.as_str()).collect();
    assert_eq!(names, ["Rent", "Food", "Fun"]);
    assert_eq!(breakdown[0].total, Money::new(500_00));
    assert_eq!(breakdown[0].percentage, Decimal::new(5000, 2));
    assert_eq!(breakdown[1].total, Money::new(250_00));
    assert_eq!(breakdown[1].category_id, food.id);
    assert!(breakdown.iter().all(|b| b.category_kind == TransactionKind::Expense));

    let sum: Decimal = breakdown.iter().map(|b| b.percentage).sum();
    assert_eq!(sum, Decimal::ONE_HUNDRED);
}

#[tokio::test]
async fn breakdown_percentages_round_to_two_decimals() {
    let (engine, _db) = engine_with_db().await;
    for name in ["A", "B", "C"] {
        let c = category(&engine, name, TransactionKind::Income, ALICE).await;
        record(&engine, &c, 1_00, date(2026, 6, 1), None).await;
    }
    let breakdown = engine
        .category_breakdown(ALICE, TransactionKind::Income, DateRange::default())
        .await
        .unwrap();
    assert!(breakdown.iter().all(|b| b.percentage == Decimal::new(3333, 2)));
    let sum: Decimal = breakdown.iter().map(|b| b.percentage).sum();
    assert!((Decimal::ONE_HUNDRED - sum).abs() <= Decimal::new(1, 1));
}

#[tokio::test]
async fn breakdown_without_data_is_empty() {
    let (engine, _db) = engine_with_db().await;
    let breakdown = engine
        .category_breakdown(ALICE, TransactionKind::Expense, DateRange::default())
        .await
        .unwrap();
    assert!(breakdown.is_empty());
}

#[tokio::test]
async fn monthly_totals_cover_months_with_data_in_the_year() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food", TransactionKind::Expense, ALICE).await;
    let salary = category(&engine, "Salary", TransactionKind::Income, ALICE).await;
    record(&engine, &salary, 2000_00, date(2026, 1, 31), None).await;
    record(&engine, &food, 300_00, date(2026, 1, 5), None).await;
    record(&engine, &food, 45_00, date(2026, 3, 9), None).await;
    record(&engine, &food, 1_00, date(2025, 12, 31), None).await;
    record(&engine, &food, 1_00, date(2027, 1, 1), None).await;

    let months = engine.monthly_totals(ALICE, 2026).await.unwrap();
    assert_eq!(months.len(), 2);

    assert_eq!(months[0].label(), "Jan 2026");
    assert_eq!(months[0].period(), "2026-01");
    assert_eq!(months[0].income, Money::new(2000_00));
    assert_eq!(months[0].expense, Money::new(300_00));

    assert_eq!(months[1].label(), "Mar 2026");
    assert_eq!(months[1].income, Money::ZERO);
    assert_eq!(months[1].expense, Money::new(45_00));
}
