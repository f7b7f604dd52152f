mod common;

use common::{ALICE, BOB, at, category, count_rows, date, engine_with_db, record};
use sea_orm::{ConnectionTrait, Statement};

use engine::{
    EngineError, Money, NewTransaction, TransactionKind, TransactionListFilter,
    TransactionOrdering, TransactionPatch,
};

#[tokio::test]
async fn create_fills_category_name_and_defaults_the_date() {
    let (engine, _db) = engine_with_db().await;
    let salary = category(&engine, "Salary", TransactionKind::Income, ALICE).await;

    let tx = engine
        .create_transaction(
            NewTransaction {
                category_id: salary.id,
                kind: TransactionKind::Income,
                amount: Money::new(2500_00),
                description: Some("   ".to_string()),
                date: None,
            },
            ALICE,
            at(2026, 5, 31),
        )
        .await
        .unwrap();

    assert_eq!(tx.category_name, "Salary");
    assert_eq!(tx.date, date(2026, 5, 31));
    assert_eq!(tx.description, None);
    assert_eq!(tx.amount.to_string(), "2500.00");

    let loaded = engine.transaction(tx.id, ALICE).await.unwrap();
    assert_eq!(loaded, tx);
}

#[tokio::test]
async fn type_must_match_the_category_type() {
    let (engine, db) = engine_with_db().await;
    let salary = category(&engine, "Salary", TransactionKind::Income, ALICE).await;

    let err = engine
        .create_transaction(
            NewTransaction {
                category_id: salary.id,
                kind: TransactionKind::Expense,
                amount: Money::new(10_00),
                description: None,
                date: Some(date(2026, 1, 2)),
            },
            ALICE,
            at(2026, 1, 2),
        )
        .await
        .unwrap_err();

    assert_eq!(err.field(), Some("type"));
    assert_eq!(
        err.to_string(),
        "Transaction type must match category type. Got expense transaction with income category."
    );
    assert_eq!(count_rows(&db, "transactions").await, 0);
}

#[tokio::test]
async fn only_own_categories_can_be_used() {
    let (engine, db) = engine_with_db().await;
    let bobs = category(&engine, "Rent", TransactionKind::Expense, BOB).await;

    let err = engine
        .create_transaction(
            NewTransaction {
                category_id: bobs.id,
                kind: TransactionKind::Expense,
                amount: Money::new(10_00),
                description: None,
                date: None,
            },
            ALICE,
            at(2026, 1, 2),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        EngineError::InvalidCategory("You can only use your own categories.".to_string())
    );
    assert_eq!(err.field(), Some("category"));
    assert_eq!(count_rows(&db, "transactions").await, 0);
}

#[tokio::test]
async fn amounts_must_be_positive() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food", TransactionKind::Expense, ALICE).await;

    for minor in [0, -1_00] {
        let err = engine
            .create_transaction(
                NewTransaction {
                    category_id: food.id,
                    kind: TransactionKind::Expense,
                    amount: Money::new(minor),
                    description: None,
                    date: None,
                },
                ALICE,
                at(2026, 1, 2),
            )
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("amount"));
    }
}

#[tokio::test]
async fn patch_is_validated_against_the_merged_transaction() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food", TransactionKind::Expense, ALICE).await;
    let salary = category(&engine, "Salary", TransactionKind::Income, ALICE).await;
    let tx = record(&engine, &food, 12_50, date(2026, 2, 1), Some("lunch")).await;

    // Kind alone would disagree with the stored category.
    let err = engine
        .update_transaction(
            tx.id,
            TransactionPatch {
                kind: Some(TransactionKind::Income),
                ..TransactionPatch::default()
            },
            ALICE,
            at(2026, 2, 2),
        )
        .await
        .unwrap_err();
    assert_eq!(err.field(), Some("type"));

    let moved = engine
        .update_transaction(
            tx.id,
            TransactionPatch {
                kind: Some(TransactionKind::Income),
                category_id: Some(salary.id),
                ..TransactionPatch::default()
            },
            ALICE,
            at(2026, 2, 2),
        )
        .await
        .unwrap();
    assert_eq!(moved.kind, TransactionKind::Income);
    assert_eq!(moved.category_name, "Salary");
    assert_eq!(moved.amount, Money::new(12_50));
    assert_eq!(moved.description.as_deref(), Some("lunch"));
    assert_eq!(moved.date, date(2026, 2, 1));
    assert_eq!(moved.updated_at, at(2026, 2, 2));

    let cleared = engine
        .update_transaction(
            tx.id,
            TransactionPatch {
                description: Some(None),
                amount: Some(Money::new(99)),
                ..TransactionPatch::default()
            },
            ALICE,
            at(2026, 2, 3),
        )
        .await
        .unwrap();
    assert_eq!(cleared.description, None);
    assert_eq!(cleared.amount, Money::new(99));
}

#[tokio::test]
async fn other_users_transactions_are_invisible() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food", TransactionKind::Expense, ALICE).await;
    let tx = record(&engine, &food, 5_00, date(2026, 2, 1), None).await;

    assert!(matches!(
        engine.transaction(tx.id, BOB).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(matches!(
        engine.delete_transaction(tx.id, BOB).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
    assert!(
        engine
            .list_transactions(BOB, &TransactionListFilter::default())
            .await
            .unwrap()
            .is_empty()
    );

    engine.delete_transaction(tx.id, ALICE).await.unwrap();
    assert!(matches!(
        engine.transaction(tx.id, ALICE).await.unwrap_err(),
        EngineError::KeyNotFound(_)
    ));
}

#[tokio::test]
async fn list_filters_and_orders() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food", TransactionKind::Expense, ALICE).await;
    let bills = category(&engine, "Bills", TransactionKind::Expense, ALICE).await;
    let salary = category(&engine, "Salary", TransactionKind::Income, ALICE).await;

    let lunch = record(&engine, &food, 12_00, date(2026, 3, 3), Some("Lunch")).await;
    let power = record(&engine, &bills, 80_00, date(2026, 3, 1), Some("power")).await;
    let pay = record(&engine, &salary, 3000_00, date(2026, 3, 2), None).await;

    let ids = |list: Vec<engine::Transaction>| list.into_iter().map(|t| t.id).collect::<Vec<_>>();

    let default = engine
        .list_transactions(ALICE, &TransactionListFilter::default())
        .await
        .unwrap();
    assert_eq!(ids(default), [lunch.id, pay.id, power.id]);

    let by_amount = engine
        .list_transactions(
            ALICE,
            &TransactionListFilter {
                ordering: "-amount".parse::<TransactionOrdering>().unwrap(),
                ..TransactionListFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ids(by_amount), [pay.id, power.id, lunch.id]);

    let by_category = engine
        .list_transactions(
            ALICE,
            &TransactionListFilter {
                ordering: TransactionOrdering::CategoryNameAsc,
                ..TransactionListFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ids(by_category), [power.id, lunch.id, pay.id]);

    let expenses = engine
        .list_transactions(
            ALICE,
            &TransactionListFilter {
                kind: Some(TransactionKind::Expense),
                ..TransactionListFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ids(expenses), [lunch.id, power.id]);

    let on_day = engine
        .list_transactions(
            ALICE,
            &TransactionListFilter {
                date: Some(date(2026, 3, 2)),
                ..TransactionListFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ids(on_day), [pay.id]);

    let in_category = engine
        .list_transactions(
            ALICE,
            &TransactionListFilter {
                category_id: Some(bills.id),
                ..TransactionListFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ids(in_category), [power.id]);

    // Search covers both the description and the category name.
    let by_description = engine
        .list_transactions(
            ALICE,
            &TransactionListFilter {
                search: Some("lunch".to_string()),
                ..TransactionListFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ids(by_description), [lunch.id]);

    let by_category_name = engine
        .list_transactions(
            ALICE,
            &TransactionListFilter {
                search: Some("sal".to_string()),
                ..TransactionListFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ids(by_category_name), [pay.id]);
}

#[tokio::test]
async fn search_treats_like_wildcards_literally() {
    let (engine, _db) = engine_with_db().await;
    let food = category(&engine, "Food", TransactionKind::Expense, ALICE).await;
    record(&engine, &food, 12_00, date(2026, 3, 1), Some("Lunch")).await;
    record(&engine, &food, 30_00, date(2026, 3, 2), Some("Dinner")).await;
    let promo = record(&engine, &food, 8_00, date(2026, 3, 3), Some("50% off_sale")).await;

    let search = |needle: &str| TransactionListFilter {
        search: Some(needle.to_string()),
        ..TransactionListFilter::default()
    };

    for needle in ["_", "%", "% off_"] {
        let found = engine.list_transactions(ALICE, &search(needle)).await.unwrap();
        let ids: Vec<_> = found.iter().map(|t| t.id).collect();
        assert_eq!(ids, [promo.id], "search {needle:?}");
    }

    let found = engine.list_transactions(ALICE, &search("l_nch")).await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn storage_rejects_kind_mismatch_written_directly() {
    let (engine, db) = engine_with_db().await;
    let salary = category(&engine, "Salary", TransactionKind::Income, ALICE).await;
    let backend = db.get_database_backend();

    let inserted = db
        .execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO transactions \
             (id, user_id, category_id, kind, amount_minor, description, date, created_at, updated_at) \
             VALUES (?, ?, ?, 'expense', 100, NULL, '2026-03-01', ?, ?)",
            vec![
                uuid::Uuid::new_v4().into(),
                ALICE.into(),
                salary.id.into(),
                at(2026, 3, 1).into(),
                at(2026, 3, 1).into(),
            ],
        ))
        .await;
    let err = inserted.unwrap_err().to_string();
    assert!(err.contains("transaction kind must match category kind"), "{err}");
    assert_eq!(count_rows(&db, "transactions").await, 0);

    let pay = record(&engine, &salary, 100_00, date(2026, 3, 1), None).await;
    let updated = db
        .execute(Statement::from_sql_and_values(
            backend,
            "UPDATE transactions SET kind = 'expense' WHERE id = ?",
            vec![pay.id.into()],
        ))
        .await;
    let err = updated.unwrap_err().to_string();
    assert!(err.contains("transaction kind must match category kind"), "{err}");
    let stored = engine.transaction(pay.id, ALICE).await.unwrap();
    assert_eq!(stored.kind, TransactionKind::Income);
}
