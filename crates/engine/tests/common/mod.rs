#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Category, Engine, Money, NewTransaction, Transaction, TransactionKind};
use migration::MigratorTrait;

pub const ALICE: &str = "alice";
pub const BOB: &str = "bob";

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for user in [ALICE, BOB] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password_hash) VALUES (?, ?)",
            vec![user.into(), "not-a-real-hash".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub async fn category(
    engine: &Engine,
    name: &str,
    kind: TransactionKind,
    user: &str,
) -> Category {
    engine.create_category(name, kind, user).await.unwrap()
}

pub async fn record(
    engine: &Engine,
    category: &Category,
    minor: i64,
    on: NaiveDate,
    description: Option<&str>,
) -> Transaction {
    engine
        .create_transaction(
            NewTransaction {
                category_id: category.id,
                kind: category.kind,
                amount: Money::new(minor),
                description: description.map(ToString::to_string),
                date: Some(on),
            },
            &category.user_id,
            at(2026, 1, 1),
        )
        .await
        .unwrap()
}

pub async fn count_rows(db: &DatabaseConnection, table: &str) -> i64 {
    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get("", "n").unwrap()
}
