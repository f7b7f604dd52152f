use sea_orm::{DatabaseConnection, DbErr};

use crate::EngineError;

mod budgets;
mod categories;
mod statistics;
mod transactions;
mod users;

pub use budgets::BudgetPatch;
pub use categories::{
    CategoryListFilter, CategoryPatch, DEFAULT_EXPENSE_CATEGORIES, DEFAULT_INCOME_CATEGORIES,
};
pub use transactions::{NewTransaction, TransactionListFilter, TransactionOrdering, TransactionPatch};

/// Evaluates `$body` with `$tx` bound to a fresh database transaction.
///
/// `Ok` commits; `Err` returns early and the dropped transaction rolls back.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point for every Pocketbook operation.
///
/// All methods take the acting user's name and only touch that user's rows.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Collects the connection the engine runs on.
#[derive(Default)]
pub struct EngineBuilder {
    database: Option<DatabaseConnection>,
}

impl EngineBuilder {
    /// Migrated SQLite connection holding the Pocketbook schema.
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = Some(db);
        self
    }

    /// Fails when no database was given or it does not answer a ping.
    pub async fn build(self) -> crate::ResultEngine<Engine> {
        let database = self.database.ok_or_else(|| {
            EngineError::Database(DbErr::Custom("engine needs a database".to_string()))
        })?;
        database.ping().await?;
        Ok(Engine { database })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn build_requires_a_database() {
        let err = Engine::builder().build().await.unwrap_err();
        assert!(matches!(err, EngineError::Database(_)));
    }
}
