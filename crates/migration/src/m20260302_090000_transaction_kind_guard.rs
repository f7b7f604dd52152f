//! Storage-level guard: a transaction's kind must equal its category's kind.
//!
//! The engine validates this before every write; the triggers only make a
//! write that bypasses the engine fail loudly instead of persisting.

use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const INSERT_TRIGGER: &str = "CREATE TRIGGER IF NOT EXISTS trg_transactions_kind_insert \
     BEFORE INSERT ON transactions \
     FOR EACH ROW \
     WHEN NEW.kind <> (SELECT kind FROM categories WHERE id = NEW.category_id) \
     BEGIN \
         SELECT RAISE(ABORT, 'transaction kind must match category kind'); \
     END;";

const UPDATE_TRIGGER: &str = "CREATE TRIGGER IF NOT EXISTS trg_transactions_kind_update \
     BEFORE UPDATE OF kind, category_id ON transactions \
     FOR EACH ROW \
     WHEN NEW.kind <> (SELECT kind FROM categories WHERE id = NEW.category_id) \
     BEGIN \
         SELECT RAISE(ABORT, 'transaction kind must match category kind'); \
     END;";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INSERT_TRIGGER).await?;
        db.execute_unprepared(UPDATE_TRIGGER).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TRIGGER IF EXISTS trg_transactions_kind_update;")
            .await?;
        db.execute_unprepared("DROP TRIGGER IF EXISTS trg_transactions_kind_insert;")
            .await?;
        Ok(())
    }
}
