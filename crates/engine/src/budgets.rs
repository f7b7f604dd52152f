//! Monthly budgets: one spending ceiling per user per calendar month.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::Money;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    /// Always the first day of the month.
    pub month: Date,
    pub amount_minor: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: String,
    pub month: NaiveDate,
    pub amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Human label such as `"October 2026"`.
    pub fn month_display(&self) -> String {
        month_display(self.month)
    }
}

impl From<Model> for Budget {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            month: model.month,
            amount: Money::new(model.amount_minor),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Whether an upsert inserted a new budget or overwrote the existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Budget-vs-spend for one month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetStatus {
    /// `None` when no budget is configured for the month.
    pub budget_id: Option<Uuid>,
    pub month: NaiveDate,
    pub amount: Money,
    pub spent: Money,
    /// `amount - spent`; negative once the budget is exceeded.
    pub remaining: Money,
    /// Rounded to 2 decimals, 0 when `amount` is 0.
    pub percentage_spent: Decimal,
}

impl BudgetStatus {
    pub fn month_display(&self) -> String {
        month_display(self.month)
    }
}

fn month_display(month: NaiveDate) -> String {
    month.format("%B %Y").to_string()
}
