use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, Statement, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Budget, BudgetStatus, EngineError, Money, ResultEngine, UpsertOutcome, budgets,
    error::on_unique_violation,
    util::{first_of_month, month_bounds},
};

use super::{Engine, statistics::expense_total, with_tx};

/// Fields to change on a budget; `None` keeps the stored value.
#[derive(Clone, Debug, Default)]
pub struct BudgetPatch {
    /// Any day of the target month.
    pub month: Option<NaiveDate>,
    pub amount: Option<Money>,
}

const UPSERT_SQL: &str = "INSERT INTO budgets (id, user_id, month, amount_minor, created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?, ?) \
     ON CONFLICT (user_id, month) DO UPDATE SET \
         amount_minor = excluded.amount_minor, \
         updated_at = excluded.updated_at \
     RETURNING id";

fn ensure_not_negative(amount: Money) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(
            "budget amount must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn duplicate_budget(month: NaiveDate) -> EngineError {
    EngineError::ExistingBudget(format!(
        "a budget for {} already exists",
        month.format("%B %Y")
    ))
}

async fn require_budget<C: ConnectionTrait>(
    db: &C,
    budget_id: Uuid,
    user_id: &str,
) -> ResultEngine<budgets::Model> {
    budgets::Entity::find_by_id(budget_id)
        .filter(budgets::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("budget not exists".to_string()))
}

impl Engine {
    /// Budgets of `user_id`, most recent month first.
    pub async fn list_budgets(&self, user_id: &str) -> ResultEngine<Vec<Budget>> {
        Ok(budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .order_by_desc(budgets::Column::Month)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Budget::from)
            .collect())
    }

    pub async fn budget(&self, budget_id: Uuid, user_id: &str) -> ResultEngine<Budget> {
        require_budget(&self.database, budget_id, user_id)
            .await
            .map(Budget::from)
    }

    /// Sets the budget of the month containing `month`.
    ///
    /// Inserts a new budget or overwrites the amount of the existing one in a
    /// single `INSERT .. ON CONFLICT DO UPDATE`, so concurrent calls for the
    /// same month never produce two rows.
    pub async fn upsert_budget(
        &self,
        month: NaiveDate,
        amount: Money,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<(Budget, UpsertOutcome)> {
        ensure_not_negative(amount)?;
        let month = first_of_month(month)?;

        with_tx!(self, |db_tx| {
            let candidate_id = Uuid::new_v4();
            let stmt = Statement::from_sql_and_values(
                db_tx.get_database_backend(),
                UPSERT_SQL,
                vec![
                    candidate_id.into(),
                    user_id.into(),
                    month.into(),
                    amount.minor().into(),
                    now.into(),
                    now.into(),
                ],
            );
            let row = db_tx.query_one(stmt).await?.ok_or_else(|| {
                EngineError::Database(DbErr::RecordNotInserted)
            })?;
            let budget_id: Uuid = row.try_get("", "id")?;

            let outcome = if budget_id == candidate_id {
                UpsertOutcome::Created
            } else {
                UpsertOutcome::Updated
            };
            let model = require_budget(&db_tx, budget_id, user_id).await?;

            tracing::debug!("user {user_id} budget for {month}: {outcome:?}");
            Ok((Budget::from(model), outcome))
        })
    }

    pub async fn update_budget(
        &self,
        budget_id: Uuid,
        patch: BudgetPatch,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<Budget> {
        if let Some(amount) = patch.amount {
            ensure_not_negative(amount)?;
        }
        let month = patch.month.map(first_of_month).transpose()?;

        with_tx!(self, |db_tx| {
            let model = require_budget(&db_tx, budget_id, user_id).await?;
            let target_month = month.unwrap_or(model.month);

            if target_month != model.month
                && budgets::Entity::find()
                    .filter(budgets::Column::UserId.eq(user_id))
                    .filter(budgets::Column::Month.eq(target_month))
                    .one(&db_tx)
                    .await?
                    .is_some()
            {
                return Err(duplicate_budget(target_month));
            }

            let mut active: budgets::ActiveModel = model.into();
            active.month = ActiveValue::Set(target_month);
            if let Some(amount) = patch.amount {
                active.amount_minor = ActiveValue::Set(amount.minor());
            }
            active.updated_at = ActiveValue::Set(now);
            let model = active
                .update(&db_tx)
                .await
                .map_err(|err| on_unique_violation(err, || duplicate_budget(target_month)))?;

            Ok(Budget::from(model))
        })
    }

    pub async fn delete_budget(&self, budget_id: Uuid, user_id: &str) -> ResultEngine<()> {
        let result = budgets::Entity::delete_many()
            .filter(budgets::Column::Id.eq(budget_id))
            .filter(budgets::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("budget not exists".to_string()));
        }
        Ok(())
    }

    /// Budget-vs-spend for the month containing `today`.
    ///
    /// Without a configured budget the amount is zero and so is the
    /// percentage spent.
    pub async fn current_budget(&self, user_id: &str, today: NaiveDate) -> ResultEngine<BudgetStatus> {
        let (first, last) = month_bounds(today)?;

        with_tx!(self, |db_tx| {
            let budget = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id))
                .filter(budgets::Column::Month.eq(first))
                .one(&db_tx)
                .await?;
            let spent = expense_total(&db_tx, user_id, first, last).await?;

            let amount = budget
                .as_ref()
                .map(|model| Money::new(model.amount_minor))
                .unwrap_or(Money::ZERO);

            Ok(BudgetStatus {
                budget_id: budget.map(|model| model.id),
                month: first,
                amount,
                spent,
                remaining: amount - spent,
                percentage_spent: spent.percentage_of(amount),
            })
        })
    }
}
