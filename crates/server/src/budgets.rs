//! Budgets API endpoints.

use api_types::budget::{BudgetNew, BudgetPatch, BudgetView, CurrentBudgetView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use engine::{Money, UpsertOutcome, User};

use crate::{
    ServerError,
    extract::{IdPath, JsonBody},
    server::ServerState,
};

fn map_budget(budget: engine::Budget) -> BudgetView {
    BudgetView {
        id: budget.id,
        month: budget.month,
        month_display: budget.month_display(),
        amount: budget.amount.to_decimal(),
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<BudgetView>>, ServerError> {
    let budgets = state
        .engine
        .list_budgets(&user.username)
        .await?
        .into_iter()
        .map(map_budget)
        .collect();
    Ok(Json(budgets))
}

/// Creates the budget of a month, or overwrites the amount of the existing
/// one. Answers `201` for a new budget and `200` for an update.
pub async fn upsert(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<BudgetNew>,
) -> Result<(StatusCode, Json<BudgetView>), ServerError> {
    let amount = Money::try_from(payload.amount)?;
    let (budget, outcome) = state
        .engine
        .upsert_budget(payload.month, amount, &user.username, Utc::now())
        .await?;
    let status = match outcome {
        UpsertOutcome::Created => StatusCode::CREATED,
        UpsertOutcome::Updated => StatusCode::OK,
    };
    Ok((status, Json(map_budget(budget))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<BudgetView>, ServerError> {
    let budget = state.engine.budget(id, &user.username).await?;
    Ok(Json(map_budget(budget)))
}

pub async fn replace(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): JsonBody<BudgetNew>,
) -> Result<Json<BudgetView>, ServerError> {
    let patch = engine::BudgetPatch {
        month: Some(payload.month),
        amount: Some(Money::try_from(payload.amount)?),
    };
    let budget = state
        .engine
        .update_budget(id, patch, &user.username, Utc::now())
        .await?;
    Ok(Json(map_budget(budget)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): JsonBody<BudgetPatch>,
) -> Result<Json<BudgetView>, ServerError> {
    let patch = engine::BudgetPatch {
        month: payload.month,
        amount: payload.amount.map(Money::try_from).transpose()?,
    };
    let budget = state
        .engine
        .update_budget(id, patch, &user.username, Utc::now())
        .await?;
    Ok(Json(map_budget(budget)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_budget(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Budget-vs-spend for the current calendar month.
pub async fn current(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<CurrentBudgetView>, ServerError> {
    let status = state
        .engine
        .current_budget(&user.username, Utc::now().date_naive())
        .await?;
    Ok(Json(CurrentBudgetView {
        id: status.budget_id,
        month: status.month,
        month_display: status.month_display(),
        amount: status.amount.to_decimal(),
        spent: status.spent.to_decimal(),
        remaining: status.remaining.to_decimal(),
        percentage_spent: status.percentage_spent,
    }))
}
