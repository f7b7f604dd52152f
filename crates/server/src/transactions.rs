//! Transactions API endpoints

use api_types::transaction::{TransactionNew, TransactionPatch, TransactionQuery, TransactionView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use engine::{Money, NewTransaction, TransactionListFilter, TransactionOrdering, User};

use crate::{
    ServerError,
    extract::{IdPath, JsonBody, QueryParams},
    kind_from_api, kind_to_api,
    server::ServerState,
};

fn map_transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        amount: tx.amount.to_decimal(),
        kind: kind_to_api(tx.kind),
        description: tx.description,
        date: tx.date,
        category: tx.category_id,
        category_name: tx.category_name,
        created_at: tx.created_at,
        updated_at: tx.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): QueryParams<TransactionQuery>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let ordering = match query.ordering.as_deref() {
        Some(raw) if !raw.trim().is_empty() => raw.parse::<TransactionOrdering>()?,
        _ => TransactionOrdering::default(),
    };
    let filter = TransactionListFilter {
        kind: query.kind.map(kind_from_api),
        category_id: query.category,
        date: query.date,
        search: query.search,
        ordering,
    };

    let transactions = state
        .engine
        .list_transactions(&user.username, &filter)
        .await?
        .into_iter()
        .map(map_transaction)
        .collect();
    Ok(Json(transactions))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let input = NewTransaction {
        category_id: payload.category,
        kind: kind_from_api(payload.kind),
        amount: Money::try_from(payload.amount)?,
        description: payload.description,
        date: payload.date,
    };
    let tx = state
        .engine
        .create_transaction(input, &user.username, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(map_transaction(tx))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(id, &user.username).await?;
    Ok(Json(map_transaction(tx)))
}

/// `PUT`: amount, type and category are required. A missing description
/// clears it, a missing date keeps the stored one.
pub async fn replace(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): JsonBody<TransactionNew>,
) -> Result<Json<TransactionView>, ServerError> {
    let patch = engine::TransactionPatch {
        category_id: Some(payload.category),
        kind: Some(kind_from_api(payload.kind)),
        amount: Some(Money::try_from(payload.amount)?),
        description: Some(payload.description),
        date: payload.date,
    };
    let tx = state
        .engine
        .update_transaction(id, patch, &user.username, Utc::now())
        .await?;
    Ok(Json(map_transaction(tx)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): JsonBody<TransactionPatch>,
) -> Result<Json<TransactionView>, ServerError> {
    let patch = engine::TransactionPatch {
        category_id: payload.category,
        kind: payload.kind.map(kind_from_api),
        amount: payload.amount.map(Money::try_from).transpose()?,
        description: payload.description,
        date: payload.date,
    };
    let tx = state
        .engine
        .update_transaction(id, patch, &user.username, Utc::now())
        .await?;
    Ok(Json(map_transaction(tx)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
