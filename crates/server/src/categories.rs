//! Categories API endpoints.

use api_types::category::{CategoryNew, CategoryPatch, CategoryQuery, CategoryView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{CategoryListFilter, TransactionKind, User};

use crate::{
    ServerError,
    extract::{IdPath, JsonBody, QueryParams},
    kind_from_api, kind_to_api,
    server::ServerState,
};

fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        kind: kind_to_api(category.kind),
    }
}

async fn list_filtered(
    state: &ServerState,
    user: &User,
    filter: CategoryListFilter,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state
        .engine
        .list_categories(&user.username, &filter)
        .await?
        .into_iter()
        .map(map_category)
        .collect();
    Ok(Json(categories))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): QueryParams<CategoryQuery>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let filter = CategoryListFilter {
        kind: query.kind.map(kind_from_api),
        search: query.search,
    };
    list_filtered(&state, &user, filter).await
}

pub async fn list_income(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let filter = CategoryListFilter {
        kind: Some(TransactionKind::Income),
        search: None,
    };
    list_filtered(&state, &user, filter).await
}

pub async fn list_expense(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let filter = CategoryListFilter {
        kind: Some(TransactionKind::Expense),
        search: None,
    };
    list_filtered(&state, &user, filter).await
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(&payload.name, kind_from_api(payload.kind), &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(id, &user.username).await?;
    Ok(Json(map_category(category)))
}

pub async fn replace(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): JsonBody<CategoryNew>,
) -> Result<Json<CategoryView>, ServerError> {
    let patch = engine::CategoryPatch {
        name: Some(payload.name),
        kind: Some(kind_from_api(payload.kind)),
    };
    let category = state
        .engine
        .update_category(id, patch, &user.username)
        .await?;
    Ok(Json(map_category(category)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(payload), _): JsonBody<CategoryPatch>,
) -> Result<Json<CategoryView>, ServerError> {
    let patch = engine::CategoryPatch {
        name: payload.name,
        kind: payload.kind.map(kind_from_api),
    };
    let category = state
        .engine
        .update_category(id, patch, &user.username)
        .await?;
    Ok(Json(map_category(category)))
}

pub async fn delete(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): IdPath,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}
