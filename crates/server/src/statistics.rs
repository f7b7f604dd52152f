//! Aggregation endpoints under `/transactions/`.

use api_types::{
    TransactionKind as ApiKind,
    stats::{BreakdownItem, BreakdownQuery, MonthlyItem, RangeQuery, Summary},
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use axum_extra::extract::WithRejection;
use chrono::{Datelike, Utc};
use engine::{DateRange, User};

use crate::{
    ServerError, extract::QueryParams, kind_from_api, kind_to_api, server::ServerState,
};

pub async fn summary(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): QueryParams<RangeQuery>,
) -> Result<Json<Summary>, ServerError> {
    let range = DateRange {
        start: query.start_date,
        end: query.end_date,
    };
    let summary = state.engine.summary(&user.username, range).await?;

    Ok(Json(Summary {
        total_income: summary.total_income.to_decimal(),
        total_expenses: summary.total_expenses.to_decimal(),
        balance: summary.balance.to_decimal(),
    }))
}

/// Totals per category of one type, expenses unless `type` says otherwise.
pub async fn category_breakdown(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): QueryParams<BreakdownQuery>,
) -> Result<Json<Vec<BreakdownItem>>, ServerError> {
    let kind = kind_from_api(query.kind.unwrap_or(ApiKind::Expense));
    let range = DateRange {
        start: query.start_date,
        end: query.end_date,
    };

    let items = state
        .engine
        .category_breakdown(&user.username, kind, range)
        .await?
        .into_iter()
        .map(|entry| BreakdownItem {
            category_id: entry.category_id,
            category_name: entry.category_name,
            category_type: kind_to_api(entry.category_kind),
            total_amount: entry.total.to_decimal(),
            percentage: entry.percentage,
        })
        .collect();
    Ok(Json(items))
}

/// Income and expense per month of the current year.
pub async fn monthly(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<MonthlyItem>>, ServerError> {
    let year = Utc::now().year();
    let items = state
        .engine
        .monthly_totals(&user.username, year)
        .await?
        .into_iter()
        .map(|totals| MonthlyItem {
            month: totals.label(),
            period: totals.period(),
            income: totals.income.to_decimal(),
            expense: totals.expense.to_decimal(),
        })
        .collect();
    Ok(Json(items))
}
