//! Extractors whose rejections answer with the JSON error body.

use axum::{
    Json,
    extract::{
        Path, Query,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::ServerError;

pub(crate) type JsonBody<T> = WithRejection<Json<T>, ServerError>;
pub(crate) type QueryParams<T> = WithRejection<Query<T>, ServerError>;
pub(crate) type IdPath = WithRejection<Path<Uuid>, ServerError>;

/// Splits a serde message such as ``type: unknown variant `x` `` or
/// ``missing field `amount` at line 1 column 2`` into the offending field
/// and the remaining message.
fn split_field(detail: &str) -> (Option<String>, String) {
    if let Some((_, rest)) = detail.split_once("missing field `") {
        let field = rest.split_once('`').map(|(name, _)| name.to_string());
        return (field, detail.to_string());
    }

    match detail.split_once(": ") {
        Some((path, message))
            if !path.is_empty()
                && !path.starts_with('.')
                && path
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.') =>
        {
            (Some(path.to_string()), message.to_string())
        }
        _ => (None, detail.to_string()),
    }
}

/// Drops axum's fixed rejection prefix ("Failed to deserialize ...: ").
fn deserialize_detail(body_text: &str) -> &str {
    body_text
        .split_once(": ")
        .map_or(body_text, |(_, detail)| detail)
}

fn bad_request(body_text: &str) -> ServerError {
    let (field, error) = split_field(deserialize_detail(body_text));
    ServerError::Rejected {
        status: StatusCode::BAD_REQUEST,
        error,
        field,
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        match &rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                bad_request(&rejection.body_text())
            }
            _ => ServerError::Rejected {
                status: rejection.status(),
                error: rejection.body_text(),
                field: None,
            },
        }
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        bad_request(&rejection.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(_) => ServerError::Rejected {
                status: StatusCode::NOT_FOUND,
                error: "Not found.".to_string(),
                field: None,
            },
            other => {
                tracing::error!("path extraction failed: {}", other.body_text());
                ServerError::Internal
            }
        }
    }
}
