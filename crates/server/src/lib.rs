use api_types::ErrorResponse;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use auth::{AuthConfig, TokenError, TokenManager, decode_secret_key};
pub use server::{ServerState, router, run_with_listener};

mod auth;
mod budgets;
mod categories;
mod extract;
mod server;
mod statistics;
mod transactions;
mod user;

pub mod types {
    pub mod auth {
        pub use api_types::auth::{AccessToken, Login, Refresh, TokenPair, UserView};
    }

    pub mod category {
        pub use api_types::category::{CategoryNew, CategoryPatch, CategoryQuery, CategoryView};
    }

    pub mod transaction {
        pub use api_types::transaction::{
            TransactionNew, TransactionPatch, TransactionQuery, TransactionView,
        };
    }

    pub mod budget {
        pub use api_types::budget::{BudgetNew, BudgetPatch, BudgetView, CurrentBudgetView};
    }

    pub mod stats {
        pub use api_types::stats::{BreakdownItem, BreakdownQuery, MonthlyItem, RangeQuery, Summary};
    }
}

pub enum ServerError {
    Engine(EngineError),
    /// The request could not be extracted (bad JSON body, query or path).
    Rejected {
        status: StatusCode,
        error: String,
        field: Option<String>,
    },
    Unauthorized,
    Internal,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        EngineError::Database(_) | EngineError::PasswordHash(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::ExistingCategory(_)
        | EngineError::ExistingBudget(_)
        | EngineError::ExistingUser(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidDate(_)
        | EngineError::InvalidCategory(_)
        | EngineError::KindMismatch(_)
        | EngineError::InvalidOrdering(_)
        | EngineError::InvalidKind(_) => StatusCode::BAD_REQUEST,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::PasswordHash(hash_err) => {
            tracing::error!("password hash error: {hash_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => {
                let status = status_for_engine_error(&err);
                let field = err.field().map(ToString::to_string);
                let error = message_for_engine_error(err);
                (status, ErrorResponse { error, field })
            }
            ServerError::Rejected {
                status,
                error,
                field,
            } => (status, ErrorResponse { error, field }),
            ServerError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    error: "Authentication credentials were not provided or are invalid"
                        .to_string(),
                    field: None,
                },
            ),
            ServerError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: "internal server error".to_string(),
                    field: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<TokenError> for ServerError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Invalid | TokenError::WrongType => Self::Unauthorized,
            TokenError::Signing(err) => {
                tracing::error!("failed to sign token: {err}");
                Self::Internal
            }
        }
    }
}

pub(crate) fn kind_to_api(kind: engine::TransactionKind) -> api_types::TransactionKind {
    match kind {
        engine::TransactionKind::Income => api_types::TransactionKind::Income,
        engine::TransactionKind::Expense => api_types::TransactionKind::Expense,
    }
}

pub(crate) fn kind_from_api(kind: api_types::TransactionKind) -> engine::TransactionKind {
    match kind {
        api_types::TransactionKind::Income => engine::TransactionKind::Income,
        api_types::TransactionKind::Expense => engine::TransactionKind::Expense,
    }
}
