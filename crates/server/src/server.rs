use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use tower_http::trace::TraceLayer;

use std::sync::Arc;

use crate::{
    ServerError, TokenManager, budgets, categories, statistics, transactions, user,
};
use engine::{Engine, EngineError};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub tokens: Arc<TokenManager>,
}

/// Resolves the caller from `Authorization: Bearer <access token>` and
/// stores the [`engine::User`] in the request extensions.
async fn auth(
    auth_header: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Ok(TypedHeader(Authorization(bearer))) = auth_header else {
        return Err(ServerError::Unauthorized);
    };

    let username = state.tokens.verify_access(bearer.token())?;
    let user = match state.engine.user(&username).await {
        Ok(user) => user,
        Err(EngineError::KeyNotFound(_)) => return Err(ServerError::Unauthorized),
        Err(err) => return Err(err.into()),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Builds the API router around `state`.
pub fn router(state: ServerState) -> Router {
    let public = Router::new()
        .route("/auth/login/", post(user::login))
        .route("/auth/refresh/", post(user::refresh));

    let protected = Router::new()
        .route("/auth/user/", get(user::me))
        .route(
            "/categories/",
            get(categories::list).post(categories::create),
        )
        .route("/categories/income/", get(categories::list_income))
        .route("/categories/expense/", get(categories::list_expense))
        .route(
            "/categories/{id}/",
            get(categories::get)
                .put(categories::replace)
                .patch(categories::update)
                .delete(categories::delete),
        )
        .route(
            "/transactions/",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/summary/", get(statistics::summary))
        .route(
            "/transactions/category_breakdown/",
            get(statistics::category_breakdown),
        )
        .route("/transactions/monthly/", get(statistics::monthly))
        .route(
            "/transactions/{id}/",
            get(transactions::get)
                .put(transactions::replace)
                .patch(transactions::update)
                .delete(transactions::delete),
        )
        .route("/budgets/", get(budgets::list).post(budgets::upsert))
        .route("/budgets/current/", get(budgets::current))
        .route(
            "/budgets/{id}/",
            get(budgets::get)
                .put(budgets::replace)
                .patch(budgets::update)
                .delete(budgets::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    tokens: TokenManager,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
        tokens: Arc::new(tokens),
    };

    axum::serve(listener, router(state)).await
}
