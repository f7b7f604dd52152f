//! Login, token refresh and the current user.

use api_types::auth::{AccessToken, Login, Refresh, TokenPair, UserView};
use axum::{Extension, Json, extract::State};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use engine::{EngineError, User};

use crate::{ServerError, extract::JsonBody, server::ServerState};

fn map_user(user: User) -> UserView {
    UserView {
        username: user.username,
        email: user.email,
    }
}

/// Trades a username/password pair for an access and a refresh token.
pub async fn login(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<Login>,
) -> Result<Json<TokenPair>, ServerError> {
    let user = state
        .engine
        .verify_credentials(&payload.username, &payload.password)
        .await?;

    let now = Utc::now();
    let access = state.tokens.issue_access(&user.username, now)?;
    let refresh = state.tokens.issue_refresh(&user.username, now)?;
    tracing::info!("user {} logged in", user.username);

    Ok(Json(TokenPair {
        access,
        refresh,
        user: map_user(user),
    }))
}

pub async fn refresh(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): JsonBody<Refresh>,
) -> Result<Json<AccessToken>, ServerError> {
    let username = state.tokens.verify_refresh(&payload.refresh)?;
    // The account may have been removed since the refresh token was issued.
    let user = match state.engine.user(&username).await {
        Ok(user) => user,
        Err(EngineError::KeyNotFound(_)) => return Err(ServerError::Unauthorized),
        Err(err) => return Err(err.into()),
    };

    let access = state.tokens.issue_access(&user.username, Utc::now())?;
    Ok(Json(AccessToken { access }))
}

pub async fn me(Extension(user): Extension<User>) -> Json<UserView> {
    Json(map_user(user))
}
