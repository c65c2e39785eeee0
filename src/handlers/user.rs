// handlers/user.rs - GET /v1/user/token

use anyhow::Context;
use axum::{extract::Request, http::StatusCode};
use serde::Serialize;

use crate::database::UserRepository;
use crate::error::ApiError;
use crate::handlers::AppState;
use crate::web::{basic_auth, respond, Outcome, RequestScope};

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// GET /v1/user/token - exchange Basic credentials for a signed token
pub async fn token(state: AppState, scope: RequestScope, req: Request) -> Outcome {
    let (email, password) = basic_auth(req.headers())
        .ok_or_else(|| ApiError::unauthorized("must provide email and password in Basic auth"))?;

    let claims = UserRepository::new(state.db.pool().clone())
        .authenticate(scope.started_at, &email, &password)
        .await?;

    let token = state
        .authenticator
        .generate_token(&claims)
        .context("generating token")?;

    respond(&TokenResponse { token }, StatusCode::OK)
}
