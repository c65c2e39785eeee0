use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{header, request::Parts, HeaderMap};

use crate::auth::Authenticator;
use crate::error::ApiError;
use crate::web::{Interceptor, RequestScope};

const BEARER_FORMAT: &str = "Expected Authorization header format: 'Bearer <token>'";

/// Requires a valid bearer token and puts its claims on the request scope
pub struct Authenticate {
    authenticator: Arc<Authenticator>,
}

impl Authenticate {
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self { authenticator }
    }
}

#[async_trait]
impl Interceptor for Authenticate {
    fn name(&self) -> &'static str {
        "authenticate"
    }

    async fn before(&self, scope: &mut RequestScope, parts: &Parts) -> Result<(), ApiError> {
        let token = bearer_token(&parts.headers)?;

        let claims = self
            .authenticator
            .parse_claims(token)
            .map_err(|e| ApiError::unauthorized(e.to_string()))?;

        scope.claims = Some(claims);
        Ok(())
    }
}

/// Token from `Authorization: Bearer <token>`; the scheme is matched
/// case-insensitively and exactly two space-separated parts are allowed.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized(BEARER_FORMAT))?;

    let parts: Vec<&str> = value.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") => Ok(*token),
        _ => Err(ApiError::unauthorized(BEARER_FORMAT)),
    }
}

/// Lets the request through when the claims hold at least one of `roles`.
/// Must sit inside `Authenticate`.
pub struct HasRoles {
    roles: Vec<&'static str>,
}

impl HasRoles {
    pub fn new(roles: &[&'static str]) -> Self {
        Self {
            roles: roles.to_vec(),
        }
    }
}

#[async_trait]
impl Interceptor for HasRoles {
    fn name(&self) -> &'static str {
        "has_roles"
    }

    async fn before(&self, scope: &mut RequestScope, _parts: &Parts) -> Result<(), ApiError> {
        let claims = scope
            .claims
            .as_ref()
            .ok_or_else(|| ApiError::internal("claims missing from request scope"))?;

        if !claims.has_roles(&self.roles) {
            return Err(ApiError::forbidden("you are not authorized for that action"));
        }
        Ok(())
    }
}
