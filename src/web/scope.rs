use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::metrics::InFlight;
use crate::web::Outcome;

/// Values that live for exactly one request.
///
/// The pipeline creates the scope, hands it by `&mut` to every interceptor
/// and gives the handler a snapshot. `started_at` is the request's notion of
/// "now" for timestamps and token issue times.
#[derive(Debug, Clone)]
pub struct RequestScope {
    pub method: Method,
    pub path: String,
    pub started_at: DateTime<Utc>,
    pub start: Instant,
    /// Status of the response produced so far
    pub status: Option<StatusCode>,
    /// Set by the authentication interceptor
    pub claims: Option<Claims>,
    /// Set by the metrics interceptor; shared with the handler's snapshot
    pub in_flight: Option<Arc<InFlight>>,
}

impl RequestScope {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            started_at: Utc::now(),
            start: Instant::now(),
            status: None,
            claims: None,
            in_flight: None,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Remember the status of a successful outcome
    pub fn record(&mut self, outcome: &Outcome) {
        if let Ok(response) = outcome {
            self.status = Some(response.status());
        }
    }

    /// Claims for routes behind authentication. Absence means the route was
    /// registered without the interceptor, which is a server fault.
    pub fn claims(&self) -> Result<&Claims, ApiError> {
        self.claims
            .as_ref()
            .ok_or_else(|| ApiError::internal("claims missing from request scope"))
    }
}
