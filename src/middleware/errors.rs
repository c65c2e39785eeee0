use async_trait::async_trait;
use axum::response::IntoResponse;

use crate::web::{Interceptor, Outcome, RequestScope};

/// Turns a failed outcome into its error response.
///
/// Request errors render their own message; internal errors render a generic
/// one. Either way the full error is logged here and nothing inside this
/// interceptor sees an `Err` afterwards.
pub struct Errors;

#[async_trait]
impl Interceptor for Errors {
    fn name(&self) -> &'static str {
        "errors"
    }

    async fn after(&self, scope: &mut RequestScope, outcome: Outcome) -> Outcome {
        match outcome {
            Ok(response) => Ok(response),
            Err(err) => {
                if err.is_internal() {
                    tracing::error!("ERROR: {} {}: {:?}", scope.method, scope.path, err);
                } else {
                    tracing::warn!("ERROR: {} {}: {}", scope.method, scope.path, err);
                }
                Ok(err.into_response())
            }
        }
    }
}
