use async_trait::async_trait;
use tracing::info;

use crate::web::{Interceptor, Outcome, RequestScope};

/// One event per request carrying status, method, path and elapsed time
pub struct Logger;

#[async_trait]
impl Interceptor for Logger {
    fn name(&self) -> &'static str {
        "logger"
    }

    async fn after(&self, scope: &mut RequestScope, outcome: Outcome) -> Outcome {
        let status = scope.status.map(|s| s.as_u16()).unwrap_or_default();
        info!(
            status,
            method = %scope.method,
            path = %scope.path,
            elapsed = ?scope.elapsed(),
            "request completed"
        );
        outcome
    }
}
