use std::sync::Arc;

use async_trait::async_trait;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::metrics::Metrics;
use crate::web::{Interceptor, Outcome, RequestScope};

/// Feeds every request into the injected collector. A request counts as an
/// error when it reaches this stage still failed or with a 5xx status, or
/// never comes back to it at all.
pub struct MetricsInterceptor {
    metrics: Arc<Metrics>,
}

impl MetricsInterceptor {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self { metrics }
    }
}

#[async_trait]
impl Interceptor for MetricsInterceptor {
    fn name(&self) -> &'static str {
        "metrics"
    }

    async fn before(&self, scope: &mut RequestScope, _parts: &Parts) -> Result<(), ApiError> {
        scope.in_flight = Some(Arc::new(self.metrics.track()));
        Ok(())
    }

    async fn after(&self, scope: &mut RequestScope, outcome: Outcome) -> Outcome {
        let failed = match &outcome {
            Ok(response) => response.status().is_server_error(),
            Err(_) => true,
        };
        if let Some(in_flight) = scope.in_flight.take() {
            in_flight.finish(failed);
        }
        outcome
    }
}
