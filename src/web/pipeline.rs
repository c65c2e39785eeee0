// Interceptor pipeline wrapped around every route handler
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::Request,
    http::request::Parts,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::web::RequestScope;

/// What a handler (or an interceptor rewriting it) produced
pub type Outcome = Result<Response, ApiError>;

/// One stage of the request pipeline.
///
/// `before` runs outermost first and may reject the request; `after` runs
/// innermost first on the outcome and may rewrite it. An interceptor whose
/// `before` failed, or that was never reached, gets no `after`.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Name for logging and debugging
    fn name(&self) -> &'static str;

    async fn before(&self, _scope: &mut RequestScope, _parts: &Parts) -> Result<(), ApiError> {
        Ok(())
    }

    async fn after(&self, _scope: &mut RequestScope, outcome: Outcome) -> Outcome {
        outcome
    }
}

pub type InterceptorRef = Arc<dyn Interceptor>;

/// An ordered, immutable interceptor chain. Index 0 is outermost.
#[derive(Clone, Default)]
pub struct Pipeline {
    interceptors: Arc<Vec<InterceptorRef>>,
    timeout: Option<Duration>,
}

#[derive(Default)]
pub struct PipelineBuilder {
    interceptors: Vec<InterceptorRef>,
    timeout: Option<Duration>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `interceptor` inside those already added
    pub fn with(mut self, interceptor: InterceptorRef) -> Self {
        tracing::debug!("Registered interceptor '{}'", interceptor.name());
        self.interceptors.push(interceptor);
        self
    }

    pub fn extend(mut self, interceptors: impl IntoIterator<Item = InterceptorRef>) -> Self {
        for interceptor in interceptors {
            self = self.with(interceptor);
        }
        self
    }

    /// Handlers running longer than `limit` fail with an internal error that
    /// every entered interceptor still sees
    pub fn timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            interceptors: Arc::new(self.interceptors),
            timeout: self.timeout,
        }
    }
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    /// Drive `req` through the chain and `handler`. Whatever error survives
    /// every `after` is logged and rendered here.
    pub async fn run<F, Fut>(&self, req: Request, handler: F) -> Response
    where
        F: FnOnce(RequestScope, Request) -> Fut,
        Fut: Future<Output = Outcome>,
    {
        let (parts, body) = req.into_parts();
        let mut scope = RequestScope::new(parts.method.clone(), parts.uri.path());

        let mut entered = 0;
        let mut rejection = None;
        for interceptor in self.interceptors.iter() {
            match interceptor.before(&mut scope, &parts).await {
                Ok(()) => entered += 1,
                Err(err) => {
                    rejection = Some(err);
                    break;
                }
            }
        }

        let mut outcome = match rejection {
            Some(err) => Err(err),
            None => {
                let handled = handler(scope.clone(), Request::from_parts(parts, body));
                match self.timeout {
                    Some(limit) => tokio::time::timeout(limit, handled)
                        .await
                        .unwrap_or_else(|_| Err(ApiError::internal(format!("handler exceeded {:?}", limit)))),
                    None => handled.await,
                }
            }
        };
        scope.record(&outcome);

        for interceptor in self.interceptors[..entered].iter().rev() {
            outcome = interceptor.after(&mut scope, outcome).await;
            scope.record(&outcome);
        }

        match outcome {
            Ok(response) => response,
            Err(err) => {
                tracing::error!("Unhandled error for {} {}: {:?}", scope.method, scope.path, err);
                err.into_response()
            }
        }
    }
}
