use std::future::Future;
use std::time::Duration;

use axum::{
    extract::Request,
    routing::{on, MethodFilter},
    Router,
};
use futures::future::BoxFuture;

use crate::web::{InterceptorRef, Outcome, Pipeline, RequestScope};

/// A route handler: application state, a snapshot of the request scope and
/// the request itself in, an outcome out.
pub trait Handler<S>: Clone + Send + Sync + 'static {
    fn call(&self, state: S, scope: RequestScope, req: Request) -> BoxFuture<'static, Outcome>;
}

impl<S, F, Fut> Handler<S> for F
where
    F: Fn(S, RequestScope, Request) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    fn call(&self, state: S, scope: RequestScope, req: Request) -> BoxFuture<'static, Outcome> {
        Box::pin(self(state, scope, req))
    }
}

/// Router builder where every route runs inside the application-wide
/// interceptors plus its own route-specific ones.
pub struct App<S> {
    router: Router,
    state: S,
    global: Vec<InterceptorRef>,
    timeout: Option<Duration>,
}

impl<S> App<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// `global` wraps every route, first entry outermost
    pub fn new(state: S, global: Vec<InterceptorRef>) -> Self {
        Self {
            router: Router::new(),
            state,
            global,
            timeout: None,
        }
    }

    /// Bound every handler registered after this call to `limit`
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Register `handler` for `method` on `pattern`. Route interceptors run
    /// inside the global ones in the order given. Registering more methods on
    /// the same pattern adds to it.
    pub fn handle<H>(
        mut self,
        method: MethodFilter,
        pattern: &str,
        handler: H,
        route: Vec<InterceptorRef>,
    ) -> Self
    where
        H: Handler<S>,
    {
        let mut builder = Pipeline::builder()
            .extend(self.global.iter().cloned())
            .extend(route);
        if let Some(limit) = self.timeout {
            builder = builder.timeout(limit);
        }
        let pipeline = builder.build();
        tracing::debug!("Route {:?} {} -> {:?}", method, pattern, pipeline.names());

        let state = self.state.clone();
        let endpoint = move |req: Request| {
            let pipeline = pipeline.clone();
            let state = state.clone();
            let handler = handler.clone();
            async move {
                pipeline
                    .run(req, move |scope, req| handler.call(state, scope, req))
                    .await
            }
        };

        self.router = self.router.route(pattern, on(method, endpoint));
        self
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}
