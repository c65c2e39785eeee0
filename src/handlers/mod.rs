// handlers/mod.rs - route table for the public API
//
// Every route runs inside logger -> errors -> metrics under the request
// deadline. Product and sale routes add authentication; deleting a product
// also requires ADMIN.
pub mod check;
pub mod product;
pub mod sale;
pub mod user;

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    routing::MethodFilter,
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::auth::{Authenticator, ROLE_ADMIN};
use crate::database::Database;
use crate::error::ApiError;
use crate::metrics::Metrics;
use crate::middleware;
use crate::web::App;

/// Shared by every handler; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub authenticator: Arc<Authenticator>,
}

impl AppState {
    pub fn new(db: Database, authenticator: Arc<Authenticator>) -> Self {
        Self { db, authenticator }
    }
}

/// Build the API router. `max_body_bytes` caps every request body and a
/// handler still running after `request_timeout` answers with a 500.
pub fn api(
    state: AppState,
    metrics: Arc<Metrics>,
    max_body_bytes: usize,
    request_timeout: Duration,
) -> Router {
    let authenticate = middleware::authenticate(state.authenticator.clone());
    let admin_only = middleware::has_roles(&[ROLE_ADMIN]);

    let global = vec![
        middleware::logger(),
        middleware::errors(),
        middleware::metrics(metrics),
    ];

    App::new(state, global)
        .with_timeout(request_timeout)
        .handle(MethodFilter::GET, "/v1/health", check::health, vec![])
        .handle(MethodFilter::GET, "/v1/user/token", user::token, vec![])
        .handle(MethodFilter::GET, "/v1/products", product::list, vec![])
        .handle(MethodFilter::POST, "/v1/products", product::create, vec![authenticate.clone()])
        .handle(MethodFilter::GET, "/v1/products/:id", product::retrieve, vec![authenticate.clone()])
        .handle(MethodFilter::PATCH, "/v1/products/:id", product::update, vec![authenticate.clone()])
        .handle(
            MethodFilter::DELETE,
            "/v1/products/:id",
            product::delete,
            vec![authenticate.clone(), admin_only],
        )
        .handle(MethodFilter::POST, "/v1/products/:id/sales", sale::add_sale, vec![authenticate.clone()])
        .handle(MethodFilter::GET, "/v1/products/:id/sales", sale::list_sales, vec![authenticate])
        .into_router()
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CatchPanicLayer::custom(panic_response))
}

/// A panicking handler still answers with the generic internal error body
fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("request handler panicked");
    ApiError::internal("handler panicked").into_response()
}
