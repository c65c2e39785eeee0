pub mod auth;
pub mod errors;
pub mod logger;
pub mod metrics;

pub use auth::{Authenticate, HasRoles};
pub use errors::Errors;
pub use logger::Logger;
pub use metrics::MetricsInterceptor;

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::metrics::Metrics;
use crate::web::InterceptorRef;

pub fn logger() -> InterceptorRef {
    Arc::new(Logger)
}

pub fn errors() -> InterceptorRef {
    Arc::new(Errors)
}

pub fn metrics(metrics: Arc<Metrics>) -> InterceptorRef {
    Arc::new(MetricsInterceptor::new(metrics))
}

pub fn authenticate(authenticator: Arc<Authenticator>) -> InterceptorRef {
    Arc::new(Authenticate::new(authenticator))
}

pub fn has_roles(roles: &[&'static str]) -> InterceptorRef {
    Arc::new(HasRoles::new(roles))
}
