// Request pipeline: per-request scope, interceptors, route registration and
// the helpers handlers use to read requests and write responses.
pub mod app;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod scope;

pub use app::{App, Handler};
pub use pipeline::{Interceptor, InterceptorRef, Outcome, Pipeline, PipelineBuilder};
pub use request::{basic_auth, decode, path_param};
pub use response::respond;
pub use scope::RequestScope;
