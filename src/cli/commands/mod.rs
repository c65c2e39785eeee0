pub mod schema;
pub mod user;
