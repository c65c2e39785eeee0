pub mod product;
pub mod sale;
pub mod user;

pub use product::{NewProduct, Product, UpdateProduct};
pub use sale::{NewSale, Sale};
pub use user::{NewUser, User};
