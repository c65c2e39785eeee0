pub mod product;
pub mod sale;
pub mod user;

pub use product::ProductRepository;
pub use sale::SaleRepository;
pub use user::UserRepository;

use crate::database::DatabaseError;

/// Product ids arrive as path text; anything that is not an integer is
/// rejected before reaching the database.
pub fn parse_product_id(id: &str) -> Result<i32, DatabaseError> {
    id.parse::<i32>().map_err(|_| DatabaseError::InvalidId)
}
