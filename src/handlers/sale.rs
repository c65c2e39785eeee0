// handlers/sale.rs - /v1/products/:id/sales

use axum::{extract::Request, http::StatusCode};

use crate::database::models::NewSale;
use crate::database::SaleRepository;
use crate::handlers::AppState;
use crate::web::{decode, path_param, respond, Outcome, RequestScope};

/// POST /v1/products/:id/sales - record a sale
pub async fn add_sale(state: AppState, scope: RequestScope, mut req: Request) -> Outcome {
    let product_id = path_param(&mut req, "id").await?;
    let new_sale: NewSale = decode(req).await?;

    let sale = SaleRepository::new(state.db.pool().clone())
        .add_sale(new_sale, &product_id, scope.started_at)
        .await?;
    respond(&sale, StatusCode::CREATED)
}

/// GET /v1/products/:id/sales - sales recorded for a product
pub async fn list_sales(state: AppState, _scope: RequestScope, mut req: Request) -> Outcome {
    let product_id = path_param(&mut req, "id").await?;

    let sales = SaleRepository::new(state.db.pool().clone())
        .list_sales(&product_id)
        .await?;
    respond(&sales, StatusCode::OK)
}
