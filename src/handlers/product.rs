// handlers/product.rs - /v1/products and /v1/products/:id

use axum::{extract::Request, http::StatusCode};

use crate::database::models::{NewProduct, UpdateProduct};
use crate::database::ProductRepository;
use crate::handlers::AppState;
use crate::web::{decode, path_param, respond, Outcome, RequestScope};

fn products(state: &AppState) -> ProductRepository {
    ProductRepository::new(state.db.pool().clone())
}

/// GET /v1/products - every product with its sales totals
pub async fn list(state: AppState, _scope: RequestScope, _req: Request) -> Outcome {
    let list = products(&state).list().await?;
    respond(&list, StatusCode::OK)
}

/// GET /v1/products/:id - one product
pub async fn retrieve(state: AppState, _scope: RequestScope, mut req: Request) -> Outcome {
    let id = path_param(&mut req, "id").await?;
    let product = products(&state).retrieve(&id).await?;
    respond(&product, StatusCode::OK)
}

/// POST /v1/products - create a product owned by the caller
pub async fn create(state: AppState, scope: RequestScope, req: Request) -> Outcome {
    let claims = scope.claims()?;
    let new_product: NewProduct = decode(req).await?;

    let product = products(&state)
        .create(claims, new_product, scope.started_at)
        .await?;
    respond(&product, StatusCode::CREATED)
}

/// PATCH /v1/products/:id - change the supplied fields; admins or the owner only
pub async fn update(state: AppState, scope: RequestScope, mut req: Request) -> Outcome {
    let claims = scope.claims()?;
    let id = path_param(&mut req, "id").await?;
    let update: UpdateProduct = decode(req).await?;

    let product = products(&state)
        .update(claims, &id, update, scope.started_at)
        .await?;
    respond(&product, StatusCode::OK)
}

/// DELETE /v1/products/:id - remove a product and its sales
pub async fn delete(state: AppState, _scope: RequestScope, mut req: Request) -> Outcome {
    let id = path_param(&mut req, "id").await?;
    products(&state).delete(&id).await?;
    respond(&(), StatusCode::NO_CONTENT)
}
