// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, models::inventory::Product};

// Catálogo de produtos: dados mestres externos, expostos somente para leitura.

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    responses((status = 200, description = "Produtos do catálogo", body = [Product]))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state
        .catalog_repo
        .list_products(&app_state.db_pool)
        .await?;
    Ok(Json(products))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .catalog_repo
        .get_product(&app_state.db_pool, id)
        .await?
        .ok_or(AppError::NotFound {
            entity: "Produto",
            id,
        })?;
    Ok(Json(product))
}
