// src/handlers/stock.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{common::error::AppError, config::AppState, models::inventory::StockBalance};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockPayload {
    pub product_id: Uuid,

    /// Opcional: escopo do ajuste a um lote específico.
    pub lot_id: Option<Uuid>,

    /// Positivo = entrada, negativo = saída.
    #[schema(example = -3)]
    pub delta: i32,
}

// POST /api/stock/adjust
#[utoipa::path(
    post,
    path = "/api/stock/adjust",
    tag = "Stock",
    request_body = AdjustStockPayload,
    responses(
        (status = 200, description = "Saldo ajustado", body = StockBalance),
        (status = 409, description = "Estoque insuficiente; saldo permanece intacto")
    )
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    Json(payload): Json<AdjustStockPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let balance = app_state
        .stock_service
        .adjust_stock(
            &app_state.db_pool,
            payload.product_id,
            payload.lot_id,
            payload.delta,
        )
        .await?;
    Ok(Json(balance))
}

// GET /api/stock
#[utoipa::path(
    get,
    path = "/api/stock",
    tag = "Stock",
    responses((status = 200, description = "Saldos de estoque", body = [StockBalance]))
)]
pub async fn list_stock(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let balances = app_state.stock_service.list_balances(&app_state.db_pool).await?;
    Ok(Json(balances))
}
