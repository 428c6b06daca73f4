// src/handlers/ledger.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::ledger::{LedgerEntry, UnbalancedPosting},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostEntryPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "estoque")]
    pub debit_account: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "fornecedores")]
    pub credit_account: String,

    #[schema(example = "37.50")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-01-12")]
    pub posting_date: NaiveDate,

    pub order_id: Option<Uuid>,
}

// POST /api/ledger
#[utoipa::path(
    post,
    path = "/api/ledger",
    tag = "Ledger",
    request_body = PostEntryPayload,
    responses(
        (status = 201, description = "Par débito/crédito criado", body = [LedgerEntry]),
        (status = 400, description = "Valor não positivo ou conta ausente")
    )
)]
pub async fn post_entry(
    State(app_state): State<AppState>,
    Json(payload): Json<PostEntryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (debit, credit) = app_state
        .ledger_service
        .post_balanced_entry(
            &app_state.db_pool,
            &payload.debit_account,
            &payload.credit_account,
            payload.amount,
            payload.posting_date,
            payload.order_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(vec![debit, credit])))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerFilter {
    pub order_id: Option<Uuid>,
}

// GET /api/ledger?orderId=...
#[utoipa::path(
    get,
    path = "/api/ledger",
    tag = "Ledger",
    params(("orderId" = Option<Uuid>, Query, description = "Filtra pelos lançamentos de um pedido")),
    responses((status = 200, description = "Lançamentos", body = [LedgerEntry]))
)]
pub async fn list_entries(
    State(app_state): State<AppState>,
    Query(filter): Query<LedgerFilter>,
) -> Result<impl IntoResponse, AppError> {
    let entries = match filter.order_id {
        Some(order_id) => {
            app_state
                .ledger_service
                .list_entries_for_order(&app_state.db_pool, order_id)
                .await?
        }
        None => app_state.ledger_service.list_entries(&app_state.db_pool).await?,
    };
    Ok(Json(entries))
}

// GET /api/ledger/unbalanced
#[utoipa::path(
    get,
    path = "/api/ledger/unbalanced",
    tag = "Ledger",
    responses((status = 200, description = "Lançamentos desbalanceados para revisão", body = [UnbalancedPosting]))
)]
pub async fn list_unbalanced(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let anomalies = app_state
        .ledger_service
        .find_unbalanced(&app_state.db_pool)
        .await?;
    Ok(Json(anomalies))
}
