// src/handlers/orders.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        inventory::Lot,
        orders::{Order, OrderDetail, OrderItem, OrderStatus},
    },
    services::order_service::{ItemPatch, NewItemInput, OrderPatch},
};

// =============================================================================
//  1. PEDIDOS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    /// Status inicial; aceita sinônimos legados (PEND/ANDA/PROC/CANC).
    #[schema(example = "PENDING")]
    pub status: Option<String>,

    #[schema(value_type = String, format = Date, example = "2025-01-10")]
    pub order_date: NaiveDate,

    #[schema(value_type = String, format = Date, example = "2025-01-20")]
    pub expected_date: NaiveDate,

    #[schema(value_type = Option<String>, format = Date)]
    pub delivery_date: Option<NaiveDate>,

    /// Conveniência da criação: aceito apenas enquanto não há itens.
    #[schema(example = "0.00")]
    pub total: Option<Decimal>,

    #[validate(length(max = 2000, message = "máximo de 2000 caracteres"))]
    pub notes: Option<String>,
}

fn parse_status(field: &'static str, raw: &str) -> Result<OrderStatus, AppError> {
    OrderStatus::parse_lenient(raw)
        .ok_or_else(|| AppError::invalid_field(field, format!("Status desconhecido: '{}'.", raw)))
}

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado", body = Order),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let status = match payload.status.as_deref() {
        Some(raw) => parse_status("status", raw)?,
        None => OrderStatus::Pending,
    };

    let order = app_state
        .order_service
        .create_order(
            &app_state.db_pool,
            status,
            payload.order_date,
            payload.expected_date,
            payload.delivery_date,
            payload.total,
            payload.notes.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    responses((status = 200, description = "Lista de pedidos", body = [Order]))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state.order_service.list_orders(&app_state.db_pool).await?;
    Ok(Json(orders))
}

// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido com suas linhas", body = OrderDetail),
        (status = 404, description = "Pedido não encontrado")
    )
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state
        .order_service
        .get_order_detail(&app_state.db_pool, id)
        .await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderPayload {
    /// Imutável; presente apenas para que a tentativa de alteração seja
    /// rejeitada explicitamente.
    #[schema(value_type = Option<String>, format = Date)]
    pub order_date: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date)]
    pub expected_date: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date)]
    pub delivery_date: Option<NaiveDate>,

    #[validate(length(max = 2000, message = "máximo de 2000 caracteres"))]
    pub notes: Option<String>,
}

// PATCH /api/orders/{id}
#[utoipa::path(
    patch,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = UpdateOrderPayload,
    responses(
        (status = 200, description = "Pedido atualizado", body = Order),
        (status = 404, description = "Pedido não encontrado"),
        (status = 409, description = "Pedido concluído ou campo imutável")
    )
)]
pub async fn update_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let patch = OrderPatch {
        order_date: payload.order_date,
        expected_date: payload.expected_date,
        delivery_date: payload.delivery_date,
        notes: payload.notes,
    };

    let order = app_state
        .order_service
        .update_order(&app_state.db_pool, id, patch)
        .await?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionPayload {
    /// Novo status; aceita sinônimos legados (PEND/ANDA/PROC/CANC).
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "PROCESSING")]
    pub status: String,
}

// POST /api/orders/{id}/status
#[utoipa::path(
    post,
    path = "/api/orders/{id}/status",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = TransitionPayload,
    responses(
        (status = 200, description = "Status atualizado (no-op se igual)", body = Order),
        (status = 409, description = "Transição inválida")
    )
)]
pub async fn transition_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let new_status = parse_status("status", &payload.status)?;
    let order = app_state
        .order_service
        .transition(&app_state.db_pool, id, new_status)
        .await?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOrderPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "maria.souza")]
    pub username: String,

    #[validate(length(min = 1, message = "required"))]
    pub password: String,
}

// DELETE /api/orders/{id}
// A exclusão em cascata exige a confirmação de credenciais de um operador.
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = DeleteOrderPayload,
    responses(
        (status = 204, description = "Pedido e dependentes excluídos"),
        (status = 401, description = "Credenciais inválidas"),
        (status = 409, description = "Pedido concluído ou lote com estoque alocado")
    )
)]
pub async fn delete_order(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeleteOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .cascade_service
        .delete_order(&app_state.db_pool, id, &payload.username, &payload.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  2. LINHAS DO PEDIDO
// =============================================================================

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewItemPayload {
    pub product_id: Uuid,

    #[validate(range(min = 1, message = "mínimo 1"))]
    #[schema(example = 3)]
    pub quantity: i32,

    #[schema(example = "12.50")]
    pub unit_price: Decimal,

    #[schema(value_type = String, format = Date, example = "2026-01-01")]
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddItemsPayload {
    #[validate(length(min = 1, message = "ao menos um item"), nested)]
    pub items: Vec<NewItemPayload>,
}

// POST /api/orders/{id}/items
#[utoipa::path(
    post,
    path = "/api/orders/{id}/items",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = AddItemsPayload,
    responses(
        (status = 201, description = "Itens adicionados; total do pedido recalculado", body = [OrderItem]),
        (status = 400, description = "Produto duplicado ou campo inválido"),
        (status = 409, description = "Pedido concluído")
    )
)]
pub async fn add_items(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddItemsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let inputs = payload
        .items
        .into_iter()
        .map(|i| NewItemInput {
            product_id: i.product_id,
            quantity: i.quantity,
            unit_price: i.unit_price,
            expiry_date: i.expiry_date,
        })
        .collect();

    let items = app_state
        .order_service
        .add_items(&app_state.db_pool, id, inputs)
        .await?;
    Ok((StatusCode::CREATED, Json(items)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemPayload {
    #[validate(range(min = 1, message = "mínimo 1"))]
    pub quantity: Option<i32>,

    pub unit_price: Option<Decimal>,

    #[schema(value_type = Option<String>, format = Date)]
    pub expiry_date: Option<NaiveDate>,
}

// PATCH /api/orders/{id}/items/{item_id}
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/items/{item_id}",
    tag = "Orders",
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("item_id" = Uuid, Path, description = "ID do item")
    ),
    request_body = UpdateItemPayload,
    responses(
        (status = 200, description = "Item atualizado; total recalculado", body = OrderItem),
        (status = 404, description = "Pedido ou item não encontrado")
    )
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let patch = ItemPatch {
        quantity: payload.quantity,
        unit_price: payload.unit_price,
        expiry_date: payload.expiry_date,
    };

    let item = app_state
        .order_service
        .update_item(&app_state.db_pool, id, item_id, patch)
        .await?;
    Ok(Json(item))
}

// DELETE /api/orders/{id}/items/{item_id}
#[utoipa::path(
    delete,
    path = "/api/orders/{id}/items/{item_id}",
    tag = "Orders",
    params(
        ("id" = Uuid, Path, description = "ID do pedido"),
        ("item_id" = Uuid, Path, description = "ID do item")
    ),
    responses(
        (status = 204, description = "Item removido; total recalculado"),
        (status = 404, description = "Pedido ou item não encontrado")
    )
)]
pub async fn remove_item(
    State(app_state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .order_service
        .remove_item(&app_state.db_pool, id, item_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  3. RECEPÇÃO DE LOTES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveLotPayload {
    pub product_id: Uuid,

    #[validate(range(min = 1, message = "mínimo 1"))]
    #[schema(example = 3)]
    pub quantity: i32,

    #[schema(value_type = String, format = Date, example = "2026-01-01")]
    pub expiry_date: NaiveDate,
}

// POST /api/orders/{id}/lots
#[utoipa::path(
    post,
    path = "/api/orders/{id}/lots",
    tag = "Stock",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    request_body = ReceiveLotPayload,
    responses(
        (status = 201, description = "Lote recebido: saldo espelhado e contabilidade lançada", body = Lot),
        (status = 409, description = "Pedido fora do estado Processing")
    )
)]
pub async fn receive_lot(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReceiveLotPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lot = app_state
        .stock_service
        .receive_lot(
            &app_state.db_pool,
            id,
            payload.product_id,
            payload.quantity,
            payload.expiry_date,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(lot)))
}

// GET /api/orders/{id}/lots
#[utoipa::path(
    get,
    path = "/api/orders/{id}/lots",
    tag = "Stock",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses((status = 200, description = "Lotes do pedido", body = [Lot]))
)]
pub async fn list_order_lots(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let lots = app_state
        .stock_service
        .list_lots_for_order(&app_state.db_pool, id)
        .await?;
    Ok(Json(lots))
}
