// src/docs.rs

use axum::Json;
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::transition_order,
        handlers::orders::delete_order,
        handlers::orders::add_items,
        handlers::orders::update_item,
        handlers::orders::remove_item,
        handlers::orders::receive_lot,
        handlers::orders::list_order_lots,

        // --- Stock ---
        handlers::stock::adjust_stock,
        handlers::stock::list_stock,

        // --- Ledger ---
        handlers::ledger::post_entry,
        handlers::ledger::list_entries,
        handlers::ledger::list_unbalanced,

        // --- Catalog ---
        handlers::catalog::list_products,
        handlers::catalog::get_product,
    ),
    components(
        schemas(
            // --- Orders ---
            models::orders::OrderStatus,
            models::orders::Order,
            models::orders::OrderItem,
            models::orders::OrderDetail,

            // --- Stock ---
            models::inventory::Product,
            models::inventory::Lot,
            models::inventory::StockBalance,

            // --- Ledger ---
            models::ledger::LedgerEntry,
            models::ledger::UnbalancedPosting,

            // --- Payloads ---
            handlers::orders::CreateOrderPayload,
            handlers::orders::UpdateOrderPayload,
            handlers::orders::TransitionPayload,
            handlers::orders::DeleteOrderPayload,
            handlers::orders::NewItemPayload,
            handlers::orders::AddItemsPayload,
            handlers::orders::UpdateItemPayload,
            handlers::orders::ReceiveLotPayload,
            handlers::stock::AdjustStockPayload,
            handlers::ledger::PostEntryPayload,
        )
    ),
    tags(
        (name = "Orders", description = "Ciclo de vida de pedidos de compra"),
        (name = "Stock", description = "Lotes e saldos de estoque"),
        (name = "Ledger", description = "Lançamentos contábeis de partida dobrada"),
        (name = "Catalog", description = "Catálogo de produtos (somente leitura)")
    )
)]
pub struct ApiDoc;

// GET /api/docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
