//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Pedidos: CRUD, transição de status e exclusão em cascata
    let order_routes = Router::new()
        .route(
            "/",
            post(handlers::orders::create_order).get(handlers::orders::list_orders),
        )
        .route(
            "/{id}",
            get(handlers::orders::get_order)
                .patch(handlers::orders::update_order)
                .delete(handlers::orders::delete_order),
        )
        .route("/{id}/status", post(handlers::orders::transition_order))
        .route("/{id}/items", post(handlers::orders::add_items))
        .route(
            "/{id}/items/{item_id}",
            axum::routing::patch(handlers::orders::update_item)
                .delete(handlers::orders::remove_item),
        )
        .route(
            "/{id}/lots",
            post(handlers::orders::receive_lot).get(handlers::orders::list_order_lots),
        );

    let stock_routes = Router::new()
        .route("/", get(handlers::stock::list_stock))
        .route("/adjust", post(handlers::stock::adjust_stock));

    let ledger_routes = Router::new()
        .route(
            "/",
            post(handlers::ledger::post_entry).get(handlers::ledger::list_entries),
        )
        .route("/unbalanced", get(handlers::ledger::list_unbalanced));

    let catalog_routes = Router::new()
        .route("/", get(handlers::catalog::list_products))
        .route("/{id}", get(handlers::catalog::get_product));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/docs/openapi.json", get(docs::openapi_json))
        .nest("/api/orders", order_routes)
        .nest("/api/stock", stock_routes)
        .nest("/api/ledger", ledger_routes)
        .nest("/api/products", catalog_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
