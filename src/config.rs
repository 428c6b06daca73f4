// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{
        CatalogRepository, LedgerRepository, OperatorRepository, OrderRepository, StockRepository,
    },
    services::{
        cascade_service::CascadeService, credential_service::CredentialService,
        ledger_service::LedgerService, order_service::OrderService, stock_service::StockService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub catalog_repo: CatalogRepository,
    pub order_service: OrderService,
    pub stock_service: StockService,
    pub ledger_service: LedgerService,
    pub cascade_service: CascadeService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let order_repo = OrderRepository::new(db_pool.clone());
        let stock_repo = StockRepository::new(db_pool.clone());
        let ledger_repo = LedgerRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let operator_repo = OperatorRepository::new(db_pool.clone());

        let ledger_service = LedgerService::new(ledger_repo.clone());
        let order_service = OrderService::new(order_repo.clone(), catalog_repo.clone());
        let stock_service = StockService::new(
            stock_repo.clone(),
            order_repo.clone(),
            catalog_repo.clone(),
            ledger_service.clone(),
        );
        let credential_service = CredentialService::new(operator_repo);
        let cascade_service =
            CascadeService::new(order_repo, stock_repo, ledger_repo, credential_service);

        Ok(Self {
            db_pool,
            catalog_repo,
            order_service,
            stock_service,
            ledger_service,
            cascade_service,
        })
    }
}
