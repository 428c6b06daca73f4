// src/services/stock_service.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, OrderRepository, StockRepository},
    models::{
        inventory::{apply_delta, Lot, StockBalance},
        orders::{validate_expiry, validate_quantity, OrderStatus},
    },
    services::ledger_service::LedgerService,
};

// Contas usadas na valoração da recepção de lotes.
const ACCOUNT_STOCK: &str = "estoque";
const ACCOUNT_SUPPLIERS: &str = "fornecedores";

#[derive(Clone)]
pub struct StockService {
    stock_repo: StockRepository,
    order_repo: OrderRepository,
    catalog_repo: CatalogRepository,
    ledger_service: LedgerService,
}

impl StockService {
    pub fn new(
        stock_repo: StockRepository,
        order_repo: OrderRepository,
        catalog_repo: CatalogRepository,
        ledger_service: LedgerService,
    ) -> Self {
        Self {
            stock_repo,
            order_repo,
            catalog_repo,
            ledger_service,
        }
    }

    // --- RECEPÇÃO DE LOTE ---
    // Cria o lote, espelha o saldo de estoque do par (produto, lote) e lança
    // a contabilidade da recepção. As três escritas são atômicas: ou tudo
    // entra, ou nada entra.
    pub async fn receive_lot<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        expiry_date: NaiveDate,
    ) -> Result<Lot, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        validate_quantity(quantity)?;
        validate_expiry(expiry_date, Utc::now().date_naive())?;

        let mut tx = executor.begin().await?;

        let order = self
            .order_repo
            .get_order_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Pedido",
                id: order_id,
            })?;

        // Só um pedido em andamento recebe mercadoria.
        if order.status != OrderStatus::Processing {
            return Err(AppError::InvalidState(format!(
                "Recepção de lote exige pedido em andamento (status atual: {:?}).",
                order.status
            )));
        }

        self.catalog_repo
            .get_product(&mut *tx, product_id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Produto",
                id: product_id,
            })?;

        // 1. Cria o lote
        let lot = self
            .stock_repo
            .insert_lot(&mut *tx, order_id, product_id, expiry_date, quantity)
            .await?;

        // 2. Espelha o saldo do par (produto, lote)
        self.stock_repo
            .upsert_balance(&mut *tx, product_id, Some(lot.id), quantity)
            .await?;

        // 3. Lança a contabilidade da recepção, valorada pelo preço unitário
        // da linha correspondente do pedido (fallback: preço de catálogo).
        if let Some(unit_price) = self
            .receipt_unit_price(&mut *tx, order_id, product_id)
            .await?
        {
            let amount = Decimal::from(quantity) * unit_price;
            self.ledger_service
                .post_balanced_entry(
                    &mut *tx,
                    ACCOUNT_STOCK,
                    ACCOUNT_SUPPLIERS,
                    amount,
                    Utc::now().date_naive(),
                    Some(order_id),
                )
                .await?;
        } else {
            tracing::warn!(
                "Recepção do produto {} no pedido {} sem preço conhecido; lançamento contábil omitido.",
                product_id,
                order_id
            );
        }

        tx.commit().await?;

        tracing::info!(
            "Lote {} recebido: pedido {}, produto {}, quantidade {}.",
            lot.id,
            order_id,
            product_id,
            quantity
        );
        Ok(lot)
    }

    async fn receipt_unit_price(
        &self,
        conn: &mut sqlx::PgConnection,
        order_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Decimal>, AppError> {
        let items = self.order_repo.list_order_items(&mut *conn, order_id).await?;
        if let Some(item) = items.iter().find(|i| i.product_id == product_id) {
            return Ok(Some(item.unit_price));
        }
        let product = self.catalog_repo.get_product(&mut *conn, product_id).await?;
        Ok(product.and_then(|p| p.unit_price))
    }

    // --- AJUSTE DE ESTOQUE ---
    // O saldo nunca fica negativo: a leitura travada, a checagem e a escrita
    // rodam na mesma transação. Quando o ajuste é escopado a um lote, a
    // quantidade do lote é espelhada na mesma transação.
    pub async fn adjust_stock<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        lot_id: Option<Uuid>,
        delta: i32,
    ) -> Result<StockBalance, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        if delta == 0 {
            return Err(AppError::invalid_field(
                "delta",
                "Ajuste de estoque exige delta diferente de zero.".to_string(),
            ));
        }

        let mut tx = executor.begin().await?;

        if let Some(lot_id) = lot_id {
            let lot = self
                .stock_repo
                .get_lot(&mut *tx, lot_id)
                .await?
                .ok_or(AppError::NotFound {
                    entity: "Lote",
                    id: lot_id,
                })?;
            if lot.product_id != product_id {
                return Err(AppError::invalid_field(
                    "lotId",
                    format!("Lote {} não pertence ao produto {}.", lot_id, product_id),
                ));
            }
        }

        let current = self
            .stock_repo
            .get_balance_for_update(&mut *tx, product_id, lot_id)
            .await?;

        let on_hand = current.as_ref().map(|b| b.quantity).unwrap_or(0);
        let new_quantity = apply_delta(product_id, on_hand, delta)?;

        let balance = match current {
            Some(existing) => {
                self.stock_repo
                    .set_balance_quantity(&mut *tx, existing.id, new_quantity)
                    .await?
            }
            None => {
                // Primeiro movimento do par (produto, lote): só pode ser entrada.
                self.stock_repo
                    .upsert_balance(&mut *tx, product_id, lot_id, delta)
                    .await?
            }
        };

        if let Some(lot_id) = lot_id {
            self.stock_repo
                .update_lot_quantity(&mut *tx, lot_id, delta)
                .await?;
        }

        tx.commit().await?;
        Ok(balance)
    }

    pub async fn list_balances<'e, E>(&self, executor: E) -> Result<Vec<StockBalance>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.stock_repo.list_balances(executor).await
    }

    pub async fn list_lots_for_order<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<Lot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.stock_repo.list_lots_for_order(executor, order_id).await
    }
}
