// src/db/stock_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{Lot, StockBalance},
};

#[derive(Clone)]
pub struct StockRepository {
    pool: PgPool,
}

impl StockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Lotes
    // ---

    pub async fn insert_lot<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        product_id: Uuid,
        expiry_date: NaiveDate,
        quantity: i32,
    ) -> Result<Lot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lot = sqlx::query_as::<_, Lot>(
            r#"
            INSERT INTO lots (order_id, product_id, expiry_date, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(product_id)
        .bind(expiry_date)
        .bind(quantity)
        .fetch_one(executor)
        .await?;

        Ok(lot)
    }

    pub async fn get_lot<'e, E>(&self, executor: E, lot_id: Uuid) -> Result<Option<Lot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lot = sqlx::query_as::<_, Lot>("SELECT * FROM lots WHERE id = $1")
            .bind(lot_id)
            .fetch_optional(executor)
            .await?;
        Ok(lot)
    }

    pub async fn list_lots_for_order<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<Lot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lots = sqlx::query_as::<_, Lot>(
            "SELECT * FROM lots WHERE order_id = $1 ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(lots)
    }

    pub async fn update_lot_quantity<'e, E>(
        &self,
        executor: E,
        lot_id: Uuid,
        delta: i32,
    ) -> Result<Lot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lot = sqlx::query_as::<_, Lot>(
            r#"
            UPDATE lots
            SET quantity = quantity + $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(lot_id)
        .bind(delta)
        .fetch_one(executor)
        .await?;

        Ok(lot)
    }

    pub async fn delete_lots_for_order<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM lots WHERE order_id = $1")
            .bind(order_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Saldos de estoque
    // ---

    /// Busca o saldo do par (produto, lote) travando a linha (`FOR UPDATE`).
    /// Toda mutação de saldo passa por aqui antes, para que a checagem de
    /// não-negatividade e a escrita sejam atômicas.
    pub async fn get_balance_for_update<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        lot_id: Option<Uuid>,
    ) -> Result<Option<StockBalance>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, StockBalance>(
            r#"
            SELECT * FROM stock_balances
            WHERE product_id = $1 AND lot_id IS NOT DISTINCT FROM $2
            FOR UPDATE
            "#,
        )
        .bind(product_id)
        .bind(lot_id)
        .fetch_optional(executor)
        .await?;
        Ok(balance)
    }

    /// UPSERT do saldo: insere o par (produto, lote) ou soma o delta ao
    /// saldo existente. Atômico, previne "race conditions" na recepção.
    pub async fn upsert_balance<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        lot_id: Option<Uuid>,
        delta: i32,
    ) -> Result<StockBalance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, StockBalance>(
            r#"
            INSERT INTO stock_balances (product_id, lot_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (product_id, lot_id)
            DO UPDATE SET
                quantity = stock_balances.quantity + $3,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(lot_id)
        .bind(delta)
        .fetch_one(executor)
        .await?;

        Ok(balance)
    }

    pub async fn set_balance_quantity<'e, E>(
        &self,
        executor: E,
        balance_id: Uuid,
        quantity: i32,
    ) -> Result<StockBalance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, StockBalance>(
            r#"
            UPDATE stock_balances
            SET quantity = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(balance_id)
        .bind(quantity)
        .fetch_one(executor)
        .await?;

        Ok(balance)
    }

    pub async fn list_balances<'e, E>(&self, executor: E) -> Result<Vec<StockBalance>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balances = sqlx::query_as::<_, StockBalance>(
            "SELECT * FROM stock_balances ORDER BY updated_at DESC",
        )
        .fetch_all(executor)
        .await?;
        Ok(balances)
    }

    /// Saldos espelhados dos lotes de um pedido, com as linhas travadas.
    /// O orquestrador de exclusão usa isto para verificar que todo lote do
    /// pedido está com estoque zerado antes de remover qualquer coisa.
    pub async fn balances_for_order_lots<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<StockBalance>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balances = sqlx::query_as::<_, StockBalance>(
            r#"
            SELECT sb.* FROM stock_balances sb
            JOIN lots l ON l.id = sb.lot_id
            WHERE l.order_id = $1
            FOR UPDATE OF sb
            "#,
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(balances)
    }

    pub async fn delete_balances_for_order_lots<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM stock_balances sb
            USING lots l
            WHERE sb.lot_id = l.id AND l.order_id = $1
            "#,
        )
        .bind(order_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
