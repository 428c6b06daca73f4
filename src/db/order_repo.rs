// src/db/order_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::orders::{Order, OrderItem, OrderStatus},
};

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Pedidos
    // ---

    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        status: OrderStatus,
        total: Decimal,
        order_date: NaiveDate,
        expected_date: NaiveDate,
        delivery_date: Option<NaiveDate>,
        notes: Option<&str>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO purchase_orders (status, total, order_date, expected_date, delivery_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(total)
        .bind(order_date)
        .bind(expected_date)
        .bind(delivery_date)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    pub async fn get_order<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM purchase_orders WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    /// Busca o pedido travando a linha (`FOR UPDATE`). Usado pelo orquestrador
    /// de exclusão para que duas exclusões concorrentes não passem ambas na
    /// pré-condição.
    pub async fn get_order_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order =
            sqlx::query_as::<_, Order>("SELECT * FROM purchase_orders WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(order)
    }

    pub async fn list_orders<'e, E>(&self, executor: E) -> Result<Vec<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM purchase_orders ORDER BY order_date DESC, created_at DESC",
        )
        .fetch_all(executor)
        .await?;
        Ok(orders)
    }

    /// Grava os campos mutáveis do pedido. A mesclagem patch/registro e as
    /// regras de imutabilidade acontecem no serviço; aqui é só a escrita.
    pub async fn update_order<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        expected_date: NaiveDate,
        delivery_date: Option<NaiveDate>,
        notes: Option<&str>,
        total: Decimal,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE purchase_orders
            SET expected_date = $2, delivery_date = $3, notes = $4, total = $5, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(expected_date)
        .bind(delivery_date)
        .bind(notes)
        .bind(total)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    pub async fn update_order_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE purchase_orders
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    /// Recalcula o total do pedido a partir das linhas. O total é sempre
    /// derivado; esta escrita roda na mesma transação de qualquer mutação
    /// de item.
    pub async fn recalculate_order_total<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE purchase_orders
            SET total = COALESCE(
                    (SELECT SUM(quantity * unit_price) FROM order_items WHERE order_id = $1),
                    0
                ),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(order_id)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    pub async fn delete_order_row<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM purchase_orders WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Linhas do pedido
    // ---

    pub async fn add_order_item<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
        expiry_date: NaiveDate,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, unit_price, expiry_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price)
        .bind(expiry_date)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                // Produto duplicado no pedido é rejeitado, nunca mesclado;
                // o chamador deve usar update para alterar a quantidade.
                if db_err.is_unique_violation() {
                    return AppError::invalid_field(
                        "productId",
                        format!("Produto {} já consta neste pedido.", product_id),
                    );
                }
            }
            e.into()
        })
    }

    pub async fn get_order_item<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE id = $1 AND order_id = $2",
        )
        .bind(item_id)
        .bind(order_id)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    pub async fn list_order_items<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    /// Atualiza os campos mutáveis da linha. `product_id` e `order_id` são
    /// imutáveis e ficam de fora por construção.
    pub async fn update_order_item<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        item_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
        expiry_date: NaiveDate,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            UPDATE order_items
            SET quantity = $3, unit_price = $4, expiry_date = $5
            WHERE id = $1 AND order_id = $2
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(order_id)
        .bind(quantity)
        .bind(unit_price)
        .bind(expiry_date)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    pub async fn delete_order_item<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        item_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM order_items WHERE id = $1 AND order_id = $2")
            .bind(item_id)
            .bind(order_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_items_for_order<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM order_items WHERE order_id = $1")
            .bind(order_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
