// src/services/order_service.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, OrderRepository},
    models::orders::{
        validate_expiry, validate_order_dates, validate_quantity, validate_unit_price, Order,
        OrderDetail, OrderItem, OrderStatus,
    },
};

/// Campos aceitos na atualização de um pedido. `order_date` aparece aqui
/// apenas para que a tentativa de alterá-lo possa ser rejeitada com um erro
/// claro em vez de silenciosamente ignorada.
#[derive(Debug, Default, Clone)]
pub struct OrderPatch {
    pub order_date: Option<NaiveDate>,
    pub expected_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Default, Clone)]
pub struct ItemPatch {
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    catalog_repo: CatalogRepository,
}

impl OrderService {
    pub fn new(order_repo: OrderRepository, catalog_repo: CatalogRepository) -> Self {
        Self {
            order_repo,
            catalog_repo,
        }
    }

    // --- PEDIDOS ---

    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        status: OrderStatus,
        order_date: NaiveDate,
        expected_date: NaiveDate,
        delivery_date: Option<NaiveDate>,
        total: Option<Decimal>,
        notes: Option<&str>,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let today = Utc::now().date_naive();
        validate_order_dates(order_date, expected_date, delivery_date, today)?;

        if status.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "Pedido não pode ser criado já em estado terminal ({:?}).",
                status
            )));
        }

        // Total direto é aceito apenas como conveniência na criação, enquanto
        // não há itens; qualquer mutação de item depois recalcula por soma.
        let initial_total = total.unwrap_or(Decimal::ZERO);
        if initial_total < Decimal::ZERO {
            return Err(AppError::invalid_field(
                "total",
                format!("Total não pode ser negativo (recebido {}).", initial_total),
            ));
        }

        self.order_repo
            .create_order(
                executor,
                status,
                initial_total,
                order_date,
                expected_date,
                delivery_date,
                notes,
            )
            .await
    }

    pub async fn get_order<'e, E>(&self, executor: E, id: Uuid) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.order_repo
            .get_order(executor, id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Pedido",
                id,
            })
    }

    pub async fn get_order_detail<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<OrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let header = self
            .order_repo
            .get_order(&mut *conn, id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Pedido",
                id,
            })?;
        let items = self.order_repo.list_order_items(&mut *conn, id).await?;

        Ok(OrderDetail { header, items })
    }

    pub async fn list_orders<'e, E>(&self, executor: E) -> Result<Vec<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.order_repo.list_orders(executor).await
    }

    pub async fn update_order<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        patch: OrderPatch,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self
            .order_repo
            .get_order(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Pedido",
                id,
            })?;

        // Pedido concluído não admite mais nenhuma mutação de campo.
        if order.status == OrderStatus::Completed {
            return Err(AppError::InvalidState(
                "Pedido concluído não pode ser alterado.".to_string(),
            ));
        }

        // Data do pedido é imutável após a criação.
        if let Some(new_order_date) = patch.order_date {
            if new_order_date != order.order_date {
                return Err(AppError::InvalidState(
                    "Data do pedido é imutável após a criação.".to_string(),
                ));
            }
        }

        let expected_date = patch.expected_date.unwrap_or(order.expected_date);
        let delivery_date = patch.delivery_date.or(order.delivery_date);
        let notes = patch.notes.or(order.notes);

        let today = Utc::now().date_naive();
        validate_order_dates(order.order_date, expected_date, delivery_date, today)?;

        let updated = self
            .order_repo
            .update_order(
                &mut *tx,
                id,
                expected_date,
                delivery_date,
                notes.as_deref(),
                order.total,
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // --- TRANSIÇÃO DE STATUS ---

    pub async fn transition<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        new_status: OrderStatus,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self
            .order_repo
            .get_order_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Pedido",
                id,
            })?;

        // Transição para o próprio status é um no-op idempotente.
        if order.status == new_status {
            tx.commit().await?;
            return Ok(order);
        }

        if !order.status.can_transition_to(new_status) {
            return Err(AppError::InvalidState(format!(
                "Transição de status inválida: {:?} -> {:?}.",
                order.status, new_status
            )));
        }

        let updated = self
            .order_repo
            .update_order_status(&mut *tx, id, new_status)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // --- LINHAS DO PEDIDO ---

    pub async fn add_items<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        items: Vec<NewItemInput>,
    ) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self
            .order_repo
            .get_order_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Pedido",
                id: order_id,
            })?;
        Self::ensure_items_editable(order.status)?;

        let today = Utc::now().date_naive();
        let mut created = Vec::with_capacity(items.len());

        for input in items {
            validate_quantity(input.quantity)?;
            validate_unit_price(input.unit_price)?;
            validate_expiry(input.expiry_date, today)?;

            // Produto é dado mestre externo; só referenciamos o que existe.
            self.catalog_repo
                .get_product(&mut *tx, input.product_id)
                .await?
                .ok_or(AppError::NotFound {
                    entity: "Produto",
                    id: input.product_id,
                })?;

            let item = self
                .order_repo
                .add_order_item(
                    &mut *tx,
                    order_id,
                    input.product_id,
                    input.quantity,
                    input.unit_price,
                    input.expiry_date,
                )
                .await?;
            created.push(item);
        }

        // O total do pedido é derivado: recalculado na mesma transação para
        // que qualquer leitura subsequente já veja a nova soma.
        self.order_repo
            .recalculate_order_total(&mut *tx, order_id)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    pub async fn update_item<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        item_id: Uuid,
        patch: ItemPatch,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self
            .order_repo
            .get_order_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Pedido",
                id: order_id,
            })?;
        Self::ensure_items_editable(order.status)?;

        let item = self
            .order_repo
            .get_order_item(&mut *tx, order_id, item_id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Item do pedido",
                id: item_id,
            })?;

        let quantity = patch.quantity.unwrap_or(item.quantity);
        let unit_price = patch.unit_price.unwrap_or(item.unit_price);
        let expiry_date = patch.expiry_date.unwrap_or(item.expiry_date);

        validate_quantity(quantity)?;
        validate_unit_price(unit_price)?;
        // Validade antiga pode permanecer; uma validade nova precisa ser futura.
        if let Some(new_expiry) = patch.expiry_date {
            validate_expiry(new_expiry, Utc::now().date_naive())?;
        }

        let updated = self
            .order_repo
            .update_order_item(&mut *tx, order_id, item_id, quantity, unit_price, expiry_date)
            .await?;

        self.order_repo
            .recalculate_order_total(&mut *tx, order_id)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn remove_item<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let order = self
            .order_repo
            .get_order_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Pedido",
                id: order_id,
            })?;
        Self::ensure_items_editable(order.status)?;

        let removed = self
            .order_repo
            .delete_order_item(&mut *tx, order_id, item_id)
            .await?;
        if removed == 0 {
            return Err(AppError::NotFound {
                entity: "Item do pedido",
                id: item_id,
            });
        }

        self.order_repo
            .recalculate_order_total(&mut *tx, order_id)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Linhas só podem ser adicionadas/editadas/removidas enquanto o pedido
    /// não estiver concluído.
    fn ensure_items_editable(status: OrderStatus) -> Result<(), AppError> {
        if status == OrderStatus::Completed {
            return Err(AppError::InvalidState(
                "Itens de um pedido concluído não podem ser alterados.".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn itens_editaveis_apenas_fora_do_estado_concluido() {
        assert!(OrderService::ensure_items_editable(OrderStatus::Pending).is_ok());
        assert!(OrderService::ensure_items_editable(OrderStatus::Processing).is_ok());
        assert!(OrderService::ensure_items_editable(OrderStatus::Canceled).is_ok());
        assert!(matches!(
            OrderService::ensure_items_editable(OrderStatus::Completed),
            Err(AppError::InvalidState(_))
        ));
    }
}
