// src/services/cascade_service.rs
//
// Orquestrador de exclusão em cascata. Excluir um pedido é a operação de
// maior risco do sistema: quatro coleções dependentes precisam sair antes da
// linha do pedido, e nenhuma falha pode deixar estado parcial. Toda a
// sequência roda dentro de UMA transação; qualquer rejeição de regra de
// negócio ou erro de armazenamento desfaz tudo no rollback.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LedgerRepository, OrderRepository, StockRepository},
    models::{
        inventory::{Lot, StockBalance},
        orders::OrderStatus,
    },
    services::credential_service::CredentialService,
};

#[derive(Clone)]
pub struct CascadeService {
    order_repo: OrderRepository,
    stock_repo: StockRepository,
    ledger_repo: LedgerRepository,
    credential_service: CredentialService,
}

impl CascadeService {
    pub fn new(
        order_repo: OrderRepository,
        stock_repo: StockRepository,
        ledger_repo: LedgerRepository,
        credential_service: CredentialService,
    ) -> Self {
        Self {
            order_repo,
            stock_repo,
            ledger_repo,
            credential_service,
        }
    }

    /// Único caminho do sistema autorizado a remover um pedido que ainda tem
    /// dependentes. Sequência, cada passo completo antes do próximo:
    /// 1. pré-condição: status != Completed;
    /// 2. exclui lançamentos contábeis do pedido;
    /// 3. exclui lotes, exigindo saldo de estoque zerado em todos;
    /// 4. exclui linhas do pedido;
    /// 5. exclui a linha do pedido.
    pub async fn delete_order(
        &self,
        pool: &PgPool,
        order_id: Uuid,
        username: &str,
        password: &str,
    ) -> Result<(), AppError> {
        // Porteiro de credenciais antes de qualquer escrita.
        let actor_id = self
            .credential_service
            .authorize(pool, username, password)
            .await?;

        let mut tx = pool.begin().await?;

        // 1. Trava a linha do pedido e checa a pré-condição. O FOR UPDATE
        // impede que duas exclusões concorrentes passem ambas por aqui.
        let order = self
            .order_repo
            .get_order_for_update(&mut *tx, order_id)
            .await?
            .ok_or(AppError::NotFound {
                entity: "Pedido",
                id: order_id,
            })?;
        ensure_deletable(order.status)?;

        // 2. Lançamentos contábeis: sem pré-condição de negócio, linhas de um
        // pedido excluído simplesmente saem.
        let entries_removed = self
            .ledger_repo
            .delete_entries_for_order(&mut *tx, order_id)
            .await?;

        // 3. Lotes: todo lote precisa estar com o saldo espelhado zerado.
        // Uma única violação aborta a exclusão inteira via rollback.
        let lots = self.stock_repo.list_lots_for_order(&mut *tx, order_id).await?;
        let balances = self
            .stock_repo
            .balances_for_order_lots(&mut *tx, order_id)
            .await?;
        ensure_lots_drained(&lots, &balances)?;

        self.stock_repo
            .delete_balances_for_order_lots(&mut *tx, order_id)
            .await?;
        let lots_removed = self.stock_repo.delete_lots_for_order(&mut *tx, order_id).await?;

        // 4. Linhas do pedido.
        let items_removed = self
            .order_repo
            .delete_items_for_order(&mut *tx, order_id)
            .await?;

        // 5. A linha do pedido, por último.
        self.order_repo.delete_order_row(&mut *tx, order_id).await?;

        tx.commit().await?;

        tracing::info!(
            "Pedido {} excluído pelo operador {}: {} lançamentos, {} lotes, {} itens.",
            order_id,
            actor_id,
            entries_removed,
            lots_removed,
            items_removed
        );
        Ok(())
    }
}

/// Pré-condição do passo 1: pedido concluído nunca é excluído.
fn ensure_deletable(status: OrderStatus) -> Result<(), AppError> {
    if status == OrderStatus::Completed {
        return Err(AppError::InvalidState(
            "Pedido concluído não pode ser excluído.".to_string(),
        ));
    }
    Ok(())
}

/// Pré-condição do passo 3: todo lote do pedido com saldo espelhado zerado.
/// Lote sem linha de saldo conta como drenado.
fn ensure_lots_drained(lots: &[Lot], balances: &[StockBalance]) -> Result<(), AppError> {
    for lot in lots {
        let allocated = balances
            .iter()
            .find(|b| b.lot_id == Some(lot.id))
            .map(|b| b.quantity)
            .unwrap_or(0);
        if allocated > 0 {
            return Err(AppError::InvalidState(format!(
                "Lote {} ainda tem estoque alocado ({} unidades); drene o estoque antes de excluir o pedido.",
                lot.id, allocated
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lot(id: Uuid) -> Lot {
        Lot {
            id,
            order_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            expiry_date: "2026-01-01".parse().unwrap(),
            quantity: 0,
            created_at: Utc::now(),
        }
    }

    fn balance(lot_id: Uuid, quantity: i32) -> StockBalance {
        StockBalance {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            lot_id: Some(lot_id),
            quantity,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn pedido_concluido_nunca_e_excluivel() {
        assert!(matches!(
            ensure_deletable(OrderStatus::Completed),
            Err(AppError::InvalidState(_))
        ));
        assert!(ensure_deletable(OrderStatus::Pending).is_ok());
        assert!(ensure_deletable(OrderStatus::Processing).is_ok());
        assert!(ensure_deletable(OrderStatus::Canceled).is_ok());
    }

    #[test]
    fn lotes_drenados_passam_na_checagem() {
        let l1 = lot(Uuid::new_v4());
        let l2 = lot(Uuid::new_v4());
        let balances = vec![balance(l1.id, 0), balance(l2.id, 0)];
        assert!(ensure_lots_drained(&[l1, l2], &balances).is_ok());
    }

    #[test]
    fn lote_com_saldo_alocado_aborta_a_exclusao() {
        let l1 = lot(Uuid::new_v4());
        let l2 = lot(Uuid::new_v4());
        let balances = vec![balance(l1.id, 0), balance(l2.id, 3)];
        assert!(matches!(
            ensure_lots_drained(&[l1, l2], &balances),
            Err(AppError::InvalidState(_))
        ));
    }

    #[test]
    fn lote_sem_linha_de_saldo_conta_como_drenado() {
        let l1 = lot(Uuid::new_v4());
        assert!(ensure_lots_drained(&[l1], &[]).is_ok());
    }

    #[test]
    fn pedido_sem_lotes_passa_direto() {
        assert!(ensure_lots_drained(&[], &[]).is_ok());
    }
}
