// src/services/ledger_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::LedgerRepository,
    models::ledger::{balanced_pair, LedgerEntry, UnbalancedPosting},
};

#[derive(Clone)]
pub struct LedgerService {
    repo: LedgerRepository,
}

impl LedgerService {
    pub fn new(repo: LedgerRepository) -> Self {
        Self { repo }
    }

    /// Cria o par débito/crédito de um lançamento: exatamente duas linhas
    /// (uma só-débito, uma só-crédito) compartilhando o mesmo número de
    /// lançamento. O balanceamento é garantido por construção, e as duas
    /// inserções rodam na mesma transação.
    pub async fn post_balanced_entry<'e, E>(
        &self,
        executor: E,
        debit_account: &str,
        credit_account: &str,
        amount: Decimal,
        posting_date: NaiveDate,
        order_id: Option<Uuid>,
    ) -> Result<(LedgerEntry, LedgerEntry), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let (debit_row, credit_row) =
            balanced_pair(debit_account, credit_account, amount, posting_date, order_id)?;

        let mut tx = executor.begin().await?;

        let lancamento = self.repo.next_lancamento(&mut *tx).await?;
        let debit_entry = self.repo.insert_entry(&mut *tx, lancamento, &debit_row).await?;
        let credit_entry = self.repo.insert_entry(&mut *tx, lancamento, &credit_row).await?;

        tx.commit().await?;
        Ok((debit_entry, credit_entry))
    }

    pub async fn list_entries<'e, E>(&self, executor: E) -> Result<Vec<LedgerEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_entries(executor).await
    }

    pub async fn list_entries_for_order<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<LedgerEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_entries_for_order(executor, order_id).await
    }

    pub async fn delete_entries_for_order<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.delete_entries_for_order(executor, order_id).await
    }

    /// Válvula de escape documentada: o modelo de dados admite linhas com
    /// débito e crédito simultâneos, e esta consulta as expõe para revisão
    /// do operador em vez de falhar silenciosamente.
    pub async fn find_unbalanced<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<UnbalancedPosting>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.find_unbalanced(executor).await
    }
}
