// src/db/ledger_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::ledger::{LedgerEntry, NewLedgerEntry, UnbalancedPosting},
};

#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Próximo número de lançamento. Dentro da transação do par, ambas as
    /// linhas recebem o mesmo número.
    pub async fn next_lancamento<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (lancamento,): (i64,) = sqlx::query_as("SELECT nextval('lancamento_seq')")
            .fetch_one(executor)
            .await?;
        Ok(lancamento)
    }

    pub async fn insert_entry<'e, E>(
        &self,
        executor: E,
        lancamento: i64,
        entry: &NewLedgerEntry,
    ) -> Result<LedgerEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO ledger_entries (lancamento, posting_date, order_id, account, debit, credit)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(lancamento)
        .bind(entry.posting_date)
        .bind(entry.order_id)
        .bind(&entry.account)
        .bind(entry.debit)
        .bind(entry.credit)
        .fetch_one(executor)
        .await?;

        Ok(row)
    }

    pub async fn list_entries<'e, E>(&self, executor: E) -> Result<Vec<LedgerEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            "SELECT * FROM ledger_entries ORDER BY lancamento DESC, created_at DESC",
        )
        .fetch_all(executor)
        .await?;
        Ok(entries)
    }

    pub async fn list_entries_for_order<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<Vec<LedgerEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            "SELECT * FROM ledger_entries WHERE order_id = $1 ORDER BY lancamento ASC",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(entries)
    }

    pub async fn delete_entries_for_order<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM ledger_entries WHERE order_id = $1")
            .bind(order_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Consulta de reconciliação: lançamentos cuja soma de débitos difere da
    /// soma de créditos. `post_balanced_entry` nunca os produz; linhas mistas
    /// inseridas por fora aparecem aqui para revisão do operador.
    pub async fn find_unbalanced<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<UnbalancedPosting>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let anomalies = sqlx::query_as::<_, UnbalancedPosting>(
            r#"
            SELECT lancamento,
                   SUM(debit)  AS total_debit,
                   SUM(credit) AS total_credit
            FROM ledger_entries
            GROUP BY lancamento
            HAVING SUM(debit) <> SUM(credit)
            ORDER BY lancamento ASC
            "#,
        )
        .fetch_all(executor)
        .await?;
        Ok(anomalies)
    }
}
