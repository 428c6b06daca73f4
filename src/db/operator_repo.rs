// src/db/operator_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{common::error::AppError, models::auth::Operator};

#[derive(Clone)]
pub struct OperatorRepository {
    pool: PgPool,
}

impl OperatorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username<'e, E>(
        &self,
        executor: E,
        username: &str,
    ) -> Result<Option<Operator>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let operator = sqlx::query_as::<_, Operator>(
            "SELECT * FROM operators WHERE username = $1 AND active = true",
        )
        .bind(username)
        .fetch_optional(executor)
        .await?;
        Ok(operator)
    }
}
