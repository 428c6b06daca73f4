// src/services/credential_service.rs

use bcrypt::verify;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, db::OperatorRepository};

// Porteiro de credenciais das operações sensíveis: responde permitir/negar
// e, quando permite, devolve a identidade do operador.
#[derive(Clone)]
pub struct CredentialService {
    operator_repo: OperatorRepository,
}

impl CredentialService {
    pub fn new(operator_repo: OperatorRepository) -> Self {
        Self { operator_repo }
    }

    /// Verifica usuário e senha. Operador inexistente ou inativo recebe a
    /// mesma resposta de senha errada, sem vazar qual dos dois falhou.
    pub async fn authorize<'e, E>(
        &self,
        executor: E,
        username: &str,
        password: &str,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let operator = self
            .operator_repo
            .find_by_username(executor, username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // bcrypt é caro de propósito; sai da thread do runtime.
        let hash = operator.password_hash.clone();
        let password = password.to_owned();
        let ok = tokio::task::spawn_blocking(move || verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação: {}", e))??;

        if !ok {
            return Err(AppError::InvalidCredentials);
        }
        Ok(operator.id)
    }
}
