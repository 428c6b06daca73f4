use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// As quatro variantes de negócio são sempre recuperáveis pelo chamador;
// apenas as variantes de infraestrutura viram 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Validação de regra de domínio que o `validator` não cobre
    // (escala de preço, janelas de data, produto duplicado...).
    #[error("Campo inválido '{field}': {message}")]
    InvalidField { field: &'static str, message: String },

    #[error("{entity} não encontrado(a): {id}")]
    NotFound { entity: &'static str, id: Uuid },

    // Operação não permitida no estado atual da entidade
    // (editar pedido concluído, excluir lote com saldo...).
    #[error("Estado inválido: {0}")]
    InvalidState(String),

    #[error("Estoque insuficiente para o produto {product_id}: disponível {available}, solicitado {requested}")]
    InsufficientStock {
        product_id: Uuid,
        available: i32,
        requested: i32,
    },

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "Um ou mais campos são inválidos.",
                        "details": details,
                    }),
                )
            }
            AppError::InvalidField { field, message } => (
                StatusCode::BAD_REQUEST,
                json!({ "error": message, "field": field }),
            ),
            AppError::NotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                json!({ "error": format!("{} não encontrado(a).", entity), "id": id }),
            ),
            AppError::InvalidState(reason) => {
                (StatusCode::CONFLICT, json!({ "error": reason }))
            }
            AppError::InsufficientStock {
                product_id,
                available,
                requested,
            } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "Estoque insuficiente.",
                    "productId": product_id,
                    "available": available,
                    "requested": requested,
                }),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "Usuário ou senha inválidos." }),
            ),

            // DatabaseError, InternalServerError e BcryptError viram 500.
            // O `tracing` loga a mensagem detalhada; o cliente recebe algo genérico.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Ocorreu um erro inesperado." }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl AppError {
    /// Atalho para erros de campo com mensagem formatada.
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        AppError::InvalidField {
            field,
            message: message.into(),
        }
    }
}
