// src/common/error.rs

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Mensagens por campo, na forma que o formulário exibe: campo -> mensagens
pub type FieldErrors = BTreeMap<String, Vec<String>>;

// Erros vindos do "store" remoto (rede, query, decodificação das linhas)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Erro de banco de dados: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Identificador inválido: {0}")]
    InvalidIdentifier(String),

    #[error("Linha em formato inesperado: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Store indisponível: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Registro não encontrado")]
    NotFound,

    #[error("Erro no store: {0}")]
    Store(#[from] StoreError),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Store(StoreError::Database(e))
    }
}

// Achata os erros do `validator` em campo -> mensagens.
pub fn field_messages(errors: &validator::ValidationErrors) -> FieldErrors {
    let mut details = FieldErrors::new();
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| match &e.message {
                Some(m) => m.to_string(),
                None => format!("Invalid {}", field),
            })
            .collect();
        details.insert(field.to_string(), messages);
    }
    details
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": field_messages(&errors),
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Failed to sign in"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Session expired"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found"),

            // Todo o resto vira 500; o `tracing` loga a mensagem detalhada.
            ref e => {
                tracing::error!("Erro Interno: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
