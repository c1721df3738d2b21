// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// A identidade autenticada que vive só em memória durante a sessão
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    #[default]
    Agent,
}

// Linha da tabela `users`: 1-para-1 com a identidade, somente leitura aqui
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub role: UserRole,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

// Credenciais guardadas pelo colaborador de autenticação
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

// Dados para login
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignInPayload {
    #[validate(email(message = "Please enter a valid email!"))]
    pub email: String,
    #[validate(length(min = 1, message = "Please input your password!"))]
    pub password: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

// Eventos de sessão entregues pelo colaborador de autenticação
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Identity),
    SignedOut,
}
