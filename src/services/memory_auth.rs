// src/services/memory_auth.rs

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{AuthEvent, Identity},
    services::auth::{verify_password, AuthClient, SessionSlot},
};

// Custo baixo: só para contas de demonstração e testes
const MEMORY_BCRYPT_COST: u32 = 4;

/// Colaborador de autenticação em memória (backend "memory" e testes).
pub struct MemoryAuthClient {
    accounts: Mutex<HashMap<String, (Uuid, String)>>,
    session_ttl: Duration,
    slot: Arc<SessionSlot>,
}

impl MemoryAuthClient {
    pub fn new(session_ttl: Duration) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            session_ttl,
            slot: SessionSlot::new(),
        }
    }

    /// Cadastra uma conta e devolve o id gerado.
    pub fn with_account(&self, email: &str, password: &str) -> Result<Uuid, AppError> {
        let hashed = bcrypt::hash(password, MEMORY_BCRYPT_COST)?;
        let id = Uuid::new_v4();
        self.accounts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(email.to_lowercase(), (id, hashed));
        Ok(id)
    }

    /// Simula a expiração do token vinda "de fora".
    pub fn expire_session(&self) {
        if let Some(identity) = self.slot.current() {
            self.slot.expire(&identity.access_token);
        }
    }
}

#[async_trait]
impl AuthClient for MemoryAuthClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        let account = self
            .accounts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&email.to_lowercase())
            .cloned();
        let (id, password_hash) = account.ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let identity = Identity {
            id,
            email: email.to_string(),
            access_token: Uuid::new_v4().to_string(),
            expires_at: Utc::now() + self.session_ttl,
        };
        self.slot.begin(identity.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        self.slot.end();
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Identity>, AppError> {
        Ok(self.slot.current().filter(|identity| identity.expires_at > Utc::now()))
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.slot.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = MemoryAuthClient::new(Duration::hours(1));
        auth.with_account("ana@example.com", "s3cret").unwrap();

        let result = auth.sign_in_with_password("ana@example.com", "nope").await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
        assert!(auth.get_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sign_in_then_out_round_trip() {
        let auth = MemoryAuthClient::new(Duration::hours(1));
        let id = auth.with_account("ana@example.com", "s3cret").unwrap();

        let identity = auth.sign_in_with_password("ANA@example.com", "s3cret").await.unwrap();
        assert_eq!(identity.id, id);
        assert_eq!(auth.get_session().await.unwrap(), Some(identity));

        auth.sign_out().await.unwrap();
        assert!(auth.get_session().await.unwrap().is_none());
    }
}
