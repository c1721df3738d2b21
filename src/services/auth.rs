// src/services/auth.rs

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bcrypt::verify;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Account, AuthEvent, Claims, Identity},
};

/// O colaborador de autenticação: login por senha e eventos de sessão.
#[async_trait]
pub trait AuthClient: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity, AppError>;

    async fn sign_out(&self) -> Result<(), AppError>;

    /// A sessão corrente, se ainda for válida.
    async fn get_session(&self) -> Result<Option<Identity>, AppError>;

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

// =========================================================================
//  A "vaga" da sessão corrente, compartilhada pelas implementações
// =========================================================================

pub(crate) struct SessionSlot {
    current: Mutex<Option<Identity>>,
    expiry: Mutex<Option<CancellationToken>>,
    events: broadcast::Sender<AuthEvent>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl SessionSlot {
    pub(crate) fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            current: Mutex::new(None),
            expiry: Mutex::new(None),
            events,
        })
    }

    pub(crate) fn current(&self) -> Option<Identity> {
        lock(&self.current).clone()
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Guarda a nova sessão e agenda a expiração do token.
    pub(crate) fn begin(self: &Arc<Self>, identity: Identity) {
        let timer = CancellationToken::new();
        if let Some(previous) = lock(&self.expiry).replace(timer.clone()) {
            previous.cancel();
        }
        *lock(&self.current) = Some(identity.clone());

        let slot = Arc::clone(self);
        let token = identity.access_token.clone();
        let wait = (identity.expires_at - Utc::now()).to_std().unwrap_or_default();
        tokio::spawn(async move {
            tokio::select! {
                _ = timer.cancelled() => {}
                _ = tokio::time::sleep(wait) => slot.expire(&token),
            }
        });

        // Sem ouvintes não é erro
        let _ = self.events.send(AuthEvent::SignedIn(identity));
    }

    /// Encerra a sessão se `token` ainda for o corrente (expiração externa).
    pub(crate) fn expire(&self, token: &str) {
        let expired = {
            let mut current = lock(&self.current);
            match current.as_ref() {
                Some(identity) if identity.access_token == token => current.take(),
                _ => None,
            }
        };

        if let Some(identity) = expired {
            tracing::info!("⏰ Sessão de {} expirou.", identity.email);
            let _ = self.events.send(AuthEvent::SignedOut);
        }
    }

    pub(crate) fn end(&self) {
        if let Some(timer) = lock(&self.expiry).take() {
            timer.cancel();
        }
        let previous = lock(&self.current).take();
        if previous.is_some() {
            let _ = self.events.send(AuthEvent::SignedOut);
        }
    }
}

// Verificação do bcrypt fora do runtime assíncrono
pub(crate) async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();

    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

    Ok(is_valid)
}

// =========================================================================
//  Implementação em cima do Postgres + JWT
// =========================================================================

// Casa com o índice único em lower(email)
const FIND_ACCOUNT_SQL: &str = "SELECT id, email, password_hash FROM accounts WHERE lower(email) = lower($1)";

pub struct PgAuthClient {
    pool: PgPool,
    jwt_secret: String,
    session_ttl: Duration,
    slot: Arc<SessionSlot>,
}

impl PgAuthClient {
    pub fn new(pool: PgPool, jwt_secret: String, session_ttl: Duration) -> Self {
        Self {
            pool,
            jwt_secret,
            session_ttl,
            slot: SessionSlot::new(),
        }
    }

    // Busca as credenciais pelo e-mail
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(FIND_ACCOUNT_SQL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(account)
    }

    fn create_token(&self, user_id: Uuid) -> Result<(String, chrono::DateTime<Utc>), AppError> {
        let now = Utc::now();
        let expires_at = now + self.session_ttl;

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?;
        Ok((token, expires_at))
    }

    fn validate_token(&self, token: &str) -> Result<Uuid, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims.sub)
    }
}

#[async_trait]
impl AuthClient for PgAuthClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity, AppError> {
        let account = self
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &account.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let (access_token, expires_at) = self.create_token(account.id)?;
        let identity = Identity {
            id: account.id,
            email: account.email,
            access_token,
            expires_at,
        };

        self.slot.begin(identity.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        self.slot.end();
        Ok(())
    }

    async fn get_session(&self) -> Result<Option<Identity>, AppError> {
        let Some(identity) = self.slot.current() else {
            return Ok(None);
        };

        match self.validate_token(&identity.access_token) {
            Ok(sub) if sub == identity.id => Ok(Some(identity)),
            _ => {
                self.slot.expire(&identity.access_token);
                Ok(None)
            }
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.slot.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(ttl: Duration) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "ana@example.com".into(),
            access_token: Uuid::new_v4().to_string(),
            expires_at: Utc::now() + ttl,
        }
    }

    #[tokio::test]
    async fn slot_emits_sign_out_when_token_expires() {
        let slot = SessionSlot::new();
        let mut events = slot.subscribe();

        slot.begin(identity(Duration::milliseconds(20)));
        assert!(matches!(events.recv().await, Ok(AuthEvent::SignedIn(_))));
        assert_eq!(events.recv().await, Ok(AuthEvent::SignedOut));
        assert!(slot.current().is_none());
    }

    #[tokio::test]
    async fn stale_expiry_does_not_end_a_newer_session() {
        let slot = SessionSlot::new();
        let old = identity(Duration::hours(1));
        let new = identity(Duration::hours(1));

        slot.begin(old.clone());
        slot.begin(new.clone());
        slot.expire(&old.access_token);

        assert_eq!(slot.current(), Some(new));
    }

    #[test]
    fn account_lookup_ignores_email_case() {
        assert!(FIND_ACCOUNT_SQL.contains("lower(email) = lower($1)"));
    }

    #[tokio::test]
    async fn end_without_session_is_silent() {
        let slot = SessionSlot::new();
        let mut events = slot.subscribe();
        slot.end();
        assert!(events.try_recv().is_err());
    }
}
