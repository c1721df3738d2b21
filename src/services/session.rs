// src/services/session.rs

use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{client::fetch_one, DataClient, Query},
    models::auth::{AuthEvent, Identity, Profile, SignInPayload},
    services::auth::AuthClient,
};

/// resolving -> (unauthenticated <-> authenticated), sem estado terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Resolving,
    Unauthenticated,
    Authenticated {
        identity: Identity,
        profile: Option<Profile>,
    },
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            SessionState::Authenticated { profile, .. } => profile.as_ref(),
            _ => None,
        }
    }

    pub fn is_resolving(&self) -> bool {
        matches!(self, SessionState::Resolving)
    }
}

/// Guarda a identidade corrente e o perfil. Passado explicitamente
/// (via `AppState`) a quem precisa; não existe instância global.
pub struct SessionStore {
    auth: Arc<dyn AuthClient>,
    data: Arc<dyn DataClient>,
    state: watch::Sender<SessionState>,
    cancel: CancellationToken,
}

impl SessionStore {
    pub fn new(auth: Arc<dyn AuthClient>, data: Arc<dyn DataClient>, cancel: CancellationToken) -> Arc<Self> {
        let (state, _) = watch::channel(SessionState::Resolving);
        Arc::new(Self { auth, data, state, cancel })
    }

    /// Passa a ouvir o colaborador e resolve a sessão inicial.
    pub async fn start(self: &Arc<Self>) {
        // Assina antes de consultar, para não perder eventos no meio
        let events = self.auth.subscribe();
        tokio::spawn(Arc::clone(self).listen(events));

        match self.auth.get_session().await {
            Ok(Some(identity)) => self.authenticate(identity).await,
            Ok(None) => self.set(SessionState::Unauthenticated),
            Err(e) => {
                tracing::error!("Falha ao resolver a sessão inicial: {}", e);
                self.set(SessionState::Unauthenticated);
            }
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Cada mudança real de estado notifica os ouvintes uma única vez.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub async fn sign_in(&self, payload: &SignInPayload) -> Result<Identity, AppError> {
        payload.validate()?;

        let identity = self
            .auth
            .sign_in_with_password(&payload.email, &payload.password)
            .await
            .inspect_err(|e| tracing::warn!("Falha no login de {}: {}", payload.email, e))?;

        self.authenticate(identity.clone()).await;
        tracing::info!("🔓 Sessão iniciada para {}", identity.email);
        Ok(identity)
    }

    /// Fire-and-forget: o estado local é limpo mesmo se o colaborador falhar.
    pub async fn sign_out(&self) {
        if let Err(e) = self.auth.sign_out().await {
            tracing::warn!("Falha ao encerrar sessão no colaborador: {}", e);
        }
        self.set(SessionState::Unauthenticated);
    }

    async fn listen(self: Arc<Self>, mut events: broadcast::Receiver<AuthEvent>) {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                event = events.recv() => match event {
                    Ok(AuthEvent::SignedIn(identity)) => self.on_signed_in(identity).await,
                    Ok(AuthEvent::SignedOut) => self.set(SessionState::Unauthenticated),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Perdemos {} eventos de sessão; reconsultando.", skipped);
                        self.refresh().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    }

    // Um SignedIn pode chegar depois de um sign-out local; só vale se ainda for a sessão corrente.
    async fn on_signed_in(&self, identity: Identity) {
        match self.auth.get_session().await {
            Ok(Some(current)) if current == identity => self.authenticate(current).await,
            Ok(_) => tracing::debug!("Evento de login obsoleto ignorado."),
            Err(e) => tracing::warn!("Falha ao conferir evento de login: {}", e),
        }
    }

    async fn refresh(&self) {
        match self.auth.get_session().await {
            Ok(Some(identity)) => self.authenticate(identity).await,
            Ok(None) => self.set(SessionState::Unauthenticated),
            Err(e) => tracing::warn!("Falha ao reconsultar sessão: {}", e),
        }
    }

    async fn authenticate(&self, identity: Identity) {
        let unchanged = self.state.borrow().identity() == Some(&identity);
        if unchanged {
            return;
        }

        let profile = self.load_profile(identity.id).await;

        // Um sign-out durante a busca do perfil vence
        match self.auth.get_session().await {
            Ok(Some(current)) if current == identity => {
                self.set(SessionState::Authenticated { identity, profile });
            }
            Ok(_) => tracing::debug!("Sessão encerrada durante a carga do perfil; ignorando."),
            Err(e) => tracing::warn!("Falha ao reconfirmar sessão: {}", e),
        }
    }

    // Perfil é opcional: falha aqui não derruba a sessão
    async fn load_profile(&self, id: Uuid) -> Option<Profile> {
        match fetch_one::<Profile>(self.data.as_ref(), &Query::from("users").eq("id", id)).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("Falha ao carregar perfil {}: {}", id, e);
                None
            }
        }
    }

    fn set(&self, next: SessionState) {
        self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
