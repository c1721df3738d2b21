// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{Identity, Profile},
    routes::Route,
    services::session::SessionState,
    views::page::{LoadingView, Page},
};

/// O que fazer com uma view protegida, dado o estado da sessão.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Loading,
    Redirect(Route),
    Render,
}

// Sem cache: avaliado de novo a cada requisição
pub fn evaluate(state: &SessionState) -> GuardDecision {
    match state {
        SessionState::Resolving => GuardDecision::Loading,
        SessionState::Unauthenticated => GuardDecision::Redirect(Route::SignIn),
        SessionState::Authenticated { .. } => GuardDecision::Render,
    }
}

// O middleware em si
pub async fn session_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let state = app_state.session.state();

    match evaluate(&state) {
        GuardDecision::Loading => Json(Page {
            user: None,
            notifications: Vec::new(),
            view: LoadingView::default(),
        })
        .into_response(),
        GuardDecision::Redirect(route) => Redirect::to(&route.path()).into_response(),
        GuardDecision::Render => {
            if let SessionState::Authenticated { identity, profile } = state {
                // Insere a sessão nos "extensions" da requisição
                request.extensions_mut().insert(CurrentUser { identity, profile });
            }
            next.run(request).await
        }
    }
}

/// Extrator para obter a sessão autenticada diretamente nos handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub identity: Identity,
    pub profile: Option<Profile>,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn decision_follows_the_three_states() {
        assert_eq!(evaluate(&SessionState::Resolving), GuardDecision::Loading);
        assert_eq!(
            evaluate(&SessionState::Unauthenticated),
            GuardDecision::Redirect(Route::SignIn)
        );

        let identity = Identity {
            id: Uuid::new_v4(),
            email: "ana@example.com".into(),
            access_token: "token".into(),
            expires_at: Utc::now(),
        };
        let state = SessionState::Authenticated { identity, profile: None };
        assert_eq!(evaluate(&state), GuardDecision::Render);
    }
}
