// src/handlers/auth.rs

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::page,
    models::auth::SignInPayload,
    routes::Route,
    services::SessionState,
};

#[derive(Debug, Serialize)]
pub struct SignInView {
    pub title: &'static str,
    pub fields: [&'static str; 2],
}

// GET /login
pub async fn sign_in_page(State(app_state): State<AppState>) -> Response {
    // Já autenticado: vai direto para o dashboard
    if let SessionState::Authenticated { .. } = app_state.session.state() {
        return Redirect::to(&Route::Dashboard.path()).into_response();
    }

    let view = SignInView { title: "Sign In", fields: ["email", "password"] };
    Json(page(&app_state, None, view)).into_response()
}

// POST /login
pub async fn sign_in(
    State(app_state): State<AppState>,
    Json(payload): Json<SignInPayload>,
) -> Result<Redirect, AppError> {
    app_state.session.sign_in(&payload).await?;
    Ok(Redirect::to(&Route::Dashboard.path()))
}

// POST /logout
pub async fn sign_out(State(app_state): State<AppState>) -> Redirect {
    app_state.session.sign_out().await;
    Redirect::to(&Route::SignIn.path())
}
