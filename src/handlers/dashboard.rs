// src/handlers/dashboard.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    config::AppState,
    handlers::page,
    middleware::auth::CurrentUser,
    views::dashboard::load_dashboard,
};

// GET /
pub async fn dashboard(State(app_state): State<AppState>, user: CurrentUser) -> Response {
    let cancel = app_state.shutdown.child_token();

    match load_dashboard(app_state.data.as_ref(), &app_state.notifier, &cancel).await {
        Some(view) => Json(page(&app_state, Some(&user), view)).into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
