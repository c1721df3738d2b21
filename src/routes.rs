// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::{
    config::AppState,
    handlers,
    middleware::auth::session_guard,
};

/// As views nomeadas da aplicação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SignIn,
    Dashboard,
    Customers,
    CustomerDetail(Uuid),
    Deals,
    DealDetail(Uuid),
    Activities,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::SignIn => "/login".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::Customers => "/customers".to_string(),
            Route::CustomerDetail(id) => format!("/customers/{id}"),
            Route::Deals => "/deals".to_string(),
            Route::DealDetail(id) => format!("/deals/{id}"),
            Route::Activities => "/activities".to_string(),
        }
    }
}

pub fn create_router(app_state: AppState) -> Router {
    // Rotas públicas
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/login",
            get(handlers::auth::sign_in_page).post(handlers::auth::sign_in),
        );

    // Tudo o mais passa pelo guard de sessão
    let protected_routes = Router::new()
        .route("/", get(handlers::dashboard::dashboard))
        .route("/logout", post(handlers::auth::sign_out))
        .route(
            "/customers",
            get(handlers::crm::list_customers).post(handlers::crm::create_customer),
        )
        .route("/customers/new", get(handlers::crm::new_customer))
        .route("/customers/{id}", get(handlers::crm::customer_detail))
        .route(
            "/deals",
            get(handlers::crm::list_deals).post(handlers::crm::create_deal),
        )
        .route("/deals/new", get(handlers::crm::new_deal))
        .route("/deals/{id}", get(handlers::crm::deal_detail))
        .route(
            "/activities",
            get(handlers::crm::list_activities).post(handlers::crm::create_activity),
        )
        .route("/activities/new", get(handlers::crm::new_activity))
        .route(
            "/activities/{id}/complete",
            post(handlers::crm::complete_activity),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            session_guard,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_paths_embed_the_id() {
        let id = Uuid::nil();
        assert_eq!(Route::DealDetail(id).path(), format!("/deals/{id}"));
        assert_eq!(Route::SignIn.path(), "/login");
        assert_eq!(Route::Dashboard.path(), "/");
    }
}
