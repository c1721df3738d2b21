// src/handlers/crm.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    config::AppState,
    handlers::page,
    middleware::auth::CurrentUser,
    models::crm::{ActivityForm, CustomerForm, DealForm},
    views::{
        detail::{load_customer, load_deal, DetailOutcome},
        entities::completion_patch,
        list::{CreateOutcome, DataList, ListEntity},
    },
};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

// =========================================================================
//  Helpers genéricos (uma vez para todas as listagens)
// =========================================================================

async fn show_list<E: ListEntity>(
    app_state: &AppState,
    user: &CurrentUser,
    list: &Mutex<DataList<E>>,
    search: String,
) -> Response {
    let mut list = list.lock().await;
    list.close_form();
    // Reabrir a página sem `?search=` volta à lista completa
    list.mount(Some(search)).await;
    Json(page(app_state, Some(user), list.render())).into_response()
}

async fn show_form<E: ListEntity>(app_state: &AppState, user: &CurrentUser, list: &Mutex<DataList<E>>) -> Response {
    let mut list = list.lock().await;
    list.mount(None).await;
    list.open_form();
    Json(page(app_state, Some(user), list.render())).into_response()
}

async fn submit<E: ListEntity>(
    app_state: &AppState,
    user: &CurrentUser,
    list: &Mutex<DataList<E>>,
    form: E::Form,
) -> Response {
    let mut list = list.lock().await;
    let status = match list.create(form).await {
        CreateOutcome::Created => StatusCode::CREATED,
        CreateOutcome::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
        CreateOutcome::Failed => StatusCode::BAD_GATEWAY,
        CreateOutcome::Cancelled => return StatusCode::SERVICE_UNAVAILABLE.into_response(),
    };
    (status, Json(page(app_state, Some(user), list.render()))).into_response()
}

fn detail<T: serde::Serialize>(app_state: &AppState, user: &CurrentUser, outcome: DetailOutcome<T>) -> Response {
    match outcome {
        DetailOutcome::Ready(view) => Json(page(app_state, Some(user), view)).into_response(),
        DetailOutcome::Redirect(route) => Redirect::to(&route.path()).into_response(),
        DetailOutcome::Cancelled => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

// =========================================================================
//  Clientes
// =========================================================================

// GET /customers?search=
pub async fn list_customers(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<SearchParams>,
) -> Response {
    show_list(&app_state, &user, &app_state.views.customers, params.search.unwrap_or_default()).await
}

// GET /customers/new
pub async fn new_customer(State(app_state): State<AppState>, user: CurrentUser) -> Response {
    show_form(&app_state, &user, &app_state.views.customers).await
}

// POST /customers
pub async fn create_customer(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<CustomerForm>,
) -> Response {
    submit(&app_state, &user, &app_state.views.customers, form).await
}

// GET /customers/{id}
pub async fn customer_detail(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Response {
    let cancel = app_state.shutdown.child_token();
    let outcome = load_customer(app_state.data.as_ref(), &app_state.notifier, &cancel, id).await;
    detail(&app_state, &user, outcome)
}

// =========================================================================
//  Negócios
// =========================================================================

// GET /deals?search=
pub async fn list_deals(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<SearchParams>,
) -> Response {
    show_list(&app_state, &user, &app_state.views.deals, params.search.unwrap_or_default()).await
}

// GET /deals/new
pub async fn new_deal(State(app_state): State<AppState>, user: CurrentUser) -> Response {
    show_form(&app_state, &user, &app_state.views.deals).await
}

// POST /deals
pub async fn create_deal(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<DealForm>,
) -> Response {
    submit(&app_state, &user, &app_state.views.deals, form).await
}

// GET /deals/{id}
pub async fn deal_detail(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Response {
    let cancel = app_state.shutdown.child_token();
    let outcome = load_deal(app_state.data.as_ref(), &app_state.notifier, &cancel, id).await;
    detail(&app_state, &user, outcome)
}

// =========================================================================
//  Atividades
// =========================================================================

// GET /activities
pub async fn list_activities(State(app_state): State<AppState>, user: CurrentUser) -> Response {
    show_list(&app_state, &user, &app_state.views.activities, String::new()).await
}

// GET /activities/new
pub async fn new_activity(State(app_state): State<AppState>, user: CurrentUser) -> Response {
    show_form(&app_state, &user, &app_state.views.activities).await
}

// POST /activities
pub async fn create_activity(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<ActivityForm>,
) -> Response {
    submit(&app_state, &user, &app_state.views.activities, form).await
}

// POST /activities/{id}/complete
pub async fn complete_activity(
    State(app_state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Response {
    let mut list = app_state.views.activities.lock().await;
    let status = if list.update_row(id, completion_patch(Utc::now())).await {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, Json(page(&app_state, Some(&user), list.render()))).into_response()
}
