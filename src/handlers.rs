// src/handlers.rs

pub mod auth;
pub mod crm;
pub mod dashboard;

use crate::{
    config::AppState,
    middleware::auth::CurrentUser,
    views::page::{Page, UserBadge},
};

// Toda página leva o usuário do cabeçalho e esvazia a fila de notificações
pub(crate) fn page<T>(app_state: &AppState, user: Option<&CurrentUser>, view: T) -> Page<T> {
    Page {
        user: user.and_then(|u| u.profile.as_ref()).map(UserBadge::from),
        notifications: app_state.notifier.drain(),
        view,
    }
}
