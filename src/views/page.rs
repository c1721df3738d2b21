// src/views/page.rs

use serde::Serialize;
use uuid::Uuid;

use crate::{common::notify::Notification, models::auth::Profile, routes::Route};

/// Tabela já formatada: cabeçalhos + células em texto.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<&'static str>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub cells: Vec<String>,
}

impl Table {
    pub fn new(columns: &[&'static str]) -> Self {
        Self { columns: columns.to_vec(), rows: Vec::new() }
    }

    pub fn push(&mut self, id: Uuid, link: Option<Route>, cells: Vec<String>) {
        self.rows.push(TableRow {
            id,
            link: link.map(|route| route.path()),
            cells,
        });
    }

    /// Valor da célula `column` na linha `row`.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| *c == column)?;
        self.rows.get(row)?.cells.get(idx).map(String::as_str)
    }
}

// Par rótulo/valor dos painéis de detalhe e dos cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

impl Field {
    pub fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self { label, value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBadge {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&Profile> for UserBadge {
    fn from(profile: &Profile) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            avatar_url: profile.avatar_url.clone(),
        }
    }
}

/// O envelope de toda página: usuário do cabeçalho, toasts pendentes e a view.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub user: Option<UserBadge>,
    pub notifications: Vec<Notification>,
    pub view: T,
}

// O placeholder enquanto a sessão ainda está sendo resolvida
#[derive(Debug, Clone, Serialize)]
pub struct LoadingView {
    pub loading: bool,
    pub message: &'static str,
}

impl Default for LoadingView {
    fn default() -> Self {
        Self { loading: true, message: "Loading..." }
    }
}
