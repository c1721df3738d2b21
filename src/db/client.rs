// src/db/client.rs

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::common::error::StoreError;

/// Uma linha como o store devolve: objeto JSON, com os joins embutidos.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Columns {
    All,
    Only(Vec<&'static str>),
}

/// Join de exibição: `tabela (colunas)` casando `tabela.id = local_key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub table: &'static str,
    pub local_key: &'static str,
    pub columns: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq { column: &'static str, value: String },
    // Substring sem diferenciar maiúsculas (ILIKE '%termo%')
    Contains { column: &'static str, term: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub table: &'static str,
    pub columns: Columns,
    pub embeds: Vec<Embed>,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn from(table: &'static str) -> Self {
        Self {
            table,
            columns: Columns::All,
            embeds: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn columns(mut self, columns: &[&'static str]) -> Self {
        self.columns = Columns::Only(columns.to_vec());
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn eq(mut self, column: &'static str, value: impl ToString) -> Self {
        self.filters.push(Filter::Eq { column, value: value.to_string() });
        self
    }

    pub fn contains(mut self, column: &'static str, term: impl Into<String>) -> Self {
        self.filters.push(Filter::Contains { column, term: term.into() });
        self
    }

    pub fn order_desc(mut self, column: &'static str) -> Self {
        self.order = Some(Order { column, descending: true });
        self
    }

    pub fn single(mut self) -> Self {
        self.limit = Some(1);
        self
    }
}

/// O cliente do store remoto. Qualquer `Err` é falha total: nunca há linhas parciais.
#[async_trait]
pub trait DataClient: Send + Sync {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError>;

    async fn insert(&self, table: &'static str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError>;

    async fn update(&self, table: &'static str, id: Uuid, patch: Row) -> Result<Vec<Row>, StoreError>;
}

// =========================================================================
//  Helpers tipados em cima do contrato cru
// =========================================================================

pub fn decode<T: DeserializeOwned>(row: Row) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

pub fn encode<T: Serialize>(value: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(row) => Ok(row),
        other => Err(StoreError::Unavailable(format!(
            "esperava um objeto para inserir, veio {other}"
        ))),
    }
}

pub async fn fetch_all<T: DeserializeOwned>(client: &dyn DataClient, query: &Query) -> Result<Vec<T>, StoreError> {
    client.select(query).await?.into_iter().map(decode).collect()
}

/// `None` quando o store não acha a linha.
pub async fn fetch_one<T: DeserializeOwned>(client: &dyn DataClient, query: &Query) -> Result<Option<T>, StoreError> {
    let query = query.clone().single();
    client.select(&query).await?.into_iter().next().map(decode).transpose()
}

pub async fn insert_one<T: Serialize + Sync>(
    client: &dyn DataClient,
    table: &'static str,
    value: &T,
) -> Result<Row, StoreError> {
    let row = encode(value)?;
    client
        .insert(table, vec![row])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::Unavailable(format!("insert em '{table}' não devolveu linha")))
}
