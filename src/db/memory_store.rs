// src/db/memory_store.rs
//
// Store em memória: backend "memory" da aplicação e dublê dos testes.

use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::StoreError,
    db::client::{Columns, DataClient, Filter, Query, Row},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Select,
    Insert,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Once,
    Always,
}

#[derive(Default)]
pub struct MemoryDataClient {
    tables: Mutex<HashMap<String, Vec<Row>>>,
    failures: Mutex<HashMap<(String, Op), Failure>>,
    calls: Mutex<HashMap<(String, Op), usize>>,
    latency: Mutex<Option<Duration>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn now() -> Value {
    Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true))
}

// Comparação "como texto": uuids, strings e números
fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => as_text(x).cmp(&as_text(y)),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn matches(row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Eq { column, value } => row.get(*column).and_then(as_text).as_deref() == Some(value.as_str()),
        Filter::Contains { column, term } => row
            .get(*column)
            .and_then(Value::as_str)
            .map(|v| v.to_lowercase().contains(&term.to_lowercase()))
            .unwrap_or(false),
    }
}

impl MemoryDataClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carrega linhas prontas (sem tocar em id/timestamps).
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Value>) {
        let mut tables = lock(&self.tables);
        let entries = tables.entry(table.to_string()).or_default();
        for value in rows {
            if let Value::Object(row) = value {
                entries.push(row);
            }
        }
    }

    pub fn rows(&self, table: &str) -> Vec<Row> {
        lock(&self.tables).get(table).cloned().unwrap_or_default()
    }

    /// A próxima chamada `op` em `table` falha.
    pub fn fail_next(&self, table: &str, op: Op) {
        lock(&self.failures).insert((table.to_string(), op), Failure::Once);
    }

    pub fn fail_always(&self, table: &str, op: Op) {
        lock(&self.failures).insert((table.to_string(), op), Failure::Always);
    }

    pub fn recover(&self) {
        lock(&self.failures).clear();
    }

    /// Quantas chamadas `op` chegaram em `table` (inclusive as que falharam).
    pub fn calls(&self, table: &str, op: Op) -> usize {
        lock(&self.calls).get(&(table.to_string(), op)).copied().unwrap_or(0)
    }

    pub fn set_latency(&self, latency: Duration) {
        *lock(&self.latency) = Some(latency);
    }

    async fn enter(&self, table: &str, op: Op) -> Result<(), StoreError> {
        *lock(&self.calls).entry((table.to_string(), op)).or_default() += 1;

        let latency = *lock(&self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut failures = lock(&self.failures);
        let key = (table.to_string(), op);
        match failures.get(&key).copied() {
            Some(Failure::Once) => {
                failures.remove(&key);
                Err(StoreError::Unavailable(format!("falha simulada em {table}")))
            }
            Some(Failure::Always) => Err(StoreError::Unavailable(format!("falha simulada em {table}"))),
            None => Ok(()),
        }
    }

    fn embed_rows(tables: &HashMap<String, Vec<Row>>, query: &Query, row: &mut Row) {
        for embed in &query.embeds {
            let key = row.get(embed.local_key).and_then(as_text);
            let found = key.and_then(|key| {
                tables
                    .get(embed.table)
                    .and_then(|rows| rows.iter().find(|r| r.get("id").and_then(as_text).as_deref() == Some(key.as_str())))
            });

            let value = match found {
                Some(target) => {
                    let object: Row = embed
                        .columns
                        .iter()
                        .map(|c| (c.to_string(), target.get(*c).cloned().unwrap_or(Value::Null)))
                        .collect();
                    Value::Object(object)
                }
                None => Value::Null,
            };
            row.insert(embed.table.to_string(), value);
        }
    }
}

#[async_trait]
impl DataClient for MemoryDataClient {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        self.enter(query.table, Op::Select).await?;

        let tables = lock(&self.tables);
        let mut rows: Vec<Row> = tables
            .get(query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = query.order {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(order.column), b.get(order.column));
                if order.descending { ord.reverse() } else { ord }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        for row in rows.iter_mut() {
            Self::embed_rows(&tables, query, row);
        }

        if let Columns::Only(columns) = &query.columns {
            for row in rows.iter_mut() {
                row.retain(|k, _| {
                    columns.iter().any(|c| *c == k.as_str()) || query.embeds.iter().any(|e| e.table == k.as_str())
                });
            }
        }

        Ok(rows)
    }

    async fn insert(&self, table: &'static str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        self.enter(table, Op::Insert).await?;

        let mut tables = lock(&self.tables);
        let entries = tables.entry(table.to_string()).or_default();
        let mut inserted = Vec::with_capacity(rows.len());

        for mut row in rows {
            // O que o DEFAULT do banco faria
            row.entry("id").or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
            row.entry("created_at").or_insert_with(now);
            row.entry("updated_at").or_insert_with(now);
            entries.push(row.clone());
            inserted.push(row);
        }

        Ok(inserted)
    }

    async fn update(&self, table: &'static str, id: Uuid, patch: Row) -> Result<Vec<Row>, StoreError> {
        self.enter(table, Op::Update).await?;

        let mut tables = lock(&self.tables);
        let id = id.to_string();
        let updated = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| r.get("id").and_then(as_text).as_deref() == Some(id.as_str())))
            .map(|row| {
                for (k, v) in patch {
                    row.insert(k, v);
                }
                row.insert("updated_at".to_string(), now());
                row.clone()
            });

        Ok(updated.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::client::Embed;
    use serde_json::json;

    fn store() -> MemoryDataClient {
        let store = MemoryDataClient::new();
        let acme = Uuid::new_v4();
        store.seed("customers", [
            json!({ "id": acme, "name": "Acme Corp", "created_at": "2024-01-01T00:00:00Z" }),
            json!({ "id": Uuid::new_v4(), "name": "Globex", "created_at": "2024-02-01T00:00:00Z" }),
        ]);
        store.seed("deals", [json!({ "id": Uuid::new_v4(), "customer_id": acme, "name": "Renewal" })]);
        store
    }

    #[tokio::test]
    async fn contains_filter_ignores_case() {
        let store = store();
        let rows = store
            .select(&Query::from("customers").contains("name", "ACME"))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("Acme Corp"));
    }

    #[tokio::test]
    async fn orders_descending_and_projects_columns() {
        let store = store();
        let rows = store
            .select(&Query::from("customers").columns(&["name"]).order_desc("created_at"))
            .await
            .unwrap();
        assert_eq!(rows[0]["name"], json!("Globex"));
        assert!(rows[0].get("id").is_none());
    }

    #[tokio::test]
    async fn embeds_related_row_by_key() {
        let store = store();
        let query = Query::from("deals")
            .embed(Embed { table: "customers", local_key: "customer_id", columns: &["name"] });
        let rows = store.select(&query).await.unwrap();
        assert_eq!(rows[0]["customers"], json!({ "name": "Acme Corp" }));
    }

    #[tokio::test]
    async fn fail_next_only_fails_once() {
        let store = store();
        store.fail_next("customers", Op::Select);

        assert!(store.select(&Query::from("customers")).await.is_err());
        assert!(store.select(&Query::from("customers")).await.is_ok());
        assert_eq!(store.calls("customers", Op::Select), 2);
    }

    #[tokio::test]
    async fn insert_fills_store_defaults() {
        let store = MemoryDataClient::new();
        let mut row = Row::new();
        row.insert("name".into(), json!("Initech"));

        let inserted = store.insert("customers", vec![row]).await.unwrap();
        assert!(inserted[0].contains_key("id"));
        assert!(inserted[0].contains_key("created_at"));
        assert_eq!(store.rows("customers").len(), 1);
    }
}
