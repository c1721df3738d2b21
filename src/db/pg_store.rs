// src/db/pg_store.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::StoreError,
    db::client::{Columns, DataClient, Filter, Query, Row},
};

// O "store" remoto em cima do Postgres: cada linha sai como um objeto JSONB
#[derive(Clone)]
pub struct PgDataClient {
    pool: PgPool,
}

impl PgDataClient {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Nomes de tabela/coluna entram no SQL como texto, então só aceitamos [a-z0-9_]
fn ident(name: &str) -> Result<&str, StoreError> {
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

// `jsonb_build_object('a', t.a, 'b', t.b)`
fn build_object(alias: &str, columns: &[&str]) -> Result<String, StoreError> {
    let pairs = columns
        .iter()
        .map(|c| ident(c).map(|c| format!("'{c}', {alias}.{c}")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("jsonb_build_object({})", pairs.join(", ")))
}

// Escapa os curingas do LIKE: o termo é literal
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn into_rows(values: Vec<Value>) -> Result<Vec<Row>, StoreError> {
    values
        .into_iter()
        .map(|value| match value {
            Value::Object(row) => Ok(row),
            other => Err(StoreError::Unavailable(format!("linha não é objeto: {other}"))),
        })
        .collect()
}

pub(crate) fn build_select(query: &Query) -> Result<QueryBuilder<'static, Postgres>, StoreError> {
    let table = ident(query.table)?;

    let mut projection = match &query.columns {
        Columns::All => "to_jsonb(t)".to_string(),
        Columns::Only(columns) => build_object("t", columns)?,
    };

    // Cada join vira um sub-select escalar pelo id
    for embed in &query.embeds {
        let target = ident(embed.table)?;
        let local_key = ident(embed.local_key)?;
        let object = build_object("r", embed.columns)?;
        projection.push_str(&format!(
            " || jsonb_build_object('{target}', (SELECT {object} FROM {target} r WHERE r.id = t.{local_key}))"
        ));
    }

    let mut qb = QueryBuilder::new(format!("SELECT {projection} AS data FROM {table} t"));

    for (idx, filter) in query.filters.iter().enumerate() {
        qb.push(if idx == 0 { " WHERE " } else { " AND " });
        match filter {
            Filter::Eq { column, value } => {
                qb.push(format!("t.{}::text = ", ident(column)?));
                qb.push_bind(value.clone());
            }
            Filter::Contains { column, term } => {
                qb.push(format!("t.{} ILIKE ", ident(column)?));
                qb.push_bind(like_pattern(term));
            }
        }
    }

    if let Some(order) = &query.order {
        let direction = if order.descending { "DESC" } else { "ASC" };
        qb.push(format!(" ORDER BY t.{} {direction}", ident(order.column)?));
    }

    if let Some(limit) = query.limit {
        qb.push(" LIMIT ");
        qb.push_bind(limit as i64);
    }

    Ok(qb)
}

#[async_trait]
impl DataClient for PgDataClient {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let mut qb = build_select(query)?;
        let values = qb
            .build_query_scalar::<Value>()
            .fetch_all(&self.pool)
            .await?;
        into_rows(values)
    }

    async fn insert(&self, table: &'static str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        let table = ident(table)?;

        // Tudo numa transação: ou entram todas as linhas, ou nenhuma
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(rows.len());

        for row in rows {
            let columns = row
                .keys()
                .map(|k| ident(k).map(str::to_string))
                .collect::<Result<Vec<_>, _>>()?
                .join(", ");

            // Colunas omitidas ficam com o DEFAULT da tabela
            let sql = format!(
                "INSERT INTO {table} ({columns}) \
                 SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1) \
                 RETURNING to_jsonb({table}.*)"
            );

            let value = sqlx::query_scalar::<_, Value>(&sql)
                .bind(Value::Object(row))
                .fetch_one(&mut *tx)
                .await?;
            inserted.push(value);
        }

        tx.commit().await?;
        into_rows(inserted)
    }

    async fn update(&self, table: &'static str, id: Uuid, patch: Row) -> Result<Vec<Row>, StoreError> {
        let table = ident(table)?;
        let columns = patch
            .keys()
            .map(|k| ident(k).map(str::to_string))
            .collect::<Result<Vec<_>, _>>()?
            .join(", ");

        let sql = format!(
            "UPDATE {table} t SET ({columns}) = \
             (SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1)) \
             WHERE t.id = $2 \
             RETURNING to_jsonb(t)"
        );

        let values = sqlx::query_scalar::<_, Value>(&sql)
            .bind(Value::Object(patch))
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        into_rows(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::client::Embed;

    #[test]
    fn rejects_identifiers_outside_the_whitelist() {
        assert!(ident("deals").is_ok());
        assert!(ident("expected_close_date").is_ok());
        assert!(ident("deals; DROP TABLE users").is_err());
        assert!(ident("").is_err());
        assert!(ident("1abc").is_err());
    }

    #[test]
    fn select_embeds_joins_as_scalar_subqueries() {
        let query = Query::from("deals")
            .embed(Embed { table: "customers", local_key: "customer_id", columns: &["name"] })
            .contains("name", "web")
            .order_desc("created_at");

        let qb = build_select(&query).unwrap();
        assert_eq!(
            qb.sql(),
            "SELECT to_jsonb(t) || jsonb_build_object('customers', \
             (SELECT jsonb_build_object('name', r.name) FROM customers r WHERE r.id = t.customer_id)) \
             AS data FROM deals t WHERE t.name ILIKE $1 ORDER BY t.created_at DESC"
        );
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
