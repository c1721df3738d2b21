// src/views/entities.rs
//
// As três listagens do CRM, cada uma só como configuração do `DataList`.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::format,
    db::{Embed, Query, Row},
    models::crm::{ActivityForm, ActivityRow, Customer, CustomerForm, DealForm, DealRow},
    routes::Route,
    views::list::ListEntity,
};

const NAME_ONLY: &[&str] = &["name"];

pub struct CustomerList;

impl ListEntity for CustomerList {
    const TABLE: &'static str = "customers";
    const LABEL: &'static str = "Customer";
    const SINGULAR: &'static str = "customer";
    const PLURAL: &'static str = "customers";
    const COLUMNS: &'static [&'static str] = &["Name", "Company", "Email", "Phone", "Status"];
    const SEARCH_COLUMN: Option<&'static str> = Some("name");

    type Row = Customer;
    type Form = CustomerForm;

    fn row_id(row: &Customer) -> Uuid {
        row.id
    }

    fn link(row: &Customer) -> Option<Route> {
        Some(Route::CustomerDetail(row.id))
    }

    fn cells(row: &Customer) -> Vec<String> {
        vec![
            row.name.clone(),
            format::text(row.company.as_deref()),
            format::text(row.email.as_deref()),
            format::text(row.phone.as_deref()),
            format::text(Some(&row.status)),
        ]
    }
}

pub struct DealList;

impl ListEntity for DealList {
    const TABLE: &'static str = "deals";
    const LABEL: &'static str = "Deal";
    const SINGULAR: &'static str = "deal";
    const PLURAL: &'static str = "deals";
    const COLUMNS: &'static [&'static str] = &["Name", "Customer", "Amount", "Stage", "Expected Close"];
    const SEARCH_COLUMN: Option<&'static str> = Some("name");
    const OPTION_SOURCES: &'static [&'static str] = &["customers"];

    type Row = DealRow;
    type Form = DealForm;

    fn query() -> Query {
        Query::from(Self::TABLE).embed(Embed {
            table: "customers",
            local_key: "customer_id",
            columns: NAME_ONLY,
        })
    }

    fn row_id(row: &DealRow) -> Uuid {
        row.deal.id
    }

    fn link(row: &DealRow) -> Option<Route> {
        Some(Route::DealDetail(row.deal.id))
    }

    fn cells(row: &DealRow) -> Vec<String> {
        vec![
            row.deal.name.clone(),
            format::text(row.customer_name()),
            format::money(row.deal.amount),
            row.deal.stage.label(),
            format::date(row.deal.expected_close_date),
        ]
    }
}

pub struct ActivityList;

impl ListEntity for ActivityList {
    const TABLE: &'static str = "activities";
    const LABEL: &'static str = "Activity";
    const SINGULAR: &'static str = "activity";
    const PLURAL: &'static str = "activities";
    const COLUMNS: &'static [&'static str] = &["Type", "Title", "Related To", "Due Date", "Status", "Created"];
    const OPTION_SOURCES: &'static [&'static str] = &["customers", "deals"];

    type Row = ActivityRow;
    type Form = ActivityForm;

    // Os dois joins pelo mesmo `entity_id`; só um deles casa de verdade
    fn query() -> Query {
        Query::from(Self::TABLE)
            .embed(Embed { table: "customers", local_key: "entity_id", columns: NAME_ONLY })
            .embed(Embed { table: "deals", local_key: "entity_id", columns: NAME_ONLY })
            .order_desc("created_at")
    }

    fn row_id(row: &ActivityRow) -> Uuid {
        row.activity.id
    }

    fn cells(row: &ActivityRow) -> Vec<String> {
        let activity = &row.activity;
        vec![
            activity.kind.label(),
            activity.title.clone(),
            format::text(row.related_name.as_deref()),
            format::day(activity.due_date),
            completion_label(activity.completed_at).to_string(),
            format::timestamp(activity.created_at),
        ]
    }
}

pub fn completion_label(completed_at: Option<DateTime<Utc>>) -> &'static str {
    if completed_at.is_some() { "Completed" } else { "Pending" }
}

/// O patch de "marcar como concluída".
pub fn completion_patch(at: DateTime<Utc>) -> Row {
    let mut patch = Row::new();
    patch.insert("completed_at".into(), Value::String(at.to_rfc3339()));
    patch
}
