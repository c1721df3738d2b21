// src/views/detail.rs
//
// Páginas de detalhe: o registro principal e as coleções ligadas a ele,
// buscados em paralelo. Qualquer falha volta para a listagem.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    common::{error::StoreError, format, notify::Notifier},
    db::{
        client::{fetch_all, fetch_one},
        DataClient, Embed, Query,
    },
    models::crm::{Activity, Contact, Customer, Deal, DealRow, RelatedEntity},
    routes::Route,
    views::{page::{Field, Table}, until_cancelled},
};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome<T> {
    Ready(T),
    Redirect(Route),
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetailView {
    pub title: &'static str,
    pub fields: Vec<Field>,
    pub deals: Table,
    pub contacts: Table,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineEntry {
    pub title: String,
    pub description: Option<String>,
    pub created: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DealDetailView {
    pub title: &'static str,
    pub fields: Vec<Field>,
    pub timeline: Vec<TimelineEntry>,
}

// =========================================================================
//  Cliente
// =========================================================================

pub async fn load_customer(
    client: &dyn DataClient,
    notifier: &Notifier,
    cancel: &CancellationToken,
    id: Uuid,
) -> DetailOutcome<CustomerDetailView> {
    let customer_query = Query::from("customers").eq("id", id);
    let deals_query = Query::from("deals").eq("customer_id", id);
    let contacts_query = Query::from("contacts").eq("customer_id", id);

    let fetch = async {
        tokio::try_join!(
            fetch_one::<Customer>(client, &customer_query),
            fetch_all::<Deal>(client, &deals_query),
            fetch_all::<Contact>(client, &contacts_query),
        )
    };

    match until_cancelled(cancel, fetch).await {
        None => DetailOutcome::Cancelled,
        Some(Ok((Some(customer), deals, contacts))) => {
            DetailOutcome::Ready(customer_view(&customer, &deals, &contacts))
        }
        Some(result) => {
            log_failure("customer", id, result.err());
            notifier.error("Failed to fetch customer data");
            DetailOutcome::Redirect(Route::Customers)
        }
    }
}

fn customer_view(customer: &Customer, deals: &[Deal], contacts: &[Contact]) -> CustomerDetailView {
    let fields = vec![
        Field::new("Name", customer.name.clone()),
        Field::new("Company", format::text(customer.company.as_deref())),
        Field::new("Email", format::text(customer.email.as_deref())),
        Field::new("Phone", format::text(customer.phone.as_deref())),
        Field::new("Status", customer.status.clone()),
        Field::new("Created", format::day(Some(customer.created_at))),
    ];

    let mut deal_table = Table::new(&["Name", "Amount", "Stage", "Expected Close"]);
    for deal in deals {
        deal_table.push(
            deal.id,
            Some(Route::DealDetail(deal.id)),
            vec![
                deal.name.clone(),
                format::money(deal.amount),
                deal.stage.label(),
                format::date(deal.expected_close_date),
            ],
        );
    }

    let mut contact_table = Table::new(&["Name", "Email", "Phone", "Position"]);
    for contact in contacts {
        contact_table.push(
            contact.id,
            None,
            vec![
                contact.full_name(),
                format::text(contact.email.as_deref()),
                format::text(contact.phone.as_deref()),
                format::text(contact.position.as_deref()),
            ],
        );
    }

    CustomerDetailView {
        title: "Customer Details",
        fields,
        deals: deal_table,
        contacts: contact_table,
    }
}

// =========================================================================
//  Negócio
// =========================================================================

pub async fn load_deal(
    client: &dyn DataClient,
    notifier: &Notifier,
    cancel: &CancellationToken,
    id: Uuid,
) -> DetailOutcome<DealDetailView> {
    let deal_query = Query::from("deals").eq("id", id).embed(Embed {
        table: "customers",
        local_key: "customer_id",
        columns: &["name"],
    });
    let activities_query = Query::from("activities")
        .eq("entity_type", RelatedEntity::DEAL)
        .eq("entity_id", id)
        .order_desc("created_at");

    let fetch = async {
        tokio::try_join!(
            fetch_one::<DealRow>(client, &deal_query),
            fetch_all::<Activity>(client, &activities_query),
        )
    };

    match until_cancelled(cancel, fetch).await {
        None => DetailOutcome::Cancelled,
        Some(Ok((Some(row), activities))) => DetailOutcome::Ready(deal_view(&row, &activities)),
        Some(result) => {
            log_failure("deal", id, result.err());
            notifier.error("Failed to fetch deal data");
            DetailOutcome::Redirect(Route::Deals)
        }
    }
}

fn deal_view(row: &DealRow, activities: &[Activity]) -> DealDetailView {
    let deal = &row.deal;
    let fields = vec![
        Field::new("Name", deal.name.clone()),
        Field::new("Customer", format::text(row.customer_name())),
        Field::new("Amount", format::money(deal.amount)),
        Field::new("Stage", deal.stage.label()),
        Field::new("Expected Close", format::date(deal.expected_close_date)),
        Field::new("Probability", format::percent(deal.probability)),
        Field::new("Created", format::day(Some(deal.created_at))),
    ];

    let timeline = activities
        .iter()
        .map(|activity| TimelineEntry {
            title: activity.title.clone(),
            description: activity.description.clone(),
            created: format::timestamp(activity.created_at),
        })
        .collect();

    DealDetailView { title: "Deal Details", fields, timeline }
}

fn log_failure(entity: &str, id: Uuid, error: Option<StoreError>) {
    match error {
        Some(e) => tracing::error!("Erro ao buscar {} {}: {}", entity, id, e),
        None => tracing::warn!("{} {} não encontrado", entity, id),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::db::{memory_store::Op, MemoryDataClient};

    struct Fixture {
        client: Arc<MemoryDataClient>,
        notifier: Notifier,
        cancel: CancellationToken,
        customer_id: Uuid,
        deal_id: Uuid,
    }

    fn fixture() -> Fixture {
        let client = Arc::new(MemoryDataClient::new());
        let customer_id = Uuid::new_v4();
        let deal_id = Uuid::new_v4();

        client.seed("customers", [json!({
            "id": customer_id, "name": "Acme Corp", "email": "ops@acme.test", "status": "active",
            "created_at": "2024-03-01T09:00:00Z", "updated_at": "2024-03-01T09:00:00Z"
        })]);
        client.seed("deals", [json!({
            "id": deal_id, "customer_id": customer_id, "name": "Website redesign",
            "amount": 5000, "stage": "closed_won", "probability": 80,
            "expected_close_date": "2024-04-15",
            "created_at": "2024-03-02T09:00:00Z", "updated_at": "2024-03-02T09:00:00Z"
        })]);
        client.seed("contacts", [json!({
            "id": Uuid::new_v4(), "customer_id": customer_id,
            "first_name": "Wile", "last_name": "Coyote", "position": "CTO",
            "created_at": "2024-03-01T09:00:00Z", "updated_at": "2024-03-01T09:00:00Z"
        })]);
        client.seed("activities", [
            json!({
                "id": Uuid::new_v4(), "type": "call", "entity_type": "deal", "entity_id": deal_id,
                "title": "Kickoff", "created_at": "2024-03-03T09:00:00Z", "updated_at": "2024-03-03T09:00:00Z"
            }),
            json!({
                "id": Uuid::new_v4(), "type": "email", "entity_type": "deal", "entity_id": deal_id,
                "title": "Proposal sent", "created_at": "2024-03-04T14:30:00Z", "updated_at": "2024-03-04T14:30:00Z"
            }),
            json!({
                "id": Uuid::new_v4(), "type": "note", "entity_type": "customer", "entity_id": customer_id,
                "title": "Not on the deal", "created_at": "2024-03-05T09:00:00Z", "updated_at": "2024-03-05T09:00:00Z"
            }),
        ]);

        Fixture { client, notifier: Notifier::new(), cancel: CancellationToken::new(), customer_id, deal_id }
    }

    #[tokio::test]
    async fn customer_detail_collects_deals_and_contacts() {
        let f = fixture();
        let outcome = load_customer(f.client.as_ref(), &f.notifier, &f.cancel, f.customer_id).await;

        let DetailOutcome::Ready(view) = outcome else {
            panic!("esperava a view pronta, veio {outcome:?}");
        };
        assert_eq!(view.deals.cell(0, "Stage"), Some("CLOSED WON"));
        assert_eq!(view.deals.cell(0, "Expected Close"), Some("Apr 15, 2024"));
        assert_eq!(view.contacts.cell(0, "Name"), Some("Wile Coyote"));
        assert_eq!(view.contacts.cell(0, "Email"), Some("-"));
        assert!(f.notifier.pending().is_empty());
    }

    #[tokio::test]
    async fn deal_detail_shows_timeline_newest_first() {
        let f = fixture();
        let outcome = load_deal(f.client.as_ref(), &f.notifier, &f.cancel, f.deal_id).await;

        let DetailOutcome::Ready(view) = outcome else {
            panic!("esperava a view pronta, veio {outcome:?}");
        };
        let titles: Vec<_> = view.timeline.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Proposal sent", "Kickoff"]);
        assert_eq!(view.timeline[0].created, "Mar 4, 2024 2:30 PM");
        assert!(view.fields.contains(&Field::new("Customer", "Acme Corp")));
        assert!(view.fields.contains(&Field::new("Probability", "80%")));
    }

    #[tokio::test]
    async fn missing_deal_redirects_to_the_list() {
        let f = fixture();
        let outcome = load_deal(f.client.as_ref(), &f.notifier, &f.cancel, Uuid::new_v4()).await;

        assert!(matches!(outcome, DetailOutcome::Redirect(Route::Deals)));
        assert_eq!(f.notifier.pending().len(), 1);
        assert_eq!(f.notifier.pending()[0].message, "Failed to fetch deal data");
    }

    #[tokio::test]
    async fn any_related_failure_fails_the_whole_detail() {
        let f = fixture();
        f.client.fail_next("contacts", Op::Select);

        let outcome = load_customer(f.client.as_ref(), &f.notifier, &f.cancel, f.customer_id).await;

        assert!(matches!(outcome, DetailOutcome::Redirect(Route::Customers)));
        assert_eq!(f.notifier.pending().len(), 1);
    }

    #[tokio::test]
    async fn cancelled_detail_leaves_no_trace() {
        let f = fixture();
        f.cancel.cancel();

        let outcome = load_customer(f.client.as_ref(), &f.notifier, &f.cancel, f.customer_id).await;

        assert!(matches!(outcome, DetailOutcome::Cancelled));
        assert!(f.notifier.pending().is_empty());
    }
}
