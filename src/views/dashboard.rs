// src/views/dashboard.rs

use serde::{de::IgnoredAny, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
    common::{format, notify::Notifier},
    db::{client::fetch_all, DataClient, Query},
    models::dashboard::{DashboardStats, DealFigure},
    views::{page::Field, until_cancelled},
};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub title: &'static str,
    pub stats: DashboardStats,
    pub cards: Vec<Field>,
}

/// Em falha os cards ficam zerados e sai uma notificação. `None` se cancelado.
pub async fn load_dashboard(
    client: &dyn DataClient,
    notifier: &Notifier,
    cancel: &CancellationToken,
) -> Option<DashboardView> {
    let customers_query = Query::from("customers").columns(&["id"]);
    let deals_query = Query::from("deals").columns(&["amount", "stage"]);

    let fetch = async {
        tokio::try_join!(
            // Só a contagem interessa
            fetch_all::<IgnoredAny>(client, &customers_query),
            fetch_all::<DealFigure>(client, &deals_query),
        )
    };

    let stats = match until_cancelled(cancel, fetch).await? {
        Ok((customers, deals)) => DashboardStats::from_rows(customers.len(), &deals),
        Err(e) => {
            tracing::error!("Erro ao buscar estatísticas do dashboard: {}", e);
            notifier.error("Failed to fetch dashboard stats");
            DashboardStats::default()
        }
    };

    let cards = vec![
        Field::new("Total Customers", stats.total_customers.to_string()),
        Field::new("Total Deals", stats.total_deals.to_string()),
        Field::new("Total Revenue", format::money(Some(stats.total_revenue))),
        Field::new("Open Deals", stats.open_deals.to_string()),
    ];

    Some(DashboardView { title: "Dashboard", stats, cards })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{memory_store::Op, MemoryDataClient};
    use serde_json::json;
    use uuid::Uuid;

    #[tokio::test]
    async fn cards_summarise_customers_and_deals() {
        let client = MemoryDataClient::new();
        let customer_id = Uuid::new_v4();
        client.seed("customers", [json!({ "id": customer_id, "name": "Acme Corp" })]);
        client.seed("deals", [
            json!({ "id": Uuid::new_v4(), "customer_id": customer_id, "name": "A", "amount": 5000, "stage": "proposal" }),
            json!({ "id": Uuid::new_v4(), "customer_id": customer_id, "name": "B", "amount": 1250.5, "stage": "closed_won" }),
        ]);
        let notifier = Notifier::new();

        let view = load_dashboard(&client, &notifier, &CancellationToken::new()).await.unwrap();

        assert_eq!(view.stats.total_customers, 1);
        assert_eq!(view.stats.open_deals, 1);
        assert!(view.cards.contains(&Field::new("Total Revenue", "$6,250.5")));
        assert!(notifier.pending().is_empty());
    }

    #[tokio::test]
    async fn store_failure_zeroes_the_cards_and_notifies() {
        let client = MemoryDataClient::new();
        client.fail_next("deals", Op::Select);
        let notifier = Notifier::new();

        let view = load_dashboard(&client, &notifier, &CancellationToken::new()).await.unwrap();

        assert_eq!(view.stats, DashboardStats::default());
        assert_eq!(notifier.pending().len(), 1);
    }
}
