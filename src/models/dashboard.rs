// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::crm::DealStage;

// Os cards do topo do dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_customers: usize,
    pub total_deals: usize,
    pub open_deals: usize,
    pub total_revenue: Decimal,
}

// Projeção `amount, stage` de `deals`
#[derive(Debug, Clone, Deserialize)]
pub struct DealFigure {
    pub amount: Option<Decimal>,
    pub stage: DealStage,
}

impl DashboardStats {
    pub fn from_rows(total_customers: usize, deals: &[DealFigure]) -> Self {
        Self {
            total_customers,
            total_deals: deals.len(),
            // Negócios fechados (ganhos ou perdidos) não contam como abertos
            open_deals: deals.iter().filter(|d| d.stage.is_open()).count(),
            total_revenue: deals.iter().filter_map(|d| d.amount).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_amounts_and_counts_open_deals() {
        let deals = vec![
            DealFigure { amount: Some(Decimal::from(5000)), stage: DealStage::Proposal },
            DealFigure { amount: None, stage: DealStage::Lead },
            DealFigure { amount: Some(Decimal::from(1200)), stage: DealStage::ClosedWon },
        ];

        let stats = DashboardStats::from_rows(4, &deals);
        assert_eq!(stats.total_customers, 4);
        assert_eq!(stats.total_deals, 3);
        assert_eq!(stats.open_deals, 2);
        assert_eq!(stats.total_revenue, Decimal::from(6200));
    }
}
