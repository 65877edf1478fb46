use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::{
    common::DateWindow,
    errors::ServiceError,
    services::transactions::{list_in_window, TransactionView},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReportSummary {
    pub transaction_count: usize,
    pub total_items_sold: i64,
    pub distinct_menus_sold: usize,
    #[schema(value_type = String)]
    pub total_revenue: Decimal,
    #[schema(value_type = String)]
    pub average_transaction_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IngredientUsage {
    pub ingredient_id: i64,
    pub name: String,
    pub unit: Option<String>,
    #[schema(value_type = String)]
    pub total_used: Decimal,
    pub times_used: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MenuSales {
    pub menu_id: i64,
    pub name: String,
    pub quantity_sold: i64,
    #[schema(value_type = String)]
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionReport {
    pub period: DateWindow,
    pub summary: ReportSummary,
    pub ingredient_usage: Vec<IngredientUsage>,
    pub menu_sales: Vec<MenuSales>,
    pub transactions: Vec<TransactionView>,
}

/// Read-only aggregation over posted sales and their stock ledger.
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DatabaseConnection>,
    default_days: i64,
}

impl ReportService {
    pub fn new(db: Arc<DatabaseConnection>, default_days: i64) -> Self {
        Self { db, default_days }
    }

    /// Report over `window`, or the trailing `default_days` when none is given.
    #[instrument(skip(self))]
    pub async fn transactions_report(
        &self,
        window: Option<DateWindow>,
    ) -> Result<TransactionReport, ServiceError> {
        let period =
            window.unwrap_or_else(|| DateWindow::trailing_days(Utc::now(), self.default_days));
        let transactions = list_in_window(&*self.db, period).await?;
        if transactions.is_empty() {
            return Err(ServiceError::NotFound(
                "No transactions found in the selected period".to_string(),
            ));
        }

        let report = TransactionReport {
            period,
            summary: summarize(&transactions),
            ingredient_usage: ingredient_usage(&transactions),
            menu_sales: menu_sales(&transactions),
            transactions,
        };

        info!(
            transactions = report.summary.transaction_count,
            revenue = %report.summary.total_revenue,
            "Transaction report generated"
        );
        Ok(report)
    }
}

pub fn summarize(transactions: &[TransactionView]) -> ReportSummary {
    let total_revenue: Decimal = transactions.iter().map(|t| t.total_amount).sum();
    let total_items_sold: i64 = transactions
        .iter()
        .flat_map(|t| &t.items)
        .map(|i| i64::from(i.quantity))
        .sum();
    let distinct_menus_sold = transactions
        .iter()
        .flat_map(|t| &t.items)
        .map(|i| i.menu_id)
        .collect::<HashSet<_>>()
        .len();

    let average_transaction_value = if transactions.is_empty() {
        Decimal::ZERO
    } else {
        (total_revenue / Decimal::from(transactions.len())).round_dp(2)
    };

    ReportSummary {
        transaction_count: transactions.len(),
        total_items_sold,
        distinct_menus_sold,
        total_revenue,
        average_transaction_value,
    }
}

/// Totals per ingredient, largest consumption first.
pub fn ingredient_usage(transactions: &[TransactionView]) -> Vec<IngredientUsage> {
    let mut usage: BTreeMap<i64, IngredientUsage> = BTreeMap::new();
    for reduction in transactions
        .iter()
        .flat_map(|t| &t.items)
        .flat_map(|i| &i.stock_reductions)
    {
        let entry = usage
            .entry(reduction.ingredient_id)
            .or_insert_with(|| IngredientUsage {
                ingredient_id: reduction.ingredient_id,
                name: reduction
                    .ingredient
                    .as_ref()
                    .map(|i| i.name.clone())
                    .unwrap_or_else(|| format!("#{}", reduction.ingredient_id)),
                unit: reduction.unit.as_ref().map(|u| u.name.clone()),
                total_used: Decimal::ZERO,
                times_used: 0,
            });
        entry.total_used += reduction.quantity_reduced;
        entry.times_used += 1;
    }

    let mut rows: Vec<IngredientUsage> = usage.into_values().collect();
    rows.sort_by(|a, b| b.total_used.cmp(&a.total_used).then_with(|| a.name.cmp(&b.name)));
    rows
}

/// Totals per menu, most portions sold first.
pub fn menu_sales(transactions: &[TransactionView]) -> Vec<MenuSales> {
    let mut sales: BTreeMap<i64, MenuSales> = BTreeMap::new();
    for item in transactions.iter().flat_map(|t| &t.items) {
        let entry = sales.entry(item.menu_id).or_insert_with(|| MenuSales {
            menu_id: item.menu_id,
            name: item
                .menu
                .as_ref()
                .map(|m| m.name.clone())
                .unwrap_or_else(|| format!("#{}", item.menu_id)),
            quantity_sold: 0,
            revenue: Decimal::ZERO,
        });
        entry.quantity_sold += i64::from(item.quantity);
        entry.revenue += item.subtotal;
    }

    let mut rows: Vec<MenuSales> = sales.into_values().collect();
    rows.sort_by(|a, b| {
        b.quantity_sold
            .cmp(&a.quantity_sold)
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::menus::{IngredientRef, UnitRef};
    use crate::services::transactions::{MenuSummary, StockReductionView, TransactionItemView};
    use rust_decimal_macros::dec;

    fn reduction(ingredient_id: i64, name: &str, qty: Decimal) -> StockReductionView {
        StockReductionView {
            id: 0,
            ingredient_id,
            unit_id: 1,
            quantity_reduced: qty,
            stock_before: dec!(100),
            stock_after: dec!(100) - qty,
            ingredient: Some(IngredientRef {
                id: ingredient_id,
                name: name.to_string(),
                slug: name.to_lowercase(),
            }),
            unit: Some(UnitRef {
                id: 1,
                name: "Gram".to_string(),
            }),
        }
    }

    fn item(menu_id: i64, name: &str, qty: i32, price: Decimal, reductions: Vec<StockReductionView>) -> TransactionItemView {
        TransactionItemView {
            id: 0,
            menu_id,
            quantity: qty,
            price,
            subtotal: price * Decimal::from(qty),
            menu: Some(MenuSummary {
                id: menu_id,
                name: name.to_string(),
                slug: name.to_lowercase(),
                image: String::new(),
            }),
            stock_reductions: reductions,
        }
    }

    fn sale(id: i64, items: Vec<TransactionItemView>) -> TransactionView {
        let now = Utc::now();
        TransactionView {
            id,
            transaction_code: format!("TRX-TEST-{}", id),
            transaction_date: now,
            total_amount: items.iter().map(|i| i.subtotal).sum(),
            notes: None,
            status: "completed".to_string(),
            items,
            created_at: now,
            updated_at: now,
        }
    }

    fn fixture() -> Vec<TransactionView> {
        vec![
            sale(
                1,
                vec![
                    item(10, "Nasi Goreng", 2, dec!(25000), vec![reduction(1, "Beras", dec!(400))]),
                    item(11, "Es Teh", 1, dec!(5000), vec![reduction(2, "Gula", dec!(20))]),
                ],
            ),
            sale(
                2,
                vec![item(10, "Nasi Goreng", 1, dec!(25000), vec![reduction(1, "Beras", dec!(200))])],
            ),
        ]
    }

    #[test]
    fn summary_totals() {
        let summary = summarize(&fixture());
        assert_eq!(summary.transaction_count, 2);
        assert_eq!(summary.total_items_sold, 4);
        assert_eq!(summary.distinct_menus_sold, 2);
        assert_eq!(summary.total_revenue, dec!(80000));
        assert_eq!(summary.average_transaction_value, dec!(40000));
    }

    #[test]
    fn ingredient_usage_is_sorted_by_consumption() {
        let usage = ingredient_usage(&fixture());
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0].name, "Beras");
        assert_eq!(usage[0].total_used, dec!(600));
        assert_eq!(usage[0].times_used, 2);
        assert_eq!(usage[0].unit.as_deref(), Some("Gram"));
        assert_eq!(usage[1].total_used, dec!(20));
    }

    #[test]
    fn menu_sales_are_sorted_by_quantity() {
        let sales = menu_sales(&fixture());
        assert_eq!(sales[0].menu_id, 10);
        assert_eq!(sales[0].quantity_sold, 3);
        assert_eq!(sales[0].revenue, dec!(75000));
        assert_eq!(sales[1].name, "Es Teh");
    }

    #[test]
    fn average_is_rounded_to_cents() {
        let sales = vec![
            sale(1, vec![item(1, "A", 1, dec!(10), vec![])]),
            sale(2, vec![item(1, "A", 1, dec!(10), vec![])]),
            sale(3, vec![item(1, "A", 1, dec!(0), vec![])]),
        ];
        assert_eq!(summarize(&sales).average_transaction_value, dec!(6.67));
    }
}
