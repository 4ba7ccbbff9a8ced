use std::collections::HashSet;

use chrono::Utc;
use configuration::{Config, RiskSortOrder};
use core_types::{Event, Order};
use dataset::Dataset;
use rust_decimal::Decimal;

use crate::aggregations::{
    bundle_effect, checked_sum, monthly_refund_trend, percentage, product_performance,
    risk_summary,
};
use crate::error::AnalyticsError;
use crate::report::{DashboardReport, KpiReport};

/// A stateless calculator for deriving business metrics from a dataset.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    reported_profit: Decimal,
    risk_sort_order: RiskSortOrder,
    title: String,
    caption: String,
}

impl AnalyticsEngine {
    pub fn new(reported_profit: Decimal, risk_sort_order: RiskSortOrder) -> Self {
        Self {
            reported_profit,
            risk_sort_order,
            title: String::new(),
            caption: String::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            reported_profit: config.kpi.reported_profit_usd,
            risk_sort_order: config.risk.sort_order,
            title: config.report.title.clone(),
            caption: config.report.caption.clone(),
        }
    }

    pub fn with_risk_sort_order(mut self, risk_sort_order: RiskSortOrder) -> Self {
        self.risk_sort_order = risk_sort_order;
        self
    }

    pub fn risk_sort_order(&self) -> RiskSortOrder {
        self.risk_sort_order
    }

    /// Computes the eight headline KPIs.
    ///
    /// # Arguments
    ///
    /// * `orders` - The deduplicated conversion rows.
    /// * `events` - Every row of the dataset; used for traffic.
    ///
    /// # Returns
    ///
    /// `AnalyticsError::NoOrders` when `orders` is empty, since average order
    /// value and conversion rate are undefined. `AnalyticsError::Overflow` when a
    /// total leaves the `Decimal` range.
    pub fn calculate_kpis(
        &self,
        orders: &[Order],
        events: &[Event],
    ) -> Result<KpiReport, AnalyticsError> {
        let total_orders = orders
            .iter()
            .map(|o| o.order_id)
            .collect::<HashSet<_>>()
            .len();
        if total_orders == 0 {
            return Err(AnalyticsError::NoOrders);
        }

        let revenue = checked_sum(orders.iter().map(|o| o.price_usd), "revenue")?;
        let total_refunds = checked_sum(orders.iter().map(|o| o.refund_amount_usd), "refunds")?;
        let items_sold = orders
            .iter()
            .try_fold(0i64, |total, o| total.checked_add(o.items_purchased))
            .ok_or_else(|| AnalyticsError::Overflow("items_sold".to_string()))?;
        let total_traffic = events
            .iter()
            .map(|e| e.website_session_id)
            .collect::<HashSet<_>>()
            .len();

        let average_order_value = revenue
            .checked_div(Decimal::from(total_orders))
            .ok_or_else(|| AnalyticsError::DivisionByZero("average_order_value".to_string()))?;
        let conversion_rate_pct =
            percentage(Decimal::from(total_orders), Decimal::from(total_traffic))
                .ok_or_else(|| AnalyticsError::DivisionByZero("conversion_rate".to_string()))?;

        Ok(KpiReport {
            revenue,
            reported_profit: self.reported_profit,
            profit_is_derived: false,
            total_refunds,
            average_order_value,
            total_orders,
            total_traffic,
            conversion_rate_pct,
            items_sold,
        })
    }

    /// Runs the KPI calculator and all four breakdowns over one dataset.
    pub fn build_dashboard(&self, dataset: &Dataset) -> Result<DashboardReport, AnalyticsError> {
        let orders = dataset.orders();
        let kpis = self.calculate_kpis(orders, dataset.events())?;

        let report = DashboardReport {
            title: self.title.clone(),
            caption: self.caption.clone(),
            generated_at: Utc::now(),
            event_rows: dataset.events().len(),
            order_rows: orders.len(),
            kpis,
            monthly_refund_trend: monthly_refund_trend(orders)?,
            product_performance: product_performance(orders),
            bundle_effect: bundle_effect(orders),
            risk_sort_order: self.risk_sort_order,
            risk_summary: risk_summary(orders, self.risk_sort_order),
        };

        tracing::info!(
            orders = report.order_rows,
            months = report.monthly_refund_trend.len(),
            products = report.risk_summary.len(),
            "Dashboard computed."
        );

        Ok(report)
    }
}
