use chrono::{DateTime, NaiveDate, Utc};
use configuration::RiskSortOrder;
use core_types::{PurchaseType, RiskTier};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The eight headline metrics of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiReport {
    // I. Financials
    pub revenue: Decimal,
    /// Configured figure, copied through unchanged. Not computed from orders.
    pub reported_profit: Decimal,
    /// Always `false`; lets consumers tell the profit figure apart from computed values.
    pub profit_is_derived: bool,
    pub total_refunds: Decimal,
    pub average_order_value: Decimal,

    // II. Volume
    pub total_orders: usize,
    pub total_traffic: usize,
    pub conversion_rate_pct: Decimal,
    pub items_sold: i64,
}

/// Refund rate for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRefundRate {
    /// Last day of the month; the bucket key.
    pub month_end: NaiveDate,
    /// Short label such as `Mar 12`.
    pub label: String,
    pub revenue: Decimal,
    pub refunds: Decimal,
    /// `None` when the month has no revenue.
    pub refund_rate_pct: Option<Decimal>,
}

/// Order and refund counts for one product name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPerformance {
    pub product_name: String,
    pub total_orders: usize,
    pub refunded_orders: usize,
}

/// Refund rate of single-item orders versus bundles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleRisk {
    pub purchase_type: PurchaseType,
    pub orders: usize,
    pub refunded_orders: usize,
    pub refund_rate_pct: Decimal,
}

/// One product line of the refund risk summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummaryRow {
    pub product_id: i64,
    pub product_name: String,
    pub orders: usize,
    pub refunds: usize,
    pub refund_rate_pct: Decimal,
    pub status: RiskTier,
}

/// Everything the dashboard shows, in one serializable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub title: String,
    pub caption: String,
    pub generated_at: DateTime<Utc>,
    pub event_rows: usize,
    pub order_rows: usize,
    pub kpis: KpiReport,
    pub monthly_refund_trend: Vec<MonthlyRefundRate>,
    pub product_performance: Vec<ProductPerformance>,
    pub bundle_effect: Vec<BundleRisk>,
    pub risk_sort_order: RiskSortOrder,
    pub risk_summary: Vec<RiskSummaryRow>,
}
