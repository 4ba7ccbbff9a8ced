//! Terminal rendering of reports.
//!
//! Money is shown as `$1,234.56`, counts as `12,345` and rates as `3.33%`.
//! Values stay exact in the report itself; rounding happens only here.

use analytics::DashboardReport;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};
use core_types::RiskTier;
use dataset::DatasetSummary;
use rust_decimal::{Decimal, RoundingStrategy};

/// Inserts thousands separators into a string of ASCII digits.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

pub fn format_count<T: ToString>(value: T) -> String {
    let text = value.to_string();
    match text.strip_prefix('-') {
        Some(digits) => format!("-{}", group_thousands(digits)),
        None => group_thousands(&text),
    }
}

pub fn format_rate(value: Option<Decimal>) -> String {
    match value {
        Some(rate) => format!(
            "{:.2}%",
            rate.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        ),
        None => "n/a".to_string(),
    }
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn status_cell(status: RiskTier) -> Cell {
    let color = match status {
        RiskTier::High => Color::Red,
        RiskTier::Medium => Color::Yellow,
        RiskTier::Low => Color::Green,
    };
    Cell::new(status.label()).fg(color)
}

/// Renders every section of the dashboard, top to bottom.
pub fn render_dashboard(report: &DashboardReport) -> String {
    let kpis = &report.kpis;
    let mut out = String::new();

    if !report.title.is_empty() {
        out.push_str(&format!("{}\n", report.title));
    }
    if !report.caption.is_empty() {
        out.push_str(&format!("{}\n", report.caption));
    }

    let mut metrics = table(vec!["Revenue", "Profit (reported)", "Refunds", "Avg Order Value"]);
    metrics.add_row(vec![
        right(format_currency(kpis.revenue)),
        right(format_currency(kpis.reported_profit)),
        right(format_currency(kpis.total_refunds)),
        right(format_currency(kpis.average_order_value)),
    ]);
    let mut volume = table(vec!["Website Traffic", "Total Orders", "Conversion Rate", "Items Sold"]);
    volume.add_row(vec![
        right(format_count(kpis.total_traffic)),
        right(format_count(kpis.total_orders)),
        right(format_rate(Some(kpis.conversion_rate_pct))),
        right(format_count(kpis.items_sold)),
    ]);
    out.push_str(&format!("\nExecutive Performance Metrics\n{}\n{}\n", metrics, volume));
    out.push_str("Profit is a reported figure from configuration, not computed from orders.\n");

    let mut trend = table(vec!["Month", "Revenue", "Refunds", "Refund Rate"]);
    for month in &report.monthly_refund_trend {
        trend.add_row(vec![
            Cell::new(&month.label),
            right(format_currency(month.revenue)),
            right(format_currency(month.refunds)),
            right(format_rate(month.refund_rate_pct)),
        ]);
    }
    out.push_str(&format!("\nMonthly Refund Rate Trend\n{}\n", trend));

    let mut products = table(vec!["Product", "Total Orders", "Refunded Orders"]);
    for product in &report.product_performance {
        products.add_row(vec![
            Cell::new(&product.product_name),
            right(format_count(product.total_orders)),
            right(format_count(product.refunded_orders)),
        ]);
    }
    out.push_str(&format!("\nOrders vs Refunds by Product\n{}\n", products));

    let mut bundles = table(vec!["Purchase Type", "Orders", "Refund Rate"]);
    for row in &report.bundle_effect {
        bundles.add_row(vec![
            Cell::new(row.purchase_type.label()),
            right(format_count(row.orders)),
            right(format_rate(Some(row.refund_rate_pct))),
        ]);
    }
    out.push_str(&format!("\nBundle Effect: Refund Risk Analysis\n{}\n", bundles));

    let mut risk = table(vec!["ID", "Product Name", "Sales Volume", "Refund %", "Status"]);
    for row in &report.risk_summary {
        risk.add_row(vec![
            right(row.product_id.to_string()),
            Cell::new(&row.product_name),
            right(format_count(row.orders)),
            right(format_rate(Some(row.refund_rate_pct))),
            status_cell(row.status),
        ]);
    }
    out.push_str(&format!("\nRefund Risk Summary: Executive View\n{}\n", risk));

    out
}

pub fn render_summary(summary: &DatasetSummary) -> String {
    let timestamp = |value: Option<chrono::NaiveDateTime>| {
        value
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "n/a".to_string())
    };

    let mut shape = table(vec!["Measure", "Value"]);
    shape.add_row(vec![Cell::new("Event rows"), right(format_count(summary.event_rows))]);
    shape.add_row(vec![
        Cell::new("Distinct sessions"),
        right(format_count(summary.distinct_sessions)),
    ]);
    shape.add_row(vec![
        Cell::new("Conversion rows"),
        right(format_count(summary.conversion_rows)),
    ]);
    shape.add_row(vec![Cell::new("Orders"), right(format_count(summary.order_rows))]);
    shape.add_row(vec![Cell::new("First event"), right(timestamp(summary.first_event_at))]);
    shape.add_row(vec![Cell::new("Last event"), right(timestamp(summary.last_event_at))]);
    format!("{}\n", shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::{BundleRisk, KpiReport, MonthlyRefundRate, RiskSummaryRow};
    use chrono::{NaiveDate, Utc};
    use configuration::RiskSortOrder;
    use core_types::PurchaseType;
    use rust_decimal_macros::dec;

    #[test]
    fn currency_formatting() {
        assert_eq!(format_currency(dec!(1222335.29)), "$1,222,335.29");
        assert_eq!(format_currency(dec!(49.99)), "$49.99");
        assert_eq!(format_currency(dec!(0)), "$0.00");
        assert_eq!(format_currency(dec!(1000)), "$1,000.00");
        assert_eq!(format_currency(dec!(74.995)), "$75.00");
        assert_eq!(format_currency(dec!(-1234.5)), "-$1,234.50");
    }

    #[test]
    fn count_formatting() {
        assert_eq!(format_count(7), "7");
        assert_eq!(format_count(472_871usize), "472,871");
        assert_eq!(format_count(1_000_000i64), "1,000,000");
        assert_eq!(format_count(-4500i64), "-4,500");
    }

    #[test]
    fn rate_formatting() {
        assert_eq!(format_rate(Some(dec!(3.3333333))), "3.33%");
        assert_eq!(format_rate(Some(dec!(50))), "50.00%");
        assert_eq!(format_rate(None), "n/a");
    }

    #[test]
    fn dashboard_contains_every_section() {
        let report = DashboardReport {
            title: "BearCart Business Analytics Dashboard".to_string(),
            caption: String::new(),
            generated_at: Utc::now(),
            event_rows: 10,
            order_rows: 2,
            kpis: KpiReport {
                revenue: dec!(149.99),
                reported_profit: dec!(1222335.29),
                profit_is_derived: false,
                total_refunds: dec!(100),
                average_order_value: dec!(74.995),
                total_orders: 2,
                total_traffic: 10,
                conversion_rate_pct: dec!(20),
                items_sold: 3,
            },
            monthly_refund_trend: vec![MonthlyRefundRate {
                month_end: NaiveDate::from_ymd_opt(2012, 3, 31).unwrap(),
                label: "Mar 12".to_string(),
                revenue: dec!(0),
                refunds: dec!(0),
                refund_rate_pct: None,
            }],
            product_performance: vec![],
            bundle_effect: vec![BundleRisk {
                purchase_type: PurchaseType::Bundle,
                orders: 1,
                refunded_orders: 1,
                refund_rate_pct: dec!(100),
            }],
            risk_sort_order: RiskSortOrder::ProductId,
            risk_summary: vec![RiskSummaryRow {
                product_id: 1,
                product_name: "The Original Mr. Fuzzy".to_string(),
                orders: 2,
                refunds: 1,
                refund_rate_pct: dec!(50),
                status: RiskTier::High,
            }],
        };

        let text = render_dashboard(&report);

        assert!(text.contains("BearCart Business Analytics Dashboard"));
        assert!(text.contains("$1,222,335.29"));
        assert!(text.contains("Mar 12"));
        assert!(text.contains("n/a"));
        assert!(text.contains("Bundle (2+ Items)"));
        assert!(text.contains("High Risk"));
        assert!(text.contains("The Original Mr. Fuzzy"));
    }
}
