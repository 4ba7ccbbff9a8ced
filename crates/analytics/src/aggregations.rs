//! The four breakdown queries over the order view.
//!
//! Each function takes the deduplicated orders and returns a fully sorted
//! table. Groups only exist when they contain at least one order, so the
//! count-based rates are always defined. The monthly trend sums money and is
//! the only query that can fail, when a total leaves the `Decimal` range.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use configuration::RiskSortOrder;
use core_types::{Order, PurchaseType, RiskTier};
use rust_decimal::Decimal;

use crate::error::AnalyticsError;
use crate::report::{BundleRisk, MonthlyRefundRate, ProductPerformance, RiskSummaryRow};

/// `part / whole × 100`, or `None` when `whole` is zero or the result overflows.
pub(crate) fn percentage(part: Decimal, whole: Decimal) -> Option<Decimal> {
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

/// Adds up money values, failing instead of panicking on overflow.
pub(crate) fn checked_sum<I>(values: I, metric: &str) -> Result<Decimal, AnalyticsError>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
        .ok_or_else(|| AnalyticsError::Overflow(metric.to_string()))
}

/// Count-based rate for groups that are never empty.
fn count_rate(part: usize, whole: usize) -> Decimal {
    percentage(Decimal::from(part), Decimal::from(whole)).unwrap_or(Decimal::ZERO)
}

/// Last calendar day of the month containing `date`.
fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}

/// Refund amount as a share of revenue, per calendar month, oldest first.
///
/// Only months that contain at least one order appear.
pub fn monthly_refund_trend(orders: &[Order]) -> Result<Vec<MonthlyRefundRate>, AnalyticsError> {
    let mut buckets: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();

    for order in orders {
        let bucket = buckets
            .entry(month_end(order.created_at.date()))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        bucket.0 = bucket
            .0
            .checked_add(order.price_usd)
            .ok_or_else(|| AnalyticsError::Overflow("monthly revenue".to_string()))?;
        bucket.1 = bucket
            .1
            .checked_add(order.refund_amount_usd)
            .ok_or_else(|| AnalyticsError::Overflow("monthly refunds".to_string()))?;
    }

    let trend = buckets
        .into_iter()
        .map(|(month_end, (revenue, refunds))| {
            let refund_rate_pct = percentage(refunds, revenue);
            if refund_rate_pct.is_none() {
                tracing::debug!(%month_end, "Month has no defined refund rate.");
            }
            MonthlyRefundRate {
                month_end,
                label: month_end.format("%b %y").to_string(),
                revenue,
                refunds,
                refund_rate_pct,
            }
        })
        .collect();
    Ok(trend)
}

/// Orders and refunded orders per product name, busiest product first.
///
/// Products with equal order counts are listed alphabetically.
pub fn product_performance(orders: &[Order]) -> Vec<ProductPerformance> {
    let mut by_name: HashMap<&str, (usize, usize)> = HashMap::new();

    for order in orders {
        let entry = by_name.entry(order.product_name.as_str()).or_default();
        entry.0 += 1;
        if order.is_refunded {
            entry.1 += 1;
        }
    }

    let mut rows: Vec<ProductPerformance> = by_name
        .into_iter()
        .map(|(name, (total, refunded))| ProductPerformance {
            product_name: name.to_string(),
            total_orders: total,
            refunded_orders: refunded,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_orders
            .cmp(&a.total_orders)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    rows
}

/// Share of refunded orders for single-item purchases versus bundles.
///
/// One row per purchase type present, single items first.
pub fn bundle_effect(orders: &[Order]) -> Vec<BundleRisk> {
    let mut by_type: BTreeMap<PurchaseType, (usize, usize)> = BTreeMap::new();

    for order in orders {
        let entry = by_type.entry(order.purchase_type()).or_default();
        entry.0 += 1;
        if order.is_refunded {
            entry.1 += 1;
        }
    }

    by_type
        .into_iter()
        .map(|(purchase_type, (count, refunded))| BundleRisk {
            purchase_type,
            orders: count,
            refunded_orders: refunded,
            refund_rate_pct: count_rate(refunded, count),
        })
        .collect()
}

/// Per-product refund rate with its risk tier.
pub fn risk_summary(orders: &[Order], sort_order: RiskSortOrder) -> Vec<RiskSummaryRow> {
    // Keyed by (id, name) so the default iteration order is already catalog order.
    let mut by_product: BTreeMap<(i64, &str), (usize, usize)> = BTreeMap::new();

    for order in orders {
        let entry = by_product
            .entry((order.product_id, order.product_name.as_str()))
            .or_default();
        entry.0 += 1;
        if order.is_refunded {
            entry.1 += 1;
        }
    }

    let mut rows: Vec<RiskSummaryRow> = by_product
        .into_iter()
        .map(|((product_id, name), (count, refunds))| {
            let refund_rate_pct = count_rate(refunds, count);
            RiskSummaryRow {
                product_id,
                product_name: name.to_string(),
                orders: count,
                refunds,
                refund_rate_pct,
                status: RiskTier::classify(refund_rate_pct),
            }
        })
        .collect();

    if sort_order == RiskSortOrder::RefundRate {
        // Stable sort keeps catalog order among equal rates.
        rows.sort_by(|a, b| b.refund_rate_pct.cmp(&a.refund_rate_pct));
    }
    rows
}
