use std::collections::HashSet;

use chrono::NaiveDateTime;
use core_types::{Event, Order};
use serde::Serialize;

use crate::error::DatasetError;

/// An immutable, fully validated copy of the transaction export.
///
/// Built once by whoever orchestrates a run and passed by reference to every
/// calculation. There is no way to mutate it after construction.
#[derive(Debug, Clone)]
pub struct Dataset {
    events: Vec<Event>,
    orders: Vec<Order>,
}

/// The shape of a loaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub event_rows: usize,
    pub distinct_sessions: usize,
    pub conversion_rows: usize,
    pub order_rows: usize,
    pub first_event_at: Option<NaiveDateTime>,
    pub last_event_at: Option<NaiveDateTime>,
}

impl Dataset {
    /// Builds a dataset from raw events, deriving the order view.
    pub fn from_events(events: Vec<Event>) -> Result<Self, DatasetError> {
        let orders = filter_orders(&events)?;
        Ok(Self { events, orders })
    }

    /// Every row of the source file, in source order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Converted rows with duplicate order ids removed, in source order.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn summary(&self) -> DatasetSummary {
        let distinct_sessions = self
            .events
            .iter()
            .map(|e| e.website_session_id)
            .collect::<HashSet<_>>()
            .len();

        DatasetSummary {
            event_rows: self.events.len(),
            distinct_sessions,
            conversion_rows: self.events.iter().filter(|e| e.is_conversion).count(),
            order_rows: self.orders.len(),
            first_event_at: self.events.iter().map(|e| e.created_at).min(),
            last_event_at: self.events.iter().map(|e| e.created_at).max(),
        }
    }
}

/// Derives orders from events: conversion rows only, one per `order_id`.
///
/// When an order id appears more than once, the first row in source order is
/// kept and later rows are dropped unread. Every kept row must carry complete
/// order fields, and every conversion row needs an `order_id`.
pub fn filter_orders(events: &[Event]) -> Result<Vec<Order>, DatasetError> {
    let mut seen = HashSet::new();
    let mut orders = Vec::new();
    let mut duplicates = 0usize;

    for event in events.iter().filter(|e| e.is_conversion) {
        if event.order_id.is_some_and(|id| seen.contains(&id)) {
            duplicates += 1;
            continue;
        }
        let order = Order::try_from(event)?;
        seen.insert(order.order_id);
        orders.push(order);
    }

    let odd_item_counts = orders.iter().filter(|o| o.items_purchased < 1).count();
    if odd_item_counts > 0 {
        tracing::warn!(
            orders = odd_item_counts,
            "Orders with fewer than one item purchased; they are counted as bundles."
        );
    }

    tracing::debug!(
        events = events.len(),
        orders = orders.len(),
        duplicates,
        "Derived order view."
    );

    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2012, 5, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn session(id: i64, day: u32) -> Event {
        Event {
            website_session_id: id,
            order_id: None,
            created_at: at(day),
            is_conversion: false,
            price_usd: None,
            refund_amount_usd: None,
            is_refunded: None,
            items_purchased: None,
            product_id: None,
            product_name: None,
        }
    }

    fn conversion(session_id: i64, order_id: i64, price: Decimal, day: u32) -> Event {
        Event {
            order_id: Some(order_id),
            is_conversion: true,
            price_usd: Some(price),
            refund_amount_usd: Some(Decimal::ZERO),
            is_refunded: Some(false),
            items_purchased: Some(1),
            product_id: Some(1),
            product_name: Some("The Original Mr. Fuzzy".to_string()),
            ..session(session_id, day)
        }
    }

    #[test]
    fn keeps_first_row_per_order_id() {
        let events = vec![
            session(1, 1),
            conversion(2, 100, dec!(49.99), 2),
            conversion(3, 100, dec!(99.99), 3),
            conversion(4, 101, dec!(29.99), 4),
        ];

        let orders = filter_orders(&events).unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].order_id, 100);
        assert_eq!(orders[0].price_usd, dec!(49.99));
        assert_eq!(orders[1].order_id, 101);
    }

    #[test]
    fn order_ids_are_unique_and_bounded_by_events() {
        let events = vec![
            conversion(1, 7, dec!(10), 1),
            conversion(1, 7, dec!(10), 1),
            conversion(2, 8, dec!(10), 2),
            session(3, 3),
        ];
        let dataset = Dataset::from_events(events).unwrap();

        let ids: HashSet<_> = dataset.orders().iter().map(|o| o.order_id).collect();
        assert_eq!(ids.len(), dataset.orders().len());
        assert!(dataset.orders().len() <= dataset.events().len());
    }

    #[test]
    fn conversion_missing_price_is_rejected() {
        let mut broken = conversion(2, 100, dec!(1), 2);
        broken.price_usd = None;
        let err = filter_orders(&[broken]).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidRow(_)));
    }

    #[test]
    fn incomplete_duplicate_of_kept_order_is_dropped() {
        let mut duplicate = conversion(3, 100, dec!(49.99), 3);
        duplicate.price_usd = None;
        duplicate.product_name = None;

        let orders = filter_orders(&[conversion(2, 100, dec!(49.99), 2), duplicate]).unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].price_usd, dec!(49.99));
    }

    #[test]
    fn conversion_without_order_id_is_rejected() {
        let mut broken = conversion(2, 100, dec!(1), 2);
        broken.order_id = None;
        let err = filter_orders(&[conversion(1, 100, dec!(1), 1), broken]).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidRow(_)));
    }

    #[test]
    fn summary_reports_shape() {
        let events = vec![
            session(1, 3),
            conversion(1, 100, dec!(49.99), 4),
            conversion(2, 101, dec!(49.99), 1),
            conversion(3, 101, dec!(49.99), 9),
        ];
        let summary = Dataset::from_events(events).unwrap().summary();

        assert_eq!(summary.event_rows, 4);
        assert_eq!(summary.distinct_sessions, 3);
        assert_eq!(summary.conversion_rows, 3);
        assert_eq!(summary.order_rows, 2);
        assert_eq!(summary.first_event_at, Some(at(1)));
        assert_eq!(summary.last_event_at, Some(at(9)));
    }
}
