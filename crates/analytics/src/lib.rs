//! # BearCart Analytics Engine
//!
//! This crate turns the order view of a `Dataset` into business KPIs and the
//! breakdown tables shown on the dashboard.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No file or network access. Inputs are slices of `Event`
//!   and `Order`; outputs are plain serializable structs.
//! - **Stateless Calculation:** The `AnalyticsEngine` holds only settings.
//!   Running it twice on the same dataset yields identical results.
//! - **Exact Arithmetic:** Money and rates are `Decimal`. Undefined values are
//!   `None` or an `AnalyticsError`, never NaN or infinity.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: computes `KpiReport` and assembles the `DashboardReport`.
//! - `monthly_refund_trend`, `product_performance`, `bundle_effect`,
//!   `risk_summary`: the four breakdown queries.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod aggregations;
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use aggregations::{bundle_effect, monthly_refund_trend, product_performance, risk_summary};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{
    BundleRisk, DashboardReport, KpiReport, MonthlyRefundRate, ProductPerformance, RiskSummaryRow,
};
