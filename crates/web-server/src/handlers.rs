use crate::{error::AppError, AppState};
use analytics::{
    bundle_effect, monthly_refund_trend, product_performance, risk_summary, BundleRisk,
    DashboardReport, KpiReport, MonthlyRefundRate, ProductPerformance, RiskSummaryRow,
};
use axum::{extract::State, Json};
use dataset::DatasetSummary;
use std::sync::Arc;

/// # GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<DatasetSummary> {
    Json(state.dataset.summary())
}

/// # GET /api/dashboard
/// Every KPI and breakdown in one response.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardReport>, AppError> {
    let report = state.engine.build_dashboard(&state.dataset)?;
    Ok(Json(report))
}

/// # GET /api/kpis
pub async fn get_kpis(State(state): State<Arc<AppState>>) -> Result<Json<KpiReport>, AppError> {
    let kpis = state
        .engine
        .calculate_kpis(state.dataset.orders(), state.dataset.events())?;
    Ok(Json(kpis))
}

/// # GET /api/trends/monthly-refunds
pub async fn get_monthly_refunds(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MonthlyRefundRate>>, AppError> {
    let trend = monthly_refund_trend(state.dataset.orders())?;
    Ok(Json(trend))
}

/// # GET /api/products/performance
pub async fn get_product_performance(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<ProductPerformance>> {
    Json(product_performance(state.dataset.orders()))
}

/// # GET /api/bundle-effect
pub async fn get_bundle_effect(State(state): State<Arc<AppState>>) -> Json<Vec<BundleRisk>> {
    Json(bundle_effect(state.dataset.orders()))
}

/// # GET /api/risk-summary
/// Rows follow the configured sort order.
pub async fn get_risk_summary(State(state): State<Arc<AppState>>) -> Json<Vec<RiskSummaryRow>> {
    Json(risk_summary(
        state.dataset.orders(),
        state.engine.risk_sort_order(),
    ))
}
