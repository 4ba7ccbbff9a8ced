use analytics::AnalyticsEngine;
use axum::{routing::get, Router};
use dataset::Dataset;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
// Note: Tracing is initialized by the binary before the server starts.

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
///
/// The dataset is loaded once at start-up and only ever read, so handlers
/// share it through the `Arc` without locking.
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub engine: AnalyticsEngine,
}

impl AppState {
    pub fn new(dataset: Arc<Dataset>, engine: AnalyticsEngine) -> Self {
        Self { dataset, engine }
    }
}

/// Builds the read-only JSON API.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // --- DEFINE THE APPLICATION ROUTES ---
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/kpis", get(handlers::get_kpis))
        .route("/api/trends/monthly-refunds", get(handlers::get_monthly_refunds))
        .route("/api/products/performance", get(handlers::get_product_performance))
        .route("/api/bundle-effect", get(handlers::get_bundle_effect))
        .route("/api/risk-summary", get(handlers::get_risk_summary))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serves the API until the process is stopped.
pub async fn run_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use configuration::RiskSortOrder;
    use core_types::Event;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::Value;
    use tower::ServiceExt;

    fn event(session: i64, order_id: Option<i64>, product_id: i64, refunded: bool) -> Event {
        let converted = order_id.is_some();
        Event {
            website_session_id: session,
            order_id,
            created_at: NaiveDate::from_ymd_opt(2013, 7, 4)
                .unwrap()
                .and_hms_opt(11, 0, 0)
                .unwrap(),
            is_conversion: converted,
            price_usd: converted.then_some(dec!(50)),
            refund_amount_usd: converted.then_some(if refunded { dec!(50) } else { Decimal::ZERO }),
            is_refunded: converted.then_some(refunded),
            items_purchased: converted.then_some(1),
            product_id: converted.then_some(product_id),
            product_name: converted.then(|| format!("Product {product_id}")),
        }
    }

    fn app(events: Vec<Event>) -> Router {
        let dataset = Arc::new(Dataset::from_events(events).unwrap());
        let engine = AnalyticsEngine::new(dec!(1000), RiskSortOrder::RefundRate);
        router(Arc::new(AppState::new(dataset, engine)))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn kpis_endpoint_returns_report() {
        let app = app(vec![
            event(1, None, 0, false),
            event(2, Some(10), 1, false),
            event(3, Some(11), 2, true),
        ]);

        let (status, body) = get_json(app, "/api/kpis").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_orders"], 2);
        assert_eq!(body["total_traffic"], 3);
        assert_eq!(body["profit_is_derived"], false);
    }

    #[tokio::test]
    async fn risk_summary_follows_configured_order() {
        let app = app(vec![
            event(1, Some(10), 1, false),
            event(2, Some(11), 2, true),
        ]);

        let (status, body) = get_json(app, "/api/risk-summary").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["product_id"], 2);
        assert_eq!(body[0]["status"], "High Risk");
        assert_eq!(body[1]["status"], "Low Risk");
    }

    #[tokio::test]
    async fn dataset_without_orders_is_unprocessable() {
        let app = app(vec![event(1, None, 0, false)]);

        let (status, body) = get_json(app, "/api/dashboard").await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("No orders"));
    }

    #[tokio::test]
    async fn health_reports_dataset_shape() {
        let app = app(vec![event(1, None, 0, false), event(2, Some(10), 1, false)]);

        let (status, body) = get_json(app, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["event_rows"], 2);
        assert_eq!(body["order_rows"], 1);
    }
}
