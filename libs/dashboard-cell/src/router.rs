// =====================================================================================
// DASHBOARD CELL ROUTER
// =====================================================================================

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::models::DashboardState;

pub fn dashboard_routes(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/metrics", get(handlers::get_metrics))
        .route("/metrics/breakdown", get(handlers::get_breakdown))
        .route("/filters", get(handlers::get_filter_options))
        .route("/quality", get(handlers::get_quality_report))
        .route("/appointments", get(handlers::list_appointments))
        .with_state(state)
}
