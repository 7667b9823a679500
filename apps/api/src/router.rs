use std::sync::Arc;

use axum::{routing::get, Router};

use dashboard_cell::{dashboard_routes, DashboardState};

pub fn create_router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Appointment operations API is running!" }))
        .nest("/dashboard", dashboard_routes(state))
}
