// =====================================================================================
// DASHBOARD CELL - APPOINTMENT OPERATIONS METRICS
// =====================================================================================
//
// Serves the operations dashboard over the cleaned dataset:
// - Volume and outcome rates (completed, canceled, no-show, rescheduled)
// - Median lead time, wait time and visit duration
// - Filters on date range, clinic, provider, appointment type and status
// - Per-group breakdowns and the options that feed the filter controls
// - The data quality report produced by the cleaning stage
//
// =====================================================================================

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    AppointmentsPage, BreakdownResponse, DashboardError, DashboardMetrics, DashboardQuery,
    DashboardState, FilterOptions, GroupBy, GroupMetrics, MetricsResponse, StatusCounts,
};
pub use services::filter::DashboardFilter;
pub use services::metrics::{compute_breakdown, compute_metrics, filter_options, median};

pub use router::dashboard_routes;
