// =====================================================================================
// DASHBOARD CELL HANDLERS
// =====================================================================================

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument};

use cleaning_cell::DataQualityReport;

use crate::models::{
    AppointmentsPage, AppointmentsQuery, BreakdownQuery, BreakdownResponse, DashboardError,
    DashboardQuery, DashboardState, FilterOptions, GroupBy, MetricsResponse,
};
use crate::services::filter::DashboardFilter;
use crate::services::metrics::{compute_breakdown, compute_metrics, filter_options};

pub const DEFAULT_PAGE_LIMIT: usize = 100;
pub const MAX_PAGE_LIMIT: usize = 1000;

// =====================================================================================
// METRICS ENDPOINTS
// =====================================================================================

#[instrument(skip(state))]
pub async fn get_metrics(
    State(state): State<Arc<DashboardState>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<MetricsResponse>, DashboardError> {
    let Query(query) = query?;
    let filter = DashboardFilter::from_query(&query)?;
    let metrics = compute_metrics(state.records(), &filter);

    Ok(Json(MetricsResponse {
        filter,
        metrics,
        timestamp: Utc::now(),
    }))
}

#[instrument(skip(state))]
pub async fn get_breakdown(
    State(state): State<Arc<DashboardState>>,
    query: Result<Query<BreakdownQuery>, QueryRejection>,
) -> Result<Json<BreakdownResponse>, DashboardError> {
    let Query(query) = query?;
    let group_by: GroupBy = query
        .group_by
        .as_deref()
        .filter(|g| !g.trim().is_empty())
        .ok_or_else(|| DashboardError::InvalidFilter("group_by is required".to_string()))?
        .parse()?;
    let filter = DashboardFilter::from_query(&query.filters())?;
    let groups = compute_breakdown(state.records(), &filter, group_by);

    debug!("Breakdown by {} produced {} groups", group_by, groups.len());

    Ok(Json(BreakdownResponse {
        group_by,
        filter,
        groups,
        timestamp: Utc::now(),
    }))
}

// =====================================================================================
// DATASET ENDPOINTS
// =====================================================================================

#[instrument(skip(state))]
pub async fn get_filter_options(State(state): State<Arc<DashboardState>>) -> Json<FilterOptions> {
    Json(filter_options(state.records()))
}

#[instrument(skip(state))]
pub async fn get_quality_report(State(state): State<Arc<DashboardState>>) -> Json<DataQualityReport> {
    Json(state.dataset.report.clone())
}

#[instrument(skip(state))]
pub async fn list_appointments(
    State(state): State<Arc<DashboardState>>,
    query: Result<Query<AppointmentsQuery>, QueryRejection>,
) -> Result<Json<AppointmentsPage>, DashboardError> {
    let Query(query) = query?;
    let limit = match query.limit {
        Some(0) => {
            return Err(DashboardError::InvalidPaging("limit must be at least 1".to_string()))
        }
        Some(limit) => limit.min(MAX_PAGE_LIMIT),
        None => DEFAULT_PAGE_LIMIT,
    };
    let offset = query.offset.unwrap_or(0);
    let filter = DashboardFilter::from_query(&query.filters())?;

    let matching: Vec<_> = filter.apply(state.records()).collect();
    let items = matching
        .iter()
        .skip(offset)
        .take(limit)
        .map(|r| (*r).clone())
        .collect();

    Ok(Json(AppointmentsPage {
        total: matching.len(),
        limit,
        offset,
        items,
    }))
}
