// =====================================================================================
// DASHBOARD CELL MODELS
// =====================================================================================

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use axum::extract::rejection::QueryRejection;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use cleaning_cell::CleanedDataset;
use shared_models::{AppError, AppointmentStatus, AppointmentType, CleanAppointment};

/// Read-only data behind the dashboard, built once at startup.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub dataset: CleanedDataset,
    pub source: Option<PathBuf>,
    pub loaded_at: DateTime<Utc>,
}

impl DashboardState {
    pub fn new(dataset: CleanedDataset) -> Self {
        Self {
            dataset,
            source: None,
            loaded_at: Utc::now(),
        }
    }

    pub fn with_source(mut self, source: PathBuf) -> Self {
        self.source = Some(source);
        self
    }

    pub fn records(&self) -> &[CleanAppointment] {
        &self.dataset.records
    }
}

// =====================================================================================
// METRICS
// =====================================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub completed: usize,
    pub canceled: usize,
    pub no_show: usize,
    pub rescheduled: usize,
    pub unknown: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: Option<AppointmentStatus>) {
        match status {
            Some(AppointmentStatus::Completed) => self.completed += 1,
            Some(AppointmentStatus::Canceled) => self.canceled += 1,
            Some(AppointmentStatus::NoShow) => self.no_show += 1,
            Some(AppointmentStatus::Rescheduled) => self.rescheduled += 1,
            None => self.unknown += 1,
        }
    }

    /// Rows with a canonical status; the denominator for every rate.
    pub fn known(&self) -> usize {
        self.completed + self.canceled + self.no_show + self.rescheduled
    }

    pub fn rate(&self, count: usize) -> Option<f64> {
        match self.known() {
            0 => None,
            known => Some(count as f64 / known as f64),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub volume: usize,
    pub status_counts: StatusCounts,
    pub completion_rate: Option<f64>,
    pub cancellation_rate: Option<f64>,
    pub no_show_rate: Option<f64>,
    pub rescheduled_rate: Option<f64>,
    pub median_lead_time_minutes: Option<f64>,
    pub median_wait_time_minutes: Option<f64>,
    pub median_visit_duration_minutes: Option<f64>,
    /// Visits whose end precedes their start; left out of the duration median.
    pub negative_duration_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupBy {
    Clinic,
    Provider,
    AppointmentType,
    VisitModality,
    InsuranceType,
    Day,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Clinic => "clinic",
            GroupBy::Provider => "provider",
            GroupBy::AppointmentType => "appointment_type",
            GroupBy::VisitModality => "visit_modality",
            GroupBy::InsuranceType => "insurance_type",
            GroupBy::Day => "day",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clinic" | "clinic_id" => Ok(GroupBy::Clinic),
            "provider" | "provider_id" => Ok(GroupBy::Provider),
            "appointment_type" => Ok(GroupBy::AppointmentType),
            "visit_modality" => Ok(GroupBy::VisitModality),
            "insurance_type" => Ok(GroupBy::InsuranceType),
            "day" | "date" => Ok(GroupBy::Day),
            other => Err(DashboardError::InvalidGroupBy(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMetrics {
    pub key: String,
    pub metrics: DashboardMetrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub clinics: Vec<String>,
    pub providers: Vec<String>,
    pub appointment_types: Vec<AppointmentType>,
    pub statuses: Vec<AppointmentStatus>,
    pub first_scheduled_date: Option<NaiveDate>,
    pub last_scheduled_date: Option<NaiveDate>,
}

// =====================================================================================
// REQUEST/RESPONSE MODELS
// =====================================================================================

/// Query-string filters as sent by the dashboard. Parsed into a
/// [`crate::DashboardFilter`] so bad values come back as JSON errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub clinic_id: Option<String>,
    pub provider_id: Option<String>,
    pub appointment_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BreakdownQuery {
    pub group_by: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub clinic_id: Option<String>,
    pub provider_id: Option<String>,
    pub appointment_type: Option<String>,
    pub status: Option<String>,
}

impl BreakdownQuery {
    pub fn filters(&self) -> DashboardQuery {
        DashboardQuery {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            clinic_id: self.clinic_id.clone(),
            provider_id: self.provider_id.clone(),
            appointment_type: self.appointment_type.clone(),
            status: self.status.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentsQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub clinic_id: Option<String>,
    pub provider_id: Option<String>,
    pub appointment_type: Option<String>,
    pub status: Option<String>,
}

impl AppointmentsQuery {
    pub fn filters(&self) -> DashboardQuery {
        DashboardQuery {
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            clinic_id: self.clinic_id.clone(),
            provider_id: self.provider_id.clone(),
            appointment_type: self.appointment_type.clone(),
            status: self.status.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub filter: crate::DashboardFilter,
    pub metrics: DashboardMetrics,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BreakdownResponse {
    pub group_by: GroupBy,
    pub filter: crate::DashboardFilter,
    pub groups: Vec<GroupMetrics>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct AppointmentsPage {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub items: Vec<CleanAppointment>,
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
    #[error("Unknown group_by '{0}'; expected one of clinic, provider, appointment_type, visit_modality, insurance_type, day")]
    InvalidGroupBy(String),
    #[error("Invalid paging: {0}")]
    InvalidPaging(String),
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),
}

impl From<QueryRejection> for DashboardError {
    fn from(rejection: QueryRejection) -> Self {
        DashboardError::InvalidQuery(rejection.body_text())
    }
}

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
