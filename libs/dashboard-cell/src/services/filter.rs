// libs/dashboard-cell/src/services/filter.rs
use chrono::NaiveDate;
use serde::Serialize;

use cleaning_cell::services::normalize::{parse_appointment_type, parse_status};
use shared_models::{AppointmentStatus, AppointmentType, CleanAppointment};

use crate::models::{DashboardError, DashboardQuery};

/// Validated dashboard filters. Every field is optional; an unset field matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub clinic_id: Option<String>,
    pub provider_id: Option<String>,
    pub appointment_type: Option<AppointmentType>,
    pub status: Option<AppointmentStatus>,
}

impl DashboardFilter {
    /// Date bounds are inclusive calendar dates of `scheduled_start`. Type and
    /// status go through the same normalization as the data, so `No-Show` works.
    pub fn from_query(query: &DashboardQuery) -> Result<Self, DashboardError> {
        let start_date = parse_date("start_date", query.start_date.as_deref())?;
        let end_date = parse_date("end_date", query.end_date.as_deref())?;

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(DashboardError::InvalidFilter(format!(
                    "start_date {} is after end_date {}",
                    start, end
                )));
            }
        }

        let appointment_type = match non_blank(query.appointment_type.as_deref()) {
            Some(raw) => Some(parse_appointment_type(raw).ok_or_else(|| {
                DashboardError::InvalidFilter(format!("unknown appointment_type '{}'", raw))
            })?),
            None => None,
        };

        let status = match non_blank(query.status.as_deref()) {
            Some(raw) => Some(parse_status(raw).ok_or_else(|| {
                DashboardError::InvalidFilter(format!("unknown status '{}'", raw))
            })?),
            None => None,
        };

        Ok(Self {
            start_date,
            end_date,
            clinic_id: non_blank(query.clinic_id.as_deref()).map(str::to_string),
            provider_id: non_blank(query.provider_id.as_deref()).map(str::to_string),
            appointment_type,
            status,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, record: &CleanAppointment) -> bool {
        if self.start_date.is_some() || self.end_date.is_some() {
            let Some(date) = record.scheduled_date() else {
                return false;
            };
            if self.start_date.is_some_and(|start| date < start) {
                return false;
            }
            if self.end_date.is_some_and(|end| date > end) {
                return false;
            }
        }

        if let Some(clinic) = &self.clinic_id {
            if record.clinic_id.as_ref() != Some(clinic) {
                return false;
            }
        }
        if let Some(provider) = &self.provider_id {
            if record.provider_id.as_ref() != Some(provider) {
                return false;
            }
        }
        if self.appointment_type.is_some() && record.appointment_type != self.appointment_type {
            return false;
        }
        if self.status.is_some() && record.status != self.status {
            return false;
        }

        true
    }

    pub fn apply<'a>(&'a self, records: &'a [CleanAppointment]) -> impl Iterator<Item = &'a CleanAppointment> + 'a {
        records.iter().filter(move |r| self.matches(r))
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, DashboardError> {
    match non_blank(raw) {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                DashboardError::InvalidFilter(format!("{} '{}' is not a YYYY-MM-DD date", field, text))
            }),
        None => Ok(None),
    }
}
