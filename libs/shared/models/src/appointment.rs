// libs/shared/models/src/appointment.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==============================================================================
// COLUMN CONTRACT
// ==============================================================================

/// Columns every raw appointments file must carry, in file order.
pub const REQUIRED_COLUMNS: [&str; 23] = [
    "appointment_id",
    "patient_id",
    "provider_id",
    "clinic_id",
    "scheduled_start",
    "scheduled_end",
    "created_at",
    "check_in_time",
    "visit_start_time",
    "visit_end_time",
    "canceled_at",
    "cancel_reason",
    "status",
    "status_detail",
    "follow_up_needed",
    "follow_up_scheduled",
    "appointment_type",
    "visit_modality",
    "insurance_type",
    "referral_source",
    "language",
    "zip3",
    "age_band",
];

pub const DATETIME_COLUMNS: [&str; 7] = [
    "scheduled_start",
    "scheduled_end",
    "created_at",
    "check_in_time",
    "visit_start_time",
    "visit_end_time",
    "canceled_at",
];

// ==============================================================================
// RAW RECORD
// ==============================================================================

/// One row of `appointments.csv` exactly as read. Blank cells are `None`; nothing
/// else is touched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAppointment {
    pub appointment_id: Option<String>,
    pub patient_id: Option<String>,
    pub provider_id: Option<String>,
    pub clinic_id: Option<String>,
    pub scheduled_start: Option<String>,
    pub scheduled_end: Option<String>,
    pub created_at: Option<String>,
    pub check_in_time: Option<String>,
    pub visit_start_time: Option<String>,
    pub visit_end_time: Option<String>,
    pub canceled_at: Option<String>,
    pub cancel_reason: Option<String>,
    pub status: Option<String>,
    pub status_detail: Option<String>,
    pub follow_up_needed: Option<String>,
    pub follow_up_scheduled: Option<String>,
    pub appointment_type: Option<String>,
    pub visit_modality: Option<String>,
    pub insurance_type: Option<String>,
    pub referral_source: Option<String>,
    pub language: Option<String>,
    pub zip3: Option<String>,
    pub age_band: Option<String>,
}

impl RawAppointment {
    /// Raw text of a timestamp column by name.
    pub fn datetime_field(&self, column: &str) -> Option<&str> {
        let value = match column {
            "scheduled_start" => &self.scheduled_start,
            "scheduled_end" => &self.scheduled_end,
            "created_at" => &self.created_at,
            "check_in_time" => &self.check_in_time,
            "visit_start_time" => &self.visit_start_time,
            "visit_end_time" => &self.visit_end_time,
            "canceled_at" => &self.canceled_at,
            _ => return None,
        };
        value.as_deref()
    }
}

// ==============================================================================
// CANONICAL VOCABULARIES
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Completed,
    Canceled,
    NoShow,
    Rescheduled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Completed,
        AppointmentStatus::Canceled,
        AppointmentStatus::NoShow,
        AppointmentStatus::Rescheduled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Canceled => "canceled",
            AppointmentStatus::NoShow => "no_show",
            AppointmentStatus::Rescheduled => "rescheduled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    Therapy,
    MedCheck,
    Intake,
    FollowUp,
}

impl AppointmentType {
    pub const ALL: [AppointmentType; 4] = [
        AppointmentType::Therapy,
        AppointmentType::MedCheck,
        AppointmentType::Intake,
        AppointmentType::FollowUp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentType::Therapy => "therapy",
            AppointmentType::MedCheck => "med_check",
            AppointmentType::Intake => "intake",
            AppointmentType::FollowUp => "follow_up",
        }
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceType {
    Medicaid,
    Medicare,
    Commercial,
    SelfPay,
}

impl InsuranceType {
    pub const ALL: [InsuranceType; 4] = [
        InsuranceType::Medicaid,
        InsuranceType::Medicare,
        InsuranceType::Commercial,
        InsuranceType::SelfPay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InsuranceType::Medicaid => "medicaid",
            InsuranceType::Medicare => "medicare",
            InsuranceType::Commercial => "commercial",
            InsuranceType::SelfPay => "self_pay",
        }
    }
}

impl fmt::Display for InsuranceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum VisitModality {
    InPerson,
    Telehealth,
}

impl VisitModality {
    pub const ALL: [VisitModality; 2] = [VisitModality::InPerson, VisitModality::Telehealth];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisitModality::InPerson => "in_person",
            VisitModality::Telehealth => "telehealth",
        }
    }
}

impl fmt::Display for VisitModality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==============================================================================
// CLEAN RECORD
// ==============================================================================

/// Analysis-ready appointment event. Unknown categories and unparseable
/// timestamps are `None`; derived durations are in minutes and may be negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanAppointment {
    pub appointment_id: String,
    pub patient_id: Option<String>,
    pub provider_id: Option<String>,
    pub clinic_id: Option<String>,
    pub scheduled_start: Option<NaiveDateTime>,
    pub scheduled_end: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub check_in_time: Option<NaiveDateTime>,
    pub visit_start_time: Option<NaiveDateTime>,
    pub visit_end_time: Option<NaiveDateTime>,
    pub canceled_at: Option<NaiveDateTime>,
    pub cancel_reason: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub status_detail: Option<String>,
    pub follow_up_needed: Option<bool>,
    pub follow_up_scheduled: Option<bool>,
    pub appointment_type: Option<AppointmentType>,
    pub visit_modality: Option<VisitModality>,
    pub insurance_type: Option<InsuranceType>,
    pub referral_source: Option<String>,
    pub language: Option<String>,
    pub zip3: Option<String>,
    pub age_band: Option<String>,
    pub lead_time_minutes: Option<f64>,
    pub wait_time_minutes: Option<f64>,
    pub visit_duration_minutes: Option<f64>,
}

impl CleanAppointment {
    pub fn scheduled_date(&self) -> Option<chrono::NaiveDate> {
        self.scheduled_start.map(|ts| ts.date())
    }

    pub fn visit_ends_before_start(&self) -> bool {
        matches!(
            (self.visit_start_time, self.visit_end_time),
            (Some(start), Some(end)) if end < start
        )
    }

    pub fn canceled_after_scheduled_start(&self) -> bool {
        matches!(
            (self.canceled_at, self.scheduled_start),
            (Some(canceled), Some(start)) if canceled > start
        )
    }
}
