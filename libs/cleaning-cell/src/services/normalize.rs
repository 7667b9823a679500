// libs/cleaning-cell/src/services/normalize.rs
use std::collections::BTreeSet;

use shared_models::{AppointmentStatus, AppointmentType, InsuranceType, VisitModality};

// ==============================================================================
// CATEGORY MAPPINGS (normalized raw text -> canonical)
// ==============================================================================
//
// Keys are matched after `norm_text`, so hyphens already read as spaces.

pub const STATUS_MAP: &[(&str, AppointmentStatus)] = &[
    ("completed", AppointmentStatus::Completed),
    ("canceled", AppointmentStatus::Canceled),
    ("cancelled", AppointmentStatus::Canceled),
    ("no show", AppointmentStatus::NoShow),
    ("no_show", AppointmentStatus::NoShow),
    ("noshow", AppointmentStatus::NoShow),
    ("rescheduled", AppointmentStatus::Rescheduled),
    ("reschedule", AppointmentStatus::Rescheduled),
];

pub const APPOINTMENT_TYPE_MAP: &[(&str, AppointmentType)] = &[
    ("therapy", AppointmentType::Therapy),
    ("med check", AppointmentType::MedCheck),
    ("med_check", AppointmentType::MedCheck),
    ("medcheck", AppointmentType::MedCheck),
    ("intake", AppointmentType::Intake),
    ("follow up", AppointmentType::FollowUp),
    ("follow_up", AppointmentType::FollowUp),
];

pub const INSURANCE_TYPE_MAP: &[(&str, InsuranceType)] = &[
    ("medicaid", InsuranceType::Medicaid),
    ("mcd", InsuranceType::Medicaid),
    ("medicare", InsuranceType::Medicare),
    ("mcr", InsuranceType::Medicare),
    ("commercial", InsuranceType::Commercial),
    ("comm", InsuranceType::Commercial),
    ("private", InsuranceType::Commercial),
    ("self pay", InsuranceType::SelfPay),
    ("self_pay", InsuranceType::SelfPay),
];

pub const VISIT_MODALITY_MAP: &[(&str, VisitModality)] = &[
    ("in_person", VisitModality::InPerson),
    ("telehealth", VisitModality::Telehealth),
];

const TRUTHY: [&str; 5] = ["true", "t", "yes", "y", "1"];
const FALSY: [&str; 5] = ["false", "f", "no", "n", "0"];

// ==============================================================================
// HELPERS
// ==============================================================================

/// Lowercase, trim, read hyphens as spaces and collapse whitespace runs.
pub fn norm_text(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace('-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// `Some(true)` / `Some(false)` for the usual encodings, `None` for blank or unknown.
pub fn parse_boolish(raw: Option<&str>) -> Option<bool> {
    let text = norm_text(raw?);
    if text.is_empty() {
        return None;
    }
    if TRUTHY.contains(&text.as_str()) {
        Some(true)
    } else if FALSY.contains(&text.as_str()) {
        Some(false)
    } else {
        None
    }
}

pub fn is_known_boolish(text: &str) -> bool {
    TRUTHY.contains(&text) || FALSY.contains(&text)
}

pub fn map_category<T: Copy>(raw: Option<&str>, mapping: &[(&str, T)]) -> Option<T> {
    let text = norm_text(raw?);
    if text.is_empty() {
        return None;
    }
    mapping
        .iter()
        .find(|(key, _)| *key == text)
        .map(|(_, value)| *value)
}

/// Observed values outside `allowed`. Used for reporting, never for rejecting.
pub fn summarize_unexpected<'a, I>(observed: I, allowed: &BTreeSet<&str>) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    observed
        .into_iter()
        .filter(|value| !allowed.contains(value))
        .map(str::to_string)
        .collect()
}

pub fn mapping_keys<T>(mapping: &[(&'static str, T)]) -> BTreeSet<&'static str> {
    mapping.iter().map(|(key, _)| *key).collect()
}

pub fn parse_status(raw: &str) -> Option<AppointmentStatus> {
    map_category(Some(raw), STATUS_MAP)
}

pub fn parse_appointment_type(raw: &str) -> Option<AppointmentType> {
    map_category(Some(raw), APPOINTMENT_TYPE_MAP)
}

pub fn parse_insurance_type(raw: &str) -> Option<InsuranceType> {
    map_category(Some(raw), INSURANCE_TYPE_MAP)
}

pub fn parse_visit_modality(raw: &str) -> Option<VisitModality> {
    map_category(Some(raw), VISIT_MODALITY_MAP)
}

/// Trimmed copy of a free-text cell; blank becomes `None`.
pub fn clean_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
