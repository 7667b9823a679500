// libs/cleaning-cell/src/services/features.rs
use chrono::NaiveDateTime;

use shared_models::CleanAppointment;

/// `later - earlier` in fractional minutes, `None` when either side is missing.
pub fn minutes_between(later: Option<NaiveDateTime>, earlier: Option<NaiveDateTime>) -> Option<f64> {
    let delta = later? - earlier?;
    Some(delta.num_milliseconds() as f64 / 60_000.0)
}

/// Fill lead time, wait time and visit duration. Negative values are kept.
pub fn add_time_features(record: &mut CleanAppointment) {
    record.lead_time_minutes = minutes_between(record.scheduled_start, record.created_at);
    record.wait_time_minutes = minutes_between(record.visit_start_time, record.scheduled_start);
    record.visit_duration_minutes = minutes_between(record.visit_end_time, record.visit_start_time);
}
