// libs/cleaning-cell/src/services/pipeline.rs
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::instrument;

use ingest_cell::{load_appointments, RawDataset};
use shared_models::{CleanAppointment, RawAppointment};

use crate::error::CleaningError;
use crate::models::CleanedDataset;
use crate::services::dedupe::dedupe_latest_created_at;
use crate::services::features::add_time_features;
use crate::services::normalize::{
    clean_text, map_category, mapping_keys, parse_boolish, APPOINTMENT_TYPE_MAP,
    INSURANCE_TYPE_MAP, STATUS_MAP, VISIT_MODALITY_MAP,
};
use crate::services::quality::QualityReportBuilder;
use crate::services::timestamps::parse_timestamp;

/// Clean a raw dataset into analysis-ready records.
///
/// Steps, in order: coerce timestamps, map categories, parse booleans, drop rows
/// without an id, dedupe on `appointment_id`, derive time features. This never
/// fails; every irregularity ends up as a missing value plus a report entry.
#[instrument(skip(raw), fields(rows = raw.len()))]
pub fn clean_appointments(raw: &RawDataset) -> CleanedDataset {
    let mut quality = QualityReportBuilder::new();
    let mut converted = Vec::with_capacity(raw.len());

    for row in &raw.rows {
        quality.record_row();
        let record = convert_row(row, &mut quality);
        match record {
            Some(record) => converted.push(record),
            None => quality.record_missing_id(),
        }
    }

    let (mut records, duplicates_removed) = dedupe_latest_created_at(converted);
    records.iter_mut().for_each(add_time_features);

    let report = quality.finish(&records, duplicates_removed, &allowed_spellings());

    CleanedDataset { records, report }
}

/// Load a raw CSV from disk and clean it.
pub fn load_and_clean(path: &Path) -> Result<CleanedDataset, CleaningError> {
    let raw = load_appointments(path)?;
    Ok(clean_appointments(&raw))
}

fn allowed_spellings() -> BTreeMap<&'static str, BTreeSet<&'static str>> {
    BTreeMap::from([
        ("status", mapping_keys(STATUS_MAP)),
        ("appointment_type", mapping_keys(APPOINTMENT_TYPE_MAP)),
        ("insurance_type", mapping_keys(INSURANCE_TYPE_MAP)),
        ("visit_modality", mapping_keys(VISIT_MODALITY_MAP)),
    ])
}

fn convert_row(row: &RawAppointment, quality: &mut QualityReportBuilder) -> Option<CleanAppointment> {
    let mut timestamp = |column: &str, raw: &Option<String>| -> Option<NaiveDateTime> {
        let parsed = raw.as_deref().and_then(parse_timestamp);
        quality.record_timestamp(column, raw.as_deref(), parsed);
        parsed
    };

    let scheduled_start = timestamp("scheduled_start", &row.scheduled_start);
    let scheduled_end = timestamp("scheduled_end", &row.scheduled_end);
    let created_at = timestamp("created_at", &row.created_at);
    let check_in_time = timestamp("check_in_time", &row.check_in_time);
    let visit_start_time = timestamp("visit_start_time", &row.visit_start_time);
    let visit_end_time = timestamp("visit_end_time", &row.visit_end_time);
    let canceled_at = timestamp("canceled_at", &row.canceled_at);

    let status = map_category(row.status.as_deref(), STATUS_MAP);
    quality.record_category("status", row.status.as_deref(), status.is_some());
    let appointment_type = map_category(row.appointment_type.as_deref(), APPOINTMENT_TYPE_MAP);
    quality.record_category("appointment_type", row.appointment_type.as_deref(), appointment_type.is_some());
    let insurance_type = map_category(row.insurance_type.as_deref(), INSURANCE_TYPE_MAP);
    quality.record_category("insurance_type", row.insurance_type.as_deref(), insurance_type.is_some());
    let visit_modality = map_category(row.visit_modality.as_deref(), VISIT_MODALITY_MAP);
    quality.record_category("visit_modality", row.visit_modality.as_deref(), visit_modality.is_some());

    quality.record_boolean("follow_up_needed", row.follow_up_needed.as_deref());
    quality.record_boolean("follow_up_scheduled", row.follow_up_scheduled.as_deref());

    let appointment_id = clean_text(row.appointment_id.as_deref())?;

    Some(CleanAppointment {
        appointment_id,
        patient_id: clean_text(row.patient_id.as_deref()),
        provider_id: clean_text(row.provider_id.as_deref()),
        clinic_id: clean_text(row.clinic_id.as_deref()),
        scheduled_start,
        scheduled_end,
        created_at,
        check_in_time,
        visit_start_time,
        visit_end_time,
        canceled_at,
        cancel_reason: clean_text(row.cancel_reason.as_deref()),
        status,
        status_detail: clean_text(row.status_detail.as_deref()),
        follow_up_needed: parse_boolish(row.follow_up_needed.as_deref()),
        follow_up_scheduled: parse_boolish(row.follow_up_scheduled.as_deref()),
        appointment_type,
        visit_modality,
        insurance_type,
        referral_source: clean_text(row.referral_source.as_deref()),
        language: clean_text(row.language.as_deref()),
        zip3: clean_text(row.zip3.as_deref()),
        age_band: clean_text(row.age_band.as_deref()),
        lead_time_minutes: None,
        wait_time_minutes: None,
        visit_duration_minutes: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_models::{AppointmentStatus, InsuranceType};

    fn raw(id: Option<&str>, created_at: &str, status: &str) -> RawAppointment {
        RawAppointment {
            appointment_id: id.map(str::to_string),
            created_at: Some(created_at.to_string()),
            scheduled_start: Some("01/15/2024 10:00".to_string()),
            status: Some(status.to_string()),
            insurance_type: Some("MCR".to_string()),
            follow_up_needed: Some("N".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_small_dataset() {
        let dataset = RawDataset::new(
            Vec::new(),
            vec![
                raw(Some("A1"), "2024-01-01 09:00:00", "Completed"),
                raw(Some("A1"), "2024-01-02 09:00:00", "CANCELLED"),
                raw(None, "2024-01-02 09:00:00", "no show"),
                raw(Some(" A2 "), "garbage", "Pending"),
            ],
        );

        let cleaned = clean_appointments(&dataset);

        assert_eq!(cleaned.len(), 2);
        let a1 = &cleaned.records[0];
        assert_eq!(a1.appointment_id, "A1");
        assert_eq!(a1.status, Some(AppointmentStatus::Canceled));
        assert_eq!(a1.insurance_type, Some(InsuranceType::Medicare));
        assert_eq!(a1.follow_up_needed, Some(false));
        assert_eq!(a1.lead_time_minutes, Some(13.0 * 24.0 * 60.0 + 60.0));

        let a2 = &cleaned.records[1];
        assert_eq!(a2.appointment_id, "A2");
        assert_eq!(a2.created_at, None);
        assert_eq!(a2.status, None);
        assert_eq!(a2.lead_time_minutes, None);

        let report = &cleaned.report;
        assert_eq!(report.raw_rows, 4);
        assert_eq!(report.clean_rows, 2);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.missing_id_rows, 1);
        assert_eq!(report.timestamps["created_at"].unparseable, 1);
        assert!(report.categories["status"].unexpected_values.contains("pending"));
    }
}
