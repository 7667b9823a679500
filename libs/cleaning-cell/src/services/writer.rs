// libs/cleaning-cell/src/services/writer.rs
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float64Array, StringArray, TimestampMillisecondArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use parquet::arrow::ArrowWriter;
use serde::Serialize;
use tracing::{info, instrument};

use shared_models::{
    AppointmentStatus, AppointmentType, CleanAppointment, InsuranceType, VisitModality,
    REQUIRED_COLUMNS,
};

use crate::error::CleaningError;
use crate::services::timestamps::format_timestamp;

pub const DERIVED_COLUMNS: [&str; 3] = [
    "lead_time_minutes",
    "wait_time_minutes",
    "visit_duration_minutes",
];

/// Header of the processed CSV: the raw contract followed by derived columns.
pub fn processed_columns() -> Vec<&'static str> {
    REQUIRED_COLUMNS.iter().chain(DERIVED_COLUMNS.iter()).copied().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Parquet,
    Json,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self, CleaningError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "parquet" => Ok(OutputFormat::Parquet),
            "json" => Ok(OutputFormat::Json),
            _ => Err(CleaningError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Flat CSV row; timestamps use one fixed layout regardless of the raw input.
#[derive(Debug, Serialize)]
struct ProcessedRow<'a> {
    appointment_id: &'a str,
    patient_id: Option<&'a str>,
    provider_id: Option<&'a str>,
    clinic_id: Option<&'a str>,
    scheduled_start: Option<String>,
    scheduled_end: Option<String>,
    created_at: Option<String>,
    check_in_time: Option<String>,
    visit_start_time: Option<String>,
    visit_end_time: Option<String>,
    canceled_at: Option<String>,
    cancel_reason: Option<&'a str>,
    status: Option<AppointmentStatus>,
    status_detail: Option<&'a str>,
    follow_up_needed: Option<bool>,
    follow_up_scheduled: Option<bool>,
    appointment_type: Option<AppointmentType>,
    visit_modality: Option<VisitModality>,
    insurance_type: Option<InsuranceType>,
    referral_source: Option<&'a str>,
    language: Option<&'a str>,
    zip3: Option<&'a str>,
    age_band: Option<&'a str>,
    lead_time_minutes: Option<f64>,
    wait_time_minutes: Option<f64>,
    visit_duration_minutes: Option<f64>,
}

impl<'a> From<&'a CleanAppointment> for ProcessedRow<'a> {
    fn from(r: &'a CleanAppointment) -> Self {
        let ts = |value: &Option<NaiveDateTime>| value.as_ref().map(format_timestamp);
        Self {
            appointment_id: &r.appointment_id,
            patient_id: r.patient_id.as_deref(),
            provider_id: r.provider_id.as_deref(),
            clinic_id: r.clinic_id.as_deref(),
            scheduled_start: ts(&r.scheduled_start),
            scheduled_end: ts(&r.scheduled_end),
            created_at: ts(&r.created_at),
            check_in_time: ts(&r.check_in_time),
            visit_start_time: ts(&r.visit_start_time),
            visit_end_time: ts(&r.visit_end_time),
            canceled_at: ts(&r.canceled_at),
            cancel_reason: r.cancel_reason.as_deref(),
            status: r.status,
            status_detail: r.status_detail.as_deref(),
            follow_up_needed: r.follow_up_needed,
            follow_up_scheduled: r.follow_up_scheduled,
            appointment_type: r.appointment_type,
            visit_modality: r.visit_modality,
            insurance_type: r.insurance_type,
            referral_source: r.referral_source.as_deref(),
            language: r.language.as_deref(),
            zip3: r.zip3.as_deref(),
            age_band: r.age_band.as_deref(),
            lead_time_minutes: r.lead_time_minutes,
            wait_time_minutes: r.wait_time_minutes,
            visit_duration_minutes: r.visit_duration_minutes,
        }
    }
}

/// Write the cleaned dataset to `path`, creating parent directories. The
/// extension picks the format: `.csv`, `.parquet` or `.json`.
#[instrument(skip(records), fields(rows = records.len()))]
pub fn write_processed(records: &[CleanAppointment], path: &Path) -> Result<(), CleaningError> {
    let format = OutputFormat::from_path(path)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Csv => write_csv(records, file)?,
        OutputFormat::Parquet => write_parquet(records, file)?,
        OutputFormat::Json => write_json(records, file)?,
    }

    info!("Wrote {} processed appointments to {}", records.len(), path.display());
    Ok(())
}

fn write_csv<W: Write>(records: &[CleanAppointment], out: W) -> Result<(), CleaningError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(processed_columns())?;
    for record in records {
        writer.serialize(ProcessedRow::from(record))?;
    }
    writer.flush()?;
    Ok(())
}

fn text_column<'a, F>(records: &'a [CleanAppointment], value: F) -> ArrayRef
where
    F: Fn(&'a CleanAppointment) -> Option<&'a str>,
{
    Arc::new(records.iter().map(value).collect::<StringArray>())
}

fn timestamp_column<F>(records: &[CleanAppointment], value: F) -> ArrayRef
where
    F: Fn(&CleanAppointment) -> Option<NaiveDateTime>,
{
    Arc::new(
        records
            .iter()
            .map(|r| value(r).map(|t| t.and_utc().timestamp_millis()))
            .collect::<TimestampMillisecondArray>(),
    )
}

fn bool_column<F>(records: &[CleanAppointment], value: F) -> ArrayRef
where
    F: Fn(&CleanAppointment) -> Option<bool>,
{
    Arc::new(records.iter().map(value).collect::<BooleanArray>())
}

fn minutes_column<F>(records: &[CleanAppointment], value: F) -> ArrayRef
where
    F: Fn(&CleanAppointment) -> Option<f64>,
{
    Arc::new(records.iter().map(value).collect::<Float64Array>())
}

/// Columnar copy of the dataset, in `processed_columns()` order. Timestamps are
/// naive millisecond timestamps; categories are their canonical strings.
fn record_batch(records: &[CleanAppointment]) -> Result<RecordBatch, CleaningError> {
    let columns: Vec<(&str, ArrayRef)> = vec![
        ("appointment_id", text_column(records, |r| Some(r.appointment_id.as_str()))),
        ("patient_id", text_column(records, |r| r.patient_id.as_deref())),
        ("provider_id", text_column(records, |r| r.provider_id.as_deref())),
        ("clinic_id", text_column(records, |r| r.clinic_id.as_deref())),
        ("scheduled_start", timestamp_column(records, |r| r.scheduled_start)),
        ("scheduled_end", timestamp_column(records, |r| r.scheduled_end)),
        ("created_at", timestamp_column(records, |r| r.created_at)),
        ("check_in_time", timestamp_column(records, |r| r.check_in_time)),
        ("visit_start_time", timestamp_column(records, |r| r.visit_start_time)),
        ("visit_end_time", timestamp_column(records, |r| r.visit_end_time)),
        ("canceled_at", timestamp_column(records, |r| r.canceled_at)),
        ("cancel_reason", text_column(records, |r| r.cancel_reason.as_deref())),
        ("status", text_column(records, |r| r.status.map(|s| s.as_str()))),
        ("status_detail", text_column(records, |r| r.status_detail.as_deref())),
        ("follow_up_needed", bool_column(records, |r| r.follow_up_needed)),
        ("follow_up_scheduled", bool_column(records, |r| r.follow_up_scheduled)),
        ("appointment_type", text_column(records, |r| r.appointment_type.map(|t| t.as_str()))),
        ("visit_modality", text_column(records, |r| r.visit_modality.map(|m| m.as_str()))),
        ("insurance_type", text_column(records, |r| r.insurance_type.map(|i| i.as_str()))),
        ("referral_source", text_column(records, |r| r.referral_source.as_deref())),
        ("language", text_column(records, |r| r.language.as_deref())),
        ("zip3", text_column(records, |r| r.zip3.as_deref())),
        ("age_band", text_column(records, |r| r.age_band.as_deref())),
        ("lead_time_minutes", minutes_column(records, |r| r.lead_time_minutes)),
        ("wait_time_minutes", minutes_column(records, |r| r.wait_time_minutes)),
        ("visit_duration_minutes", minutes_column(records, |r| r.visit_duration_minutes)),
    ];

    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
        .collect();
    let arrays = columns.into_iter().map(|(_, array)| array).collect();

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

fn write_parquet<W: Write + Send>(records: &[CleanAppointment], out: W) -> Result<(), CleaningError> {
    let batch = record_batch(records)?;
    let mut writer = ArrowWriter::try_new(out, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn write_json<W: Write>(records: &[CleanAppointment], mut out: W) -> Result<(), CleaningError> {
    serde_json::to_writer_pretty(&mut out, records)?;
    out.flush()?;
    Ok(())
}
