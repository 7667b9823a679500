// libs/cleaning-cell/src/services/quality.rs
use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use tracing::{info, warn};

use shared_models::CleanAppointment;

use crate::models::{CategoryIssues, DataQualityReport, TimestampIssues};
use crate::services::normalize::{is_known_boolish, norm_text, summarize_unexpected};

const MAX_TIMESTAMP_SAMPLES: usize = 5;

/// Accumulates per-column observations while rows are converted.
#[derive(Debug, Default)]
pub struct QualityReportBuilder {
    raw_rows: usize,
    missing_id_rows: usize,
    timestamps: BTreeMap<String, TimestampIssues>,
    categories: BTreeMap<String, CategoryIssues>,
    booleans: BTreeMap<String, CategoryIssues>,
    observed: BTreeMap<String, BTreeSet<String>>,
}

impl QualityReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_row(&mut self) {
        self.raw_rows += 1;
    }

    pub fn record_missing_id(&mut self) {
        self.missing_id_rows += 1;
    }

    pub fn record_timestamp(&mut self, column: &str, raw: Option<&str>, parsed: Option<NaiveDateTime>) {
        let entry = self.timestamps.entry(column.to_string()).or_default();
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => entry.blank += 1,
            Some(text) if parsed.is_none() => {
                entry.unparseable += 1;
                if entry.samples.len() < MAX_TIMESTAMP_SAMPLES {
                    entry.samples.insert(text.to_string());
                }
            }
            Some(_) => {}
        }
    }

    pub fn record_category(&mut self, column: &str, raw: Option<&str>, mapped: bool) {
        let entry = self.categories.entry(column.to_string()).or_default();
        let text = raw.map(norm_text).unwrap_or_default();
        if text.is_empty() {
            entry.blank += 1;
            return;
        }
        if !mapped {
            entry.unmapped += 1;
        }
        self.observed.entry(column.to_string()).or_default().insert(text);
    }

    pub fn record_boolean(&mut self, column: &str, raw: Option<&str>) {
        let entry = self.booleans.entry(column.to_string()).or_default();
        let text = raw.map(norm_text).unwrap_or_default();
        if text.is_empty() {
            entry.blank += 1;
        } else if !is_known_boolish(&text) {
            entry.unmapped += 1;
            entry.unexpected_values.insert(text);
        }
    }

    /// Close the report against the deduplicated output. `allowed` holds the
    /// accepted spellings for each categorical column.
    pub fn finish(
        mut self,
        records: &[CleanAppointment],
        duplicates_removed: usize,
        allowed: &BTreeMap<&str, BTreeSet<&str>>,
    ) -> DataQualityReport {
        for (column, observed) in &self.observed {
            if let (Some(entry), Some(allowed)) =
                (self.categories.get_mut(column), allowed.get(column.as_str()))
            {
                entry.unexpected_values =
                    summarize_unexpected(observed.iter().map(String::as_str), allowed);
            }
        }

        let report = DataQualityReport {
            raw_rows: self.raw_rows,
            clean_rows: records.len(),
            duplicates_removed,
            missing_id_rows: self.missing_id_rows,
            timestamps: self.timestamps,
            categories: self.categories,
            booleans: self.booleans,
            visit_end_before_start: records.iter().filter(|r| r.visit_ends_before_start()).count(),
            canceled_after_scheduled_start: records
                .iter()
                .filter(|r| r.canceled_after_scheduled_start())
                .count(),
            negative_lead_time: records
                .iter()
                .filter(|r| r.lead_time_minutes.is_some_and(|m| m < 0.0))
                .count(),
        };

        log_report(&report);
        report
    }
}

fn log_report(report: &DataQualityReport) {
    info!(
        "Cleaned {} raw rows into {} ({} duplicates removed, {} without appointment_id)",
        report.raw_rows, report.clean_rows, report.duplicates_removed, report.missing_id_rows
    );

    for (column, issues) in &report.timestamps {
        if issues.unparseable > 0 {
            warn!(
                "{}: {} unparseable timestamps coerced to missing (e.g. {:?})",
                column, issues.unparseable, issues.samples
            );
        }
    }
    for (column, issues) in report.categories.iter().chain(report.booleans.iter()) {
        if !issues.unexpected_values.is_empty() {
            warn!(
                "{}: {} rows with unexpected values {:?}",
                column, issues.unmapped, issues.unexpected_values
            );
        }
    }
    if report.visit_end_before_start > 0 {
        warn!("{} visits end before they start", report.visit_end_before_start);
    }
}
