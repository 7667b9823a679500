// libs/cleaning-cell/src/models.rs
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use shared_models::CleanAppointment;

/// Output of the cleaning stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanedDataset {
    pub records: Vec<CleanAppointment>,
    pub report: DataQualityReport,
}

impl CleanedDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimestampIssues {
    pub blank: usize,
    pub unparseable: usize,
    /// A handful of raw values that failed to parse.
    pub samples: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryIssues {
    pub blank: usize,
    pub unmapped: usize,
    pub unexpected_values: BTreeSet<String>,
}

/// What the cleaning stage saw and did. Column-level counts are taken over raw
/// rows; ordering anomalies over the deduplicated output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub raw_rows: usize,
    pub clean_rows: usize,
    pub duplicates_removed: usize,
    pub missing_id_rows: usize,
    pub timestamps: BTreeMap<String, TimestampIssues>,
    pub categories: BTreeMap<String, CategoryIssues>,
    pub booleans: BTreeMap<String, CategoryIssues>,
    pub visit_end_before_start: usize,
    pub canceled_after_scheduled_start: usize,
    pub negative_lead_time: usize,
}

impl DataQualityReport {
    pub fn unparseable_timestamps(&self) -> usize {
        self.timestamps.values().map(|t| t.unparseable).sum()
    }

    pub fn unmapped_categories(&self) -> usize {
        self.categories
            .values()
            .chain(self.booleans.values())
            .map(|c| c.unmapped)
            .sum()
    }

    pub fn has_unexpected_values(&self) -> bool {
        self.unparseable_timestamps() > 0 || self.unmapped_categories() > 0
    }
}
