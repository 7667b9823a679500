use std::path::PathBuf;

use shared_models::RawAppointment;

/// Raw rows plus the header they were read with.
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub source: Option<PathBuf>,
    pub columns: Vec<String>,
    pub rows: Vec<RawAppointment>,
}

impl RawDataset {
    pub fn new(columns: Vec<String>, rows: Vec<RawAppointment>) -> Self {
        Self {
            source: None,
            columns,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}
