use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Appointments file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Appointments dataset is empty")]
    EmptyDataset,

    #[error("Missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
