use thiserror::Error;

use ingest_cell::IngestError;

#[derive(Error, Debug)]
pub enum CleaningError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Arrow batch error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}
