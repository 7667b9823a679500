// =====================================================================================
// CLEANING CELL - RAW TO ANALYSIS-READY APPOINTMENTS
// =====================================================================================
//
// Turns messy raw rows into a consistent dataset while keeping operational edge
// cases visible:
// - Coerces mixed-format timestamps (unparseable values become missing)
// - Maps categorical columns onto canonical vocabularies
// - Parses boolean-like encodings
// - Deduplicates on appointment_id, keeping the latest booking
// - Derives lead time, wait time and visit duration in minutes
// - Reports every irregularity instead of failing on it
//
// =====================================================================================

pub mod error;
pub mod models;
pub mod services;

pub use error::CleaningError;
pub use models::{CategoryIssues, CleanedDataset, DataQualityReport, TimestampIssues};
pub use services::pipeline::{clean_appointments, load_and_clean};
pub use services::writer::{write_processed, OutputFormat};
