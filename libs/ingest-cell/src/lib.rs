// =====================================================================================
// INGEST CELL - RAW APPOINTMENT LOADING & SCHEMA VALIDATION
// =====================================================================================
//
// Loads the raw appointments CSV and checks that it has the expected shape.
// Values are never cleaned or transformed here; that is the cleaning cell's job.
//
// =====================================================================================

pub mod error;
pub mod models;
pub mod services;

pub use error::IngestError;
pub use models::RawDataset;
pub use services::loader::{load_appointments, load_appointments_from_reader, missing_columns};
