// libs/ingest-cell/src/services/loader.rs
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, instrument};

use shared_models::{RawAppointment, REQUIRED_COLUMNS};

use crate::error::IngestError;
use crate::models::RawDataset;

/// Load raw appointments from a CSV file and run the basic schema checks.
#[instrument]
pub fn load_appointments(path: &Path) -> Result<RawDataset, IngestError> {
    if !path.exists() {
        return Err(IngestError::FileNotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let mut dataset = load_appointments_from_reader(file)?;
    dataset.source = Some(path.to_path_buf());

    info!(
        "Loaded {} raw appointment rows ({} columns) from {}",
        dataset.len(),
        dataset.columns.len(),
        path.display()
    );

    Ok(dataset)
}

/// Same checks as [`load_appointments`] over any reader.
pub fn load_appointments_from_reader<R: Read>(reader: R) -> Result<RawDataset, IngestError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::None)
        .from_reader(reader);

    let header = normalize_header(csv_reader.headers()?);
    csv_reader.set_headers(header.clone());
    let columns: Vec<String> = header.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in csv_reader.deserialize::<RawAppointment>() {
        rows.push(result?);
    }

    if rows.is_empty() {
        return Err(IngestError::EmptyDataset);
    }

    let missing = missing_columns(&columns);
    if !missing.is_empty() {
        return Err(IngestError::MissingColumns(missing));
    }

    let extra: Vec<&String> = columns
        .iter()
        .filter(|c| !REQUIRED_COLUMNS.contains(&c.as_str()))
        .collect();
    if !extra.is_empty() {
        debug!("Ignoring {} extra columns: {:?}", extra.len(), extra);
    }

    Ok(RawDataset::new(columns, rows))
}

/// Required columns absent from `columns`, sorted by name.
pub fn missing_columns(columns: &[String]) -> Vec<String> {
    let present: BTreeSet<&str> = columns.iter().map(String::as_str).collect();
    let missing: BTreeSet<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !present.contains(c))
        .collect();
    missing.into_iter().map(str::to_string).collect()
}

fn normalize_header(raw: &StringRecord) -> StringRecord {
    raw.iter()
        .map(|name| name.trim_start_matches('\u{feff}').trim())
        .collect()
}
