// =====================================================================================
// INGEST CELL INTEGRATION TESTS
// =====================================================================================

use std::io::Write;
use std::path::PathBuf;

use assert_matches::assert_matches;
use tempfile::NamedTempFile;

use ingest_cell::{load_appointments, load_appointments_from_reader, IngestError};
use shared_models::REQUIRED_COLUMNS;

fn header() -> String {
    REQUIRED_COLUMNS.join(",")
}

fn row(id: &str, status: &str) -> String {
    format!(
        "{id},P1,PR1,C1,2024-01-10 09:00:00,2024-01-10 09:30:00,2024-01-02 12:00:00,,,,,,{status},,Y,,therapy,in_person,medicaid,self,english,021,25-34"
    )
}

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_valid_file() {
    let file = write_csv(&format!("{}\n{}\n{}\n", header(), row("A1", "Completed"), row("A2", "")));

    let dataset = load_appointments(file.path()).unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.source.as_deref(), Some(file.path()));
    assert_eq!(dataset.columns.len(), REQUIRED_COLUMNS.len());

    let first = &dataset.rows[0];
    assert_eq!(first.appointment_id.as_deref(), Some("A1"));
    // Values are not cleaned on load.
    assert_eq!(first.status.as_deref(), Some("Completed"));
    assert_eq!(first.check_in_time, None);
    assert_eq!(dataset.rows[1].status, None);
}

#[test]
fn test_missing_file() {
    let path = PathBuf::from("/definitely/not/here/appointments.csv");
    assert_matches!(load_appointments(&path), Err(IngestError::FileNotFound(p)) if p == path);
}

#[test]
fn test_header_only_file_is_empty() {
    let file = write_csv(&format!("{}\n", header()));
    assert_matches!(load_appointments(file.path()), Err(IngestError::EmptyDataset));
}

#[test]
fn test_zero_byte_file_is_empty() {
    let file = write_csv("");
    assert_matches!(load_appointments(file.path()), Err(IngestError::EmptyDataset));
}

#[test]
fn test_missing_columns_are_reported_sorted() {
    let csv = "appointment_id,status\nA1,completed\n";
    let result = load_appointments_from_reader(csv.as_bytes());

    match result {
        Err(IngestError::MissingColumns(missing)) => {
            assert_eq!(missing.len(), REQUIRED_COLUMNS.len() - 2);
            let mut sorted = missing.clone();
            sorted.sort();
            assert_eq!(missing, sorted);
            assert!(missing.contains(&"zip3".to_string()));
            assert!(!missing.contains(&"status".to_string()));
        }
        other => panic!("expected MissingColumns, got {:?}", other),
    }
}

#[test]
fn test_extra_columns_are_tolerated() {
    let csv = format!("{},notes\n{},free text\n", header(), row("A1", "no show"));
    let dataset = load_appointments_from_reader(csv.as_bytes()).unwrap();

    assert_eq!(dataset.len(), 1);
    assert!(dataset.has_column("notes"));
}

#[test]
fn test_ragged_row_is_malformed() {
    let csv = format!("{}\n{}\nA2,P2\n", header(), row("A1", "completed"));
    assert_matches!(
        load_appointments_from_reader(csv.as_bytes()),
        Err(IngestError::Csv(_))
    );
}
