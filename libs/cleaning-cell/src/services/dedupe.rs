// libs/cleaning-cell/src/services/dedupe.rs
use std::collections::BTreeMap;

use tracing::debug;

use shared_models::CleanAppointment;

/// Keep one row per `appointment_id`: the one with the latest `created_at`.
///
/// A missing `created_at` ranks below any value, and on a full tie the row that
/// appears later in the input wins. Output is ordered by `appointment_id`.
/// Returns the survivors and the number of rows dropped.
pub fn dedupe_latest_created_at(records: Vec<CleanAppointment>) -> (Vec<CleanAppointment>, usize) {
    let total = records.len();
    let mut latest: BTreeMap<String, CleanAppointment> = BTreeMap::new();

    for record in records {
        let superseded = latest
            .get(&record.appointment_id)
            .is_some_and(|kept| kept.created_at > record.created_at);
        if !superseded {
            latest.insert(record.appointment_id.clone(), record);
        }
    }

    let removed = total - latest.len();
    if removed > 0 {
        debug!("Dropped {} duplicate appointment rows", removed);
    }

    (latest.into_values().collect(), removed)
}
