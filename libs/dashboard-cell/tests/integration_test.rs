// =====================================================================================
// DASHBOARD CELL INTEGRATION TESTS
// =====================================================================================

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use cleaning_cell::load_and_clean;
use dashboard_cell::{dashboard_routes, DashboardState};

fn setup_router() -> Router {
    // Shared with the cleaning cell's tests.
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../cleaning-cell/tests/fixtures/appointments_messy.csv");
    let dataset = load_and_clean(&path).expect("fixture should load");
    dashboard_routes(Arc::new(DashboardState::new(dataset).with_source(path)))
}

async fn get_json(uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = setup_router().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_metrics_over_whole_dataset() {
    let (status, json) = get_json("/metrics").await;
    assert_eq!(status, StatusCode::OK);

    let metrics = &json["metrics"];
    assert_eq!(metrics["volume"], 9);
    assert_eq!(metrics["status_counts"]["completed"], 3);
    assert_eq!(metrics["status_counts"]["canceled"], 2);
    assert_eq!(metrics["status_counts"]["no_show"], 2);
    assert_eq!(metrics["status_counts"]["rescheduled"], 1);
    assert_eq!(metrics["status_counts"]["unknown"], 1);
    assert_eq!(metrics["completion_rate"], 0.375);
    assert_eq!(metrics["no_show_rate"], 0.25);
    assert_eq!(metrics["median_lead_time_minutes"], 8760.0);
    assert_eq!(metrics["median_wait_time_minutes"], 3.5);
    assert_eq!(metrics["median_visit_duration_minutes"], 45.0);
    assert_eq!(metrics["negative_duration_count"], 1);
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_metrics_filtered_by_clinic() {
    let (status, json) = get_json("/metrics?clinic_id=CL-A").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["filter"]["clinic_id"], "CL-A");
    assert_eq!(json["metrics"]["volume"], 4);
    assert_eq!(json["metrics"]["completion_rate"], 0.5);
}

#[tokio::test]
async fn test_metrics_filtered_by_date_and_status() {
    let (_, json) = get_json("/metrics?start_date=2024-03-11").await;
    assert_eq!(json["metrics"]["volume"], 3);

    let (_, json) = get_json("/metrics?status=No-Show").await;
    assert_eq!(json["filter"]["status"], "no_show");
    assert_eq!(json["metrics"]["volume"], 2);
    assert_eq!(json["metrics"]["no_show_rate"], 1.0);
}

#[tokio::test]
async fn test_invalid_filter_is_bad_request() {
    let (status, json) = get_json("/metrics?status=pending").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("pending"));

    let (status, _) = get_json("/metrics?start_date=2024-03-10&end_date=2024-03-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_breakdown_by_clinic() {
    let (status, json) = get_json("/metrics/breakdown?group_by=clinic").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["group_by"], "clinic");
    let groups = json["groups"].as_array().unwrap();
    let keys: Vec<&str> = groups.iter().map(|g| g["key"].as_str().unwrap()).collect();
    assert_eq!(keys, vec!["CL-A", "CL-B", "CL-C"]);
    assert_eq!(groups[1]["metrics"]["volume"], 3);
    assert_eq!(groups[2]["metrics"]["volume"], 2);
}

#[tokio::test]
async fn test_breakdown_by_day() {
    let (status, json) = get_json("/metrics/breakdown?group_by=day").await;
    assert_eq!(status, StatusCode::OK);

    let groups = json["groups"].as_array().unwrap();
    let first = &groups[0];
    assert_eq!(first["key"], "2024-03-04");
    assert_eq!(first["metrics"]["volume"], 2);

    // APT-0006 has an unparseable scheduled_start.
    let last = groups.last().unwrap();
    assert_eq!(last["key"], "unknown");
    assert_eq!(last["metrics"]["volume"], 1);

    let total: u64 = groups.iter().map(|g| g["metrics"]["volume"].as_u64().unwrap()).sum();
    assert_eq!(total, 9);
}

#[tokio::test]
async fn test_breakdown_requires_known_group() {
    let (status, json) = get_json("/metrics/breakdown?group_by=weather").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("weather"));

    let (status, json) = get_json("/metrics/breakdown").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("group_by is required"));
}

#[tokio::test]
async fn test_filter_options() {
    let (status, json) = get_json("/filters").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["clinics"], serde_json::json!(["CL-A", "CL-B", "CL-C"]));
    assert_eq!(json["first_scheduled_date"], "2024-03-04");
    assert_eq!(json["last_scheduled_date"], "2024-03-13");
    assert!(json["statuses"].as_array().unwrap().contains(&Value::from("rescheduled")));
}

#[tokio::test]
async fn test_quality_report() {
    let (status, json) = get_json("/quality").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["raw_rows"], 11);
    assert_eq!(json["clean_rows"], 9);
    assert_eq!(json["duplicates_removed"], 1);
    assert_eq!(json["visit_end_before_start"], 1);
}

#[tokio::test]
async fn test_appointments_paging() {
    let (status, json) = get_json("/appointments?limit=2&offset=1").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["total"], 9);
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["appointment_id"], "APT-0002");
    assert_eq!(items[1]["appointment_id"], "APT-0003");

    let (status, _) = get_json("/appointments?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_paging_is_json_bad_request() {
    for uri in ["/appointments?limit=abc", "/appointments?offset=-1"] {
        let (status, json) = get_json(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        let message = json["error"].as_str().unwrap_or_else(|| panic!("{uri}: no JSON error body"));
        assert!(message.starts_with("Invalid query string"), "{uri}: {message}");
    }
}
