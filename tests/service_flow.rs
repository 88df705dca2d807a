//! Service Flow Tests
//!
//! End-to-end behavior of the API handler over both store backends:
//! - Register, submit, fetch round trip
//! - Rejected records never reach the record store
//! - Failure tallies count records, not violations
//! - File-backed state survives reopen
//! - Rebuild and recompute mode agree with incremental folding
//! - Concurrent submits lose no updates
//! - Values that would overflow the statistics are refused before any write

use std::sync::Arc;
use std::thread;

use serde_json::{json, Value};
use shapestat::api::{AnalysisMode, ApiHandler};
use shapestat::stats::{AnalysisRecord, StatisticsNode};
use shapestat::store::Stores;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn classroom_fields() -> Value {
    json!([
        {"name": "classroomName", "type": "string"},
        {"name": "classroomLimit", "type": "int"},
        {"name": "professor", "type": "customobject", "field_attributes": [
            {"name": "name", "type": "string"},
            {"name": "yearsAtRice", "type": "int"}
        ]}
    ])
}

fn classroom(limit: i32, years: i32) -> Value {
    json!({
        "classroomName": "Duncan Hall 1072",
        "classroomLimit": limit,
        "professor": {"name": "Swong", "yearsAtRice": years}
    })
}

fn years(analysis: &AnalysisRecord) -> (u64, f64, f64) {
    let stats = analysis
        .statistics
        .find("professor.yearsAtRice")
        .and_then(StatisticsNode::stats)
        .unwrap();
    (stats.count(), stats.mean(), stats.std_dev())
}

fn registered(mode: AnalysisMode) -> ApiHandler {
    let handler = ApiHandler::in_memory(mode);
    handler.register_schema("rooms", &classroom_fields()).unwrap();
    handler
}

// =============================================================================
// In-Memory Flow
// =============================================================================

/// Fresh registration returns a zeroed analysis.
#[test]
fn test_register_returns_zeroed_analysis() {
    let handler = ApiHandler::in_memory(AnalysisMode::Incremental);
    let analysis = handler.register_schema("rooms", &classroom_fields()).unwrap();
    assert_eq!(analysis.id, "rooms");
    assert_eq!(analysis.number_of_records, 0);
    assert_eq!(years(&analysis), (0, 0.0, 0.0));
    assert_eq!(handler.schema_ids().unwrap(), vec!["rooms".to_string()]);
}

/// Two clean records give count 2, mean 15, deviation 5.
#[test]
fn test_submit_and_fetch() {
    let handler = registered(AnalysisMode::Incremental);
    assert!(handler.submit_record("rooms", &classroom(65, 10)).unwrap().accepted);
    assert!(handler.submit_record("rooms", &classroom(65, 20)).unwrap().accepted);

    let analysis = handler.fetch_analysis("rooms").unwrap();
    assert_eq!(analysis.number_of_records, 2);
    assert_eq!(years(&analysis), (2, 15.0, 5.0));
    assert_eq!(handler.stores().records.count("rooms").unwrap(), 2);
}

/// A record with two bad values and one extra field bumps the bad
/// tally once and the extra tally once, and is not stored.
#[test]
fn test_rejection_tallies_once_per_kind() {
    let handler = registered(AnalysisMode::Incremental);
    let outcome = handler
        .submit_record(
            "rooms",
            &json!({
                "classroomName": 1072,
                "classroomLimit": "65",
                "professor": {"name": "Swong", "yearsAtRice": 10},
                "building": "Duncan"
            }),
        )
        .unwrap();
    assert!(!outcome.accepted);
    assert!(outcome.record_id.is_none());
    assert_eq!(outcome.outcome.bad_value_count, 2);
    assert_eq!(outcome.outcome.extra_field_count, 1);
    assert_eq!(outcome.violations.len(), 3);

    let analysis = handler.fetch_analysis("rooms").unwrap();
    assert_eq!(analysis.number_of_records, 0);
    assert_eq!(analysis.bad_value_count, 1);
    assert_eq!(analysis.missing_field_count, 0);
    assert_eq!(analysis.extra_field_count, 1);
    assert_eq!(handler.stores().records.count("rooms").unwrap(), 0);
}

/// Unknown identifiers and duplicates surface as typed errors.
#[test]
fn test_error_codes() {
    let handler = registered(AnalysisMode::Incremental);
    let dup = handler.register_schema("rooms", &classroom_fields()).unwrap_err();
    assert_eq!(dup.code(), "SHAPE_SCHEMA_ALREADY_EXISTS");
    assert_eq!(dup.status(), 409);

    let unknown = handler.submit_record("halls", &classroom(1, 1)).unwrap_err();
    assert_eq!(unknown.code(), "SHAPE_UNKNOWN_SCHEMA");
    assert_eq!(unknown.status(), 404);

    let null = handler
        .submit_record("rooms", &json!({"classroomName": null}))
        .unwrap_err();
    assert_eq!(null.status(), 400);

    let bad_id = handler.fetch_analysis("../etc").unwrap_err();
    assert_eq!(bad_id.status(), 400);
}

/// A failed registration leaves nothing behind.
#[test]
fn test_invalid_schema_is_not_stored() {
    let handler = ApiHandler::in_memory(AnalysisMode::Incremental);
    let err = handler
        .register_schema("rooms", &json!([{"name": "x", "type": "complex"}]))
        .unwrap_err();
    assert_eq!(err.status(), 400);
    assert!(handler.schema_ids().unwrap().is_empty());
    assert_eq!(handler.fetch_analysis("rooms").unwrap_err().status(), 404);
}

/// Recompute mode reports the same statistics as incremental mode.
#[test]
fn test_recompute_mode_agrees() {
    let incremental = registered(AnalysisMode::Incremental);
    let recompute = registered(AnalysisMode::Recompute);
    for (limit, y) in [(65, 10), (40, 20), (120, 3)] {
        incremental.submit_record("rooms", &classroom(limit, y)).unwrap();
        recompute.submit_record("rooms", &classroom(limit, y)).unwrap();
    }
    let a = incremental.fetch_analysis("rooms").unwrap();
    let b = recompute.fetch_analysis("rooms").unwrap();
    assert_eq!(a.number_of_records, b.number_of_records);
    assert!(a.statistics.approx_eq(&b.statistics, 1e-9));
}

/// Rebuild replaces statistics from the record log and keeps tallies.
#[test]
fn test_rebuild_keeps_tallies() {
    let handler = registered(AnalysisMode::Incremental);
    handler.submit_record("rooms", &classroom(65, 10)).unwrap();
    handler.submit_record("rooms", &json!({"extra": true})).unwrap();
    handler.submit_record("rooms", &classroom(65, 20)).unwrap();

    let before = handler.fetch_analysis("rooms").unwrap();
    let rebuilt = handler.rebuild_analysis("rooms").unwrap();
    assert_eq!(rebuilt.number_of_records, 2);
    assert_eq!(rebuilt.missing_field_count, before.missing_field_count);
    assert_eq!(rebuilt.extra_field_count, 1);
    assert!(rebuilt.statistics.approx_eq(&before.statistics, 1e-9));
}

/// Parallel submits under the global lock all land.
#[test]
fn test_concurrent_submits_lose_no_updates() {
    let handler = Arc::new(registered(AnalysisMode::Incremental));
    let workers: Vec<_> = (0..8)
        .map(|w| {
            let handler = Arc::clone(&handler);
            thread::spawn(move || {
                for i in 0..25 {
                    handler
                        .submit_record("rooms", &classroom(w * 100 + i, i))
                        .unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    let analysis = handler.fetch_analysis("rooms").unwrap();
    assert_eq!(analysis.number_of_records, 200);
    assert_eq!(years(&analysis).0, 200);
}

// =============================================================================
// Line Envelope
// =============================================================================

#[test]
fn test_envelope_round_trip() {
    let handler = ApiHandler::in_memory(AnalysisMode::Incremental);
    let register = json!({"op": "register", "schema_id": "rooms", "fields": classroom_fields()});
    let response: Value =
        serde_json::from_str(&handler.handle(&register.to_string()).to_json()).unwrap();
    assert_eq!(response["status"], "ok");

    let submit = json!({"op": "submit", "schema_id": "rooms", "record": classroom(65, 10)});
    let response: Value =
        serde_json::from_str(&handler.handle(&submit.to_string()).to_json()).unwrap();
    assert_eq!(response["data"]["accepted"], true);

    let response: Value = serde_json::from_str(
        &handler
            .handle(r#"{"op": "schema", "schema_id": "rooms"}"#)
            .to_json(),
    )
    .unwrap();
    assert_eq!(response["data"], classroom_fields());

    let response = handler.handle(r#"{"op": "drop", "schema_id": "rooms"}"#);
    assert!(!response.is_success());
    assert!(response.to_json().contains("SHAPE_UNKNOWN_OPERATION"));
}

// =============================================================================
// File Backend
// =============================================================================

/// Schemas, records, and analyses survive closing and reopening.
#[test]
fn test_file_backend_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let handler = ApiHandler::new(
            Stores::open_dir(dir.path()).unwrap(),
            AnalysisMode::Incremental,
        );
        handler.register_schema("rooms", &classroom_fields()).unwrap();
        handler.submit_record("rooms", &classroom(65, 10)).unwrap();
        handler.submit_record("rooms", &classroom(65, 20)).unwrap();
        handler.submit_record("rooms", &json!({"classroomName": "x"})).unwrap();
    }

    let handler = ApiHandler::new(
        Stores::open_dir(dir.path()).unwrap(),
        AnalysisMode::Incremental,
    );
    assert_eq!(handler.schema_ids().unwrap(), vec!["rooms".to_string()]);
    let analysis = handler.fetch_analysis("rooms").unwrap();
    assert_eq!(analysis.number_of_records, 2);
    assert_eq!(analysis.missing_field_count, 1);
    assert_eq!(years(&analysis), (2, 15.0, 5.0));

    let dup = handler.register_schema("rooms", &classroom_fields()).unwrap_err();
    assert_eq!(dup.status(), 409);
}

/// A lost analysis file is rebuilt from the record log.
#[test]
fn test_missing_analysis_is_rebuilt() {
    let dir = TempDir::new().unwrap();
    {
        let handler = ApiHandler::new(
            Stores::open_dir(dir.path()).unwrap(),
            AnalysisMode::Incremental,
        );
        handler.register_schema("rooms", &classroom_fields()).unwrap();
        handler.submit_record("rooms", &classroom(65, 10)).unwrap();
        handler.submit_record("rooms", &classroom(65, 20)).unwrap();
    }
    std::fs::remove_file(dir.path().join("analysis").join("analysis_rooms.json")).unwrap();

    let handler = ApiHandler::new(
        Stores::open_dir(dir.path()).unwrap(),
        AnalysisMode::Incremental,
    );
    let analysis = handler.fetch_analysis("rooms").unwrap();
    assert_eq!(analysis.number_of_records, 2);
    assert_eq!(years(&analysis), (2, 15.0, 5.0));
}

fn open_handler(dir: &TempDir) -> ApiHandler {
    ApiHandler::new(
        Stores::open_dir(dir.path()).unwrap(),
        AnalysisMode::Incremental,
    )
}

/// Doubles of opposite sign near the f64 limit are refused with 422
/// and leave the persisted analysis readable.
#[test]
fn test_extreme_doubles_never_reach_storage() {
    let dir = TempDir::new().unwrap();
    let handler = open_handler(&dir);
    handler
        .register_schema("m", &json!([{"name": "x", "type": "double"}]))
        .unwrap();
    assert!(handler.submit_record("m", &json!({"x": 1.7e308})).unwrap().accepted);

    let err = handler.submit_record("m", &json!({"x": -1.7e308})).unwrap_err();
    assert_eq!(err.code(), "SHAPE_STATISTICS_OVERFLOW");
    assert_eq!(err.status(), 422);
    assert_eq!(handler.stores().records.count("m").unwrap(), 1);

    assert!(handler.submit_record("m", &json!({"x": 1.7e308})).unwrap().accepted);
    drop(handler);

    let handler = open_handler(&dir);
    let analysis = handler.fetch_analysis("m").unwrap();
    assert_eq!(analysis.number_of_records, 2);
    let x = analysis.statistics.find("x").and_then(StatisticsNode::stats).unwrap();
    assert_eq!(x.mean(), 1.7e308);
    assert_eq!(x.std_dev(), 0.0);
    assert_eq!(handler.rebuild_analysis("m").unwrap().number_of_records, 2);
}

/// Rebuild replaces an analysis file that no longer decodes.
#[test]
fn test_rebuild_replaces_unreadable_analysis() {
    let dir = TempDir::new().unwrap();
    {
        let handler = open_handler(&dir);
        handler
            .register_schema("m", &json!([{"name": "x", "type": "double"}]))
            .unwrap();
        handler.submit_record("m", &json!({"x": 2.0})).unwrap();
        handler.submit_record("m", &json!({"x": 4.0})).unwrap();
    }
    let damaged = json!({
        "id": "m",
        "number_of_records": 2,
        "bad_value_count": 0,
        "missing_field_count": 0,
        "extra_field_count": 0,
        "statistics": [{"name": "x", "type": "double", "count": 2, "mean": null}]
    });
    std::fs::write(
        dir.path().join("analysis").join("analysis_m.json"),
        damaged.to_string(),
    )
    .unwrap();

    let handler = open_handler(&dir);
    assert_eq!(
        handler.fetch_analysis("m").unwrap_err().code(),
        "SHAPE_STORE_CORRUPTION"
    );
    let rebuilt = handler.rebuild_analysis("m").unwrap();
    assert_eq!(rebuilt.number_of_records, 2);
    let x = rebuilt.statistics.find("x").and_then(StatisticsNode::stats).unwrap();
    assert_eq!(x.mean(), 3.0);
    assert_eq!(x.std_dev(), 1.0);
    assert_eq!(handler.fetch_analysis("m").unwrap(), rebuilt);
}

/// Large same-sign values give the same finite mean either way.
#[test]
fn test_huge_values_agree_across_modes() {
    let fields = json!([{"name": "x", "type": "double"}]);
    let incremental = ApiHandler::in_memory(AnalysisMode::Incremental);
    let recompute = ApiHandler::in_memory(AnalysisMode::Recompute);
    for handler in [&incremental, &recompute] {
        handler.register_schema("m", &fields).unwrap();
        handler.submit_record("m", &json!({"x": 1e308})).unwrap();
        handler.submit_record("m", &json!({"x": 1e308})).unwrap();
    }
    let a = incremental.fetch_analysis("m").unwrap();
    let b = recompute.fetch_analysis("m").unwrap();
    assert_eq!(b.statistics.find("x").and_then(StatisticsNode::stats).unwrap().mean(), 1e308);
    assert!(a.statistics.approx_eq(&b.statistics, 1e-12));
}
