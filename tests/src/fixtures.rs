//! Test fixtures and event generators.

use chrono::{DateTime, Duration, TimeZone, Utc};
use engine_core::Event;

/// Fixed base time so ordering assertions are deterministic.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// An event `minutes_after` the base time.
pub fn event(severity: &str, minutes_after: i64) -> Event {
    Event::new(
        "ids",
        "h1",
        severity,
        "port scan detected",
        base_time() + Duration::minutes(minutes_after),
    )
}

/// JSON body for `POST /events`.
pub fn event_json(severity: &str) -> serde_json::Value {
    event_json_at(severity, 0)
}

/// JSON body for `POST /events` with a timestamp offset from the base time.
pub fn event_json_at(severity: &str, minutes_after: i64) -> serde_json::Value {
    serde_json::to_value(event(severity, minutes_after)).unwrap()
}

/// The canonical healthy-scenario event.
pub fn scenario_event() -> serde_json::Value {
    serde_json::json!({
        "source": "ids",
        "host": "h1",
        "severity": "high",
        "message": "m",
        "timestamp": "2024-01-01T00:00:00Z"
    })
}

/// A body that is not JSON at all.
pub fn malformed_body() -> &'static str {
    r#"{"source": "ids", "host": "#
}

/// A valid event with one field removed.
pub fn event_without(field: &str) -> serde_json::Value {
    let mut value = scenario_event();
    if let Some(obj) = value.as_object_mut() {
        obj.remove(field);
    }
    value
}

/// A valid event with one field replaced.
pub fn event_with(field: &str, replacement: serde_json::Value) -> serde_json::Value {
    let mut value = scenario_event();
    value[field] = replacement;
    value
}
