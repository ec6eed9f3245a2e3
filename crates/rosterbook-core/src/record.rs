// ABOUTME: Defines StudentRecord, an opaque JSON object identified by its `id` attribute.
// ABOUTME: Records round-trip verbatim; department and semester are optional lookup fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single student record. The shape is deliberately open: any
/// JSON-compatible object is accepted and stored verbatim. Only `id` is
/// required (it keys the primary store); `department` and `semester` are
/// optional, non-unique lookup fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentRecord(pub Map<String, Value>);

impl StudentRecord {
    /// The record's stable identity, if the `id` attribute is a string.
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn department(&self) -> Option<&str> {
        self.0.get("department").and_then(Value::as_str)
    }

    pub fn semester(&self) -> Option<&str> {
        self.0.get("semester").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> StudentRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn accessors_read_known_fields() {
        let r = record(json!({
            "id": "s-001",
            "department": "Physics",
            "semester": "3",
            "name": "Ada"
        }));

        assert_eq!(r.id(), Some("s-001"));
        assert_eq!(r.department(), Some("Physics"));
        assert_eq!(r.semester(), Some("3"));
    }

    #[test]
    fn missing_fields_are_none() {
        let r = record(json!({ "id": "s-002" }));

        assert_eq!(r.department(), None);
        assert_eq!(r.semester(), None);
    }

    #[test]
    fn non_string_id_is_none() {
        let r = record(json!({ "id": 42 }));

        assert_eq!(r.id(), None);
    }

    #[test]
    fn unknown_fields_round_trip_verbatim() {
        let original = json!({
            "id": "s-003",
            "grades": { "math": [90, 85] },
            "notes": null,
            "active": true
        });

        let r = record(original.clone());
        let back = serde_json::to_value(&r).unwrap();

        assert_eq!(back, original);
    }
}
