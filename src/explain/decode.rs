// src/explain/decode.rs

//! Best-effort decoding of search responses.
//!
//! The response shape is `{ result: [ { neuron: { ..., explanations: [ { description } ] } } ] }`
//! but nothing about it is guaranteed. Only a body that is not JSON at all is
//! an error; every other irregularity drops the affected part:
//!
//! - `result` missing or not an array: no records.
//! - result entry without a non-empty `neuron` object: entry skipped.
//! - `neuron.explanations` missing or not an array: neuron skipped.
//! - explanation that is not an object: explanation skipped.
//! - `description` missing, null or not a string: [`NO_DESCRIPTION`].
//!
//! Records come out in result order, then explanation order.

use super::types::{ExplanationRecord, NO_DESCRIPTION};
use crate::error::RemoteError;
use serde_json::{Map, Value};
use tracing::{debug, trace};

pub fn decode_records(body: &str) -> Result<Vec<ExplanationRecord>, RemoteError> {
    let value: Value = serde_json::from_str(body).map_err(|e| RemoteError::decode(e.to_string()))?;
    Ok(records_from_value(&value))
}

pub fn records_from_value(value: &Value) -> Vec<ExplanationRecord> {
    let Some(results) = value.get("result").and_then(Value::as_array) else {
        debug!("Search response has no result array");
        return Vec::new();
    };

    let mut records = Vec::new();
    for (index, entry) in results.iter().enumerate() {
        let Some(neuron) = neuron_object(entry) else {
            trace!(result.index = index, "Skipping result without neuron");
            continue;
        };
        let Some(explanations) = neuron.get("explanations").and_then(Value::as_array) else {
            trace!(result.index = index, "Skipping neuron without explanations list");
            continue;
        };
        records.extend(
            explanations
                .iter()
                .filter_map(Value::as_object)
                .map(|explanation| ExplanationRecord {
                    description: description_of(explanation),
                    neuron: neuron.clone(),
                }),
        );
    }
    records
}

fn neuron_object(entry: &Value) -> Option<&Map<String, Value>> {
    entry
        .get("neuron")
        .and_then(Value::as_object)
        .filter(|neuron| !neuron.is_empty())
}

fn description_of(explanation: &Map<String, Value>) -> String {
    explanation
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or(NO_DESCRIPTION)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_description_with_neuron() {
        let body = r#"{"result":[{"neuron":{"name":"n1","explanations":[{"description":"d1"}]}}]}"#;
        let records = decode_records(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "d1");
        assert_eq!(records[0].neuron["name"], json!("n1"));
        assert_eq!(records[0].neuron["explanations"], json!([{"description": "d1"}]));
    }

    #[test]
    fn keeps_result_then_explanation_order() {
        let value = json!({"result": [
            {"neuron": {"index": "1", "explanations": [{"description": "a"}, {"description": "b"}]}},
            {"neuron": {"index": "2", "explanations": [{"description": "c"}]}}
        ]});
        let descriptions: Vec<_> = records_from_value(&value)
            .into_iter()
            .map(|r| r.description)
            .collect();
        assert_eq!(descriptions, vec!["a", "b", "c"]);
    }

    #[test]
    fn duplicates_are_not_collapsed() {
        let value = json!({"result": [
            {"neuron": {"index": "1", "explanations": [{"description": "same"}]}},
            {"neuron": {"index": "1", "explanations": [{"description": "same"}]}}
        ]});
        assert_eq!(records_from_value(&value).len(), 2);
    }

    #[test]
    fn missing_description_gets_placeholder() {
        let value = json!({"result": [
            {"neuron": {"explanations": [{}, {"description": null}, {"description": 7}]}}
        ]});
        let records = records_from_value(&value);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.description == NO_DESCRIPTION));
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let value = json!({"result": [
            {"activation": 1.0},
            {"neuron": {}},
            {"neuron": "not an object"},
            {"neuron": {"name": "n", "explanations": {"description": "not a list"}}},
            {"neuron": {"name": "n"}},
            {"neuron": {"name": "n", "explanations": ["bare string", {"description": "kept"}]}}
        ]});
        let records = records_from_value(&value);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "kept");
    }

    #[test]
    fn missing_or_odd_result_is_empty() {
        assert!(records_from_value(&json!({})).is_empty());
        assert!(records_from_value(&json!({"result": {"neuron": {}}})).is_empty());
        assert!(records_from_value(&json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn non_json_body_is_a_decode_error() {
        let err = decode_records("<html>oops</html>").unwrap_err();
        assert!(matches!(err, RemoteError::Decode { .. }));
    }
}
