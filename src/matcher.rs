//! Structural JSON payload matching.
//!
//! Decides whether a stub's expected payload is satisfied by an incoming
//! payload. Two disciplines: partial, where the actual payload may carry
//! fields beyond the expected ones, and exact, where field counts must
//! agree at every object level. Arrays are compared unordered but
//! length-strict in both disciplines.
//!
//! Comparison never fails: any structural disagreement short-circuits to
//! `false`. The functions here are pure and safe to call concurrently.

use serde_json::{Map, Value};

/// Partial match: every expected field must be present in `actual` with an
/// equal value; `actual` may carry additional fields.
pub fn matches(expected: &Map<String, Value>, actual: &Map<String, Value>) -> bool {
    compare(expected, actual, false)
}

/// Exact match: partial match, plus `actual` must have exactly the same
/// number of fields as `expected` at every object level.
pub fn equals(expected: &Map<String, Value>, actual: &Map<String, Value>) -> bool {
    compare(expected, actual, true)
}

fn compare(expected: &Map<String, Value>, actual: &Map<String, Value>, exact: bool) -> bool {
    if exact && expected.len() != actual.len() {
        return false;
    }
    expected.iter().all(|(field, value)| {
        actual
            .get(field)
            .map_or(false, |other| value_matches(value, other, exact))
    })
}

/// Kind-based dispatch for one expected/actual value pair.
fn value_matches(expected: &Value, actual: &Value, exact: bool) -> bool {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => compare(expected, actual, exact),
        (Value::Array(expected), Value::Array(actual)) => arrays_match(expected, actual, exact),
        // numbers compare numerically so 1 and 1.0 agree
        (Value::Number(expected), Value::Number(actual)) => expected.as_f64() == actual.as_f64(),
        (Value::String(expected), Value::String(actual)) => expected == actual,
        (Value::Bool(expected), Value::Bool(actual)) => expected == actual,
        (Value::Null, Value::Null) => true,
        // kinds differ
        _ => false,
    }
}

/// Unordered array comparison.
///
/// Lengths must agree even in partial mode. Each expected element needs
/// some matching actual element; an actual element may satisfy more than
/// one expected element.
fn arrays_match(expected: &[Value], actual: &[Value], exact: bool) -> bool {
    if expected.len() != actual.len() {
        return false;
    }
    expected
        .iter()
        .all(|item| actual.iter().any(|other| value_matches(item, other, exact)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn test_reflexive() {
        let value = obj(json!({"a": 1, "b": {"c": [1, 2, 3]}, "d": null}));
        assert!(matches(&value, &value));
        assert!(equals(&value, &value));
    }

    #[test]
    fn test_equals_implies_matches() {
        let expected = obj(json!({"a": 1, "b": {"c": 2}}));
        let actual = obj(json!({"a": 1, "b": {"c": 2}}));
        assert!(equals(&expected, &actual));
        assert!(matches(&expected, &actual));
    }

    #[test]
    fn test_partial_tolerates_extra_fields() {
        let expected = obj(json!({"a": 1}));
        let actual = obj(json!({"a": 1, "b": 2}));
        assert!(matches(&expected, &actual));
    }

    #[test]
    fn test_exact_rejects_extra_fields() {
        let expected = obj(json!({"a": 1}));
        let actual = obj(json!({"a": 1, "b": 2}));
        assert!(!equals(&expected, &actual));
    }

    #[test]
    fn test_missing_field_rejected() {
        let expected = obj(json!({"a": 1}));
        let actual = obj(json!({"b": 2}));
        assert!(!matches(&expected, &actual));
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let expected = obj(json!({"a": 1}));
        let actual = obj(json!({"a": "1"}));
        assert!(!matches(&expected, &actual));

        let expected = obj(json!({"a": {"b": 1}}));
        let actual = obj(json!({"a": [1]}));
        assert!(!matches(&expected, &actual));
    }

    #[test]
    fn test_scalar_mismatch_rejected() {
        let expected = obj(json!({"a": true}));
        let actual = obj(json!({"a": false}));
        assert!(!matches(&expected, &actual));
    }

    #[test]
    fn test_integer_and_float_agree() {
        let expected = obj(json!({"a": 1}));
        let actual = obj(json!({"a": 1.0}));
        assert!(matches(&expected, &actual));
        assert!(equals(&expected, &actual));
    }

    #[test]
    fn test_array_length_strict_in_partial_mode() {
        let expected = obj(json!({"a": [1]}));
        let actual = obj(json!({"a": [1, 2]}));
        assert!(!matches(&expected, &actual));
    }

    #[test]
    fn test_arrays_match_unordered() {
        let expected = obj(json!({"a": [1, 2]}));
        let actual = obj(json!({"a": [2, 1]}));
        assert!(matches(&expected, &actual));
        assert!(equals(&expected, &actual));
    }

    #[test]
    fn test_array_element_may_be_reused() {
        // two expected elements satisfied by the same actual element
        let expected = obj(json!({"a": [1, 1]}));
        let actual = obj(json!({"a": [1, 2]}));
        assert!(matches(&expected, &actual));
    }

    #[test]
    fn test_array_of_objects_unordered() {
        let expected = obj(json!({"a": [{"id": 2}, {"id": 1}]}));
        let actual = obj(json!({"a": [{"id": 1}, {"id": 2}]}));
        assert!(matches(&expected, &actual));
    }

    #[test]
    fn test_exact_applies_inside_array_elements() {
        let expected = obj(json!({"a": [{"b": 1}]}));
        let actual = obj(json!({"a": [{"b": 1, "c": 2}]}));
        assert!(matches(&expected, &actual));
        assert!(!equals(&expected, &actual));
    }

    #[test]
    fn test_nested_objects_recurse() {
        let expected = obj(json!({"a": {"b": 1}}));
        assert!(equals(&expected, &obj(json!({"a": {"b": 1}}))));
        assert!(!equals(&expected, &obj(json!({"a": {"b": 1, "c": 2}}))));
    }

    #[test]
    fn test_partial_recurses_into_nested_objects() {
        let expected = obj(json!({"a": {"b": 1}}));
        let actual = obj(json!({"a": {"b": 1, "c": 2}}));
        assert!(matches(&expected, &actual));

        let actual = obj(json!({"a": {"c": 2}}));
        assert!(!matches(&expected, &actual));
    }

    #[test]
    fn test_nested_arrays_recurse() {
        let expected = obj(json!({"a": [[1, 2]]}));
        let actual = obj(json!({"a": [[2, 1]]}));
        assert!(matches(&expected, &actual));

        let actual = obj(json!({"a": [[1, 2, 3]]}));
        assert!(!matches(&expected, &actual));
    }

    #[test]
    fn test_empty_expectation_matches_anything_partially() {
        let expected = Map::new();
        let actual = obj(json!({"a": 1}));
        assert!(matches(&expected, &actual));
        assert!(!equals(&expected, &actual));
        assert!(equals(&expected, &Map::new()));
    }
}
