//! Value overlay merging.
//!
//! A release carries its configuration as an opaque JSON document. Updates
//! may supply `path.to.key=value` overrides which are merged onto the
//! stored document, helm `--set` style: dotted paths address nested keys,
//! commas separate multiple assignments within one string, and `\,`
//! escapes a literal comma inside a value.

use serde_json::{Map, Value};

use crate::error::CoreError;

/// Merges override assignments onto a base values document.
///
/// `base` may be empty. Override strings are processed in input order, so
/// later assignments win. Returns the canonical merged document with
/// sorted keys; on any parse failure the whole merge is aborted and the
/// base is left untouched.
pub fn merge_values(base: &str, overrides: &[String]) -> Result<String, CoreError> {
    let mut document = parse_document(base)?;
    for raw in overrides {
        for token in split_assignments(raw) {
            let (path, value) = parse_assignment(&token)?;
            apply_assignment(&mut document, &path, value);
        }
    }
    serialize_document(document)
}

fn parse_document(base: &str) -> Result<Map<String, Value>, CoreError> {
    if base.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str(base) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => {
            Err(CoreError::ValuesParse {
                reason: format!("expected an object at the top level, got {}", kind(&other)),
            })
        }
        Err(err) => {
            Err(CoreError::ValuesParse {
                reason: err.to_string(),
            })
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Splits one override string on commas, honoring `\,` escapes. Empty
/// tokens (from trailing or doubled commas) are dropped.
fn split_assignments(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                chars.next();
                current.push_str("\\,");
            }
            ',' => tokens.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    tokens.push(current);
    tokens.retain(|t| !t.is_empty());
    tokens
}

fn parse_assignment(token: &str) -> Result<(Vec<String>, Value), CoreError> {
    let (path, raw_value) = token.split_once('=').ok_or_else(|| {
        CoreError::InvalidOverride {
            token: token.to_string(),
            reason: "missing '=' between path and value".to_string(),
        }
    })?;
    if path.is_empty() {
        return Err(CoreError::InvalidOverride {
            token: token.to_string(),
            reason: "empty path".to_string(),
        });
    }
    let segments: Vec<String> = path.split('.').map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
        return Err(CoreError::InvalidOverride {
            token: token.to_string(),
            reason: "empty path segment".to_string(),
        });
    }
    Ok((segments, coerce_scalar(raw_value)))
}

/// Interprets an override value: boolean and null literals, then integer,
/// then float, otherwise a string (with comma escapes resolved).
fn coerce_scalar(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = raw.parse::<f64>() {
        if float.is_finite() && raw.chars().any(|c| c.is_ascii_digit()) {
            return Value::from(float);
        }
    }
    Value::String(raw.replace("\\,", ","))
}

fn apply_assignment(document: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((leaf, parents)) = path.split_last() else {
        return;
    };
    let mut node = document;
    for key in parents {
        let entry = node
            .entry(key.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        node = match entry.as_object_mut() {
            Some(map) => map,
            None => return,
        };
    }
    node.insert(leaf.clone(), value);
}

fn serialize_document(document: Map<String, Value>) -> Result<String, CoreError> {
    serde_json::to_string_pretty(&Value::Object(document)).map_err(|err| {
        CoreError::ValuesParse {
            reason: err.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn merge(base: &str, overrides: &[&str]) -> Result<String, CoreError> {
        let overrides: Vec<String> = overrides.iter().map(|s| s.to_string()).collect();
        merge_values(base, &overrides)
    }

    fn parsed(merged: &str) -> Value {
        serde_json::from_str(merged).unwrap()
    }

    #[test]
    fn test_override_precedence() {
        let merged = merge(r#"{"foo": 42}"#, &["foo=24"]).unwrap();
        assert_eq!(parsed(&merged), json!({"foo": 24}));
    }

    #[test]
    fn test_multi_assignment_swap() {
        let merged = merge(
            r#"{"bar": "value1", "foo": "value2"}"#,
            &["bar=value2,foo=value1"],
        )
        .unwrap();
        assert_eq!(parsed(&merged), json!({"bar": "value2", "foo": "value1"}));
    }

    #[test]
    fn test_nested_path_preserves_siblings() {
        let merged = merge(
            r#"{"foo": {"bar": "value1", "baz": "keep"}}"#,
            &["foo.bar=value2"],
        )
        .unwrap();
        assert_eq!(
            parsed(&merged),
            json!({"foo": {"bar": "value2", "baz": "keep"}})
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let overrides = vec!["a.b=1".to_string(), "a.c=two,d=true".to_string()];
        let once = merge_values(r#"{"a": {"z": 9}}"#, &overrides).unwrap();
        let twice = merge_values(&once, &overrides).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_base_creates_intermediates() {
        let merged = merge("", &["outer.middle.inner=leaf"]).unwrap();
        assert_eq!(
            parsed(&merged),
            json!({"outer": {"middle": {"inner": "leaf"}}})
        );
    }

    #[test]
    fn test_scalar_replaced_by_map_on_deeper_path() {
        let merged = merge(r#"{"foo": "scalar"}"#, &["foo.bar=1"]).unwrap();
        assert_eq!(parsed(&merged), json!({"foo": {"bar": 1}}));
    }

    #[test]
    fn test_later_assignment_wins() {
        let merged = merge("", &["key=first", "key=second"]).unwrap();
        assert_eq!(parsed(&merged), json!({"key": "second"}));
    }

    #[test]
    fn test_escaped_comma_in_value() {
        let merged = merge("", &[r"hosts=a\,b,port=80"]).unwrap();
        assert_eq!(parsed(&merged), json!({"hosts": "a,b", "port": 80}));
    }

    #[test]
    fn test_scalar_coercion() {
        let merged = merge(
            "",
            &["int=7", "float=1.5", "flag=true", "off=false", "none=null", "text=1.2.3"],
        )
        .unwrap();
        assert_eq!(
            parsed(&merged),
            json!({
                "int": 7,
                "float": 1.5,
                "flag": true,
                "off": false,
                "none": null,
                "text": "1.2.3"
            })
        );
    }

    #[test]
    fn test_trailing_comma_is_tolerated() {
        let merged = merge("", &["a=1,"]).unwrap();
        assert_eq!(parsed(&merged), json!({"a": 1}));
    }

    #[test]
    fn test_canonical_output_sorts_keys() {
        let merged = merge("", &["zeta=1,alpha=2,mid.b=3,mid.a=4"]).unwrap();
        let alpha = merged.find(r#""alpha""#).unwrap();
        let mid = merged.find(r#""mid""#).unwrap();
        let zeta = merged.find(r#""zeta""#).unwrap();
        assert!(alpha < mid && mid < zeta);
    }

    #[test]
    fn test_missing_equals_is_an_error() {
        let err = merge(r#"{"keep": 1}"#, &["noequals"]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidOverride { .. }));
    }

    #[test]
    fn test_empty_path_segment_is_an_error() {
        for bad in ["=v", "a..b=1", ".a=1", "a.=1"] {
            let err = merge("", &[bad]).unwrap_err();
            assert!(
                matches!(err, CoreError::InvalidOverride { .. }),
                "expected InvalidOverride for {bad:?}"
            );
        }
    }

    #[test]
    fn test_non_object_base_is_an_error() {
        let err = merge("[1, 2]", &["a=1"]).unwrap_err();
        assert!(matches!(err, CoreError::ValuesParse { .. }));
    }

    #[test]
    fn test_failure_reports_offending_token() {
        let err = merge("", &["good=1,bad"]).unwrap_err();
        let CoreError::InvalidOverride { token, .. } = err else {
            panic!("expected InvalidOverride");
        };
        assert_eq!(token, "bad");
    }
}
