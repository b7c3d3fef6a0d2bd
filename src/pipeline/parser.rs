use super::types::{FieldMap, FieldValue, RawModelResponse};
use super::ExtractionError;

/// Parse the model's raw text into a field-value map.
///
/// Strict JSON first. If that fails, recover the largest balanced `{...}`
/// span (vision models like to wrap their answer in prose or fences) and
/// retry strictly on it. A non-object decode is a `ParseFailure` — the
/// contract demands a single object. `ParseFailure` is an expected outcome
/// here, not an exceptional one.
pub fn parse_response(raw: &RawModelResponse) -> Result<FieldMap, ExtractionError> {
    let text = raw.text.trim();
    if text.is_empty() {
        return Err(ExtractionError::ParseFailure("empty model response".into()));
    }

    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => object_to_field_map(value),
        Err(strict_err) => {
            let candidate = largest_balanced_object(text).ok_or_else(|| {
                ExtractionError::ParseFailure(format!("no JSON object found: {strict_err}"))
            })?;
            let value: serde_json::Value = serde_json::from_str(candidate)
                .map_err(|e| ExtractionError::ParseFailure(format!("recovered span: {e}")))?;
            object_to_field_map(value)
        }
    }
}

fn object_to_field_map(value: serde_json::Value) -> Result<FieldMap, ExtractionError> {
    match value {
        serde_json::Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
            .collect()),
        other => Err(ExtractionError::ParseFailure(format!(
            "model returned non-object JSON ({})",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Find the largest balanced `{...}` substring.
///
/// String-literal and escape aware, so braces inside JSON strings do not
/// unbalance the scan. Unmatched braces in surrounding prose are skipped by
/// restarting at the next `{`.
fn largest_balanced_object(text: &str) -> Option<&str> {
    let mut best: Option<(usize, usize)> = None;
    let mut i = 0;
    while let Some(offset) = text[i..].find('{') {
        let start = i + offset;
        match balanced_len(&text[start..]) {
            Some(len) => {
                let better = best.map_or(true, |(s, e)| len > e - s);
                if better {
                    best = Some((start, start + len));
                }
                // Starts inside this span are nested, hence shorter
                i = start + len;
            }
            None => i = start + 1,
        }
    }
    best.map(|(s, e)| &text[s..e])
}

/// Length of the balanced object starting at `text[0] == '{'`, if it closes.
fn balanced_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in text.bytes().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str) -> RawModelResponse {
        RawModelResponse {
            text: text.to_string(),
            provider_score: None,
        }
    }

    #[test]
    fn strict_object_parses() {
        let map = parse_response(&raw(r#"{"repairId": "R-2", "panelNumber": "12"}"#)).unwrap();
        assert_eq!(map.get("repairId"), Some(&FieldValue::Text("R-2".into())));
        assert_eq!(map.get("panelNumber"), Some(&FieldValue::Text("12".into())));
    }

    #[test]
    fn recovers_object_embedded_in_prose() {
        // Scenario D: leading prose before the JSON payload
        let text = "Here is the transcription you asked for:\n\
                    {\"dateTime\":\"2024-12-08T14:30\",\"panelNumber\":\"12\"}";
        let map = parse_response(&raw(text)).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(
            map.get("dateTime"),
            Some(&FieldValue::Text("2024-12-08T14:30".into()))
        );
    }

    #[test]
    fn recovers_object_inside_code_fence() {
        let text = "```json\n{\"seamNumber\": \"S-14\", \"result\": \"pass\"}\n```";
        let map = parse_response(&raw(text)).unwrap();
        assert_eq!(map.get("result"), Some(&FieldValue::Text("pass".into())));
    }

    #[test]
    fn braces_inside_strings_do_not_break_recovery() {
        let text = "note: {\"comments\": \"bracket } in text\", \"length\": 30}";
        let map = parse_response(&raw(text)).unwrap();
        assert_eq!(map.get("length"), Some(&FieldValue::Number(30.0)));
    }

    #[test]
    fn unmatched_brace_in_prose_is_skipped() {
        let text = "weird { prose, then the payload {\"width\": 7.5} trailing";
        let map = parse_response(&raw(text)).unwrap();
        assert_eq!(map.get("width"), Some(&FieldValue::Number(7.5)));
    }

    #[test]
    fn picks_the_largest_of_multiple_objects() {
        let text = "{\"a\": 1} and also {\"seamNumber\": \"S-1\", \"testDate\": \"2024-06-01\"}";
        let map = parse_response(&raw(text)).unwrap();
        assert!(map.contains_key("seamNumber"));
        assert!(!map.contains_key("a"));
    }

    #[test]
    fn bare_array_is_parse_failure() {
        let result = parse_response(&raw(r#"[{"repairId": "R-2"}]"#));
        assert!(matches!(result, Err(ExtractionError::ParseFailure(_))));
    }

    #[test]
    fn bare_scalar_is_parse_failure() {
        assert!(matches!(
            parse_response(&raw("42")),
            Err(ExtractionError::ParseFailure(_))
        ));
        assert!(matches!(
            parse_response(&raw("\"just a string\"")),
            Err(ExtractionError::ParseFailure(_))
        ));
    }

    #[test]
    fn plain_prose_is_parse_failure() {
        let result = parse_response(&raw("I could not read the form, sorry."));
        assert!(matches!(result, Err(ExtractionError::ParseFailure(_))));
    }

    #[test]
    fn empty_response_is_parse_failure() {
        assert!(matches!(
            parse_response(&raw("   ")),
            Err(ExtractionError::ParseFailure(_))
        ));
    }

    #[test]
    fn broken_json_with_no_recoverable_span_fails() {
        let result = parse_response(&raw("{\"repairId\": \"R-2\""));
        assert!(matches!(result, Err(ExtractionError::ParseFailure(_))));
    }

    #[test]
    fn null_and_number_values_survive_parsing() {
        let map =
            parse_response(&raw(r#"{"barrelTemp": 410, "wedgeTemp": null, "speed": 2.5}"#)).unwrap();
        assert_eq!(map.get("barrelTemp"), Some(&FieldValue::Number(410.0)));
        assert_eq!(map.get("wedgeTemp"), Some(&FieldValue::Null));
        assert_eq!(map.get("speed"), Some(&FieldValue::Number(2.5)));
    }

    #[test]
    fn nested_values_collapse_to_null() {
        let map = parse_response(&raw(r#"{"comments": {"nested": true}}"#)).unwrap();
        assert_eq!(map.get("comments"), Some(&FieldValue::Null));
    }
}
