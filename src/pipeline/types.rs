use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::ExtractionError;
use crate::domain::DomainSchema;

/// A single extracted field value after typing/validation.
///
/// Replaces the loose dictionary values of the original system with a tagged
/// variant, so downstream code never runtime-casts.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Enum(String),
    Null,
}

impl FieldValue {
    /// Convert a raw model JSON scalar into an untyped value. Strings stay
    /// text until the validator types them; non-scalar JSON collapses to
    /// `Null` (the model was told scalars only).
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => Self::Number(f),
                None => Self::Null,
            },
            serde_json::Value::Bool(b) => Self::Text(b.to_string()),
            _ => Self::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) | Self::Enum(s) => serializer.serialize_str(s),
            Self::Number(n) => {
                // Whole values render as integers so "12" does not come back "12.0"
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Self::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => {
                serializer.serialize_str(&dt.format("%Y-%m-%dT%H:%M").to_string())
            }
            Self::Null => serializer.serialize_unit(),
        }
    }
}

/// Field name → value map produced by the parser and refined by the
/// validator. Keys are a subset of the domain's field names.
pub type FieldMap = BTreeMap<String, FieldValue>;

/// Fully-keyed output record for one domain: exactly the schema's field
/// names, in schema order, every value possibly `Null`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanonicalRecord {
    entries: Vec<(String, FieldValue)>,
}

impl CanonicalRecord {
    pub fn new(entries: Vec<(String, FieldValue)>) -> Self {
        Self { entries }
    }

    /// All-null record for a schema — the shape handed back on failure so
    /// the form can still render for manual entry.
    pub fn all_null(schema: &DomainSchema) -> Self {
        Self {
            entries: schema
                .fields
                .iter()
                .map(|f| (f.name.to_string(), FieldValue::Null))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Serialize for CanonicalRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Non-fatal, per-field validation outcome surfaced for operator visibility.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldWarning {
    pub field: String,
    pub kind: WarningKind,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Value was accepted after reformatting (e.g. "R - 5" → "R-5").
    Normalized,
    /// Value did not conform and was set to null.
    Rejected,
}

impl FieldWarning {
    pub fn normalized(field: &str, detail: String) -> Self {
        Self {
            field: field.to_string(),
            kind: WarningKind::Normalized,
            detail,
        }
    }

    pub fn rejected(field: &str, detail: String) -> Self {
        Self {
            field: field.to_string(),
            kind: WarningKind::Rejected,
            detail,
        }
    }
}

/// Taxonomy label on a PartialFailure envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ProviderTimeout,
    ProviderError,
    ProviderUnavailable,
    ParseFailure,
}

/// The uniform result envelope every extraction attempt produces — success
/// or not, the caller always gets a renderable record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub success: bool,
    pub confidence: f32,
    #[serde(rename = "extractedFields")]
    pub record: CanonicalRecord,
    pub warnings: Vec<FieldWarning>,
    #[serde(rename = "errorKind", skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(rename = "formType", skip_serializing_if = "Option::is_none")]
    pub form_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PipelineResult {
    pub fn success(
        record: CanonicalRecord,
        confidence: f32,
        warnings: Vec<FieldWarning>,
        form_type: &str,
    ) -> Self {
        Self {
            success: true,
            confidence,
            record,
            warnings,
            error_kind: None,
            form_type: Some(form_type.to_string()),
            message: None,
        }
    }

    /// Terminal failure envelope: all-null record so the form still renders
    /// and the technician can fill it manually.
    pub fn partial_failure(schema: &DomainSchema, error: &ExtractionError) -> Self {
        Self {
            success: false,
            confidence: 0.0,
            record: CanonicalRecord::all_null(schema),
            warnings: Vec::new(),
            error_kind: Some(error.kind()),
            form_type: Some(schema.domain.as_str().to_string()),
            message: Some(error.to_string()),
        }
    }
}

/// One extraction attempt's inputs, built once and never mutated.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub domain_id: String,
    /// System instruction block: strict JSON, prefixes kept, nulls not guesses.
    pub system: String,
    /// Domain instruction block enumerating the schema's fields.
    pub instructions: String,
    /// Raw image bytes; the client base64-encodes at the wire.
    pub image: Vec<u8>,
}

/// What came back from the provider, before parsing. Ephemeral.
#[derive(Debug, Clone)]
pub struct RawModelResponse {
    pub text: String,
    /// Provider-reported confidence, if the backend exposes one.
    pub provider_score: Option<f32>,
}

/// Vision-language provider abstraction (allows mocking).
pub trait VisionClient: Send + Sync {
    fn extract(&self, request: &ExtractionRequest) -> Result<RawModelResponse, ExtractionError>;

    fn is_model_available(&self, model: &str) -> Result<bool, ExtractionError>;

    fn list_models(&self) -> Result<Vec<String>, ExtractionError>;
}

/// Fallback collaborator for form types outside the six domains. Always
/// produces an envelope — failure handling is its own concern.
pub trait LegacyExtractor: Send + Sync {
    fn extract(&self, form_type: &str, image: &[u8], context: Option<&str>) -> PipelineResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain;

    #[test]
    fn field_value_from_json_scalars() {
        assert_eq!(
            FieldValue::from_json(&serde_json::json!("R-2")),
            FieldValue::Text("R-2".into())
        );
        assert_eq!(
            FieldValue::from_json(&serde_json::json!(4.25)),
            FieldValue::Number(4.25)
        );
        assert_eq!(FieldValue::from_json(&serde_json::json!(null)), FieldValue::Null);
        assert_eq!(
            FieldValue::from_json(&serde_json::json!(true)),
            FieldValue::Text("true".into())
        );
    }

    #[test]
    fn field_value_from_json_non_scalars_collapse_to_null() {
        assert_eq!(FieldValue::from_json(&serde_json::json!([1, 2])), FieldValue::Null);
        assert_eq!(
            FieldValue::from_json(&serde_json::json!({"a": 1})),
            FieldValue::Null
        );
    }

    #[test]
    fn date_values_serialize_in_form_format() {
        let date = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 12, 8).unwrap());
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2024-12-08\"");

        let dt = FieldValue::DateTime(
            NaiveDate::from_ymd_opt(2024, 12, 8)
                .unwrap()
                .and_hms_opt(14, 30, 0)
                .unwrap(),
        );
        assert_eq!(serde_json::to_string(&dt).unwrap(), "\"2024-12-08T14:30\"");
    }

    #[test]
    fn whole_numbers_serialize_without_decimal_point() {
        assert_eq!(serde_json::to_string(&FieldValue::Number(12.0)).unwrap(), "12");
        assert_eq!(serde_json::to_string(&FieldValue::Number(12.5)).unwrap(), "12.5");
    }

    #[test]
    fn null_serializes_as_json_null() {
        assert_eq!(serde_json::to_string(&FieldValue::Null).unwrap(), "null");
    }

    #[test]
    fn all_null_record_matches_schema_keys_in_order() {
        let schema = domain::lookup("trial_weld").unwrap();
        let record = CanonicalRecord::all_null(schema);
        assert_eq!(record.len(), 14);
        let keys: Vec<_> = record.keys().collect();
        let expected: Vec<_> = schema.field_names().collect();
        assert_eq!(keys, expected);
        assert!(record.iter().all(|(_, v)| v.is_null()));
    }

    #[test]
    fn record_serializes_as_ordered_map() {
        let schema = domain::lookup("panel_placement").unwrap();
        let record = CanonicalRecord::all_null(schema);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            "{\"panelNumber\":null,\"dateTime\":null,\"length\":null,\"width\":null}"
        );
    }

    #[test]
    fn partial_failure_envelope_shape() {
        let schema = domain::lookup("repairs").unwrap();
        let err = ExtractionError::ProviderTimeout(120);
        let result = PipelineResult::partial_failure(schema, &err);

        assert!(!result.success);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.error_kind, Some(ErrorKind::ProviderTimeout));
        assert_eq!(result.record.len(), 7);
        assert!(result.record.iter().all(|(_, v)| v.is_null()));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["errorKind"], "ProviderTimeout");
        assert_eq!(json["formType"], "repairs");
        assert!(json["extractedFields"]["repairId"].is_null());
    }

    #[test]
    fn success_envelope_omits_error_kind() {
        let schema = domain::lookup("repairs").unwrap();
        let result = PipelineResult::success(
            CanonicalRecord::all_null(schema),
            0.85,
            Vec::new(),
            "repairs",
        );
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("errorKind").is_none());
        assert_eq!(json["success"], true);
    }
}
