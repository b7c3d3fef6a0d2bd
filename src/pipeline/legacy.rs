use std::sync::Arc;

use super::confidence::resolve_confidence;
use super::parser::parse_response;
use super::types::{
    CanonicalRecord, ExtractionRequest, LegacyExtractor, PipelineResult, VisionClient,
};

/// System block for form types outside the six schemas. Same contract
/// posture as the domain prompt, minus the field list.
const GENERIC_SYSTEM_PROMPT: &str = "\
You are a form transcription assistant. Read the photographed form and \
return a single strict JSON object mapping each labeled field on the form \
to its handwritten value. Use null for unreadable entries. No prose, no \
code fences.";

/// Generic free-form extractor used when the requested form type is not one
/// of the six domains. Same envelope shape, no schema validation — the
/// caller renders whatever fields came back.
pub struct GenericFormExtractor {
    vision: Arc<dyn VisionClient>,
}

impl GenericFormExtractor {
    pub fn new(vision: Arc<dyn VisionClient>) -> Self {
        Self { vision }
    }
}

impl LegacyExtractor for GenericFormExtractor {
    fn extract(&self, form_type: &str, image: &[u8], context: Option<&str>) -> PipelineResult {
        let mut instructions = format!(
            "This photo is a \"{form_type}\" form. Transcribe every labeled field \
             into a flat JSON object.\n"
        );
        if let Some(ctx) = context {
            instructions.push_str(&format!("Project context: {ctx}\n"));
        }

        let request = ExtractionRequest {
            domain_id: form_type.to_string(),
            system: GENERIC_SYSTEM_PROMPT.to_string(),
            instructions,
            image: image.to_vec(),
        };

        let raw = match self.vision.extract(&request) {
            Ok(raw) => raw,
            Err(e) => return failure_envelope(form_type, &e),
        };

        let map = match parse_response(&raw) {
            Ok(map) => map,
            Err(e) => return failure_envelope(form_type, &e),
        };

        let record = CanonicalRecord::new(
            map.into_iter().collect::<Vec<_>>(),
        );

        PipelineResult {
            success: true,
            confidence: resolve_confidence(raw.provider_score),
            record,
            warnings: Vec::new(),
            error_kind: None,
            form_type: Some(form_type.to_string()),
            message: None,
        }
    }
}

/// No schema to shape a null record around, so the failure envelope carries
/// an empty field set — still renderable as a blank manual form.
fn failure_envelope(form_type: &str, error: &super::ExtractionError) -> PipelineResult {
    PipelineResult {
        success: false,
        confidence: 0.0,
        record: CanonicalRecord::default(),
        warnings: Vec::new(),
        error_kind: Some(error.kind()),
        form_type: Some(form_type.to_string()),
        message: Some(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ollama::MockVisionClient;
    use crate::pipeline::types::{ErrorKind, FieldValue};
    use crate::pipeline::ExtractionError;

    #[test]
    fn generic_extractor_returns_freeform_fields() {
        let vision = Arc::new(MockVisionClient::new(
            r#"{"inspector": "J. Doe", "weather": "overcast", "station": "4+20"}"#,
        ));
        let extractor = GenericFormExtractor::new(vision);
        let result = extractor.extract("daily_report", &[1, 2, 3], None);

        assert!(result.success);
        assert_eq!(result.form_type.as_deref(), Some("daily_report"));
        assert_eq!(
            result.record.get("inspector"),
            Some(&FieldValue::Text("J. Doe".into()))
        );
        assert_eq!(result.record.len(), 3);
    }

    #[test]
    fn generic_extractor_failure_keeps_envelope_shape() {
        let vision =
            Arc::new(MockVisionClient::failing(|| ExtractionError::ProviderTimeout(120)));
        let extractor = GenericFormExtractor::new(vision);
        let result = extractor.extract("daily_report", &[1], None);

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::ProviderTimeout));
        assert_eq!(result.confidence, 0.0);
        assert!(result.record.is_empty());
    }

    #[test]
    fn unparseable_response_is_parse_failure_envelope() {
        let vision = Arc::new(MockVisionClient::new("no json at all"));
        let extractor = GenericFormExtractor::new(vision);
        let result = extractor.extract("daily_report", &[1], Some("Cell 3 liner"));
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::ParseFailure));
    }
}
