use std::sync::Arc;

use uuid::Uuid;

use super::confidence::resolve_confidence;
use super::mapper::map_to_record;
use super::parser::parse_response;
use super::prompt::build_request;
use super::types::{LegacyExtractor, PipelineResult, VisionClient};
use super::validate::validate_fields;
use crate::domain;

/// End-to-end extraction pipeline:
/// build → model call → parse → validate → map → envelope.
///
/// Holds no per-request state, so one instance serves concurrent
/// extractions; the only shared pieces are the injected client and the
/// static schemas. Provider and parse failures terminate in a
/// PartialFailure envelope — the caller always gets a renderable record.
///
/// Policy: one attempt per call, no automatic retry at any layer. A failed
/// extraction degrades to manual entry; retrying is an explicit new request.
pub struct FormExtractor {
    vision: Arc<dyn VisionClient>,
    legacy: Box<dyn LegacyExtractor>,
}

impl FormExtractor {
    pub fn new(vision: Arc<dyn VisionClient>, legacy: Box<dyn LegacyExtractor>) -> Self {
        Self { vision, legacy }
    }

    /// Run one extraction attempt for a photographed form.
    ///
    /// Recognized domain ids go through the schema pipeline; anything else
    /// routes to the legacy extractor, whose envelope passes through
    /// unchanged.
    pub fn extract(
        &self,
        domain_id: &str,
        image: &[u8],
        project_context: Option<&str>,
    ) -> PipelineResult {
        let extraction_id = Uuid::new_v4();
        let _span = tracing::info_span!(
            "extract_form",
            %extraction_id,
            domain = domain_id,
            image_size = image.len(),
        )
        .entered();
        let start = std::time::Instant::now();

        let Some(schema) = domain::lookup(domain_id) else {
            tracing::info!(domain = domain_id, "unrecognized domain, routing to legacy extractor");
            return self.legacy.extract(domain_id, image, project_context);
        };

        let mut request = build_request(schema, image.to_vec());
        if let Some(ctx) = project_context {
            request.instructions.push_str(&format!("\nProject context: {ctx}\n"));
        }

        let raw = match self.vision.extract(&request) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "provider call failed, returning partial failure");
                return PipelineResult::partial_failure(schema, &e);
            }
        };

        let parsed = match parse_response(&raw) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(error = %e, "model response unparseable, returning partial failure");
                return PipelineResult::partial_failure(schema, &e);
            }
        };

        let (validated, warnings) = validate_fields(parsed, schema);
        let record = map_to_record(&validated, schema);
        let confidence = resolve_confidence(raw.provider_score);

        let populated = record.iter().filter(|(_, v)| !v.is_null()).count();
        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            populated,
            total = record.len(),
            warning_count = warnings.len(),
            "extraction complete"
        );

        PipelineResult::success(record, confidence, warnings, schema.domain.as_str())
    }
}
