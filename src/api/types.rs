//! Shared types for the extraction API layer.

use std::sync::Arc;

use serde::Deserialize;

use crate::pipeline::orchestrator::FormExtractor;
use crate::pipeline::types::VisionClient;

/// Shared context for all API routes: the pipeline plus a handle on the
/// provider for health probes. Everything is Arc'd and immutable — requests
/// share nothing mutable.
#[derive(Clone)]
pub struct ApiContext {
    pub extractor: Arc<FormExtractor>,
    pub vision: Arc<dyn VisionClient>,
}

impl ApiContext {
    pub fn new(extractor: Arc<FormExtractor>, vision: Arc<dyn VisionClient>) -> Self {
        Self { extractor, vision }
    }
}

/// `POST /api/extract` request body.
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    #[serde(rename = "domainId")]
    pub domain_id: String,
    /// Base64 data URL (`data:image/jpeg;base64,...`) or bare base64.
    pub image: String,
    #[serde(rename = "projectContext")]
    pub project_context: Option<String>,
}
