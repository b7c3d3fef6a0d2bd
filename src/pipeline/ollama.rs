use base64::Engine as _;

use super::ollama_types::{
    validate_base_url, OllamaTagsResponse, VisionChatMessage, VisionChatRequest,
    VisionChatResponse, VisionGenerationOptions,
};
use super::types::{ExtractionRequest, RawModelResponse, VisionClient};
use super::ExtractionError;

/// Maximum image payload accepted by the client (decoded bytes).
/// Phone photos compressed for upload stay well under this.
pub const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// Ollama-backed vision extraction client.
///
/// One bounded, non-retried HTTP call per `extract`. Retry is a caller
/// policy decision, never hidden in here, so failure semantics stay
/// observable.
pub struct OllamaVisionClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaVisionClient {
    /// Create a client against a local Ollama instance. Rejects non-loopback
    /// endpoints — form photos do not leave the machine.
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, ExtractionError> {
        validate_base_url(base_url)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ExtractionError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> ExtractionError {
        if e.is_timeout() {
            ExtractionError::ProviderTimeout(self.timeout_secs)
        } else if e.is_connect() {
            ExtractionError::ProviderUnavailable(self.base_url.clone())
        } else {
            ExtractionError::ProviderUnavailable(e.to_string())
        }
    }
}

impl VisionClient for OllamaVisionClient {
    fn extract(&self, request: &ExtractionRequest) -> Result<RawModelResponse, ExtractionError> {
        if request.image.is_empty() {
            return Err(ExtractionError::InvalidImage("empty image payload".into()));
        }
        if request.image.len() > MAX_IMAGE_BYTES {
            return Err(ExtractionError::InvalidImage(format!(
                "image is {} bytes, maximum is {MAX_IMAGE_BYTES}",
                request.image.len()
            )));
        }

        let start = std::time::Instant::now();
        let image_b64 = base64::engine::general_purpose::STANDARD.encode(&request.image);

        let body = VisionChatRequest {
            model: self.model.clone(),
            messages: vec![
                VisionChatMessage {
                    role: "system".into(),
                    content: request.system.clone(),
                    images: None,
                },
                VisionChatMessage {
                    role: "user".into(),
                    content: request.instructions.clone(),
                    images: Some(vec![image_b64]),
                },
            ],
            stream: false,
            options: Some(VisionGenerationOptions::default()),
        };

        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractionError::ProviderError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: VisionChatResponse = response
            .json()
            .map_err(|e| ExtractionError::ParseFailure(format!("provider body: {e}")))?;

        tracing::debug!(
            domain = %request.domain_id,
            model = %self.model,
            elapsed_ms = %start.elapsed().as_millis(),
            response_len = parsed.message.content.len(),
            "vision extraction call complete"
        );

        Ok(RawModelResponse {
            text: parsed.message.content,
            // Ollama does not report a confidence; the orchestrator applies
            // its fixed default.
            provider_score: None,
        })
    }

    fn is_model_available(&self, model: &str) -> Result<bool, ExtractionError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| m.starts_with(model)))
    }

    fn list_models(&self) -> Result<Vec<String>, ExtractionError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractionError::ProviderError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| ExtractionError::ParseFailure(format!("tags body: {e}")))?;

        Ok(parsed.models.into_iter().map(|m| m.name).collect())
    }
}

/// Mock vision client for testing — configurable response or error.
pub struct MockVisionClient {
    response: String,
    provider_score: Option<f32>,
    error: Option<fn() -> ExtractionError>,
    available_models: Vec<String>,
}

impl MockVisionClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            provider_score: None,
            error: None,
            available_models: vec!["qwen2.5vl:7b".to_string()],
        }
    }

    /// A client whose every `extract` call fails with the given error.
    pub fn failing(error: fn() -> ExtractionError) -> Self {
        Self {
            response: String::new(),
            provider_score: None,
            error: Some(error),
            available_models: vec![],
        }
    }

    pub fn with_provider_score(mut self, score: f32) -> Self {
        self.provider_score = Some(score);
        self
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.available_models = models;
        self
    }
}

impl VisionClient for MockVisionClient {
    fn extract(&self, _request: &ExtractionRequest) -> Result<RawModelResponse, ExtractionError> {
        if let Some(make_error) = self.error {
            return Err(make_error());
        }
        Ok(RawModelResponse {
            text: self.response.clone(),
            provider_score: self.provider_score,
        })
    }

    fn is_model_available(&self, model: &str) -> Result<bool, ExtractionError> {
        Ok(self.list_models()?.iter().any(|m| m.starts_with(model)))
    }

    fn list_models(&self) -> Result<Vec<String>, ExtractionError> {
        if let Some(make_error) = self.error {
            return Err(make_error());
        }
        Ok(self.available_models.clone())
    }
}
