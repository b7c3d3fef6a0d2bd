//! Wire types for the Ollama vision chat API, plus endpoint guards.
//!
//! These formalize the HTTP contract the vision client speaks. Chat-template
//! vision models expect the messages-based `/api/chat` format; the generate
//! endpoint rejects image payloads for them.

use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Request body for `/api/chat` with image attachments.
#[derive(Debug, Clone, Serialize)]
pub struct VisionChatRequest {
    pub model: String,
    pub messages: Vec<VisionChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<VisionGenerationOptions>,
}

/// A single message in a vision chat request.
#[derive(Debug, Clone, Serialize)]
pub struct VisionChatMessage {
    pub role: String,
    pub content: String,
    /// Base64-encoded images (only on user messages).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

/// Generation options tuned for transcription (deterministic output).
#[derive(Debug, Clone, Serialize)]
pub struct VisionGenerationOptions {
    /// 0.0 — a transcription must not be creative.
    pub temperature: f32,
    /// Token cap for the JSON object; the largest schema fits well within.
    pub num_predict: i32,
}

impl Default for VisionGenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            num_predict: 1024,
        }
    }
}

/// Response body from `/api/chat` (non-streaming).
#[derive(Debug, Deserialize)]
pub struct VisionChatResponse {
    pub message: VisionChatResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct VisionChatResponseMessage {
    pub content: String,
}

/// Raw response from GET `/api/tags` (installed model list).
#[derive(Debug, Deserialize)]
pub(crate) struct OllamaTagsResponse {
    pub models: Vec<OllamaTagModel>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OllamaTagModel {
    pub name: String,
}

/// Validate that the provider base URL points to localhost only.
///
/// Form photos never leave the machine via this client. Accepts localhost,
/// 127.0.0.1, and [::1]; rejects everything else.
pub fn validate_base_url(url: &str) -> Result<(), ExtractionError> {
    let after_scheme = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or_else(|| ExtractionError::NonLocalEndpoint(url.to_string()))?;

    let host = after_scheme
        .split(':')
        .next()
        .unwrap_or("")
        .split('/')
        .next()
        .unwrap_or("");

    // IPv6 bracket notation: [::1]
    let host_clean = if after_scheme.starts_with('[') {
        after_scheme
            .split(']')
            .next()
            .unwrap_or("")
            .trim_start_matches('[')
    } else {
        host
    };

    match host_clean {
        "localhost" | "127.0.0.1" | "::1" => Ok(()),
        _ => Err(ExtractionError::NonLocalEndpoint(url.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_url_accepts_loopback_forms() {
        assert!(validate_base_url("http://localhost:11434").is_ok());
        assert!(validate_base_url("http://localhost").is_ok());
        assert!(validate_base_url("http://127.0.0.1:11434").is_ok());
        assert!(validate_base_url("http://[::1]:11434").is_ok());
        assert!(validate_base_url("https://localhost:11434").is_ok());
    }

    #[test]
    fn validate_url_rejects_remote_hosts() {
        assert!(validate_base_url("http://example.com:11434").is_err());
        assert!(validate_base_url("http://192.168.1.50:11434").is_err());
        assert!(validate_base_url("https://api.example.com").is_err());
    }

    #[test]
    fn validate_url_rejects_missing_scheme() {
        assert!(validate_base_url("localhost:11434").is_err());
        assert!(validate_base_url("").is_err());
    }

    #[test]
    fn chat_request_serializes_images_only_when_present() {
        let request = VisionChatRequest {
            model: "qwen2.5vl:7b".into(),
            messages: vec![
                VisionChatMessage {
                    role: "system".into(),
                    content: "rules".into(),
                    images: None,
                },
                VisionChatMessage {
                    role: "user".into(),
                    content: "transcribe".into(),
                    images: Some(vec!["aGVsbG8=".into()]),
                },
            ],
            stream: false,
            options: Some(VisionGenerationOptions::default()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json["messages"][0].get("images").is_none());
        assert_eq!(json["messages"][1]["images"][0], "aGVsbG8=");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn default_options_are_deterministic() {
        let opts = VisionGenerationOptions::default();
        assert_eq!(opts.temperature, 0.0);
        assert!(opts.num_predict >= 512);
    }

    #[test]
    fn chat_response_deserializes() {
        let body = r#"{"model":"qwen2.5vl:7b","message":{"role":"assistant","content":"{}"},"done":true}"#;
        let parsed: VisionChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.message.content, "{}");
    }

    #[test]
    fn tags_response_deserializes() {
        let body = r#"{"models":[{"name":"qwen2.5vl:7b","size":1},{"name":"llava:13b"}]}"#;
        let parsed: OllamaTagsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.models.len(), 2);
        assert_eq!(parsed.models[0].name, "qwen2.5vl:7b");
    }
}
