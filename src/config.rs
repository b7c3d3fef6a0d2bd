/// Application-level constants
pub const APP_NAME: &str = "AsBuilt";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{}=info,tower_http=info", env!("CARGO_PKG_NAME"))
}

/// Runtime configuration, resolved once at startup from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Vision provider endpoint (localhost only).
    pub provider_base_url: String,
    /// Vision model to run transcription with.
    pub model: String,
    /// Bound on a single provider call, in seconds.
    pub provider_timeout_secs: u64,
    /// Caller-visible end-to-end budget, in seconds. Held at ≥150% of the
    /// provider bound so a failure envelope always beats the caller's
    /// deadline.
    pub request_timeout_secs: u64,
    /// HTTP listen address for the extraction API.
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider_base_url: "http://localhost:11434".to_string(),
            model: "qwen2.5vl:7b".to_string(),
            provider_timeout_secs: 120,
            request_timeout_secs: 180,
            bind_addr: "127.0.0.1:8787".to_string(),
        }
    }
}

impl AppConfig {
    /// Read configuration from `ASBUILT_*` environment variables, falling
    /// back to defaults. The caller budget is raised if an override would
    /// leave it under 150% of the provider bound.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let provider_timeout_secs = env_u64("ASBUILT_PROVIDER_TIMEOUT_SECS")
            .unwrap_or(defaults.provider_timeout_secs);
        let request_timeout_secs = env_u64("ASBUILT_REQUEST_TIMEOUT_SECS")
            .unwrap_or(defaults.request_timeout_secs)
            .max(provider_timeout_secs * 3 / 2);

        Self {
            provider_base_url: std::env::var("ASBUILT_PROVIDER_URL")
                .unwrap_or(defaults.provider_base_url),
            model: std::env::var("ASBUILT_MODEL").unwrap_or(defaults.model),
            provider_timeout_secs,
            request_timeout_secs,
            bind_addr: std::env::var("ASBUILT_BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_the_timeout_margin() {
        let config = AppConfig::default();
        assert!(
            config.request_timeout_secs * 2 >= config.provider_timeout_secs * 3,
            "caller budget must be at least 150% of the provider bound"
        );
    }

    #[test]
    fn default_provider_is_local() {
        let config = AppConfig::default();
        assert!(config.provider_base_url.starts_with("http://localhost"));
    }

    #[test]
    fn app_name_and_version() {
        assert_eq!(APP_NAME, "AsBuilt");
        assert_eq!(APP_VERSION, "0.4.0");
    }

    #[test]
    fn log_filter_mentions_the_crate() {
        assert!(default_log_filter().contains("asbuilt"));
    }
}
