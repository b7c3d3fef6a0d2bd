use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use asbuilt::api::router::extraction_router;
use asbuilt::api::types::ApiContext;
use asbuilt::config::{self, AppConfig};
use asbuilt::pipeline::legacy::GenericFormExtractor;
use asbuilt::pipeline::ollama::OllamaVisionClient;
use asbuilt::pipeline::orchestrator::FormExtractor;
use asbuilt::pipeline::types::VisionClient;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let cfg = AppConfig::from_env();
    tracing::info!(
        version = config::APP_VERSION,
        provider = %cfg.provider_base_url,
        model = %cfg.model,
        provider_timeout_secs = cfg.provider_timeout_secs,
        "{} starting",
        config::APP_NAME
    );

    // The blocking provider client must be built outside the async runtime;
    // handlers only touch it through spawn_blocking.
    let vision: Arc<dyn VisionClient> = Arc::new(OllamaVisionClient::new(
        &cfg.provider_base_url,
        &cfg.model,
        cfg.provider_timeout_secs,
    )?);
    let extractor = Arc::new(FormExtractor::new(
        vision.clone(),
        Box::new(GenericFormExtractor::new(vision.clone())),
    ));
    let ctx = ApiContext::new(extractor, vision);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let router = extraction_router(ctx);
        let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
        tracing::info!(addr = %cfg.bind_addr, "extraction API listening");
        axum::serve(listener, router).await?;
        Ok(())
    })
}
