//! Generation client factory.
//!
//! The provider is chosen here, once. Everything downstream holds an
//! `Arc<dyn LlmClient>` and never branches on the provider.

use crate::client::LlmClient;
use crate::providers::{DeepSeekClient, GeminiClient};
use crate::types::ProviderType;
use inkpipe_core::{AppConfig, AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Request timeout used when the provider config sets none.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Create a generation client for a provider.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini", "deepseek")
/// * `api_key` - API key for the provider
/// * `endpoint` - Optional custom endpoint URL
/// * `timeout` - Optional request timeout
///
/// # Errors
/// `AppError::Config` if the provider is unknown, the key is empty, or the
/// HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    api_key: &str,
    endpoint: Option<&str>,
    timeout: Option<Duration>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    if api_key.trim().is_empty() {
        return Err(AppError::Config(format!(
            "{} provider requires API key",
            provider_type.as_str()
        )));
    }

    let http = reqwest::Client::builder()
        .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
        .build()
        .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

    let base_url = endpoint.unwrap_or(provider_type.default_endpoint());

    tracing::debug!(provider = provider_type.as_str(), base_url, "Creating generation client");

    let client: Arc<dyn LlmClient> = match provider_type {
        ProviderType::Gemini => Arc::new(GeminiClient::with_base_url(base_url, api_key, http)),
        ProviderType::DeepSeek => {
            Arc::new(DeepSeekClient::with_base_url(base_url, api_key, http))
        }
    };
    Ok(client)
}

/// Create the client for the active provider of an application config.
pub fn client_for_config(config: &AppConfig) -> AppResult<Arc<dyn LlmClient>> {
    let api_key = config.resolve_api_key(&config.provider)?;
    let provider_config = config.provider_config(&config.provider);

    create_client(
        &config.provider,
        &api_key,
        provider_config.and_then(|p| p.endpoint.as_deref()),
        provider_config.and_then(|p| p.timeout).map(Duration::from_secs),
    )
}
