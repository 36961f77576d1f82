// SPDX-FileCopyrightText: 2026 SAVA Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider adapter for the SAVA sentiment classifier.
//!
//! Implements [`ProviderAdapter`] over the `generateContent` REST method. Each
//! call targets the model named in the request, so one provider instance
//! serves every endpoint the router rotates through.

pub mod client;
pub mod types;

use async_trait::async_trait;
use sava_config::model::GeminiConfig;
use sava_core::error::{ProviderErrorKind, SavaError};
use sava_core::traits::{PluginAdapter, ProviderAdapter};
use sava_core::types::{AdapterType, HealthStatus, ProviderRequest, ProviderResponse};
use tracing::{debug, info};

use crate::client::GeminiClient;
use crate::types::GenerateContentRequest;

/// Environment variable consulted when `gemini.api_key` is unset.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `GEMINI_API_KEY` env var -> error.
pub struct GeminiProvider {
    client: GeminiClient,
}

impl GeminiProvider {
    /// Creates a new Gemini provider from the `[gemini]` config section.
    pub fn new(config: &GeminiConfig) -> Result<Self, SavaError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = GeminiClient::new(&api_key, &config.base_url, config.request_timeout())?;

        info!(
            base_url = %config.base_url,
            models = config.models.len(),
            "Gemini provider initialized"
        );

        Ok(Self { client })
    }

    /// Creates a provider with an existing client.
    pub fn with_client(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, SavaError> {
        // Probing would spend quota; a built client is as healthy as we can tell.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SavaError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, SavaError> {
        let body = GenerateContentRequest::user_prompt(
            &request.prompt,
            request.max_output_tokens,
            request.temperature,
        );
        let response = self.client.generate_content(&request.model, &body).await?;

        if let Some(reason) = response.block_reason() {
            return Err(SavaError::provider(
                ProviderErrorKind::SafetyBlocked,
                &request.model,
                reason,
            ));
        }

        let text = response.text();
        if text.trim().is_empty() {
            return Err(SavaError::provider(
                ProviderErrorKind::SafetyBlocked,
                &request.model,
                "response carried no text parts",
            ));
        }

        debug!(model = %request.model, chars = text.len(), "completion received");
        Ok(ProviderResponse {
            text,
            model: response.model_version.unwrap_or(request.model),
        })
    }
}

/// Resolves the API key from config or environment variable.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, SavaError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            SavaError::Config(format!(
                "Gemini API key not found. Set gemini.api_key in config or the {API_KEY_ENV} environment variable."
            ))
        })
}
