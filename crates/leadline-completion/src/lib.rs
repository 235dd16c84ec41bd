// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat completion provider for the Leadline intent classifier.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint; the default
//! configuration points at NVIDIA's hosted inference API.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use leadline_config::model::CompletionConfig;
use leadline_core::types::{CompletionRequest, CompletionResponse};
use leadline_core::{AdapterType, CompletionProvider, HealthStatus, LeadlineError, PluginAdapter};

use crate::client::CompletionClient;
use crate::types::{ChatCompletionRequest, ResponseFormat};

/// Environment variable consulted when `completion.api_key` is unset.
pub const API_KEY_ENV: &str = "NVIDIA_API_KEY";

/// [`CompletionProvider`] backed by an OpenAI-compatible endpoint.
///
/// API key resolution order: config -> `NVIDIA_API_KEY` env var -> error.
pub struct ChatCompletionsProvider {
    client: CompletionClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl ChatCompletionsProvider {
    pub fn new(config: &CompletionConfig) -> Result<Self, LeadlineError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = CompletionClient::new(
            &api_key,
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
        )?;
        info!(model = %config.model, base_url = %config.base_url, "completion provider initialized");
        Ok(Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl PluginAdapter for ChatCompletionsProvider {
    fn name(&self) -> &str {
        "chat-completions"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadlineError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadlineError> {
        Ok(())
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionsProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LeadlineError> {
        let wire = ChatCompletionRequest {
            model: self.model.clone(),
            messages: request.messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: request.json_mode.then(ResponseFormat::json_object),
        };
        let response = self.client.complete(&wire).await?;
        let model = response.model.unwrap_or_else(|| self.model.clone());
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LeadlineError::Provider {
                message: "completion response had no content".into(),
                source: None,
            })?;
        debug!(model = %model, chars = content.len(), "completion received");
        Ok(CompletionResponse { content, model })
    }
}

/// Config key first, then the environment.
pub fn resolve_api_key(config_key: &Option<String>) -> Result<String, LeadlineError> {
    if let Some(key) = config_key
        && !key.trim().is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            LeadlineError::Config(format!(
                "completion API key not found. Set completion.api_key in config or {API_KEY_ENV} environment variable."
            ))
        })
}
