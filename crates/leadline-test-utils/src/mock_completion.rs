// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion provider with queued responses.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadline_core::types::{CompletionRequest, CompletionResponse};
use leadline_core::{AdapterType, CompletionProvider, HealthStatus, LeadlineError, PluginAdapter};

/// Returns queued responses in order. An empty queue is a provider error,
/// which exercises the classifier fallback.
pub struct MockCompletionProvider {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockCompletionProvider {
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn add_response(&self, content: impl Into<String>) {
        self.responses.lock().await.push_back(content.into());
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockCompletionProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockCompletionProvider {
    fn name(&self) -> &str {
        "mock-completion"
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
impl CompletionProvider for MockCompletionProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, LeadlineError> {
        self.requests.lock().await.push(request);
        match self.responses.lock().await.pop_front() {
            Some(content) => Ok(CompletionResponse {
                content,
                model: "mock-model".into(),
            }),
            None => Err(LeadlineError::Provider {
                message: "no mock response queued".into(),
                source: None,
            }),
        }
    }
}
