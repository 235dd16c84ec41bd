// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion provider trait for the LLM-backed intent classifier.

use async_trait::async_trait;

use crate::error::LeadlineError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CompletionRequest, CompletionResponse};

/// A chat-completion endpoint.
#[async_trait]
pub trait CompletionProvider: PluginAdapter {
    /// Sends a completion request and returns the assistant's text.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, LeadlineError>;
}
