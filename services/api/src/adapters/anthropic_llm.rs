//! services/api/src/adapters/anthropic_llm.rs
//!
//! This module contains the Anthropic-backed text-generation adapter, the
//! alternate provider behind the `TextGenerator` port. It talks to the
//! Messages API directly over `reqwest`.

use async_trait::async_trait;
use campusflow_core::ports::{PortError, PortResult, TextGenerator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1000;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextGenerator` against the Anthropic
/// Messages API.
#[derive(Clone)]
pub struct AnthropicTextAdapter {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl AnthropicTextAdapter {
    /// Creates a new `AnthropicTextAdapter`. The request timeout is baked
    /// into the HTTP client, so every call is bounded without further
    /// wrapping.
    pub fn new(
        api_base: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> PortResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base,
            api_key,
            model,
        })
    }
}

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

//=========================================================================================
// `TextGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextGenerator for AnthropicTextAdapter {
    async fn generate(&self, prompt: &str) -> PortResult<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| PortError::Generation(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Generation(format!(
                "messages API returned {status}: {body}"
            )));
        }

        let payload: MessagesResponse = response
            .json()
            .await
            .map_err(|e| PortError::Generation(e.to_string()))?;

        match payload.content.into_iter().next() {
            Some(block) if !block.text.is_empty() => Ok(block.text),
            _ => Err(PortError::Generation(
                "model response contained no text content".to_string(),
            )),
        }
    }
}
