//! OpenAI-compatible chat-completions client.
//!
//! Strictly request/response: no streaming, no retries, no backoff.
//! A transport or API failure surfaces immediately and ends the
//! session that issued it.
//!
//! # Security
//!
//! The API key is held in a [`SecretString`] and only exposed at the
//! point the authorization header is written.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use convoke_common::chat::Message;
use convoke_common::client::{ChatOptions, ChatRequest, ChatResponse, Usage};
use convoke_common::tools::ToolDeclaration;

use crate::error::{ClientError, ErrorResponse};
use crate::ModelClient;

/// Wire shape of a chat-completions request body.
///
/// `Message` and `ToolDeclaration` already serialize in the OpenAI
/// convention, so the body borrows them directly from the request.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDeclaration]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<serde_json::Value>,
    stream: bool,
}

/// Wire shape of a chat-completions response body.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    created: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Request/response client for OpenAI-compatible chat-completions APIs.
///
/// # Examples
///
/// ```no_run
/// use convoke_client::OpenAIClient;
/// use convoke_common::ChatOptions;
///
/// # fn example() -> anyhow::Result<()> {
/// let options = ChatOptions::new("gpt-4o")
///     .with_api_key("sk-...")
///     .with_base_url("https://api.openai.com/v1");
/// let client = OpenAIClient::new(options)?;
/// # Ok(())
/// # }
/// ```
pub struct OpenAIClient {
    options: ChatOptions,
    http: reqwest::Client,
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("model", &self.options.model)
            .field("base_url", &self.options.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAIClient {
    /// Creates a client from the given options.
    ///
    /// The per-request timeout from `options.timeout_seconds` is
    /// applied to the underlying HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the options fail
    /// validation or the HTTP client cannot be built.
    pub fn new(options: ChatOptions) -> Result<Self, ClientError> {
        options
            .validate()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()
            .map_err(ClientError::Network)?;

        Ok(Self { options, http })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.options.base_url.trim_end_matches('/')
        )
    }

    fn parse_response(body: &str) -> Result<ChatResponse, ClientError> {
        let parsed: ChatCompletionResponse = serde_json::from_str(body)?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::InvalidResponse("response has no choices".to_string()))?;

        if !matches!(choice.message, Message::Assistant { .. }) {
            return Err(ClientError::InvalidResponse(format!(
                "expected an assistant message, got role '{}'",
                choice.message.role()
            )));
        }

        let finish_reason = choice.finish_reason.as_deref().and_then(|s| {
            s.parse().map_or_else(
                |_| {
                    warn!("unknown finish reason from API: {s}");
                    None
                },
                Some,
            )
        });

        let created_at = parsed
            .created
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(Utc::now);

        Ok(ChatResponse {
            message: choice.message,
            model: parsed.model.unwrap_or_default(),
            usage: parsed.usage,
            finish_reason,
            created_at,
        })
    }

    fn map_error_status(status: reqwest::StatusCode, body: &str) -> ClientError {
        // Prefer the structured message, fall back to the raw body.
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map_or_else(|_| body.to_string(), |e| e.error.message);

        match status.as_u16() {
            401 => ClientError::Authentication(message),
            429 => ClientError::RateLimit(message),
            500..=599 => ClientError::ServiceUnavailable(message),
            status => ClientError::Api { status, message },
        }
    }
}

#[async_trait]
impl ModelClient for OpenAIClient {
    fn options(&self) -> &ChatOptions {
        &self.options
    }

    fn supports_tools(&self) -> bool {
        true
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.validate_request(request)?;

        let body = ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            tools: request.tools.as_deref(),
            tool_choice: request.tool_choice.clone().map(Into::into),
            stream: false,
        };

        let url = self.completions_url();
        debug!("POST {url} ({} messages)", request.messages.len());

        let mut builder = self.http.post(&url).json(&body);
        if let Some(key) = &self.options.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(ClientError::Network)?;
        let status = response.status();
        let text = response.text().await.map_err(ClientError::Network)?;

        if !status.is_success() {
            return Err(Self::map_error_status(status, &text).into());
        }

        Ok(Self::parse_response(&text)?)
    }
}


#[cfg(test)]
mod proptests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn fuzz_response_parsing(data in ".*") {
            // Arbitrary bodies produce errors, never panics.
            let _ = OpenAIClient::parse_response(&data);
        }

        #[test]
        fn fuzz_response_with_partial_fields(
            model in prop::option::of("[a-z0-9\\-]{1,20}"),
            content in ".*",
            created in prop::option::of(any::<i64>()),
        ) {
            let mut body = serde_json::json!({
                "choices": [{
                    "message": {"role": "assistant", "content": content}
                }]
            });
            if let Some(m) = &model {
                body["model"] = serde_json::json!(m);
            }
            if let Some(c) = created {
                body["created"] = serde_json::json!(c);
            }

            let parsed = OpenAIClient::parse_response(&body.to_string()).unwrap();
            assert_eq!(parsed.message.content(), Some(content.as_str()));
        }
    }
}
