//! Chat configuration, requests, and responses.
//!
//! [`ChatOptions`] enumerates every option the bundled client
//! recognizes, with documented defaults, instead of an open-ended
//! configuration dictionary. [`ChatRequest`] pairs a transcript with
//! the advertised tool declarations for one round trip to the model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::chat::Message;
use crate::tools::ToolDeclaration;

/// Controls how the model selects which tool to call, if any.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum ToolChoice {
    /// Let the model decide whether to call a tool and which one.
    ///
    /// The default.
    #[serde(rename = "auto")]
    Auto,
    /// Disable tool calling for this request.
    #[serde(rename = "none")]
    None,
    /// Require the model to call at least one tool.
    #[serde(rename = "required")]
    Required,
    /// Force the model to call a specific function by name.
    Function {
        /// The name of the function to call.
        name: String,
    },
}

impl fmt::Display for ToolChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::None => write!(f, "none"),
            Self::Required => write!(f, "required"),
            Self::Function { name } => write!(f, "{name}"),
        }
    }
}

impl From<ToolChoice> for serde_json::Value {
    fn from(tool_choice: ToolChoice) -> Self {
        match tool_choice {
            ToolChoice::Auto => Self::String("auto".to_string()),
            ToolChoice::None => Self::String("none".to_string()),
            ToolChoice::Required => Self::String("required".to_string()),
            ToolChoice::Function { name } => serde_json::json!({
                "type": "function",
                "function": { "name": name }
            }),
        }
    }
}

/// Why the model stopped generating tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FinishReason {
    /// Generation completed naturally.
    #[serde(rename = "stop")]
    Stop,
    /// Generation was truncated at the token limit.
    #[serde(rename = "length")]
    Length,
    /// Generation stopped because the model requested tool calls.
    #[serde(rename = "tool_calls")]
    ToolCalls,
    /// Generation was stopped by the provider's content filter.
    #[serde(rename = "content_filter")]
    ContentFilter,
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stop => write!(f, "stop"),
            Self::Length => write!(f, "length"),
            Self::ToolCalls => write!(f, "tool_calls"),
            Self::ContentFilter => write!(f, "content_filter"),
        }
    }
}

impl FromStr for FinishReason {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stop" => Ok(Self::Stop),
            "length" => Ok(Self::Length),
            "tool_calls" => Ok(Self::ToolCalls),
            "content_filter" => Ok(Self::ContentFilter),
            _ => anyhow::bail!("unknown finish reason: {s}"),
        }
    }
}

/// Token usage statistics for one completion request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct Usage {
    /// Tokens in the input prompt.
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Tokens generated in the completion.
    #[serde(default)]
    pub completion_tokens: u32,
    /// Total tokens used.
    #[serde(default)]
    pub total_tokens: u32,
}

/// Configuration for a model client.
///
/// Every recognized option is an explicit field with a documented
/// default; there is no pass-through dictionary.
///
/// # Defaults
///
/// - `base_url`: `https://api.openai.com/v1`
/// - `timeout_seconds`: 120 (bounds each request; there is no retry)
/// - `tool_choice`: [`ToolChoice::Auto`]
/// - `stream`: `false`
/// - `temperature`, `max_tokens`: unset, the provider's defaults apply
///
/// # Security
///
/// The API key is held in a [`SecretString`] and never serialized.
///
/// # Examples
///
/// ```
/// use convoke_common::ChatOptions;
///
/// let options = ChatOptions::new("gpt-4o")
///     .with_api_key("sk-...")
///     .with_temperature(0.7);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatOptions {
    /// The model identifier to request.
    pub model: String,
    /// Base URL for API requests.
    pub base_url: String,
    /// API key for authentication; never serialized.
    #[serde(skip_serializing, default)]
    pub api_key: Option<SecretString>,
    /// Per-request timeout in seconds.
    pub timeout_seconds: u64,
    /// Sampling temperature (0.0 to 2.0); provider default when unset.
    pub temperature: Option<f32>,
    /// Maximum tokens to generate; provider default when unset.
    pub max_tokens: Option<u32>,
    /// How the model selects tools.
    pub tool_choice: ToolChoice,
    /// Whether to request a streamed response.
    ///
    /// The bundled client is strictly request/response and rejects
    /// streaming requests.
    pub stream: bool,
}

impl ChatOptions {
    /// Creates options for the given model with all defaults.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            timeout_seconds: 120,
            temperature: None,
            max_tokens: None,
            tool_choice: ToolChoice::Auto,
            stream: false,
        }
    }

    /// Sets a custom base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key.into().into()));
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the maximum tokens to generate.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the tool selection policy.
    #[must_use]
    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = tool_choice;
        self
    }

    /// Enables or disables streaming.
    #[must_use]
    pub const fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Validates the configuration parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is empty or `temperature` is out
    /// of the 0.0 to 2.0 range.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.model.is_empty() {
            anyhow::bail!("model identifier must not be empty");
        }
        if let Some(temp) = self.temperature
            && !(0.0..=2.0).contains(&temp)
        {
            anyhow::bail!("temperature must be between 0.0 and 2.0, got {temp}");
        }
        Ok(())
    }
}

/// One request for a chat completion.
///
/// Pairs the full transcript with the tool declarations the model may
/// call, plus the sampling parameters for this round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The conversation messages to send, oldest first.
    pub messages: Vec<Message>,
    /// The model identifier.
    pub model: String,
    /// Sampling temperature for this request.
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Tools available for the model to call.
    pub tools: Option<Vec<ToolDeclaration>>,
    /// Tool selection policy, when tools are present.
    pub tool_choice: Option<ToolChoice>,
    /// Whether to stream the response.
    pub stream: bool,
}

impl ChatRequest {
    /// Creates a request for the given model and messages with no tools.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: model.into(),
            temperature: None,
            max_tokens: None,
            tools: None,
            tool_choice: None,
            stream: false,
        }
    }

    /// Sets the tools available to the model.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolDeclaration>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Sets the tool selection policy.
    #[must_use]
    pub fn with_tool_choice(mut self, tool_choice: ToolChoice) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    /// Returns whether any tools are attached to this request.
    #[must_use]
    pub fn has_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Returns whether this request asks for a streamed response.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        self.stream
    }

    /// Validates that the request carries at least one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message list is empty.
    pub fn validate_has_messages(&self) -> anyhow::Result<()> {
        if self.messages.is_empty() {
            anyhow::bail!("chat request must have at least one message");
        }
        Ok(())
    }
}

impl From<(&ChatOptions, Vec<Message>)> for ChatRequest {
    fn from((options, messages): (&ChatOptions, Vec<Message>)) -> Self {
        Self {
            messages,
            model: options.model.clone(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            tools: None,
            tool_choice: None,
            stream: options.stream,
        }
    }
}

/// A response from a chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The generated assistant message.
    pub message: Message,
    /// The model that produced this response.
    pub model: String,
    /// Token usage, when the provider reports it.
    pub usage: Option<Usage>,
    /// Why generation stopped.
    pub finish_reason: Option<FinishReason>,
    /// When this response was created.
    pub created_at: DateTime<Utc>,
}


#[cfg(test)]
mod proptests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn temperature_validation(temp in -10.0f32..10.0f32) {
            let options = ChatOptions::new("gpt-4o").with_temperature(temp);
            let is_valid = (0.0..=2.0).contains(&temp);
            assert_eq!(options.validate().is_ok(), is_valid);
        }

        #[test]
        fn builder_chain_preserves_values(
            model in "[a-z0-9\\-:.]{1,40}",
            timeout in 1u64..600,
            max_tokens in 1u32..100_000,
        ) {
            let options = ChatOptions::new(model.as_str())
                .with_timeout(timeout)
                .with_max_tokens(max_tokens);
            assert_eq!(options.model, model);
            assert_eq!(options.timeout_seconds, timeout);
            assert_eq!(options.max_tokens, Some(max_tokens));
            assert!(options.validate().is_ok());
        }
    }
}
