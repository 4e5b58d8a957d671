//! # convoke-client
//!
//! Client layer for sending conversation transcripts to a hosted
//! language model.
//!
//! The [`ModelClient`] trait is the session loop's only view of the
//! model service: one request carrying the full transcript and the
//! advertised tool declarations, one assistant message back. The crate
//! ships [`OpenAIClient`], a request/response implementation of the
//! OpenAI chat-completions API.
//!
//! ## Example
//!
//! ```no_run
//! use convoke_client::{ModelClient, OpenAIClient};
//! use convoke_common::{ChatOptions, ChatRequest, Message};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let options = ChatOptions::new("gpt-4o").with_api_key("sk-...");
//! let client = OpenAIClient::new(options)?;
//!
//! let request = ChatRequest::from((client.options(), vec![Message::user("Hello!")]));
//! let response = client.chat(&request).await?;
//! println!("{}", response.message.content().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use async_trait::async_trait;

use convoke_common::{ChatOptions, ChatRequest, ChatResponse};

pub mod error;
pub mod openai;

pub use error::ClientError;
pub use openai::OpenAIClient;

/// A request/response connection to a hosted language model.
///
/// Implementations must be thread-safe; the session loop holds one
/// client and awaits one call at a time.
#[must_use = "a ModelClient does nothing until chat() is called"]
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Returns the options this client was built with.
    fn options(&self) -> &ChatOptions;

    /// Sends one chat completion request and returns the assistant's
    /// reply.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, the network transport
    /// fails, the API rejects the request, or the response cannot be
    /// parsed. Errors are not retried.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Returns whether this client can advertise tools to the model.
    fn supports_tools(&self) -> bool;

    /// Returns whether this client can stream responses.
    fn supports_streaming(&self) -> bool {
        false
    }

    /// Validates a request against this client's capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the request has no messages, carries tools
    /// the client cannot send, or asks for streaming the client does
    /// not support.
    fn validate_request(&self, request: &ChatRequest) -> Result<()> {
        request
            .validate_has_messages()
            .map_err(|e| ClientError::InvalidRequest(e.to_string()))?;

        if !self.supports_tools() && request.has_tools() {
            return Err(ClientError::ToolsNotSupported.into());
        }

        if !self.supports_streaming() && request.is_streaming() {
            return Err(ClientError::StreamingNotSupported.into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use chrono::Utc;
    use convoke_common::tools::{Parameters, ToolDeclaration};
    use convoke_common::Message;

    struct MockClient {
        options: ChatOptions,
        tools: bool,
    }

    impl MockClient {
        fn new(tools: bool) -> Self {
            Self {
                options: ChatOptions::new("mock-model"),
                tools,
            }
        }
    }

    #[async_trait]
    impl ModelClient for MockClient {
        fn options(&self) -> &ChatOptions {
            &self.options
        }

        async fn chat(&self, _request: &ChatRequest) -> Result<ChatResponse> {
            Ok(ChatResponse {
                message: Message::assistant("ok"),
                model: "mock-model".to_string(),
                usage: None,
                finish_reason: None,
                created_at: Utc::now(),
            })
        }

        fn supports_tools(&self) -> bool {
            self.tools
        }
    }

    fn tool_decl() -> ToolDeclaration {
        ToolDeclaration::function("f", "", Parameters::empty())
    }

    #[test]
    fn empty_request_is_rejected() {
        let client = MockClient::new(true);
        let request = ChatRequest::new("mock-model", vec![]);
        let err = client.validate_request(&request).unwrap_err();
        let client_err = err.downcast_ref::<ClientError>().unwrap();
        assert!(matches!(client_err, ClientError::InvalidRequest(_)));
    }

    #[test]
    fn tools_rejected_without_support() {
        let client = MockClient::new(false);
        let request =
            ChatRequest::new("mock-model", vec![Message::user("hi")]).with_tools(vec![tool_decl()]);
        let err = client.validate_request(&request).unwrap_err();
        let client_err = err.downcast_ref::<ClientError>().unwrap();
        assert!(matches!(client_err, ClientError::ToolsNotSupported));
    }

    #[test]
    fn streaming_rejected_by_default() {
        let client = MockClient::new(true);
        let mut request = ChatRequest::new("mock-model", vec![Message::user("hi")]);
        request.stream = true;
        let err = client.validate_request(&request).unwrap_err();
        let client_err = err.downcast_ref::<ClientError>().unwrap();
        assert!(matches!(client_err, ClientError::StreamingNotSupported));
    }

    #[tokio::test]
    async fn valid_request_passes_and_chats() {
        let client = MockClient::new(true);
        let request =
            ChatRequest::new("mock-model", vec![Message::user("hi")]).with_tools(vec![tool_decl()]);
        client.validate_request(&request).unwrap();

        let response = client.chat(&request).await.unwrap();
        assert_eq!(response.message.content(), Some("ok"));
    }
}
