//! The conversation session loop.
//!
//! A [`Session`] owns the transcript and drives one user turn at a
//! time: send the transcript, execute whatever tools the model
//! requested, send the results back, and repeat until the model
//! answers in plain text.

use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::{Map, Value};

use convoke_client::ModelClient;
use convoke_common::chat::{Conversation, Message};
use convoke_common::client::ChatRequest;
use convoke_common::tools::ToolCall;
use convoke_tools::ToolRegistry;

use crate::error::SessionError;

/// Where the session currently stands in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ready to accept the next user message.
    AwaitingUser,
    /// A request is in flight to the model.
    AwaitingModel,
    /// Executing tool calls from the last assistant message.
    HandlingToolCalls,
    /// The session has ended and accepts no further input.
    Terminated,
}

/// Callback invoked after each successful tool execution, with the
/// tool name, its raw argument string, and the serialized result.
pub type ToolTraceFn = Arc<dyn Fn(&str, &str, &str) + Send + Sync>;

/// A tool-calling conversation bound to one client and one registry.
///
/// # Examples
///
/// ```no_run
/// use convoke::{ChatOptions, OpenAIClient, Session};
/// use convoke_tools::{DeliveryDateTool, ToolRegistry};
///
/// # async fn example() -> anyhow::Result<()> {
/// let options = ChatOptions::new("gpt-4o").with_api_key("sk-...");
/// let client = OpenAIClient::new(options)?;
///
/// let registry = ToolRegistry::new();
/// registry.register(DeliveryDateTool)?;
///
/// let mut session = Session::new(client, registry)
///     .with_system_prompt("You are a helpful customer support assistant.");
/// let reply = session.send("Where is order 8675309?").await?;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
pub struct Session<C: ModelClient> {
    client: C,
    registry: ToolRegistry,
    conversation: Conversation,
    state: SessionState,
    tool_trace: Option<ToolTraceFn>,
}

impl<C: ModelClient> Session<C> {
    /// Creates a session with an empty transcript.
    pub fn new(client: C, registry: ToolRegistry) -> Self {
        Self {
            client,
            registry,
            conversation: Conversation::new(),
            state: SessionState::AwaitingUser,
            tool_trace: None,
        }
    }

    /// Seeds the transcript with a system message.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        // System messages always pass transcript validation.
        let _ = self.conversation.push(Message::system(prompt));
        self
    }

    /// Installs a callback observing each executed tool call.
    #[must_use]
    pub fn with_tool_trace(mut self, trace: ToolTraceFn) -> Self {
        self.tool_trace = Some(trace);
        self
    }

    /// The full transcript accumulated so far.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The session's current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Sends one user message and drives the exchange until the model
    /// produces a plain-text reply.
    ///
    /// Tool calls are executed sequentially in the order the model
    /// listed them, each exactly once, and every call gets exactly one
    /// tool message in reply before the transcript goes back to the
    /// model. There is no bound on the number of tool rounds.
    ///
    /// # Errors
    ///
    /// Any [`SessionError`] is fatal: the session moves to
    /// [`SessionState::Terminated`] and the transcript stops at the
    /// last message appended before the failure.
    pub async fn send(&mut self, user_text: impl Into<String>) -> Result<String, SessionError> {
        if self.state == SessionState::Terminated {
            return Err(SessionError::Other(anyhow::anyhow!(
                "session is terminated"
            )));
        }

        self.conversation
            .push(Message::user(user_text))
            .map_err(SessionError::Other)?;

        let result = self.drive_to_text().await;
        match &result {
            Ok(_) => self.state = SessionState::AwaitingUser,
            Err(e) => {
                warn!("session ended with error: {e}");
                self.state = SessionState::Terminated;
            }
        }
        result
    }

    /// Marks the session finished. Further `send` calls fail.
    pub fn close(&mut self) {
        self.state = SessionState::Terminated;
    }

    async fn drive_to_text(&mut self) -> Result<String, SessionError> {
        loop {
            self.state = SessionState::AwaitingModel;
            let request = self.build_request();
            debug!(
                "sending {} messages to model '{}'",
                request.messages.len(),
                request.model
            );

            let response = self
                .client
                .chat(&request)
                .await
                .map_err(SessionError::Transport)?;

            let message = response.message.clone();
            self.conversation
                .push(response.message)
                .map_err(SessionError::Other)?;

            let calls = message.tool_calls().to_vec();
            if calls.is_empty() {
                return Ok(message.content().unwrap_or_default().to_string());
            }

            self.state = SessionState::HandlingToolCalls;
            info!("model requested {} tool call(s)", calls.len());
            for call in &calls {
                let reply = self.execute_tool_call(call).await?;
                self.conversation
                    .push(Message::tool(reply, call.id.clone()))
                    .map_err(SessionError::Other)?;
            }
        }
    }

    fn build_request(&self) -> ChatRequest {
        let options = self.client.options();
        let mut request =
            ChatRequest::from((options, self.conversation.messages().to_vec()));
        if !self.registry.is_empty() {
            request = request
                .with_tools(self.registry.declarations())
                .with_tool_choice(options.tool_choice.clone());
        }
        request
    }

    async fn execute_tool_call(&self, call: &ToolCall) -> Result<String, SessionError> {
        let name = call.function.name.as_str();
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| SessionError::UnknownTool(name.to_string()))?;

        let args = decode_arguments(name, call.function.arguments_json())?;
        debug!("executing tool '{name}' with {} argument(s)", args.len());

        let result = tool
            .call(&args)
            .await
            .map_err(|source| SessionError::Tool {
                name: name.to_string(),
                source,
            })?;

        let rendered = render_result(&result);
        if let Some(trace) = &self.tool_trace {
            trace(name, &call.function.arguments, &rendered);
        }
        Ok(rendered)
    }
}

/// Decodes a tool call's argument string into a JSON object.
fn decode_arguments(tool: &str, raw: &str) -> Result<Map<String, Value>, SessionError> {
    let value: Value = serde_json::from_str(raw).map_err(|source| SessionError::Decode {
        tool: tool.to_string(),
        source,
    })?;
    match value {
        Value::Object(map) => Ok(map),
        // Re-run the deserialization to get a typed error for the caller.
        other => serde_json::from_value(other).map_err(|source| SessionError::Decode {
            tool: tool.to_string(),
            source,
        }),
    }
}

/// Renders a tool result as the string placed in the tool message.
///
/// Strings pass through unquoted; everything else is compact JSON.
fn render_result(result: &Value) -> String {
    match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
