//! Conversation transcripts for tool-calling LLM sessions.
//!
//! The module centers on two types:
//!
//! - [`Message`]: one entry in a transcript, a tagged variant per role so
//!   each role's required fields are enforced at construction time
//! - [`Conversation`]: an append-only, ordered sequence of messages owned
//!   by a single session
//!
//! # Message roles
//!
//! - **System**: instructions and context for the model
//! - **User**: input from the end user
//! - **Assistant**: model output; plain text, tool calls, or both
//! - **Tool**: the result of executing one requested tool call
//!
//! # Tool-call correlation
//!
//! A tool message answers exactly one tool call issued by the immediately
//! preceding assistant message. [`Conversation::push`] enforces this: a
//! tool message whose `tool_call_id` does not match an unanswered call
//! from that assistant turn is rejected.
//!
//! # Serialization
//!
//! Messages serialize with a `"role"` tag in the lowercase OpenAI
//! convention, so a transcript can be placed directly into a
//! chat-completions request body:
//!
//! ```
//! use convoke_common::Message;
//!
//! let msg = Message::user("What's the ETA for package 8675309?");
//! let json = serde_json::to_value(&msg).unwrap();
//! assert_eq!(json["role"], "user");
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tools::ToolCall;

/// The role of a message sender.
///
/// Derived from a [`Message`] variant; used for display and filtering.
/// Serializes to the lowercase strings the OpenAI API expects.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System-level instructions or context.
    System,
    /// Input from the end user.
    User,
    /// Output from the model, possibly carrying tool calls.
    Assistant,
    /// The result of executing one tool call.
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::Tool => write!(f, "tool"),
        }
    }
}

/// A single entry in a conversation transcript.
///
/// One variant per role, so the fields each role requires are enforced
/// by construction rather than by runtime checks on a bag of options:
/// only assistant messages can carry tool calls, and a tool message
/// always has the `tool_call_id` that links it back to the call it
/// answers.
///
/// # Examples
///
/// ```
/// use convoke_common::{Message, ToolCall};
///
/// let system = Message::system("You are a helpful assistant.");
/// let user = Message::user("Where is my package?");
///
/// // An assistant turn that only requests a tool has no text content.
/// let call = ToolCall::new("get_estimated_delivery_date", r#"{"tracking_number": "8675309"}"#);
/// let assistant = Message::assistant_tool_calls(None, vec![call.clone()]);
/// assert!(assistant.content().is_none());
///
/// let result = Message::tool("2024-06-01T12:00:00Z", call.id);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// System-level instructions or context.
    System {
        /// The instruction text.
        content: String,
    },
    /// Input from the end user.
    User {
        /// The user's text.
        content: String,
    },
    /// Output from the model.
    Assistant {
        /// The assistant's text; absent when the turn only carries
        /// tool calls.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        /// Tool calls requested by this turn, in the order the model
        /// emitted them.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    /// The serialized result of executing one tool call.
    Tool {
        /// The tool's result, always a string (non-text results are
        /// serialized to JSON before being placed here).
        content: String,
        /// The id of the [`ToolCall`] this message answers.
        tool_call_id: String,
    },
}

impl Message {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    /// Creates a plain-text assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// Creates an assistant message carrying tool calls.
    #[must_use]
    pub const fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            content,
            tool_calls,
        }
    }

    /// Creates a tool result message answering the given call id.
    pub fn tool(content: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self::Tool {
            content: content.into(),
            tool_call_id: tool_call_id.into(),
        }
    }

    /// Returns the role of this message.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::System { .. } => Role::System,
            Self::User { .. } => Role::User,
            Self::Assistant { .. } => Role::Assistant,
            Self::Tool { .. } => Role::Tool,
        }
    }

    /// Returns the text content, if any.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::System { content } | Self::User { content } | Self::Tool { content, .. } => {
                Some(content)
            }
            Self::Assistant { content, .. } => content.as_deref(),
        }
    }

    /// Returns the tool calls carried by this message.
    ///
    /// Empty for every role except assistant messages that invoke tools.
    #[must_use]
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    /// Returns `true` for an assistant message that requests tool calls.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls().is_empty()
    }
}

/// An append-only conversation transcript.
///
/// Owned exclusively by one session; grows monotonically and is never
/// reordered or mutated in place. [`push`](Self::push) validates the
/// tool-call correlation invariant before appending.
///
/// # Examples
///
/// ```
/// use convoke_common::{Conversation, Message};
///
/// let mut conversation = Conversation::new();
/// conversation.push(Message::system("You are a helpful assistant.")).unwrap();
/// conversation.push(Message::user("Hello!")).unwrap();
/// assert_eq!(conversation.messages().len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique identifier for this transcript.
    pub id: Uuid,
    /// When this conversation was created.
    pub created_at: DateTime<Utc>,
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates an empty conversation with a generated id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            messages: Vec::new(),
        }
    }

    /// Appends a message to the transcript.
    ///
    /// # Errors
    ///
    /// Returns an error if the message is a tool message whose
    /// `tool_call_id` does not correspond to an unanswered tool call
    /// from the immediately preceding assistant message.
    pub fn push(&mut self, message: Message) -> anyhow::Result<()> {
        if let Message::Tool { tool_call_id, .. } = &message {
            self.check_tool_correlation(tool_call_id)?;
        }
        self.messages.push(message);
        Ok(())
    }

    /// Returns the messages in this conversation, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the most recent message, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns the number of messages in this conversation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the conversation holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    // Walks back over the trailing tool messages to the assistant turn
    // that issued the calls, ensuring `id` names one of its calls and is
    // not already answered.
    fn check_tool_correlation(&self, id: &str) -> anyhow::Result<()> {
        let mut answered: Vec<&str> = Vec::new();
        for message in self.messages.iter().rev() {
            match message {
                Message::Tool { tool_call_id, .. } => answered.push(tool_call_id),
                Message::Assistant { tool_calls, .. } if !tool_calls.is_empty() => {
                    if answered.contains(&id) {
                        anyhow::bail!("tool call '{id}' has already been answered");
                    }
                    if tool_calls.iter().any(|call| call.id == id) {
                        return Ok(());
                    }
                    anyhow::bail!(
                        "tool call id '{id}' does not match any call issued by the preceding assistant message"
                    );
                }
                _ => {
                    anyhow::bail!(
                        "tool message '{id}' has no preceding assistant message with tool calls"
                    );
                }
            }
        }
        anyhow::bail!("tool message '{id}' cannot start a conversation");
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
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
        fn message_serialization_roundtrip(
            content in ".*",
            role_idx in 0usize..4,
        ) {
            let msg = match role_idx {
                0 => Message::system(content.clone()),
                1 => Message::user(content.clone()),
                2 => Message::assistant(content.clone()),
                _ => Message::tool(content.clone(), "call_1"),
            };

            let json = serde_json::to_string(&msg).unwrap();
            let parsed: Message = serde_json::from_str(&json).unwrap();
            assert_eq!(msg, parsed);
        }

        #[test]
        fn fuzz_message_deserialization(data in prop::collection::vec(any::<u8>(), 0..1000)) {
            // Should not panic on arbitrary bytes.
            let _ = serde_json::from_slice::<Message>(&data);
        }

        #[test]
        fn fuzz_message_json_with_invalid_roles(
            content in "[\\p{L}\\p{N} ]{0,100}",
            role_str in "[a-z]{1,20}",
        ) {
            let json = format!(
                r#"{{"role":"{role_str}","content":"{content}"}}"#
            );
            // Unknown roles fail deserialization without panicking.
            let _ = serde_json::from_str::<Message>(&json);
        }

        #[test]
        fn conversation_push_preserves_order(
            contents in prop::collection::vec(".*", 0..20),
        ) {
            let mut conv = Conversation::new();
            for content in &contents {
                conv.push(Message::user(content.clone())).unwrap();
            }
            let texts: Vec<_> = conv
                .messages()
                .iter()
                .filter_map(Message::content)
                .collect();
            assert_eq!(texts, contents.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
