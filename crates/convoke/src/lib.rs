//! # convoke
//!
//! Tool-calling conversation sessions over OpenAI-compatible chat
//! APIs.
//!
//! A [`Session`] owns a growing transcript and drives the
//! model/tool exchange for one user turn at a time: the transcript
//! and tool declarations go to the model, any requested tool calls
//! are executed locally in order, their results go back to the model,
//! and the loop repeats until the model answers in plain text.
//!
//! The pieces compose from three member crates, re-exported here:
//!
//! - `convoke-common`: messages, conversations, tool declarations,
//!   and client configuration
//! - `convoke-tools`: the [`ToolFn`] trait, schema generation from
//!   static parameter tables, and the [`ToolRegistry`]
//! - `convoke-client`: the [`ModelClient`] trait and the bundled
//!   [`OpenAIClient`]
//!
//! ## Example
//!
//! ```no_run
//! use convoke::{ChatOptions, OpenAIClient, Session};
//! use convoke::{DeliveryDateTool, ToolRegistry};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let options = ChatOptions::new("gpt-4o").with_api_key("sk-...");
//! let client = OpenAIClient::new(options)?;
//!
//! let registry = ToolRegistry::new();
//! registry.register(DeliveryDateTool)?;
//!
//! let mut session = Session::new(client, registry)
//!     .with_system_prompt("You are a helpful customer support assistant.");
//! let reply = session.send("Where is order 8675309?").await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod session;

pub use error::SessionError;
pub use session::{Session, SessionState, ToolTraceFn};

pub use convoke_client::{ClientError, ModelClient, OpenAIClient};
pub use convoke_common::{
    ChatOptions, ChatRequest, ChatResponse, Conversation, FinishReason, FunctionCall,
    FunctionDecl, Message, Parameters, Property, Role, ToolCall, ToolChoice, ToolDeclaration,
    Usage,
};
pub use convoke_tools::{
    CurrentTimeTool, DeliveryDateTool, ParamSpec, ParamType, SchemaError, ToolFn, ToolRegistry,
    ToolSignature,
};
