//! # convoke-common
//!
//! Shared data model for the convoke workspace: conversation transcripts,
//! tool calls, tool declarations, and chat configuration.
//!
//! The types here mirror the OpenAI chat-completions wire shapes closely
//! enough that they serialize directly into request bodies, while staying
//! vendor-neutral at the API surface.

pub mod chat;
pub mod client;
pub mod tools;

pub use chat::{Conversation, Message, Role};
pub use client::{ChatOptions, ChatRequest, ChatResponse, FinishReason, ToolChoice, Usage};
pub use tools::{FunctionCall, FunctionDecl, Parameters, Property, ToolCall, ToolDeclaration};
