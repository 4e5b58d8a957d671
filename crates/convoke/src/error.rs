//! Session-level error types.

use thiserror::Error;

/// Errors raised while driving a conversation session.
///
/// Every variant is fatal to the session that produced it. There is no
/// retry and no degraded continuation: a failed tool call or transport
/// error leaves the transcript as-is and ends the exchange.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The model requested a tool that is not in the registry.
    #[error("model requested unknown tool '{0}'")]
    UnknownTool(String),

    /// The model supplied arguments that are not a JSON object.
    #[error("failed to decode arguments for tool '{tool}'")]
    Decode {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    /// A registered tool returned an error when invoked.
    #[error("tool '{name}' failed")]
    Tool {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// The model client failed to complete the request.
    #[error("chat request failed")]
    Transport(#[source] anyhow::Error),

    /// Anything else that ends the session.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
