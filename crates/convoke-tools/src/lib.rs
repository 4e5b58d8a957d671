//! # convoke-tools
//!
//! Tool definitions and execution for convoke sessions.
//!
//! A tool is any type implementing [`ToolFn`]: it declares a static
//! [`ToolSignature`] (name, documentation, parameter table) and an
//! async `call`. The [`ToolRegistry`] generates each tool's
//! [`ToolDeclaration`](convoke_common::ToolDeclaration) once at
//! registration and hands it to the session loop for every request.
//!
//! ## Example
//!
//! ```rust
//! use anyhow::Result;
//! use async_trait::async_trait;
//! use serde_json::{Map, Value};
//! use convoke_tools::{ParamSpec, ParamType, SchemaError, ToolFn, ToolRegistry, ToolSignature};
//!
//! struct GreetingTool;
//!
//! #[async_trait]
//! impl ToolFn for GreetingTool {
//!     fn signature(&self) -> Result<ToolSignature, SchemaError> {
//!         Ok(ToolSignature::new(
//!             "greet",
//!             "Greet a person by name",
//!             vec![ParamSpec::required("name", ParamType::Text)],
//!         ))
//!     }
//!
//!     async fn call(&self, args: &Map<String, Value>) -> Result<Value> {
//!         let name = args.get("name").and_then(Value::as_str).unwrap_or("stranger");
//!         Ok(Value::String(format!("Hello, {name}!")))
//!     }
//! }
//!
//! let registry = ToolRegistry::new();
//! registry.register(GreetingTool).unwrap();
//! assert!(registry.contains("greet"));
//! ```

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};

use convoke_common::tools::ToolDeclaration;

mod builtin;
pub mod schema;

pub use builtin::{CurrentTimeTool, DeliveryDateTool};
pub use schema::{ParamSpec, ParamType, SchemaError, ToolSignature};

/// A locally invocable function the model may call.
///
/// Implementations are side-effect-bearing (external lookups, clocks)
/// and are invoked at most once per tool call. Return values must be
/// JSON-serializable; anything that is not, such as a timestamp, must
/// be converted explicitly (e.g. to an RFC 3339 string) before being
/// returned.
#[async_trait]
pub trait ToolFn: Send + Sync {
    /// Returns the tool's statically declared signature.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Introspection`] when the parameter list
    /// cannot be determined for this tool.
    fn signature(&self) -> Result<ToolSignature, SchemaError>;

    /// Invokes the tool with the decoded arguments object.
    ///
    /// Arguments are passed exactly as decoded from the model's
    /// request; no validation against the declared schema happens
    /// first, so tools must handle missing or extra keys themselves.
    async fn call(&self, args: &Map<String, Value>) -> Result<Value>;
}

struct RegisteredTool {
    func: Arc<dyn ToolFn>,
    declaration: ToolDeclaration,
}

/// A mapping from function name to invocable tool plus its declaration.
///
/// Populated at session start and treated as immutable for the
/// session's duration. Backed by `DashMap` so one populated registry
/// can be shared across independent sessions without extra locking.
pub struct ToolRegistry {
    tools: DashMap<String, RegisteredTool>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tools: DashMap::new(),
        }
    }

    /// Registers a tool, generating its declaration from its signature.
    ///
    /// Registering a second tool under the same name replaces the first.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Introspection`] when the tool's signature
    /// cannot be determined; the registry is left unchanged for that
    /// tool and callers may skip or abort per policy.
    pub fn register<T: ToolFn + 'static>(&self, tool: T) -> Result<(), SchemaError> {
        self.register_arc(Arc::new(tool))
    }

    /// Registers an already shared tool.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn register_arc(&self, tool: Arc<dyn ToolFn>) -> Result<(), SchemaError> {
        let signature = tool.signature()?;
        let declaration = signature.declaration();
        self.tools.insert(
            signature.name,
            RegisteredTool {
                func: tool,
                declaration,
            },
        );
        Ok(())
    }

    /// Looks up a tool by function name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolFn>> {
        self.tools.get(name).map(|t| t.func.clone())
    }

    /// Returns the declarations of every registered tool.
    #[must_use]
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools.iter().map(|t| t.declaration.clone()).collect()
    }

    /// Returns whether a tool with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Returns the registered function names.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.key().clone()).collect()
    }

    /// Returns the number of registered tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    struct EchoTool;

    #[async_trait]
    impl ToolFn for EchoTool {
        fn signature(&self) -> Result<ToolSignature, SchemaError> {
            Ok(ToolSignature::new(
                "echo",
                "Echo the input back",
                vec![ParamSpec::required("text", ParamType::Text)],
            ))
        }

        async fn call(&self, args: &Map<String, Value>) -> Result<Value> {
            Ok(args.get("text").cloned().unwrap_or(Value::Null))
        }
    }

    /// Stands in for a native callable with no introspectable signature.
    struct OpaqueTool;

    #[async_trait]
    impl ToolFn for OpaqueTool {
        fn signature(&self) -> Result<ToolSignature, SchemaError> {
            Err(SchemaError::Introspection {
                tool: "opaque".to_string(),
                reason: "no introspectable signature".to_string(),
            })
        }

        async fn call(&self, _args: &Map<String, Value>) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn register_generates_declaration_once() {
        let registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();

        assert!(registry.contains("echo"));
        assert_eq!(registry.len(), 1);

        let decls = registry.declarations();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].function.name, "echo");
        assert_eq!(decls[0].function.parameters.required, vec!["text"]);
    }

    #[test]
    fn introspection_failure_is_fatal_to_one_declaration_only() {
        let registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();

        let err = registry.register(OpaqueTool).unwrap_err();
        assert!(matches!(err, SchemaError::Introspection { .. }));

        // The rest of the registry is untouched.
        assert_eq!(registry.len(), 1);
        assert!(!registry.contains("opaque"));
    }

    #[test]
    fn lookup_of_missing_tool_returns_none() {
        let registry = ToolRegistry::new();
        assert!(registry.get("nope").is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn registered_tool_is_invocable() {
        let registry = ToolRegistry::new();
        registry.register(EchoTool).unwrap();

        let tool = registry.get("echo").unwrap();
        let mut args = Map::new();
        args.insert("text".to_string(), Value::String("hi".to_string()));
        let result = tool.call(&args).await.unwrap();
        assert_eq!(result, Value::String("hi".to_string()));
    }
}
