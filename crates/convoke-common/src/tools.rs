//! Tool calls and tool declarations.
//!
//! [`ToolCall`] is the model-issued request to run a local function;
//! [`ToolDeclaration`] is the JSON-Schema-shaped description advertised
//! to the model so it knows what it may call. Both serialize in the
//! OpenAI function-calling format.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A `{type: <primitive>}` node describing one parameter.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Property {
    /// The JSON-Schema primitive name ("string", "integer", "number",
    /// "boolean", "array", "object", or "null").
    #[serde(rename = "type")]
    pub prop_type: String,
}

impl Property {
    /// Creates a property with the given JSON-Schema primitive name.
    pub fn new(prop_type: impl Into<String>) -> Self {
        Self {
            prop_type: prop_type.into(),
        }
    }

    /// Creates a string property.
    #[must_use]
    pub fn string() -> Self {
        Self::new("string")
    }
}

/// The parameter schema of a function, a JSON-Schema object node.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Parameters {
    /// The JSON type, always "object".
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Map of parameter names to their property nodes.
    pub properties: HashMap<String, Property>,
    /// Names of parameters without a default, in declaration order.
    pub required: Vec<String>,
}

impl Parameters {
    /// Creates a parameter schema with type "object".
    #[must_use]
    pub fn new(properties: HashMap<String, Property>, required: Vec<String>) -> Self {
        Self {
            schema_type: "object".to_string(),
            properties,
            required,
        }
    }

    /// Creates an empty parameter schema for a zero-argument function.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(HashMap::new(), Vec::new())
    }
}

/// The function half of a [`ToolDeclaration`].
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct FunctionDecl {
    /// The function's name, unique within a registry.
    pub name: String,
    /// Free-text description, derived from the function's documentation;
    /// empty when none exists.
    pub description: String,
    /// The parameter schema.
    pub parameters: Parameters,
}

/// A schema advertised to the model describing one callable tool.
///
/// Generated once when a tool is registered and immutable thereafter.
/// Serializes as `{"type": "function", "function": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct ToolDeclaration {
    /// The tool type, always "function".
    #[serde(rename = "type")]
    pub kind: String,
    /// The declared function.
    pub function: FunctionDecl,
}

impl ToolDeclaration {
    /// Creates a function tool declaration.
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Parameters,
    ) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionDecl {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// The function invocation carried by a [`ToolCall`].
///
/// `arguments` is passed through exactly as the model emitted it, a
/// JSON-encoded object as a string. Consumers decode and validate it
/// when executing the tool.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// The name of the function being called.
    pub name: String,
    /// The arguments as a single JSON string.
    pub arguments: String,
}

impl FunctionCall {
    /// Returns the arguments as a JSON string slice.
    ///
    /// Returns `"{}"` if the arguments string is empty, which some
    /// providers emit for zero-argument calls.
    #[must_use]
    pub fn arguments_json(&self) -> &str {
        if self.arguments.is_empty() {
            "{}"
        } else {
            &self.arguments
        }
    }
}

/// A model-issued request to execute a named local function.
///
/// Created by the model response and consumed exactly once: the session
/// loop produces exactly one corresponding tool message before the next
/// request to the model.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ToolCall {
    /// Opaque correlation token issued by the model service.
    pub id: String,
    /// The type of call, always "function".
    #[serde(rename = "type")]
    pub call_type: String,
    /// The function being invoked.
    pub function: FunctionCall,
}

impl ToolCall {
    /// Creates a tool call with a generated id.
    ///
    /// Real ids are issued by the model service; this constructor exists
    /// for building transcripts locally and in tests.
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn tool_call_new_generates_unique_ids() {
        let a = ToolCall::new("f", "{}");
        let b = ToolCall::new("f", "{}");
        assert_ne!(a.id, b.id);
        assert_eq!(a.call_type, "function");
    }

    #[test]
    fn tool_call_serializes_in_wire_format() {
        let call = ToolCall::new("get_weather", r#"{"city":"NYC"}"#);
        let json = serde_json::to_value(&call).unwrap();

        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "get_weather");
        assert_eq!(json["function"]["arguments"], r#"{"city":"NYC"}"#);
    }

    #[test]
    fn tool_call_deserializes_from_api_shape() {
        let json = r#"{
            "id": "call_abc123",
            "type": "function",
            "function": {"name": "lookup", "arguments": "{\"q\": 1}"}
        }"#;
        let call: ToolCall = serde_json::from_str(json).unwrap();
        assert_eq!(call.id, "call_abc123");
        assert_eq!(call.function.name, "lookup");
    }

    #[test]
    fn empty_arguments_read_as_empty_object() {
        let call = ToolCall::new("no_args", "");
        assert_eq!(call.function.arguments_json(), "{}");
    }

    #[test]
    fn declaration_serializes_in_wire_format() {
        let mut properties = HashMap::new();
        properties.insert("tracking_number".to_string(), Property::string());
        let decl = ToolDeclaration::function(
            "get_estimated_delivery_date",
            "get the estimated delivery date for a package",
            Parameters::new(properties, vec!["tracking_number".to_string()]),
        );

        let json = serde_json::to_value(&decl).unwrap();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "get_estimated_delivery_date");
        assert_eq!(json["function"]["parameters"]["type"], "object");
        assert_eq!(
            json["function"]["parameters"]["properties"]["tracking_number"]["type"],
            "string"
        );
        assert_eq!(
            json["function"]["parameters"]["required"],
            serde_json::json!(["tracking_number"])
        );
    }

    #[test]
    fn empty_parameters_node() {
        let params = Parameters::empty();
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["type"], "object");
        assert_eq!(json["properties"], serde_json::json!({}));
        assert_eq!(json["required"], serde_json::json!([]));
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
        fn fuzz_tool_call_deserialization(data in prop::collection::vec(any::<u8>(), 0..1000)) {
            // Should not panic on arbitrary bytes.
            let _ = serde_json::from_slice::<ToolCall>(&data);
        }

        #[test]
        fn fuzz_tool_call_preserves_malformed_arguments(
            name in r"[a-zA-Z0-9_\-\.]{1,50}",
            args in ".*",
        ) {
            // Arguments pass through untouched regardless of validity.
            let call = ToolCall::new(name.clone(), args.clone());
            let json = serde_json::to_string(&call).unwrap();
            let parsed: ToolCall = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed.function.name, name);
            assert_eq!(parsed.function.arguments, args);
        }

        #[test]
        fn declaration_roundtrip(
            name in r"[a-z_]{1,30}",
            description in ".*",
            param_names in prop::collection::hash_set(r"[a-z_]{1,20}", 0..8),
        ) {
            let properties: HashMap<String, Property> = param_names
                .iter()
                .map(|p| (p.clone(), Property::string()))
                .collect();
            let required: Vec<String> = param_names.iter().cloned().collect();
            let decl = ToolDeclaration::function(
                name,
                description,
                Parameters::new(properties.clone(), required.clone()),
            );

            let json = serde_json::to_string(&decl).unwrap();
            let parsed: ToolDeclaration = serde_json::from_str(&json).unwrap();
            assert_eq!(decl, parsed);
            assert_eq!(parsed.function.parameters.properties.len(), properties.len());
        }
    }
}
