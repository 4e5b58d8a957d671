//! Declaration generation from statically declared tool signatures.
//!
//! Instead of runtime reflection, every tool declares its parameter
//! list as an explicit table of [`ParamSpec`] entries built at
//! registration time. [`ToolSignature::declaration`] maps that table
//! onto a JSON-Schema object node in the OpenAI function-calling shape.

use std::collections::HashMap;

use thiserror::Error;

use convoke_common::tools::{Parameters, Property, ToolDeclaration};

/// Errors raised while generating a tool declaration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SchemaError {
    /// The tool's parameter list cannot be determined at all, e.g. a
    /// native callable with no declared signature.
    ///
    /// Fatal to that one declaration, not to the whole registry; the
    /// caller decides whether to skip the tool or abort.
    #[error("cannot determine signature for tool '{tool}': {reason}")]
    Introspection {
        /// The tool that failed introspection.
        tool: String,
        /// Why the signature could not be produced.
        reason: String,
    },
}

/// The declared type of one tool parameter.
///
/// A closed set mapping totally onto the JSON-Schema primitive names.
/// Types outside the set are carried as [`Other`](Self::Other) and map
/// to `"string"`, the safe default, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParamType {
    /// Free text; maps to `"string"`.
    Text,
    /// Whole numbers; maps to `"integer"`.
    Integer,
    /// Floating-point numbers; maps to `"number"`.
    Float,
    /// True/false; maps to `"boolean"`.
    Boolean,
    /// An ordered list; maps to `"array"`.
    Sequence,
    /// A key/value mapping; maps to `"object"`.
    Mapping,
    /// The null type; maps to `"null"`.
    Null,
    /// Any declared type outside the supported set; maps to `"string"`.
    Other(String),
}

impl ParamType {
    /// Returns the JSON-Schema primitive name for this type.
    #[must_use]
    pub fn json_type(&self) -> &str {
        match self {
            Self::Text | Self::Other(_) => "string",
            Self::Integer => "integer",
            Self::Float => "number",
            Self::Boolean => "boolean",
            Self::Sequence => "array",
            Self::Mapping => "object",
            Self::Null => "null",
        }
    }
}

/// One entry in a tool's statically declared parameter table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// The parameter name.
    pub name: String,
    /// The declared type.
    pub ty: ParamType,
    /// Whether the parameter lacks a default value.
    pub required: bool,
}

impl ParamSpec {
    /// Declares a parameter with no default value.
    pub fn required(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
        }
    }

    /// Declares a parameter that has a default value.
    pub fn optional(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
        }
    }
}

/// A tool's name, documentation, and parameter table.
///
/// The static replacement for inspecting a function signature at
/// runtime; built once per tool and turned into an immutable
/// [`ToolDeclaration`] at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSignature {
    /// The function name advertised to the model.
    pub name: String,
    /// The function's documentation string; may be empty.
    pub description: String,
    /// The parameters in declaration order.
    pub params: Vec<ParamSpec>,
}

impl ToolSignature {
    /// Creates a signature with the given name, documentation, and
    /// parameter table.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        params: Vec<ParamSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params,
        }
    }

    /// Generates the declaration advertised to the model.
    ///
    /// `properties` holds one `{type: <primitive>}` node per declared
    /// parameter; `required` lists exactly the parameters without a
    /// default value, in declaration order; the description is the
    /// documentation string with surrounding whitespace trimmed.
    #[must_use]
    pub fn declaration(&self) -> ToolDeclaration {
        let properties: HashMap<String, Property> = self
            .params
            .iter()
            .map(|p| (p.name.clone(), Property::new(p.ty.json_type())))
            .collect();

        let required: Vec<String> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.clone())
            .collect();

        ToolDeclaration::function(
            &self.name,
            self.description.trim(),
            Parameters::new(properties, required),
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    fn delivery_signature() -> ToolSignature {
        ToolSignature::new(
            "get_estimated_delivery_date",
            "\n    get the estimated delivery date for a package\n    ",
            vec![ParamSpec::required("tracking_number", ParamType::Text)],
        )
    }

    #[test]
    fn declaration_matches_function_calling_shape() {
        let decl = delivery_signature().declaration();

        assert_eq!(decl.kind, "function");
        assert_eq!(decl.function.name, "get_estimated_delivery_date");
        assert_eq!(
            decl.function.description,
            "get the estimated delivery date for a package"
        );
        assert_eq!(decl.function.parameters.schema_type, "object");
        assert_eq!(
            decl.function.parameters.properties["tracking_number"].prop_type,
            "string"
        );
        assert_eq!(decl.function.parameters.required, vec!["tracking_number"]);
    }

    #[test]
    fn required_set_is_exactly_params_without_defaults_in_order() {
        let sig = ToolSignature::new(
            "multi",
            "",
            vec![
                ParamSpec::required("a", ParamType::Integer),
                ParamSpec::optional("b", ParamType::Text),
                ParamSpec::required("c", ParamType::Boolean),
                ParamSpec::optional("d", ParamType::Float),
                ParamSpec::required("e", ParamType::Sequence),
            ],
        );
        let params = sig.declaration().function.parameters;

        assert_eq!(params.properties.len(), 5);
        assert_eq!(params.required, vec!["a", "c", "e"]);
    }

    #[test]
    fn every_primitive_maps_to_its_json_name() {
        let cases = [
            (ParamType::Text, "string"),
            (ParamType::Integer, "integer"),
            (ParamType::Float, "number"),
            (ParamType::Boolean, "boolean"),
            (ParamType::Sequence, "array"),
            (ParamType::Mapping, "object"),
            (ParamType::Null, "null"),
        ];
        for (ty, expected) in cases {
            assert_eq!(ty.json_type(), expected);
        }
    }

    #[test]
    fn unsupported_types_fall_back_to_string() {
        let ty = ParamType::Other("datetime.datetime".to_string());
        assert_eq!(ty.json_type(), "string");

        let sig = ToolSignature::new(
            "f",
            "",
            vec![ParamSpec::required("when", ty)],
        );
        let params = sig.declaration().function.parameters;
        assert_eq!(params.properties["when"].prop_type, "string");
    }

    #[test]
    fn missing_documentation_yields_empty_description() {
        let sig = ToolSignature::new("bare", "", vec![]);
        let decl = sig.declaration();
        assert_eq!(decl.function.description, "");
        assert!(decl.function.parameters.properties.is_empty());
        assert!(decl.function.parameters.required.is_empty());
    }
}
