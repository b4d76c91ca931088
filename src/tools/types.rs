//! Tool parameter schemas.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// JSON Schema-based parameter definition for a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentToolParameters {
    /// JSON Schema object describing the parameters.
    pub schema: Value,
}

impl AgentToolParameters {
    /// Builder: create an object schema with properties.
    pub fn object() -> ParameterBuilder {
        ParameterBuilder {
            properties: Map::new(),
            required: Vec::new(),
        }
    }
}

/// Builder for constructing tool parameter schemas.
pub struct ParameterBuilder {
    properties: Map<String, Value>,
    required: Vec<String>,
}

impl ParameterBuilder {
    fn property(mut self, name: impl Into<String>, schema: Value, required: bool) -> Self {
        let name = name.into();
        self.properties.insert(name.clone(), schema);
        if required {
            self.required.push(name);
        }
        self
    }

    pub fn string(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(
            name,
            json!({"type": "string", "description": description.into()}),
            required,
        )
    }

    pub fn number(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(
            name,
            json!({"type": "number", "description": description.into()}),
            required,
        )
    }

    pub fn integer(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(
            name,
            json!({"type": "integer", "description": description.into()}),
            required,
        )
    }

    /// Add an enum (string) property.
    pub fn string_enum(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        values: &[&str],
        required: bool,
    ) -> Self {
        self.property(
            name,
            json!({"type": "string", "description": description.into(), "enum": values}),
            required,
        )
    }

    pub fn build(self) -> AgentToolParameters {
        AgentToolParameters {
            schema: json!({
                "type": "object",
                "properties": self.properties,
                "required": self.required,
            }),
        }
    }
}
