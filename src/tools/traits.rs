//! Tool trait and schema descriptors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// JSON type a tool parameter must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Integer,
    Boolean,
    /// Array of strings.
    Array,
}

impl ParamType {
    /// Whether `value` is acceptable for this parameter type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value
                .as_array()
                .map(|items| items.iter().all(Value::is_string))
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Integer => write!(f, "integer"),
            Self::Boolean => write!(f, "boolean"),
            Self::Array => write!(f, "array"),
        }
    }
}

/// Declared shape of a single parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    #[serde(rename = "type")]
    pub kind: ParamType,
    pub description: String,
    pub required: bool,
}

impl ParamSpec {
    pub fn required(kind: ParamType, description: &str) -> Self {
        Self {
            kind,
            description: description.to_string(),
            required: true,
        }
    }

    pub fn optional(kind: ParamType, description: &str) -> Self {
        Self {
            kind,
            description: description.to_string(),
            required: false,
        }
    }
}

/// Definition of a tool exposed to the inference model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: BTreeMap<String, ParamSpec>,
}

impl ToolDescriptor {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn param(mut self, name: &str, spec: ParamSpec) -> Self {
        self.parameters.insert(name.to_string(), spec);
        self
    }

    /// Render the parameters as a JSON Schema object for the model API.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (name, spec) in &self.parameters {
            let mut prop = json!({
                "type": spec.kind.to_string(),
                "description": spec.description,
            });
            if spec.kind == ParamType::Array {
                prop["items"] = json!({ "type": "string" });
            }
            properties.insert(name.clone(), prop);
            if spec.required {
                required.push(Value::String(name.clone()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check `args` against the declared parameters.
    ///
    /// Unknown keys are ignored; missing required keys and type mismatches
    /// are reported in declaration order.
    pub fn validate(&self, args: &Value) -> Result<(), ToolError> {
        let Some(obj) = args.as_object() else {
            return Err(ToolError::InvalidArguments(
                "arguments must be a JSON object".into(),
            ));
        };

        let mut problems = Vec::new();
        for (name, spec) in &self.parameters {
            match obj.get(name) {
                None | Some(Value::Null) if spec.required => {
                    problems.push(format!("missing required field '{name}'"));
                }
                None | Some(Value::Null) => {}
                Some(value) if !spec.kind.accepts(value) => {
                    problems.push(format!("field '{name}' must be of type {}", spec.kind));
                }
                Some(_) => {}
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ToolError::InvalidArguments(problems.join("; ")))
        }
    }
}

/// Failures a tool invocation can produce. None of them leave the registry:
/// they are rendered into the tool result so the model can react.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    NotFound(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("tool execution failed: {0}")]
    Execution(String),

    #[error("tool timed out after {0}s")]
    Timeout(u64),
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidArguments(_) => "invalid_arguments",
            Self::Execution(_) => "execution_failure",
            Self::Timeout(_) => "timeout",
        }
    }
}

impl From<anyhow::Error> for ToolError {
    fn from(err: anyhow::Error) -> Self {
        Self::Execution(format!("{err:#}"))
    }
}

/// A locally executed function the model may request.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and parameter schema.
    fn descriptor(&self) -> ToolDescriptor;

    /// Execute the tool with arguments that already passed validation.
    async fn execute(&self, args: &Value) -> Result<Value, ToolError>;
}

/// Pull a list of strings out of validated arguments.
pub(crate) fn string_list(args: &Value, key: &str) -> Vec<String> {
    args.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
