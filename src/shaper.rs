//! Reusable shaper bound to one schema.

use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::matcher::is_valid;
use crate::projector::{project_with, Projection};
use crate::types::{Schema, ShapeOptions, STATUS_KEY};

/// Shapes handler output against a fixed, validated schema.
///
/// # Example
///
/// ```
/// use jsend_schema::Shaper;
/// use serde_json::json;
///
/// let shaper = Shaper::from_schema_value(&json!({
///     "success": { "required": ["status", "payload"] }
/// }))
/// .unwrap();
///
/// let out = shaper.success(json!([1, 2])).into_value();
/// assert_eq!(out, json!({ "payload": [1, 2], "status": "success" }));
/// ```
#[derive(Debug, Clone)]
pub struct Shaper {
    schema: Schema,
    options: ShapeOptions,
}

impl Default for Shaper {
    fn default() -> Self {
        Self::new()
    }
}

impl Shaper {
    /// Shaper over the built-in JSend schema.
    pub fn new() -> Self {
        Self::with_schema(Schema::jsend())
    }

    /// Shaper over an already-built schema.
    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema,
            options: ShapeOptions::default(),
        }
    }

    /// Shaper over a raw schema document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the document is not a valid schema; no shaper
    /// is built in that case.
    pub fn from_schema_value(schema: &Value) -> Result<Self, ConfigError> {
        let schema = Schema::from_value(schema)?;
        tracing::debug!(branches = schema.len(), "custom schema accepted");
        Ok(Self::with_schema(schema))
    }

    /// Replace the projection options.
    pub fn options(mut self, options: ShapeOptions) -> Self {
        self.options = options;
        self
    }

    /// The schema candidates are matched and projected against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns true if `candidate` matches at least one branch.
    pub fn is_valid(&self, candidate: &Value) -> bool {
        is_valid(candidate, &self.schema)
    }

    /// Project `candidate` against this shaper's schema.
    pub fn project(&self, candidate: &Value) -> Projection {
        project_with(candidate, &self.schema, &self.options)
    }

    /// `{status: "success", data}`, shaped.
    pub fn success(&self, data: Value) -> Projection {
        self.envelope("success", [("data", Some(data))])
    }

    /// `{status: "fail", data}`, shaped.
    pub fn fail(&self, data: Value) -> Projection {
        self.envelope("fail", [("data", Some(data))])
    }

    /// `{status: "error", message}`, shaped.
    pub fn error(&self, message: impl Into<String>) -> Projection {
        self.error_with(message, None, None)
    }

    /// `{status: "error", message, code?, data?}`, shaped.
    pub fn error_with(
        &self,
        message: impl Into<String>,
        code: Option<Value>,
        data: Option<Value>,
    ) -> Projection {
        self.envelope(
            "error",
            [
                ("message", Some(Value::String(message.into()))),
                ("code", code),
                ("data", data),
            ],
        )
    }

    fn envelope<const N: usize>(
        &self,
        status: &str,
        members: [(&str, Option<Value>); N],
    ) -> Projection {
        let mut candidate = Map::new();
        candidate.insert(STATUS_KEY.to_string(), Value::String(status.to_string()));
        for (key, value) in members {
            if let Some(value) = value {
                candidate.insert(key.to_string(), value);
            }
        }
        self.project(&Value::Object(candidate))
    }
}
