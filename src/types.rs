//! Core types for response shaping.

use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Key carrying the envelope status on every candidate.
pub const STATUS_KEY: &str = "status";

/// Branch names of the built-in JSend schema.
pub const JSEND_BRANCHES: &[&str] = &["success", "fail", "error"];

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field lists for one named branch of a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BranchSpec {
    /// Keys that must be present for the branch to match.
    pub required: Vec<String>,
    /// Keys that are kept when present but never affect matching.
    pub optional: Vec<String>,
}

impl BranchSpec {
    /// Create a branch spec with the given required keys and no optional keys.
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
            optional: Vec::new(),
        }
    }

    /// Set the optional keys.
    pub fn optional<I, S>(mut self, optional: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional = optional.into_iter().map(Into::into).collect();
        self
    }

    /// All permitted keys: required first, then optional, without repeats.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::with_capacity(self.required.len() + self.optional.len());
        for key in self.required.iter().chain(&self.optional) {
            if !fields.contains(&key.as_str()) {
                fields.push(key.as_str());
            }
        }
        fields
    }

    /// First required key other than `status`.
    ///
    /// For JSend-shaped branches this is the field holding the payload
    /// (`data` or `message`).
    pub fn primary_field(&self) -> Option<&str> {
        self.required
            .iter()
            .map(String::as_str)
            .find(|key| *key != STATUS_KEY)
    }

    /// Parse one branch of a raw schema document.
    fn from_value(branch: &str, value: &Value) -> Result<Self, ConfigError> {
        let Value::Object(map) = value else {
            return Err(ConfigError::InvalidBranch {
                branch: branch.to_string(),
                actual: json_type_name(value).to_string(),
            });
        };

        let required = match map.get("required") {
            None | Some(Value::Null) => {
                return Err(ConfigError::MissingRequired {
                    branch: branch.to_string(),
                })
            }
            Some(list) => field_list(branch, "required", list)?,
        };

        let optional = match map.get("optional") {
            None | Some(Value::Null) => Vec::new(),
            Some(list) => field_list(branch, "optional", list)?,
        };

        Ok(Self { required, optional })
    }
}

fn field_list(branch: &str, list: &str, value: &Value) -> Result<Vec<String>, ConfigError> {
    let invalid = || ConfigError::InvalidFieldList {
        branch: branch.to_string(),
        list: list.to_string(),
    };

    value
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|item| item.as_str().map(String::from).ok_or_else(invalid))
        .collect()
}

/// Ordered mapping from branch name to [`BranchSpec`].
///
/// Declaration order decides which branch wins when several match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    branches: Vec<(String, BranchSpec)>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in JSend schema.
    ///
    /// | branch | required | optional |
    /// |---|---|---|
    /// | success | status, data | |
    /// | fail | status, data | |
    /// | error | status, message | code, data |
    pub fn jsend() -> Self {
        Self::new()
            .branch("success", BranchSpec::new(["status", "data"]))
            .branch("fail", BranchSpec::new(["status", "data"]))
            .branch(
                "error",
                BranchSpec::new(["status", "message"]).optional(["code", "data"]),
            )
    }

    /// Add a branch. Re-declaring an existing name replaces it in place.
    pub fn branch(mut self, name: impl Into<String>, spec: BranchSpec) -> Self {
        let name = name.into();
        match self.branches.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = spec,
            None => self.branches.push((name, spec)),
        }
        self
    }

    /// Parse a raw schema document, rejecting invalid ones.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the document is not an object, a branch is not
    /// an object, a branch lacks `required`, or a field list is not an array
    /// of strings.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let Value::Object(map) = value else {
            return Err(ConfigError::NotAnObject {
                actual: json_type_name(value).to_string(),
            });
        };

        let branches = map
            .iter()
            .map(|(name, spec)| Ok((name.clone(), BranchSpec::from_value(name, spec)?)))
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { branches })
    }

    /// Look up a branch by name.
    pub fn get(&self, name: &str) -> Option<&BranchSpec> {
        self.branches
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }

    /// Branches in declaration order.
    pub fn branches(&self) -> impl Iterator<Item = (&str, &BranchSpec)> {
        self.branches.iter().map(|(n, spec)| (n.as_str(), spec))
    }

    /// Number of declared branches.
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Returns true if no branch is declared; such a schema matches nothing.
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Render back to a schema document.
    pub fn to_value(&self) -> Value {
        let mut doc = Map::new();
        for (name, spec) in &self.branches {
            let mut branch = Map::new();
            branch.insert("required".to_string(), string_array(&spec.required));
            if !spec.optional.is_empty() {
                branch.insert("optional".to_string(), string_array(&spec.optional));
            }
            doc.insert(name.clone(), Value::Object(branch));
        }
        Value::Object(doc)
    }
}

fn string_array(keys: &[String]) -> Value {
    Value::Array(keys.iter().cloned().map(Value::String).collect())
}

/// Knobs for a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeOptions {
    /// Let a custom schema receive the JSend payload field under its own name
    /// when the candidate only matches the built-in schema.
    pub field_substitution: bool,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            field_substitution: true,
        }
    }
}

impl ShapeOptions {
    /// Options with field substitution enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable field substitution.
    pub fn field_substitution(mut self, enabled: bool) -> Self {
        self.field_substitution = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn jsend_schema_table() {
        let schema = Schema::jsend();
        let names: Vec<&str> = schema.branches().map(|(n, _)| n).collect();
        assert_eq!(names, JSEND_BRANCHES);

        let error = schema.get("error").unwrap();
        assert_eq!(error.fields(), vec!["status", "message", "code", "data"]);
        assert_eq!(error.primary_field(), Some("message"));
        assert_eq!(schema.get("fail").unwrap().primary_field(), Some("data"));
    }

    #[test]
    fn from_value_keeps_declaration_order() {
        let doc = json!({
            "zeta": { "required": ["status"] },
            "alpha": { "required": ["status", "data"], "optional": ["meta"] }
        });
        let schema = Schema::from_value(&doc).unwrap();
        let names: Vec<&str> = schema.branches().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(schema.get("alpha").unwrap().optional, vec!["meta"]);
    }

    #[test]
    fn from_value_rejects_missing_required() {
        let doc = json!({ "success": { "required": ["status"] }, "bogus": {} });
        assert_eq!(
            Schema::from_value(&doc),
            Err(ConfigError::MissingRequired {
                branch: "bogus".into()
            })
        );

        let doc = json!({ "success": { "required": null } });
        assert!(matches!(
            Schema::from_value(&doc),
            Err(ConfigError::MissingRequired { .. })
        ));
    }

    #[test]
    fn from_value_rejects_bad_shapes() {
        assert!(matches!(
            Schema::from_value(&json!(["success"])),
            Err(ConfigError::NotAnObject { .. })
        ));
        assert!(matches!(
            Schema::from_value(&json!({ "success": true })),
            Err(ConfigError::InvalidBranch { .. })
        ));
        assert_eq!(
            Schema::from_value(&json!({ "success": { "required": "status" } })),
            Err(ConfigError::InvalidFieldList {
                branch: "success".into(),
                list: "required".into()
            })
        );
        assert!(matches!(
            Schema::from_value(&json!({ "s": { "required": [], "optional": [1] } })),
            Err(ConfigError::InvalidFieldList { .. })
        ));
    }

    #[test]
    fn empty_required_is_valid() {
        let schema = Schema::from_value(&json!({ "any": { "required": [] } })).unwrap();
        assert!(schema.get("any").unwrap().required.is_empty());
        assert_eq!(schema.get("any").unwrap().primary_field(), None);
    }

    #[test]
    fn branch_redeclaration_replaces_in_place() {
        let schema = Schema::new()
            .branch("a", BranchSpec::new(["x"]))
            .branch("b", BranchSpec::new(["y"]))
            .branch("a", BranchSpec::new(["z"]));
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.branches().next().unwrap().1.required, vec!["z"]);
    }

    #[test]
    fn to_value_round_trips_jsend() {
        let doc = Schema::jsend().to_value();
        assert_eq!(doc["error"]["optional"], json!(["code", "data"]));
        assert!(doc["success"].get("optional").is_none());
        assert_eq!(Schema::from_value(&doc).unwrap(), Schema::jsend());
    }

    #[test]
    fn shape_options_default_enables_substitution() {
        assert!(ShapeOptions::new().field_substitution);
        assert!(!ShapeOptions::new().field_substitution(false).field_substitution);
    }
}
