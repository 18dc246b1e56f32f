//! Error types for schema loading, configuration and shaping.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while reading a JSON document (schema or payload).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

/// A schema document that cannot be used for shaping.
///
/// Raised when a custom schema is supplied; a shaper is never built from
/// a schema that produced one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("schema must be an object mapping branch names to branch specs, got {actual}")]
    NotAnObject { actual: String },

    #[error("branch '{branch}' must be an object, got {actual}")]
    InvalidBranch { branch: String, actual: String },

    #[error("branch '{branch}' does not define 'required'")]
    MissingRequired { branch: String },

    #[error("branch '{branch}': '{list}' must be an array of field names")]
    InvalidFieldList { branch: String, list: String },
}

impl ConfigError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors loading a schema from a source and turning it into a [`Schema`](crate::Schema).
#[derive(Debug, Error)]
pub enum SchemaLoadError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("invalid schema: {0}")]
    Config(#[from] ConfigError),
}

impl SchemaLoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            SchemaLoadError::Load(e) => e.exit_code(),
            SchemaLoadError::Config(e) => e.exit_code(),
        }
    }
}

/// Why a candidate could not be projected at all.
///
/// This is a value, not a fault: `project` hands it back inside
/// [`Projection::Rejected`](crate::Projection::Rejected).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeFailure {
    #[error("response must be an object, got {actual}")]
    NotAnObject { actual: String },

    #[error("response has no status")]
    MissingStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_exit_codes() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("schema.json"),
        };
        assert_eq!(err.exit_code(), 3);

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = LoadError::InvalidJson { source };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn schema_load_error_delegates_exit_code() {
        let err = SchemaLoadError::from(LoadError::FileNotFound {
            path: PathBuf::from("missing.json"),
        });
        assert_eq!(err.exit_code(), 3);

        let err = SchemaLoadError::from(ConfigError::MissingRequired {
            branch: "bogus".into(),
        });
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.to_string(),
            "invalid schema: branch 'bogus' does not define 'required'"
        );
    }

    #[test]
    fn shape_failure_display() {
        let err = ShapeFailure::NotAnObject {
            actual: "null".into(),
        };
        assert_eq!(err.to_string(), "response must be an object, got null");
        assert_eq!(ShapeFailure::MissingStatus.to_string(), "response has no status");
    }
}
