//! JSend Response Shaper
//!
//! Normalizes ad-hoc handler output into consistent `status`-tagged envelopes.
//!
//! A [`Schema`] maps branch names (`success`, `fail`, `error`, ...) to the keys
//! each branch requires and permits. Projecting a candidate object finds the
//! branch whose required keys are all present and returns a copy holding
//! only that branch's keys, plus the candidate's `status`. The branch named by
//! the candidate's `status` is preferred when it matches; otherwise the first
//! matching branch in declaration order is used.
//!
//! # Example
//!
//! ```
//! use jsend_schema::{project, Schema};
//! use serde_json::json;
//!
//! let handler_output = json!({
//!     "status": "error",
//!     "message": "bad",
//!     "code": 400,
//!     "extra": "drop me"
//! });
//!
//! let shaped = project(&handler_output, &Schema::jsend()).into_value();
//! assert_eq!(shaped, json!({ "status": "error", "message": "bad", "code": 400 }));
//! ```
//!
//! # Built-in Schema
//!
//! | Branch | Required | Optional |
//! |--------|----------|----------|
//! | `success` | status, data | |
//! | `fail` | status, data | |
//! | `error` | status, message | code, data |
//!
//! # Failure Modes
//!
//! Input that cannot be shaped at all (not an object, or no `status`) comes
//! back as [`Projection::Rejected`]; only an invalid custom schema is a hard
//! error ([`ConfigError`]), raised when the schema is loaded.

mod error;
mod linter;
mod loader;
mod matcher;
mod projector;
mod shaper;
mod types;

pub use error::{ConfigError, LoadError, SchemaLoadError, ShapeFailure};
pub use linter::{lint, lint_file, Diagnostic, FileResult, FileStatus, LintResult, Severity};
pub use loader::{load_schema, parse_json, read_json, Source};
pub use matcher::{check_schema, find_branch, is_valid, is_valid_schema, matches, select_branch};
pub use projector::{project, project_with, Projection};
pub use shaper::Shaper;
pub use types::{json_type_name, BranchSpec, Schema, ShapeOptions, JSEND_BRANCHES, STATUS_KEY};
