//! Branch matching: key-presence checks of candidates against schemas.

use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::types::{BranchSpec, Schema};

/// Returns true if every required key of `spec` is present on `candidate`.
///
/// Only presence is checked; a key mapped to `null` still counts. Optional
/// keys never affect the result, and an empty `required` list always matches.
pub fn matches(candidate: &Map<String, Value>, spec: &BranchSpec) -> bool {
    spec.required.iter().all(|key| candidate.contains_key(key))
}

/// Returns true if `candidate` is an object matching at least one branch.
pub fn is_valid(candidate: &Value, schema: &Schema) -> bool {
    candidate
        .as_object()
        .is_some_and(|map| schema.branches().any(|(_, spec)| matches(map, spec)))
}

/// First branch, in declaration order, whose required keys are all present.
pub fn find_branch<'s>(
    candidate: &Map<String, Value>,
    schema: &'s Schema,
) -> Option<(&'s str, &'s BranchSpec)> {
    schema.branches().find(|(name, spec)| {
        let hit = matches(candidate, spec);
        tracing::trace!(branch = %name, hit, "branch check");
        hit
    })
}

/// Branch a candidate projects through.
///
/// The branch named by `status` wins when its required keys are present;
/// otherwise the first matching branch in declaration order is used.
pub fn select_branch<'s>(
    candidate: &Map<String, Value>,
    status: Option<&str>,
    schema: &'s Schema,
) -> Option<(&'s str, &'s BranchSpec)> {
    let named = status.and_then(|name| {
        schema
            .branches()
            .find(|(branch, spec)| *branch == name && matches(candidate, spec))
    });
    named.or_else(|| find_branch(candidate, schema))
}

/// Check that a raw schema document can be used for shaping.
///
/// # Errors
///
/// Returns the first `ConfigError` found; see [`Schema::from_value`].
pub fn check_schema(schema: &Value) -> Result<(), ConfigError> {
    Schema::from_value(schema).map(|_| ())
}

/// Returns true if every branch of a raw schema document defines `required`.
pub fn is_valid_schema(schema: &Value) -> bool {
    check_schema(schema).is_ok()
}
