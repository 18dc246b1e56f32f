//! Projection - reduces a candidate to the fields its matched branch permits.
//!
//! Resolution order for a candidate that has a `status`:
//!
//! 1. A status naming no branch of the schema or of the JSend schema goes
//!    straight to step 4.
//! 2. The branch named by the status wins if its required keys are present,
//!    else the first matching branch in declaration order; its required and
//!    optional keys present on the candidate are kept.
//! 3. Otherwise, if the candidate is a JSend object, its payload field is
//!    handed to the schema's branch under that branch's own field name
//!    (see [`ShapeOptions::field_substitution`]).
//! 4. Otherwise the candidate degrades to whatever JSend fields it carries.
//!
//! The candidate's `status` is copied verbatim into every shaped result.

use std::sync::OnceLock;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ShapeFailure;
use crate::matcher::select_branch;
use crate::types::{json_type_name, Schema, ShapeOptions, STATUS_KEY};

/// Outcome of shaping one candidate.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Reduced copy of the candidate.
    Shaped(Map<String, Value>),
    /// No sensible projection exists.
    Rejected(ShapeFailure),
}

impl Projection {
    /// Returns true for [`Projection::Shaped`].
    pub fn is_shaped(&self) -> bool {
        matches!(self, Projection::Shaped(_))
    }

    /// The shaped object, if any.
    pub fn as_shaped(&self) -> Option<&Map<String, Value>> {
        match self {
            Projection::Shaped(map) => Some(map),
            Projection::Rejected(_) => None,
        }
    }

    /// The failure, if the candidate was rejected.
    pub fn failure(&self) -> Option<&ShapeFailure> {
        match self {
            Projection::Shaped(_) => None,
            Projection::Rejected(failure) => Some(failure),
        }
    }

    /// Convert to a JSON value.
    ///
    /// A rejection becomes a JSend error envelope carrying the failure text.
    pub fn into_value(self) -> Value {
        match self {
            Projection::Shaped(map) => Value::Object(map),
            Projection::Rejected(failure) => Value::Object(error_envelope(&failure)),
        }
    }
}

impl From<Projection> for Value {
    fn from(projection: Projection) -> Self {
        projection.into_value()
    }
}

impl Serialize for Projection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Projection::Shaped(map) => map.serialize(serializer),
            Projection::Rejected(failure) => error_envelope(failure).serialize(serializer),
        }
    }
}

fn error_envelope(failure: &ShapeFailure) -> Map<String, Value> {
    let mut envelope = Map::new();
    envelope.insert(STATUS_KEY.to_string(), Value::String("error".to_string()));
    envelope.insert("message".to_string(), Value::String(failure.to_string()));
    envelope
}

/// The built-in JSend schema, shared by every projection.
fn jsend() -> &'static Schema {
    static JSEND: OnceLock<Schema> = OnceLock::new();
    JSEND.get_or_init(Schema::jsend)
}

/// Project a candidate with default options.
pub fn project(candidate: &Value, schema: &Schema) -> Projection {
    project_with(candidate, schema, &ShapeOptions::default())
}

/// Project a candidate against `schema`.
///
/// Never panics and never fails hard: malformed input comes back as
/// [`Projection::Rejected`].
pub fn project_with(candidate: &Value, schema: &Schema, options: &ShapeOptions) -> Projection {
    let Value::Object(map) = candidate else {
        return Projection::Rejected(ShapeFailure::NotAnObject {
            actual: json_type_name(candidate).to_string(),
        });
    };

    let status = match map.get(STATUS_KEY) {
        None | Some(Value::Null) => return Projection::Rejected(ShapeFailure::MissingStatus),
        Some(status) => status,
    };

    let status_name = status.as_str();
    let known = status_name.is_some_and(|name| {
        schema.get(name).is_some() || jsend().get(name).is_some()
    });
    if !known {
        tracing::debug!(%status, "status names no branch, degrading to JSend fields");
        return Projection::Shaped(degrade(map, status));
    }

    if let Some((branch, spec)) = select_branch(map, status_name, schema) {
        tracing::debug!(%branch, "candidate matched branch");
        return Projection::Shaped(pick(map, &spec.fields(), status));
    }

    if options.field_substitution {
        if let Some(shaped) = substitute_default_field(map, status, schema) {
            return Projection::Shaped(shaped);
        }
    }

    tracing::debug!(%status, "no branch matched, degrading to JSend fields");
    Projection::Shaped(degrade(map, status))
}

/// Copy the listed keys present on `candidate`, then attach `status`.
fn pick(candidate: &Map<String, Value>, fields: &[&str], status: &Value) -> Map<String, Value> {
    let mut shaped = Map::new();
    for &key in fields {
        if let Some(value) = candidate.get(key) {
            shaped.insert(key.to_string(), value.clone());
        }
    }
    if !shaped.contains_key(STATUS_KEY) {
        shaped.insert(STATUS_KEY.to_string(), status.clone());
    }
    shaped
}

/// Rename the JSend payload field to the schema's field for the same status.
///
/// Applies when the candidate matches the JSend schema but not `schema`:
/// `{status: "success", data: x}` against a schema whose `success` branch
/// requires `payload` yields `{payload: x, status: "success"}`. Returns
/// `None` when either side has no payload field to map.
fn substitute_default_field(
    candidate: &Map<String, Value>,
    status: &Value,
    schema: &Schema,
) -> Option<Map<String, Value>> {
    let jsend = jsend();
    let status_name = status.as_str();

    let (default_branch, default_spec) = select_branch(candidate, status_name, jsend)?;

    let custom_spec = status_name
        .and_then(|name| schema.get(name))
        .or_else(|| schema.get(default_branch))?;

    let source = default_spec.primary_field()?;
    let target = custom_spec.primary_field()?;
    let value = candidate.get(source)?;

    tracing::debug!(
        branch = %default_branch,
        from = source,
        to = target,
        "substituting JSend payload field"
    );

    let mut shaped = Map::new();
    shaped.insert(target.to_string(), value.clone());
    shaped.insert(STATUS_KEY.to_string(), status.clone());
    Some(shaped)
}

/// Keep whatever JSend fields the candidate carries.
///
/// A status naming a JSend branch limits the pick to that branch; any other
/// status picks from the fields of all JSend branches.
fn degrade(candidate: &Map<String, Value>, status: &Value) -> Map<String, Value> {
    let jsend = jsend();
    let fields = match status.as_str().and_then(|name| jsend.get(name)) {
        Some(spec) => spec.fields(),
        None => {
            let mut all: Vec<&str> = Vec::new();
            for (_, spec) in jsend.branches() {
                for key in spec.fields() {
                    if !all.contains(&key) {
                        all.push(key);
                    }
                }
            }
            all
        }
    };
    pick(candidate, &fields, status)
}
