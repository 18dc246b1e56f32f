//! Static checks for shaping schema files.
//!
//! | code | severity | finding |
//! |------|----------|---------|
//! | E001 | error | file is not readable JSON |
//! | E002 | error | document is not a schema (branch not an object, no `required`, bad field list) |
//! | W001 | warning | a field is listed twice within one branch |
//! | W002 | warning | the schema declares no branches |

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Value};

use crate::loader::Source;
use crate::types::Schema;

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One finding in one schema file.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub file: PathBuf,
    /// JSON pointer into the schema document, `/` for the whole document.
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.code, self.path, self.message)
    }
}

/// Findings for a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl FileResult {
    fn new(file: PathBuf, diagnostics: Vec<Diagnostic>) -> Self {
        let status = if diagnostics.iter().any(|d| d.severity == Severity::Error) {
            FileStatus::Error
        } else if diagnostics.is_empty() {
            FileStatus::Ok
        } else {
            FileStatus::Warning
        };
        FileResult {
            file,
            status,
            diagnostics,
        }
    }

    /// Number of diagnostics at `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Whether this file fails the run; with `strict`, warnings fail too.
    pub fn fails(&self, strict: bool) -> bool {
        match self.status {
            FileStatus::Ok => false,
            FileStatus::Warning => strict,
            FileStatus::Error => true,
        }
    }
}

/// Worst severity found in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Warning,
    Error,
}

/// Aggregate over every schema file under a path.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub strict: bool,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true when no file fails under this run's strictness.
    pub fn is_ok(&self) -> bool {
        self.failed == 0
    }
}

/// Lint a schema file, or every `.json` file below a directory.
///
/// With `strict`, files that only carry warnings count as failed.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    let results: Vec<FileResult> = schema_files(path)
        .iter()
        .map(|file| lint_file(file, path))
        .collect();

    let failed = results.iter().filter(|r| r.fails(strict)).count();
    let errors = results.iter().map(|r| r.count(Severity::Error)).sum();
    let warnings = results.iter().map(|r| r.count(Severity::Warning)).sum();

    tracing::debug!(files = results.len(), failed, errors, warnings, "lint finished");

    LintResult {
        path: path.to_path_buf(),
        strict,
        files_checked: results.len(),
        passed: results.len() - failed,
        failed,
        errors,
        warnings,
        results,
    }
}

/// Lint one schema file. The reported file name is relative to `base`.
pub fn lint_file(file: &Path, base: &Path) -> FileResult {
    let shown = file.strip_prefix(base).unwrap_or(file);
    let shown = if shown.as_os_str().is_empty() {
        file
    } else {
        shown
    };

    let findings = match Source::File(file.to_path_buf()).read() {
        Err(e) => vec![(Severity::Error, "E001", "/".to_string(), e.to_string())],
        Ok(doc) => {
            let mut findings = structure_findings(&doc);
            if findings.is_empty() {
                if let Ok(schema) = Schema::from_value(&doc) {
                    findings.extend(branch_findings(&schema));
                }
            }
            findings
        }
    };

    let diagnostics = findings
        .into_iter()
        .map(|(severity, code, path, message)| Diagnostic {
            severity,
            code,
            file: shown.to_path_buf(),
            path,
            message,
        })
        .collect();

    FileResult::new(shown.to_path_buf(), diagnostics)
}

type Finding = (Severity, &'static str, String, String);

/// JSON Schema describing a shaping schema document.
fn document_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": {
            "type": "object",
            "required": ["required"],
            "properties": {
                "required": {
                    "type": "array",
                    "items": { "type": "string" }
                },
                "optional": {
                    "type": ["array", "null"],
                    "items": { "type": "string" }
                }
            }
        }
    })
}

fn structure_findings(doc: &Value) -> Vec<Finding> {
    let validator = match jsonschema::validator_for(&document_schema()) {
        Ok(validator) => validator,
        Err(e) => {
            return vec![(
                Severity::Error,
                "E002",
                "/".to_string(),
                format!("cannot build structure check: {}", e),
            )]
        }
    };

    validator
        .iter_errors(doc)
        .map(|error| {
            let pointer = error.instance_path.to_string();
            let pointer = if pointer.is_empty() {
                "/".to_string()
            } else {
                pointer
            };
            (Severity::Error, "E002", pointer, error.to_string())
        })
        .collect()
}

fn branch_findings(schema: &Schema) -> Vec<Finding> {
    if schema.is_empty() {
        return vec![(
            Severity::Warning,
            "W002",
            "/".to_string(),
            "schema declares no branches; nothing will ever match".to_string(),
        )];
    }

    let mut findings = Vec::new();
    for (name, spec) in schema.branches() {
        let listed: Vec<&String> = spec.required.iter().chain(&spec.optional).collect();
        for (index, key) in listed.iter().enumerate() {
            // report each repeat once, at its second listing
            if listed[..index].iter().filter(|k| *k == key).count() == 1 {
                findings.push((
                    Severity::Warning,
                    "W001",
                    format!("/{}", name),
                    format!("field \"{}\" is listed more than once", key),
                ));
            }
        }
    }
    findings
}

/// `.json` files at or below `root`, sorted.
fn schema_files(root: &Path) -> Vec<PathBuf> {
    let is_json = |path: &Path| path.extension().is_some_and(|ext| ext == "json");

    if root.is_file() {
        return if is_json(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        };
    }

    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            tracing::debug!(dir = %dir.display(), "skipping unreadable directory");
            continue;
        };
        for path in entries.flatten().map(|entry| entry.path()) {
            if path.is_dir() {
                pending.push(path);
            } else if is_json(&path) {
                found.push(path);
            }
        }
    }
    found.sort();
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn lint_str(content: &str) -> FileResult {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        lint_file(file.path(), file.path().parent().unwrap())
    }

    #[test]
    fn lint_valid_schema() {
        let result = lint_str(
            r#"{
                "success": { "required": ["status", "payload"] },
                "error": { "required": ["status", "message"], "optional": ["code"] }
            }"#,
        );
        assert_eq!(result.status, FileStatus::Ok);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn lint_invalid_json_syntax() {
        let result = lint_str("{ not valid json }");
        assert_eq!(result.status, FileStatus::Error);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, "E001");
    }

    #[test]
    fn lint_missing_required() {
        let result = lint_str(r#"{ "success": { "required": ["status"] }, "bogus": {} }"#);
        assert_eq!(result.status, FileStatus::Error);
        let diag = result
            .diagnostics
            .iter()
            .find(|d| d.code == "E002")
            .unwrap();
        assert_eq!(diag.path, "/bogus");
    }

    #[test]
    fn lint_non_string_field() {
        let result = lint_str(r#"{ "success": { "required": ["status", 3] } }"#);
        assert_eq!(result.status, FileStatus::Error);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == "E002" && d.path == "/success/required/1"));
    }

    #[test]
    fn lint_top_level_not_object() {
        let result = lint_str(r#"["success"]"#);
        assert_eq!(result.status, FileStatus::Error);
        assert_eq!(result.diagnostics[0].path, "/");
    }

    #[test]
    fn lint_duplicate_field() {
        let result = lint_str(
            r#"{ "error": { "required": ["status", "message"], "optional": ["message", "message"] } }"#,
        );
        assert_eq!(result.status, FileStatus::Warning);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, "W001");
        assert_eq!(
            result.diagnostics[0].to_string(),
            "W001 /error: field \"message\" is listed more than once"
        );
    }

    #[test]
    fn overlapping_branches_are_fine() {
        let result = lint_str(
            r#"{
                "any": { "required": ["status"] },
                "success": { "required": ["status", "data"] }
            }"#,
        );
        assert_eq!(result.status, FileStatus::Ok);
    }

    #[test]
    fn lint_empty_schema() {
        let result = lint_str("{}");
        assert_eq!(result.status, FileStatus::Warning);
        assert_eq!(result.diagnostics[0].code, "W002");
    }

    #[test]
    fn lint_directory() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("good.json"),
            r#"{"ok": {"required": ["status"]}}"#,
        )
        .unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested/bad.json"), r#"{"ok": {}}"#).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let result = lint(dir.path(), false);
        assert_eq!(result.files_checked, 2);
        assert_eq!(result.passed, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.results[1].file, Path::new("nested/bad.json"));
        assert!(!result.is_ok());
    }

    #[test]
    fn lint_single_file_keeps_its_name() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("schema.json");
        std::fs::write(&file, r#"{"ok": {"required": ["status"]}}"#).unwrap();

        let result = lint(&file, false);
        assert_eq!(result.files_checked, 1);
        assert_eq!(result.results[0].file, file);
    }

    #[test]
    fn lint_strict_fails_on_warnings() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("empty.json"), "{}").unwrap();

        let lenient = lint(dir.path(), false);
        assert_eq!(lenient.failed, 0);
        assert!(lenient.is_ok());

        let strict = lint(dir.path(), true);
        assert_eq!(strict.failed, 1);
        assert_eq!(strict.warnings, 1);
        assert!(!strict.is_ok());
    }
}
