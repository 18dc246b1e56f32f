//! JSend Schema CLI
//!
//! Command-line interface for shaping payloads into status envelopes and
//! linting shaping schemas.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use jsend_schema::{
    lint, load_schema, parse_json, select_branch, FileStatus, LintResult, Projection, Severity,
    ShapeOptions, Shaper, Source, STATUS_KEY,
};

#[derive(Parser)]
#[command(name = "jsend-schema")]
#[command(about = "Shape payloads into JSend-style status envelopes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a payload onto the branch it matches
    Shape {
        /// Payload file to shape ("-" reads stdin)
        payload: String,

        /// Custom schema file (default: built-in JSend schema)
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Do not map the JSend payload field onto the custom schema's field
        #[arg(long)]
        no_substitution: bool,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Check whether a payload matches any branch
    Check {
        /// Payload file to check ("-" reads stdin)
        payload: String,

        /// Custom schema file (default: built-in JSend schema)
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Build an envelope for a status
    Wrap {
        /// Envelope status
        #[arg(value_enum)]
        status: WrapStatus,

        /// Payload as JSON (success, fail, error)
        #[arg(long)]
        data: Option<String>,

        /// Error message
        #[arg(long, required_if_eq("status", "error"))]
        message: Option<String>,

        /// Error code as JSON (error only)
        #[arg(long)]
        code: Option<String>,

        /// Custom schema file (default: built-in JSend schema)
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Lint schema files (syntax, structure, duplicate fields, empty schemas)
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum WrapStatus {
    Success,
    Fail,
    Error,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Shape {
            payload,
            schema,
            no_substitution,
            output,
            pretty,
        } => run_shape(
            &Source::from_arg(&payload),
            schema.as_deref(),
            !no_substitution,
            output,
            pretty,
        ),

        Commands::Check {
            payload,
            schema,
            json,
        } => run_check(&Source::from_arg(&payload), schema.as_deref(), json),

        Commands::Wrap {
            status,
            data,
            message,
            code,
            schema,
            pretty,
        } => run_wrap(WrapArgs {
            status,
            data,
            message,
            code,
            schema,
            pretty,
        }),

        Commands::Lint {
            path,
            format,
            strict,
            quiet,
        } => run_lint(&path, &format, strict, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Build a shaper over the given schema file, or the built-in schema.
fn build_shaper(schema_file: Option<&Path>, substitution: bool) -> Result<Shaper, u8> {
    let shaper = match schema_file {
        Some(path) => {
            let schema = load_schema(&Source::File(path.to_path_buf())).map_err(|e| {
                eprintln!("Error loading schema: {}", e);
                e.exit_code() as u8
            })?;
            Shaper::with_schema(schema)
        }
        None => Shaper::new(),
    };

    Ok(shaper.options(ShapeOptions::new().field_substitution(substitution)))
}

fn read_payload(source: &Source) -> Result<Value, u8> {
    source.read().map_err(|e| {
        eprintln!("Error loading payload: {}", e);
        e.exit_code() as u8
    })
}

fn render(value: &impl serde::Serialize, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}

fn run_shape(
    payload_source: &Source,
    schema_file: Option<&Path>,
    substitution: bool,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let shaper = build_shaper(schema_file, substitution)?;
    let payload = read_payload(payload_source)?;

    let projection = shaper.project(&payload);
    let json_output = render(&projection, pretty)?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    match projection {
        Projection::Shaped(_) => Ok(()),
        Projection::Rejected(failure) => {
            eprintln!("Rejected: {}", failure);
            Err(1)
        }
    }
}

fn run_check(
    payload_source: &Source,
    schema_file: Option<&Path>,
    json_output: bool,
) -> Result<(), u8> {
    let shaper = build_shaper(schema_file, true)?;
    let payload = read_payload(payload_source)?;

    let valid = shaper.is_valid(&payload);
    let branch = payload.as_object().and_then(|map| {
        let status = map.get(STATUS_KEY).and_then(Value::as_str);
        select_branch(map, status, shaper.schema()).map(|(name, _)| name)
    });

    if json_output {
        let output = serde_json::json!({
            "valid": valid,
            "branch": branch,
        });
        println!("{}", output);
    } else if let Some(branch) = branch {
        println!("Valid (branch: {})", branch);
    } else {
        eprintln!("No branch matches");
    }

    if valid {
        Ok(())
    } else {
        Err(1)
    }
}

struct WrapArgs {
    status: WrapStatus,
    data: Option<String>,
    message: Option<String>,
    code: Option<String>,
    schema: Option<PathBuf>,
    pretty: bool,
}

fn run_wrap(args: WrapArgs) -> Result<(), u8> {
    let WrapArgs {
        status,
        data,
        message,
        code,
        schema,
        pretty,
    } = args;

    let shaper = build_shaper(schema.as_deref(), true)?;
    let data = data.as_deref().map(parse_json_arg).transpose()?;
    let code = code.as_deref().map(parse_json_arg).transpose()?;

    let projection = match status {
        WrapStatus::Success => shaper.success(data.unwrap_or(Value::Null)),
        WrapStatus::Fail => shaper.fail(data.unwrap_or(Value::Null)),
        WrapStatus::Error => shaper.error_with(message.unwrap_or_default(), code, data),
    };

    println!("{}", render(&projection, pretty)?);
    Ok(())
}

fn parse_json_arg(raw: &str) -> Result<Value, u8> {
    parse_json(raw).map_err(|e| {
        eprintln!("Error parsing argument: {}", e);
        e.exit_code() as u8
    })
}

fn run_lint(path: &Path, format: &str, strict: bool, quiet: bool) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let result = lint(path, strict);

    if format == "json" {
        println!("{}", render(&result, true)?);
    } else {
        print_lint_report(&result, quiet);
    }

    if result.is_ok() {
        Ok(())
    } else {
        Err(1)
    }
}

/// One line per file, its diagnostics indented beneath, then a summary.
/// `quiet` hides passing files and warnings.
fn print_lint_report(result: &LintResult, quiet: bool) {
    for file in &result.results {
        let label = match file.status {
            FileStatus::Ok if quiet => continue,
            FileStatus::Ok => "ok",
            FileStatus::Warning => "warning",
            FileStatus::Error => "error",
        };
        let shown: Vec<_> = file
            .diagnostics
            .iter()
            .filter(|d| !quiet || d.severity == Severity::Error)
            .collect();
        if quiet && shown.is_empty() && !file.fails(result.strict) {
            continue;
        }

        println!("{}: {}", file.file.display(), label);
        for diagnostic in shown {
            println!("    {}", diagnostic);
        }
    }

    println!(
        "summary: {} files, {} passed, {} failed ({} errors, {} warnings)",
        result.files_checked, result.passed, result.failed, result.errors, result.warnings
    );
}
