//! Reading payloads and schema documents.
//!
//! Both come from a [`Source`]: a file on disk, or stdin when the CLI is
//! given `-`. [`load_schema`] additionally turns the document into a
//! [`Schema`], so a bad schema is reported before any payload is shaped.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{LoadError, SchemaLoadError};
use crate::types::Schema;

/// Where a JSON document is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// Interpret a command-line argument; `-` means stdin.
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Source::Stdin
        } else {
            Source::File(PathBuf::from(arg))
        }
    }

    /// Path used in error messages.
    pub fn path(&self) -> &Path {
        match self {
            Source::Stdin => Path::new("<stdin>"),
            Source::File(path) => path,
        }
    }

    /// Read and parse the document.
    ///
    /// # Errors
    ///
    /// `FileNotFound` for a missing file, `ReadError` for other IO failures,
    /// and `InvalidJson` when the bytes do not parse.
    pub fn read(&self) -> Result<Value, LoadError> {
        match self {
            Source::Stdin => read_json(io::stdin().lock(), self.path()),
            Source::File(path) => {
                let file = File::open(path).map_err(|source| match source.kind() {
                    io::ErrorKind::NotFound => LoadError::FileNotFound { path: path.clone() },
                    _ => LoadError::ReadError {
                        path: path.clone(),
                        source,
                    },
                })?;
                read_json(BufReader::new(file), path)
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}

/// Parse one JSON document from a reader.
///
/// `origin` names the reader in IO errors.
pub fn read_json(reader: impl Read, origin: &Path) -> Result<Value, LoadError> {
    serde_json::from_reader(reader).map_err(|source| {
        if source.is_io() {
            LoadError::ReadError {
                path: origin.to_path_buf(),
                source: io::Error::from(source),
            }
        } else {
            LoadError::InvalidJson { source }
        }
    })
}

/// Parse a JSON document held in memory, such as a command-line argument.
pub fn parse_json(content: &str) -> Result<Value, LoadError> {
    serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
}

/// Read a schema document and build a [`Schema`] from it.
///
/// # Errors
///
/// `SchemaLoadError::Load` if the document can't be read, or
/// `SchemaLoadError::Config` if it isn't a usable schema.
pub fn load_schema(source: &Source) -> Result<Schema, SchemaLoadError> {
    let doc = source.read()?;
    let schema = Schema::from_value(&doc)?;
    tracing::debug!(%source, branches = schema.len(), "schema loaded");
    Ok(schema)
}
