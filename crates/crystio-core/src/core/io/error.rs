//! Error types shared by every structure format handler.
//!
//! Parsing and serialization report a single [`FormatError`] kind carrying an
//! optional 1-based line number. Filesystem failures are kept apart in
//! [`StructureFileError`] so callers can tell a malformed file from an unreadable one.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A malformed structure file or a structure that cannot be expressed in a format.
///
/// Displays as `"<line>: <message>"` when the failure is tied to an input line and
/// as the bare message otherwise.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{prefix}{message}", prefix = LinePrefix(line))]
pub struct FormatError {
    /// One-based input line where parsing failed, if any.
    pub line: Option<usize>,
    /// Human-readable reason.
    pub message: String,
}

impl FormatError {
    /// Builds an error attached to a specific input line.
    pub fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }

    /// Builds an error that is not tied to any input line.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }
}

/// Errors raised by the path-based read and write helpers.
#[derive(Debug, Error)]
pub enum StructureFileError {
    #[error("I/O error for '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}: {source}", path = path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
}

impl StructureFileError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn format(path: impl Into<PathBuf>, source: FormatError) -> Self {
        Self::Format {
            path: path.into(),
            source,
        }
    }

    /// The underlying format error, if this is not an I/O failure.
    pub fn format_error(&self) -> Option<&FormatError> {
        match self {
            Self::Format { source, .. } => Some(source),
            Self::Io { .. } => None,
        }
    }
}

struct LinePrefix<'a>(&'a Option<usize>);

impl fmt::Display for LinePrefix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(line) => write!(f, "{}: ", line),
            None => Ok(()),
        }
    }
}
