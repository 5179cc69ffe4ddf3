//! Error types for the configuration compiler

use std::path::PathBuf;

use thiserror::Error;

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, LinkageError>;

/// Broad failure category, for callers that retry, log or abort
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Description does not match its structural contract
    Validation,
    /// A builder step or `build()` rejected the accumulated state
    Construction,
    /// Reading, writing or parsing a description file failed
    Io,
    /// The serializer was handed an object it cannot describe
    Type,
    /// A script statement could not be dispatched
    Script,
    /// Configuration could not be loaded
    Config,
}

/// Compiler errors
#[derive(Error, Debug)]
pub enum LinkageError {
    #[error("Invalid {kind} description at '{path}': {reason}")]
    Validation {
        kind: &'static str,
        path: String,
        reason: String,
    },

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("No such column ({role}): {name}")]
    UnknownColumn { role: &'static str, name: String },

    #[error("Compare field '{name}' is not a column of {missing_in}")]
    UnknownCompareField { name: String, missing_in: &'static str },

    #[error("Column '{0}' has zero length")]
    EmptySpan(String),

    #[error("Column '{name}' ends past the largest offset: start {start}, length {length}")]
    SpanOverflow {
        name: String,
        start: usize,
        length: usize,
    },

    #[error("Cannot build {0}: no {1} declared")]
    Empty(&'static str, &'static str),

    #[error("There was a problem reading the file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("There was a problem writing the file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot decode description: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Don't know how to save a {0}")]
    Unsupported(&'static str),

    #[error("Unbound name: {0}")]
    Unbound(String),

    #[error("'{0}' is not a file schema")]
    NotASchema(String),

    #[error("'{0}' is not a record comparator")]
    NotAComparator(String),

    #[error("Invalid script statement #{index}: {reason}")]
    Statement { index: usize, reason: String },

    #[error("Script nesting exceeds {0} levels")]
    TooDeep(usize),

    #[error("Broken description contract: {0}")]
    Contract(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl LinkageError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LinkageError::Validation { .. }
            | LinkageError::Contract(_)
            | LinkageError::Decode(_) => ErrorKind::Validation,
            LinkageError::DuplicateColumn(_)
            | LinkageError::UnknownColumn { .. }
            | LinkageError::UnknownCompareField { .. }
            | LinkageError::EmptySpan(_)
            | LinkageError::SpanOverflow { .. }
            | LinkageError::Empty(..) => ErrorKind::Construction,
            LinkageError::Read { .. }
            | LinkageError::Write { .. }
            | LinkageError::Parse { .. } => ErrorKind::Io,
            LinkageError::Unsupported(_) => ErrorKind::Type,
            LinkageError::Unbound(_)
            | LinkageError::NotASchema(_)
            | LinkageError::NotAComparator(_)
            | LinkageError::Statement { .. }
            | LinkageError::TooDeep(_) => ErrorKind::Script,
            LinkageError::Config(_) => ErrorKind::Config,
        }
    }

    /// Re-anchor a validation path under `prefix`, for descriptions nested in another
    pub fn within(self, prefix: &str) -> Self {
        match self {
            LinkageError::Validation { kind, path, reason } => LinkageError::Validation {
                kind,
                path: format!("{}{}", prefix, path),
                reason,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let e = LinkageError::UnknownColumn { role: "blocking", name: "zip".into() };
        assert_eq!(e.kind(), ErrorKind::Construction);
        assert_eq!(e.to_string(), "No such column (blocking): zip");

        let e = LinkageError::Unsupported("record comparator");
        assert_eq!(e.kind(), ErrorKind::Type);

        let e = LinkageError::SpanOverflow { name: "a".into(), start: usize::MAX, length: 1 };
        assert_eq!(e.kind(), ErrorKind::Construction);

        assert_eq!(LinkageError::NotAComparator("census".into()).kind(), ErrorKind::Script);
    }

    #[test]
    fn test_within_prefixes_validation_paths_only() {
        let e = LinkageError::Validation {
            kind: "delimited schema",
            path: "/columns/0".into(),
            reason: "bad".into(),
        }
        .within("/schema/1");
        assert!(matches!(e, LinkageError::Validation { ref path, .. } if path == "/schema/1/columns/0"));

        let e = LinkageError::Unbound("x".into()).within("/schema");
        assert!(matches!(e, LinkageError::Unbound(n) if n == "x"));
    }
}
