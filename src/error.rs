//! Error types for program loading, import resolution and queries.
//!
//! Structural problems found while loading a tree are collected into a
//! `Vec<AnalysisError>` next to whatever partial [`Program`](crate::core::Program)
//! could be built; only the caller decides whether they are fatal.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Root path missing, empty or not a directory
    #[error("invalid root path '{}': {reason}", .path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    /// Exclusion pattern that does not compile as a glob
    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Filesystem failure while walking; never aborts the walk
    #[error("error walking '{}': {source}", .path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unreadable or syntactically broken source file
    #[error("error parsing '{}': {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("more than one package name [{}] found in single directory: {}", .names.join(", "), .path.display())]
    MultiplePackageDeclared { names: Vec<String>, path: PathBuf },

    #[error("package '{logical_path}' at {} already loaded from {}", .path.display(), .existing.display())]
    DuplicateLogicalPath {
        logical_path: String,
        path: PathBuf,
        existing: PathBuf,
    },

    #[error("unable to find import path '{import_path}' from {}: {reason}", .from.display())]
    ImportResolutionFailed {
        import_path: String,
        from: PathBuf,
        reason: String,
    },

    #[error("package: {name} not found")]
    PackageNotFound { name: String },

    #[error("invalid marker type '{marker}', expected <import/path>.<TypeName>")]
    InvalidMarker { marker: String },
}

impl AnalysisError {
    pub(crate) fn traversal(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::Traversal {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AnalysisError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Errors that only degrade results (an edge stays unresolved) rather than
    /// dropping a whole package.
    pub fn is_degradation(&self) -> bool {
        matches!(self, AnalysisError::ImportResolutionFailed { .. })
    }
}

impl From<walkdir::Error> for AnalysisError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        let message = err.to_string();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, message));
        AnalysisError::Traversal { path, source }
    }
}
