//! Sync error handling
//!
//! Provides typed errors for push/pull operations. Each variant maps to one
//! failure class: configuration, catalog parsing, remote document I/O and
//! local filesystem access.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while synchronizing catalogs with the remote document
#[derive(Error, Debug)]
pub enum SyncError {
    /// Configuration is malformed or inconsistent for a locale
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog file cannot be read as a valid catalog
    #[error("Failed to parse '{path}' at line {line}: {details}")]
    Parse {
        path: PathBuf,
        line: usize,
        details: String,
    },

    /// A request against the remote document failed
    #[error("Remote document error: {0}")]
    Remote(String),

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File not found (when expected to exist)
    #[error("File not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Failed to read file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Backup could not be written, so the catalog was left untouched
    #[error("Failed to back up '{path}' to '{backup_path}': {source}")]
    Backup {
        path: PathBuf,
        backup_path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SyncError {
    /// Create a read error from an I/O error with path context
    pub fn from_read(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => SyncError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => SyncError::NotFound { path },
            _ => SyncError::ReadError {
                path,
                source: error,
            },
        }
    }

    /// Create a write error from an I/O error with path context
    pub fn from_write(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => SyncError::PermissionDenied {
                path,
                source: error,
            },
            _ => SyncError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Build a remote error from anything displayable
    pub fn remote(details: impl std::fmt::Display) -> Self {
        SyncError::Remote(details.to_string())
    }

    /// Short classification used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Config(_) => "config",
            SyncError::Parse { .. } => "parse",
            SyncError::Remote(_) => "remote",
            SyncError::Backup { .. } => "backup",
            SyncError::PermissionDenied { .. }
            | SyncError::NotFound { .. }
            | SyncError::ReadError { .. }
            | SyncError::WriteError { .. } => "io",
        }
    }
}

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;
