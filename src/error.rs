//! Error types for `sitesmith`.
//!
//! One top-level error enum aggregates the failure modes of the migration
//! pipeline and maps each to a process exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for `sitesmith` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Input error (missing root, undecodable file, malformed record)
    pub const INPUT_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;
}

/// Top-level error type for `sitesmith` operations.
#[derive(Debug, Error)]
pub enum SitesmithError {
    /// A configured input root directory does not exist.
    #[error("input root not found: {path}")]
    MissingRoot {
        /// The missing directory.
        path: PathBuf,
    },

    /// A legacy source file is neither valid UTF-8 nor valid Windows-1252.
    #[error("cannot decode {path} as UTF-8 or Windows-1252")]
    Decode {
        /// Path to the undecodable file.
        path: PathBuf,
    },

    /// A legacy JSON record does not have a recognizable shape.
    #[error("unexpected JSON structure in {path}: {message}")]
    RecordShape {
        /// Path to the offending JSON file.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SitesmithError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::MissingRoot { .. } | Self::Decode { .. } | Self::RecordShape { .. } => {
                ExitCode::INPUT_ERROR
            }
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Json(_) => ExitCode::INPUT_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_root_maps_to_input_error() {
        let err = SitesmithError::MissingRoot {
            path: PathBuf::from("/nope"),
        };
        assert_eq!(err.exit_code(), ExitCode::INPUT_ERROR);
    }

    #[test]
    fn io_maps_to_io_error() {
        let err = SitesmithError::Io(std::io::Error::other("boom"));
        assert_eq!(err.exit_code(), ExitCode::IO_ERROR);
    }

    #[test]
    fn decode_error_names_the_file() {
        let err = SitesmithError::Decode {
            path: PathBuf::from("old/alma.json"),
        };
        assert!(err.to_string().contains("alma.json"));
    }
}
