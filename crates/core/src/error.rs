use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::classify::ErrorSummary;

/// Errors that can occur while building and measuring a sample
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{context} timed out after {} minutes{summary}", minutes(.timeout))]
    TimedOut {
        context: String,
        timeout: Duration,
        summary: ErrorSummary,
    },

    #[error("{context} failed (unexpected exit code){summary}")]
    UnexpectedExitCode {
        context: String,
        exit_code: i32,
        summary: ErrorSummary,
    },

    #[error("No solution file found in {} or any parent directory", .0.display())]
    NoSolutionFound(PathBuf),

    #[error("No app directory found:{}", listing(.seen))]
    NoArtifact { seen: Vec<PathBuf> },

    #[error("More than one app directory found:{}", listing(.candidates))]
    AmbiguousArtifact { candidates: Vec<PathBuf> },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl Error {
    /// True for failures reported by the external tool itself rather than by the harness
    pub fn is_tool_failure(&self) -> bool {
        matches!(self, Error::TimedOut { .. } | Error::UnexpectedExitCode { .. })
    }
}

/// Result type alias for buildprobe operations
pub type Result<T> = std::result::Result<T, Error>;

fn minutes(timeout: &Duration) -> String {
    format!("{}", timeout.as_secs_f64() / 60.0)
}

fn listing(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("\n\t{}", p.display()))
        .collect()
}
