//! buildprobe - build sample projects and record what they produce
//!
//! This crate provides functionality to:
//! - Run external build tools under a timeout with timestamped, merged output
//! - Summarize the error lines of a failed run
//! - Keep per-run execution logs in a lazily created log directory
//! - Restore and compile a sample, then locate and measure its artifact
//! - Write `perf-data` reports for regression tracking
pub mod build;
pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod locate;
pub mod logs;
pub mod perf;
pub mod process;

// Re-export commonly used types
pub use error::{Error, Result};

// Re-export main API components
pub use build::{BuildOutcome, BuildRequest, BuildStage};
pub use classify::{ErrorSummary, classify};
pub use config::HarnessConfig;
pub use context::HarnessContext;
pub use locate::ArtifactLocator;
pub use logs::{ConsoleReporter, LogWriter, Reporter};
pub use perf::{BuildReport, BuildResult, FileEntry};
pub use process::{EnvValue, ExecutionRequest, ExecutionResult, OutputLine};
