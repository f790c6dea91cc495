use std::time::Duration;

use chrono::{DateTime, Local};

/// Exit code reported when the process was killed before it could report one
pub const NO_EXIT_CODE: i32 = -1;

/// One line of merged stdout/stderr, stamped on arrival
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub timestamp: DateTime<Local>,
    pub text: String,
}

impl OutputLine {
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            text: text.into(),
        }
    }

    /// `HH:MM:SS.ffffff: text`, the execution log format
    pub fn to_log_line(&self) -> String {
        format!("{}: {}", self.timestamp.format("%H:%M:%S%.6f"), self.text)
    }
}

/// Outcome of a single execution. Non-zero exit codes and timeouts are data, not errors.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub timed_out: bool,
    pub elapsed: Duration,
    pub lines: Vec<OutputLine>,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }

    /// The trailing line written to every execution log
    pub fn summary_line(&self) -> String {
        format!(
            "Exit code: {} Timed out: {} Total duration: {}",
            self.exit_code,
            self.timed_out,
            format_elapsed(self.elapsed)
        )
    }
}

/// `hh:mm:ss.fffffff`, with days folded into the hour count
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let ticks = elapsed.subsec_nanos() / 100;
    format!(
        "{:02}:{:02}:{:02}.{:07}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        ticks
    )
}
