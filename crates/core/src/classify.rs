//! Error-line extraction from captured tool output

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::process::OutputLine;

/// Matches `error:` optionally followed by an MSBuild (MSB), C# compiler (CS)
/// or platform toolchain (MT, MM) diagnostic code.
static ERROR_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)error\s*(MSB....)?(CS....)?(MT....)?(MM....)?:")
        .expect("error marker pattern is valid")
});

/// Distinct error lines from a failed run, in first-occurrence order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSummary {
    lines: Vec<String>,
}

impl ErrorSummary {
    pub fn from_lines(lines: Vec<String>) -> Self {
        let mut summary = Self::default();
        for line in lines {
            summary.push(line);
        }
        summary
    }

    fn push(&mut self, line: String) {
        if !self.lines.contains(&line) {
            self.lines.push(line);
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

impl fmt::Display for ErrorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lines.is_empty() {
            return Ok(());
        }
        write!(f, "\n\t[Summary of errors from the build output below]")?;
        for line in &self.lines {
            write!(f, "\n\t{line}")?;
        }
        Ok(())
    }
}

/// Returns true when the line carries a recognized error marker
pub fn is_error_line(text: &str) -> bool {
    ERROR_MARKER.is_match(text)
}

/// Collect the error lines of a run that timed out or exited non-zero.
///
/// A clean run (exit code 0, no timeout) always yields an empty summary, even
/// when its output mentions errors.
pub fn classify(lines: &[OutputLine], exit_code: i32, timed_out: bool) -> ErrorSummary {
    let mut summary = ErrorSummary::default();
    if (!timed_out && exit_code == 0) || lines.is_empty() {
        return summary;
    }

    for line in lines {
        if is_error_line(&line.text) {
            summary.push(line.text.clone());
        }
    }
    summary
}
