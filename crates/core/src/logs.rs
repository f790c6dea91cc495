//! Per-run log directory, execution logs and the reporting hook

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::error::Result;
use crate::perf::{self, BuildReport};
use crate::process::{ExecutionResult, OutputLine};

const LOG_DIRECTORY_PREFIX: &str = "execution-logs";

/// Receives every file the harness produces
pub trait Reporter: Send + Sync {
    /// Attach a produced file to the current test
    fn attach(&self, path: &Path, description: &str);

    /// Show free-form text alongside the attachments
    fn echo(&self, text: &str) {
        println!("{text}");
    }
}

/// Prints attachments to standard output
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn attach(&self, path: &Path, description: &str) {
        info!("Attached {}: {}", description, path.display());
        println!("{}: {}", description, path.display());
    }
}

/// Writes execution logs and performance reports into one directory per run.
///
/// The directory is created on first use and kept after the process exits.
/// File names carry a counter shared by every file this writer produces.
#[derive(Debug)]
pub struct LogWriter {
    root: Option<PathBuf>,
    directory: OnceCell<PathBuf>,
    counter: AtomicU64,
}

impl LogWriter {
    /// `root` is the parent of the run directory; `None` uses the system temp dir
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            directory: OnceCell::new(),
            counter: AtomicU64::new(0),
        }
    }

    /// The run's log directory, created on the first call
    pub fn directory(&self) -> Result<&Path> {
        let dir = self
            .directory
            .get_or_try_init(|| create_run_directory(self.root.as_deref()))?;
        Ok(dir.as_path())
    }

    /// Reserve a unique `<stem>-<n>.<extension>` path in the run directory
    pub fn next_path(&self, stem: &str, extension: &str) -> Result<PathBuf> {
        let dir = self.directory()?;
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(dir.join(format!("{stem}-{n}.{extension}")))
    }

    /// Write the captured output of one execution, followed by its summary line
    pub fn write_execution_log(&self, name: &str, result: &ExecutionResult) -> Result<PathBuf> {
        let path = self.next_path(name, "log")?;
        let trailer = OutputLine::now(result.summary_line());

        let mut contents = String::new();
        for line in result.lines.iter().chain(std::iter::once(&trailer)) {
            contents.push_str(&line.to_log_line());
            contents.push('\n');
        }
        fs::write(&path, contents)?;
        debug!("Wrote {} lines to {}", result.lines.len() + 1, path.display());
        Ok(path)
    }

    /// Write a `perf-data` document for one build
    pub fn write_performance_report(&self, subject: &str, report: &BuildReport) -> Result<PathBuf> {
        let path = self.next_path(&format!("{subject}-perfdata"), "xml")?;
        fs::write(&path, perf::to_xml(std::slice::from_ref(report)))?;
        debug!("Wrote performance data to {}", path.display());
        Ok(path)
    }
}

fn create_run_directory(root: Option<&Path>) -> Result<PathBuf> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(LOG_DIRECTORY_PREFIX);
    let dir = match root {
        Some(root) => {
            fs::create_dir_all(root)?;
            builder.tempdir_in(root)?
        }
        None => builder.tempdir()?,
    };
    let dir = dir.keep();
    info!("Execution logs are written to {}", dir.display());
    Ok(dir)
}
