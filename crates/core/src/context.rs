//! The state shared by every build in a test run

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::build::{BuildOrchestrator, BuildOutcome, BuildRequest};
use crate::classify::classify;
use crate::config::HarnessConfig;
use crate::error::{Error, Result};
use crate::logs::{ConsoleReporter, LogWriter, Reporter};
use crate::perf::BuildReport;
use crate::process::{ExecutionRequest, ExecutionResult, ProcessRunner, SystemRunner};

/// Owns the run's configuration, log directory, log counter, reporter and
/// process runner. Create one per test run and share it by reference between
/// concurrently running tests.
pub struct HarnessContext {
    config: HarnessConfig,
    logs: LogWriter,
    reporter: Box<dyn Reporter>,
    runner: Box<dyn ProcessRunner>,
}

impl HarnessContext {
    pub fn new(config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            logs: LogWriter::new(config.log_root.clone()),
            config,
            reporter: Box::new(ConsoleReporter),
            runner: Box::new(SystemRunner),
        })
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn with_runner(mut self, runner: impl ProcessRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn logs(&self) -> &LogWriter {
        &self.logs
    }

    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    /// Run a process and attach its execution log, leaving pass/fail to the caller
    pub fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult> {
        let result = self.runner.run(request)?;
        let name = request.program_name();
        let path = self.logs.write_execution_log(&name, &result)?;
        self.reporter.attach(&path, &format!("Execution log for {name}"));
        Ok(result)
    }

    /// Run a process that is expected to succeed.
    ///
    /// A timeout or a non-zero exit code becomes an error whose message starts
    /// with `context` and ends with the distinct error lines found in the output.
    pub fn run_checked(&self, request: &ExecutionRequest, context: &str) -> Result<ExecutionResult> {
        let result = self.execute(request)?;
        let summary = classify(&result.lines, result.exit_code, result.timed_out);

        if result.timed_out {
            return Err(Error::TimedOut {
                context: context.to_string(),
                timeout: request.timeout(),
                summary,
            });
        }
        if result.exit_code != 0 {
            return Err(Error::UnexpectedExitCode {
                context: context.to_string(),
                exit_code: result.exit_code,
                summary,
            });
        }
        Ok(result)
    }

    /// Write, attach and echo a performance report
    pub fn publish_report(&self, subject: &str, report: &BuildReport) -> Result<PathBuf> {
        let path = self.logs.write_performance_report(subject, report)?;
        self.reporter.attach(&path, "Performance data");

        let contents = fs::read_to_string(&path)?;
        let body: Vec<&str> = contents.lines().collect();
        self.reporter.echo(&format!(
            "Performance data: {}:\n\t{}",
            path.display(),
            body.join("\n\t")
        ));
        debug!("Published {} report for {}", report.result, report.test_name);
        Ok(path)
    }

    /// Restore, compile, locate and measure one sample
    pub fn build(&self, request: &BuildRequest) -> BuildOutcome {
        BuildOrchestrator::new(self).run(request)
    }
}
