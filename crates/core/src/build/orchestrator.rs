use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::request::BuildRequest;
use super::solution::{RestorePlan, plan_restore};
use crate::context::HarnessContext;
use crate::error::{Error, Result};
use crate::locate::ArtifactLocator;
use crate::perf::{self, BuildReport};
use crate::process::ExecutionRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    Restore,
    Compile,
    Locate,
    Measure,
    Report,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStage::Restore => "restore",
            BuildStage::Compile => "compile",
            BuildStage::Locate => "locate",
            BuildStage::Measure => "measure",
            BuildStage::Report => "report",
        };
        f.write_str(name)
    }
}

/// The first stage that failed, with its error
#[derive(Debug)]
pub struct BuildFailure {
    pub stage: BuildStage,
    pub error: Error,
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for BuildFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Every build produces a report, whether or not it succeeded
#[derive(Debug)]
pub struct BuildOutcome {
    pub report: BuildReport,
    pub report_path: Option<PathBuf>,
    /// Wall-clock time of the compile stage, if it ran
    pub compile_elapsed: Option<Duration>,
    pub failure: Option<BuildFailure>,
}

impl BuildOutcome {
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn into_result(self) -> Result<BuildReport> {
        match self.failure {
            Some(failure) => Err(failure.error),
            None => Ok(self.report),
        }
    }
}

/// Runs Restore → Compile → Locate → Measure, stopping at the first failure
pub struct BuildOrchestrator<'a> {
    context: &'a HarnessContext,
    locator: ArtifactLocator,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(context: &'a HarnessContext) -> Self {
        Self {
            locator: ArtifactLocator::from_config(context.config()),
            context,
        }
    }

    pub fn run(&self, request: &BuildRequest) -> BuildOutcome {
        info!("Building {} ({})", request.project.display(), request.test_name);
        let mut compile_elapsed = None;

        let (report, mut failure) = match self.run_stages(request, &mut compile_elapsed) {
            Ok(report) => (report, None),
            Err(failure) => {
                warn!(
                    "Build of {} failed at {}: {}",
                    request.test_name, failure.stage, failure.error
                );
                let report = BuildReport::failed(
                    &request.test_name,
                    request.platform(),
                    &request.configuration,
                );
                (report, Some(failure))
            }
        };

        let report_path = match self.context.publish_report(&request.subject(), &report) {
            Ok(path) => Some(path),
            Err(error) => {
                warn!("Could not write performance data for {}: {}", request.test_name, error);
                failure.get_or_insert(BuildFailure {
                    stage: BuildStage::Report,
                    error,
                });
                None
            }
        };

        BuildOutcome {
            report,
            report_path,
            compile_elapsed,
            failure,
        }
    }

    fn run_stages(
        &self,
        request: &BuildRequest,
        compile_elapsed: &mut Option<Duration>,
    ) -> std::result::Result<BuildReport, BuildFailure> {
        let config = self.context.config();

        let plan = plan_restore(&request.project, &config.solution_extension)
            .map_err(at(BuildStage::Restore))?;
        self.restore(request, &plan).map_err(at(BuildStage::Restore))?;

        info!("Compiling {}", request.project.display());
        let started = Instant::now();
        let compiled = self.compile(request, &plan);
        let elapsed = started.elapsed();
        *compile_elapsed = Some(elapsed);
        compiled.map_err(at(BuildStage::Compile))?;

        let artifact = self
            .locator
            .locate(&plan.solution_dir, request.platform(), &request.configuration)
            .map_err(at(BuildStage::Locate))?;
        info!("Measuring {}", artifact.display());

        let measurement = perf::measure(&artifact).map_err(at(BuildStage::Measure))?;
        Ok(BuildReport::succeeded(
            &request.test_name,
            request.platform(),
            &request.configuration,
            elapsed,
            measurement,
        ))
    }

    fn restore(&self, request: &BuildRequest, plan: &RestorePlan) -> Result<()> {
        let config = self.context.config();
        let tool = &config.restore_tool;
        let context = format!("{} restore", tool_name(tool));

        for solution in &plan.solutions {
            info!("Restoring {}", solution.display());
            let execution = self.tool_request(
                tool,
                plan.restore_args(solution),
                config.restore_timeout(),
                request,
                plan,
            );
            self.context.run_checked(&execution, &context)?;
        }
        Ok(())
    }

    fn compile(&self, request: &BuildRequest, plan: &RestorePlan) -> Result<()> {
        let config = self.context.config();
        let execution = self.tool_request(
            &config.build_tool,
            request.compile_args(),
            config.build_timeout(),
            request,
            plan,
        );
        self.context.run_checked(&execution, "build")?;
        Ok(())
    }

    fn tool_request(
        &self,
        program: &str,
        args: Vec<String>,
        timeout: Duration,
        request: &BuildRequest,
        plan: &RestorePlan,
    ) -> ExecutionRequest {
        let config = self.context.config();
        let working_dir = config
            .working_dir
            .clone()
            .unwrap_or_else(|| plan.solution_dir.clone());

        let execution = ExecutionRequest::new(program, timeout)
            .with_args(args)
            .with_working_dir(working_dir)
            .with_env_overrides(&request.env);
        config.pin_toolchain(execution)
    }
}

fn at(stage: BuildStage) -> impl FnOnce(Error) -> BuildFailure {
    move |error| BuildFailure { stage, error }
}

fn tool_name(tool: &str) -> String {
    std::path::Path::new(tool)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| tool.to_string())
}
