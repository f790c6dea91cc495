use std::path::Path;

use anyhow::{Context, Result};
use buildprobe_core::{BuildRequest, HarnessContext};
use tracing::debug;

use super::load_config;
use crate::cli::BuildArgs;
use crate::utils::parse_env_pair;

pub fn build_command(args: BuildArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let context = HarnessContext::new(config)?;

    let mut request = BuildRequest::new(&args.project, &args.configuration);
    if let Some(platform) = &args.platform {
        request = request.with_platform(platform);
    }
    if let Some(target) = &args.target {
        request = request.with_target(target);
    }
    if let Some(name) = &args.test_name {
        request = request.with_test_name(name);
    }
    for pair in &args.env {
        let (name, value) = parse_env_pair(pair)?;
        request = request.with_env(name, value);
    }
    for name in &args.unset {
        request = request.without_env(name);
    }
    debug!("Build request: {:?}", request);

    let outcome = context.build(&request);
    if let Some(path) = &outcome.report_path {
        println!("Report: {}", path.display());
    }

    if let Some(failure) = outcome.failure {
        return Err(failure.error)
            .with_context(|| format!("{} stage failed for {}", failure.stage, args.project.display()));
    }

    let report = outcome.report;
    println!(
        "Build succeeded: {} files, {} bytes",
        report.files().len(),
        report.total_size()
    );
    Ok(())
}
