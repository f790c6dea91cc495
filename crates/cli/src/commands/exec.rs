use std::path::Path;
use std::time::Duration;

use anyhow::{Result, bail};
use buildprobe_core::{ExecutionRequest, HarnessContext};
use tracing::info;

use super::load_config;
use crate::cli::ExecArgs;

pub fn exec_command(args: ExecArgs, config_path: Option<&Path>) -> Result<()> {
    if args.timeout_secs == 0 {
        bail!("--timeout-secs must be greater than zero");
    }
    let config = load_config(config_path)?;
    let context = HarnessContext::new(config)?;

    let mut request = ExecutionRequest::new(&args.program, Duration::from_secs(args.timeout_secs))
        .with_args(args.args);
    if let Some(cwd) = args.cwd {
        request = request.with_working_dir(cwd);
    }
    let request = context.config().pin_toolchain(request);

    let message = args.context.unwrap_or_else(|| request.program_name());
    info!("Running: {}", request.to_shell_command());
    let result = context.run_checked(&request, &message)?;
    println!("{}", result.summary_line());
    Ok(())
}
