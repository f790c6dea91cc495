pub mod build;
pub mod exec;
pub mod locate;

pub use build::build_command;
pub use exec::exec_command;
pub use locate::locate_command;

use std::path::Path;

use anyhow::{Context, Result};
use buildprobe_core::HarnessConfig;

/// Load an explicit config file, or the nearest one above the current directory
pub fn load_config(explicit: Option<&Path>) -> Result<HarnessConfig> {
    let config = match explicit {
        Some(path) => HarnessConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            HarnessConfig::discover(&cwd)?
        }
    };
    Ok(config)
}
