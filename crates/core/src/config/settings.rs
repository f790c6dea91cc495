use crate::error::{Error, Result};
use crate::process::ExecutionRequest;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Files searched for, in order, in each directory while walking upward
pub const CONFIG_FILE_NAMES: [&str; 2] = [".buildprobe.json", "buildprobe.json"];

/// Pinned to the configured toolchain for every tool invocation
pub const TOOLCHAIN_DIR_VAR: &str = "DEVELOPER_DIR";

/// Always removed so it cannot shadow the pinned toolchain
pub const TOOLCHAIN_OVERRIDE_VAR: &str = "XCODE_DEVELOPER_DIR_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct HarnessConfig {
    /// Dependency restore tool
    pub restore_tool: String,
    /// Compiler/linker driver
    pub build_tool: String,
    pub restore_timeout_secs: u64,
    pub build_timeout_secs: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain_dir: Option<PathBuf>,
    /// Directory both tools run in; defaults to the solution directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    /// Parent of the per-run log directory; defaults to the system temp dir
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_root: Option<PathBuf>,

    pub artifact_suffix: String,
    pub output_marker: String,
    pub solution_extension: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            restore_tool: "nuget".to_string(),
            build_tool: "msbuild".to_string(),
            restore_timeout_secs: 120,
            build_timeout_secs: 300,
            toolchain_dir: None,
            working_dir: None,
            log_root: None,
            artifact_suffix: ".app".to_string(),
            output_marker: "bin".to_string(),
            solution_extension: "sln".to_string(),
        }
    }
}

impl HarnessConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Load the nearest config file above `start_path`, or the defaults if there is none
    pub fn discover(start_path: &Path) -> Result<Self> {
        match Self::find_config_file(start_path) {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::load_from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.is_file() {
                    return Some(config_path);
                }
            }

            current = current.parent()?;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.restore_timeout_secs == 0 || self.build_timeout_secs == 0 {
            return Err(Error::ConfigError("timeouts must be greater than zero".to_string()));
        }
        for (field, value) in [
            ("restore_tool", &self.restore_tool),
            ("build_tool", &self.build_tool),
            ("artifact_suffix", &self.artifact_suffix),
            ("output_marker", &self.output_marker),
            ("solution_extension", &self.solution_extension),
        ] {
            if value.is_empty() {
                return Err(Error::ConfigError(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }

    pub fn restore_timeout(&self) -> Duration {
        Duration::from_secs(self.restore_timeout_secs)
    }

    pub fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }

    /// Apply the toolchain pins on top of whatever the request already overrides
    pub fn pin_toolchain(&self, request: ExecutionRequest) -> ExecutionRequest {
        let request = request.without_env(TOOLCHAIN_OVERRIDE_VAR);
        match &self.toolchain_dir {
            Some(dir) => request.with_env(TOOLCHAIN_DIR_VAR, dir.to_string_lossy()),
            None => request,
        }
    }
}
