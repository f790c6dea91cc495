//! Configuration management for buildprobe

mod settings;

// Re-export main types
pub use settings::{
    CONFIG_FILE_NAMES, HarnessConfig, TOOLCHAIN_DIR_VAR, TOOLCHAIN_OVERRIDE_VAR,
};
