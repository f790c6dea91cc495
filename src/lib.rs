//! buildprobe builds sample projects with external tools, captures their
//! output and records artifact metrics. The implementation lives in
//! `buildprobe-core`; this crate re-exports it for the workspace's
//! cross-module integration tests.

pub use buildprobe_core::*;
