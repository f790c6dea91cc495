//! Restore, compile, locate and measure one sample

mod orchestrator;
mod request;
mod solution;

pub use orchestrator::{BuildFailure, BuildOrchestrator, BuildOutcome, BuildStage};
pub use request::BuildRequest;
pub use solution::{RestorePlan, plan_restore};
