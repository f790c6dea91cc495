//! Running one external tool under a timeout with merged, timestamped output

mod request;
mod result;
mod runner;

pub use request::{EnvValue, ExecutionRequest};
pub use result::{ExecutionResult, NO_EXIT_CODE, OutputLine, format_elapsed};
pub use runner::{ProcessRunner, SystemRunner, run};
