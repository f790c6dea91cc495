use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "buildprobe")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    /// Config file to use instead of the nearest .buildprobe.json
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Restore, compile, locate and measure a sample
    #[command(visible_alias = "b")]
    Build(BuildArgs),
    /// Run one tool under a timeout and keep its execution log
    Exec(ExecArgs),
    /// Find the artifact directory in a build output tree
    Locate(LocateArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Solution or project file to build
    pub project: PathBuf,

    #[arg(short, long)]
    pub platform: Option<String>,

    #[arg(short, long, default_value = "Debug")]
    pub configuration: String,

    /// Build target passed as /t:<target>
    #[arg(short, long)]
    pub target: Option<String>,

    /// Environment override (repeatable)
    #[arg(long = "env", value_name = "NAME=VALUE")]
    pub env: Vec<String>,

    /// Remove a variable from the tools' environment (repeatable)
    #[arg(long = "unset", value_name = "NAME")]
    pub unset: Vec<String>,

    /// Name recorded in the performance report
    #[arg(long)]
    pub test_name: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    #[arg(long, default_value_t = 300)]
    pub timeout_secs: u64,

    /// Working directory for the tool
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Prefix for failure messages (defaults to the program name)
    #[arg(long)]
    pub context: Option<String>,

    pub program: PathBuf,

    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Root of the build output tree
    pub root: PathBuf,

    #[arg(short, long)]
    pub platform: Option<String>,

    #[arg(short, long, default_value = "Debug")]
    pub configuration: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_exec_keeps_hyphenated_args() {
        let cli = Cli::parse_from(["buildprobe", "exec", "--timeout-secs", "5", "msbuild", "/verbosity:diag", "-m"]);
        match cli.command {
            Commands::Exec(args) => {
                assert_eq!(args.timeout_secs, 5);
                assert_eq!(args.program, PathBuf::from("msbuild"));
                assert_eq!(args.args, ["/verbosity:diag", "-m"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_build_env_flags() {
        let cli = Cli::parse_from([
            "buildprobe",
            "build",
            "Foo.sln",
            "--env",
            "A=1",
            "--env",
            "B=2",
            "--unset",
            "C",
        ]);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.configuration, "Debug");
                assert_eq!(args.env, ["A=1", "B=2"]);
                assert_eq!(args.unset, ["C"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
