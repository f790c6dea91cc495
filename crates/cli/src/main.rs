use anyhow::Result;
use buildprobe_cli::commands::{build_command, exec_command, locate_command};
use buildprobe_cli::{Cli, Commands};
use clap::Parser;
use tracing::debug;

fn main() -> Result<()> {
    // Initialize tracing based on RUST_LOG env var
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!("Parsed arguments: {:?}", cli);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Build(args) => build_command(args, config),
        Commands::Exec(args) => exec_command(args, config),
        Commands::Locate(args) => locate_command(args, config),
    }
}
