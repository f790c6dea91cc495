use std::path::Path;

use anyhow::Result;
use buildprobe_core::ArtifactLocator;

use super::load_config;
use crate::cli::LocateArgs;

pub fn locate_command(args: LocateArgs, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    config.validate()?;

    let locator = ArtifactLocator::from_config(&config);
    let artifact = locator.locate(&args.root, args.platform.as_deref(), &args.configuration)?;
    println!("{}", artifact.display());
    Ok(())
}
