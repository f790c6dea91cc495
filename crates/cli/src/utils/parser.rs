use anyhow::{Result, bail};

/// Split a `NAME=VALUE` environment override
pub fn parse_env_pair(pair: &str) -> Result<(String, String)> {
    match pair.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => bail!("invalid environment override '{pair}', expected NAME=VALUE"),
    }
}
