use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use packet_rush_core::Tuning;

/// Reads gameplay constants from a TOML file. Missing keys keep their defaults.
pub(crate) fn load(path: &Path) -> Result<Tuning> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read tuning file {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid tuning file {}", path.display()))
}

fn parse(contents: &str) -> Result<Tuning> {
    let tuning: Tuning = toml::from_str(contents).context("failed to parse tuning toml")?;
    if tuning.movement_floor_ms == 0 {
        bail!("movement_floor_ms must be greater than zero");
    }
    if tuning.spawn_floor_ms == 0 {
        bail!("spawn_floor_ms must be greater than zero");
    }
    Ok(tuning)
}
