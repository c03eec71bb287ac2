use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Initializes the global logger.
///
/// `RUST_LOG` wins when set. Otherwise only warnings get through, since the
/// game owns the terminal. Debug output needs both `verbose` and a `log_file`,
/// which then receives every record instead of stderr.
pub(crate) fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = default_level(verbose, log_file.is_some());
    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        let _ = builder.target(Target::Pipe(Box::new(file)));
    }

    // Only fails when a logger is already installed.
    let _ = builder.try_init();
    Ok(())
}

/// Stderr shares the alternate screen with the frame, so it stays at warn.
fn default_level(verbose: bool, to_file: bool) -> LevelFilter {
    if verbose && to_file {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}
