#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Packet Rush experience.
//!
//! The adapter owns the wall clock: every frame it forwards key presses to the
//! session, advances the session's virtual clock to the time elapsed since
//! start and projects the resulting world into a fresh scene.

mod logging;
mod tuning;

use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use packet_rush_core::{Command, Tuning};
use packet_rush_rendering::{
    command_for_key, FrameControl, Presentation, RenderingBackend, Scene,
};
use packet_rush_rendering_terminal::TerminalBackend;
use packet_rush_system_bootstrap::{Bootstrap, Origin, Session};
use packet_rush_system_spawning::{Config, Spawning};
use packet_rush_world::query;
use rand::Rng;

const WINDOW_TITLE: &str = "PACKET RUSH - Network Router Simulator";

/// Route packets through switchable junctions before the network panics.
#[derive(Debug, Parser)]
#[command(name = "packet-rush", author, version, about, long_about = None)]
struct CliArgs {
    /// Level to start on.
    #[arg(long, default_value_t = 1)]
    level: u32,
    /// Start on the numbered-port practice level instead.
    #[arg(long, conflicts_with = "level")]
    practice: bool,
    /// Seed for the packet spawner; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file overriding gameplay constants.
    #[arg(long, value_name = "PATH")]
    tuning: Option<PathBuf>,
    /// Enable debug logging; takes effect together with `--log-file`.
    #[arg(short, long)]
    verbose: bool,
    /// Write log records to this file instead of stderr.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl CliArgs {
    fn origin(&self) -> Origin {
        if self.practice {
            Origin::Practice
        } else {
            Origin::Level(self.level)
        }
    }
}

/// Entry point for the Packet Rush command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    logging::init(args.verbose, args.log_file.as_deref())?;

    let tuning = match &args.tuning {
        Some(path) => tuning::load(path)?,
        None => Tuning::default(),
    };
    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!("spawn seed {seed}");

    let origin = args.origin();
    let mut session = Session::new(origin, tuning, Spawning::new(Config::new(seed)))
        .with_context(|| format!("failed to load {origin:?}"))?;
    println!("{}", Bootstrap.welcome_banner(session.world()));

    let _ = session.submit(Command::Start)?;
    let presentation = Presentation::new(WINDOW_TITLE, Scene::from_world(session.world()));
    let started = Instant::now();

    TerminalBackend::new().run(presentation, move |_delta, input, scene| {
        if let Some((columns, rows)) = input.resized {
            let _ = session.submit(Command::Resize { columns, rows })?;
        }
        for key in input.keys {
            let Some(command) = command_for_key(key, query::phase(session.world())) else {
                continue;
            };
            if session.submit(command)?.quit {
                info!("quit requested");
                return Ok(FrameControl::Exit);
            }
        }

        let _ = session.advance_to(started.elapsed())?;
        *scene = Scene::from_world(session.world());
        Ok(FrameControl::Continue)
    })
}
