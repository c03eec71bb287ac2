#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for choosing packet kinds.
//!
//! The world decides *when* a packet may enter and announces it with
//! [`Event::SpawnDue`]. This system decides *what* enters by drawing one of
//! the offered kinds uniformly from an injectable random source.

use packet_rush_core::{Command, Event};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }

    /// Seed the random source starts from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rng_seed
    }
}

/// Pure system that turns spawn opportunities into spawn commands.
#[derive(Debug)]
pub struct Spawning<R = ChaCha8Rng> {
    rng: R,
}

impl Spawning {
    /// Creates a new spawning system seeded from the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(config.seed()))
    }
}

impl<R: Rng> Spawning<R> {
    /// Creates a spawning system that draws from the provided random source.
    #[must_use]
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Consumes events and emits one spawn command per due spawn.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            let Event::SpawnDue { kinds } = event else {
                continue;
            };

            if let Some(kind) = kinds.choose(&mut self.rng) {
                out.push(Command::SpawnPacket { kind: *kind });
            }
        }
    }
}
