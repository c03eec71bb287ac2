#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session coordinator that boots and drives the Packet Rush experience.
//!
//! A [`Session`] owns the current world, the spawning system and a virtual
//! clock. It replaces the world when the player restarts after a game over or
//! advances past a completed level, and turns timer arms into future ticks.

mod timers;

use std::time::Duration;

use log::{info, warn};
use packet_rush_core::{Command, Event, Timer, Tuning};
use packet_rush_system_levels::{load_level, practice_level, LevelError, MAX_LEVEL};
use packet_rush_system_spawning::Spawning;
use packet_rush_world::{self as world, query, Level, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

pub use timers::{Due, TimerQueue};

const MAX_CATCH_UP: usize = 4_096;

/// Produces data required to greet the player.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }
}

/// Where a session begins.
///
/// A restart returns catalogue sessions to level 1 and practice sessions to
/// the practice level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Catalogue level with the provided one-based number.
    Level(u32),
    /// Numbered-port practice level.
    Practice,
}

/// Level that follows `completed`, wrapping to 1 after the last level.
#[must_use]
pub const fn following_level(completed: u32) -> u32 {
    if completed >= MAX_LEVEL {
        1
    } else {
        completed + 1
    }
}

/// Everything a session reports after processing input or time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionOutput {
    /// Events emitted by every world that processed a command.
    pub events: Vec<Event>,
    /// Timer arms requested, in order.
    pub timers: Vec<(Timer, Duration)>,
    /// Whether the player asked to leave.
    pub quit: bool,
}

impl SessionOutput {
    fn merge(&mut self, other: SessionOutput) {
        self.events.extend(other.events);
        self.timers.extend(other.timers);
        self.quit |= other.quit;
    }
}

/// Coordinator owning the world, the spawning system and the scheduler.
#[derive(Debug)]
pub struct Session<R = ChaCha8Rng> {
    world: World,
    spawning: Spawning<R>,
    timers: TimerQueue,
    origin: Origin,
    tuning: Tuning,
    clock: Duration,
}

impl<R: Rng> Session<R> {
    /// Loads the origin level. No timer runs until [`Command::Start`] is submitted.
    pub fn new(origin: Origin, tuning: Tuning, spawning: Spawning<R>) -> Result<Self, LevelError> {
        let level = load_origin(origin)?;
        info!("loaded level {} ({})", level.number, level.goal);
        Ok(Self {
            world: World::new(level, tuning.clone()),
            spawning,
            timers: TimerQueue::new(),
            origin,
            tuning,
            clock: Duration::ZERO,
        })
    }

    /// Current world, for queries and rendering.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Virtual time the session has advanced to.
    #[must_use]
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Earliest pending timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Applies a command at the current clock and reacts to what it caused.
    pub fn submit(&mut self, command: Command) -> Result<SessionOutput, LevelError> {
        let mut output = SessionOutput::default();
        let mut pending = vec![command];

        while !pending.is_empty() {
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }

            let mut follow_up = Vec::new();
            self.spawning.handle(&events, &mut follow_up);
            for event in &events {
                match event {
                    Event::TimerRequested { timer, delay } => {
                        self.timers.arm(*timer, *delay, self.clock);
                        output.timers.push((*timer, *delay));
                    }
                    Event::QuitRequested => output.quit = true,
                    Event::RestartRequested => {
                        let level = match self.origin {
                            Origin::Practice => practice_level()?,
                            Origin::Level(_) => load_level(1)?,
                        };
                        info!("restarting on level {}", level.number);
                        self.replace_world(level, 0);
                        follow_up.push(Command::Start);
                    }
                    Event::LevelAdvanceRequested { level, score } => {
                        let next = match self.origin {
                            Origin::Practice => practice_level()?,
                            Origin::Level(_) => load_level(following_level(*level))?,
                        };
                        info!("advancing to level {} with score {score}", next.number);
                        self.replace_world(next, *score);
                        follow_up.push(Command::Start);
                    }
                    _ => {}
                }
            }

            output.events.extend(events);
            pending = follow_up;
        }

        Ok(output)
    }

    /// Fires every timer due up to `now`, each at its own deadline.
    pub fn advance_to(&mut self, now: Duration) -> Result<SessionOutput, LevelError> {
        let mut output = SessionOutput::default();

        for _ in 0..MAX_CATCH_UP {
            let Some(fired) = self.timers.pop_next(now) else {
                self.clock = self.clock.max(now);
                return Ok(output);
            };
            self.clock = self.clock.max(fired.deadline);
            output.merge(self.submit(fired.command())?);
        }

        warn!("timers still due after {MAX_CATCH_UP} firings; deferring the rest");
        Ok(output)
    }

    fn replace_world(&mut self, level: Level, score: i64) {
        self.timers.clear();
        self.world = World::new(level, self.tuning.clone()).with_score(score);
    }
}

fn load_origin(origin: Origin) -> Result<Level, LevelError> {
    match origin {
        Origin::Level(number) => load_level(number),
        Origin::Practice => practice_level(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_wrap_after_the_last_one() {
        assert_eq!(following_level(1), 2);
        assert_eq!(following_level(MAX_LEVEL - 1), MAX_LEVEL);
        assert_eq!(following_level(MAX_LEVEL), 1);
    }

    #[test]
    fn unknown_origin_fails_to_load() {
        assert_eq!(
            load_origin(Origin::Level(42)).map(|level| level.number),
            Err(LevelError::UnknownLevel { level: 42 })
        );
        assert_eq!(load_origin(Origin::Practice).map(|level| level.number), Ok(0));
    }
}
