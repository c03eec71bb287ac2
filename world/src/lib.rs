#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for Packet Rush.
//!
//! The [`World`] owns the static grid, the junctions and every live packet of
//! one level. It only changes through [`apply`], which consumes one
//! [`Command`] to completion and reports what happened as [`Event`] values,
//! including the timer arms the scheduler should perform next.

mod grid;
mod junction;
mod packet;

use std::{collections::BTreeMap, time::Duration};

use log::{debug, info};
use packet_rush_core::{
    Cell, Command, Direction, Event, JunctionId, LevelMode, PacketId, PacketKind, Phase,
    Position, Timer, Tuning, WELCOME_BANNER,
};

pub use grid::Grid;
pub use junction::Junction;

use packet::Packet;

/// Everything the level factory provides to build one level.
#[derive(Clone, Debug)]
pub struct Level {
    /// One-based level number.
    pub number: u32,
    /// Static character map.
    pub grid: Grid,
    /// Junctions bound to cells of the grid.
    pub junctions: Vec<Junction>,
    /// Spawn interval at the start of the level.
    pub spawn_interval: Duration,
    /// Human-readable goal description.
    pub goal: String,
    /// Goal configuration.
    pub mode: LevelMode,
}

/// Represents the authoritative Packet Rush world state for one level.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    level: u32,
    grid: Grid,
    junctions: BTreeMap<Position, Junction>,
    packets: Vec<Packet>,
    next_packet_id: u32,
    score: i64,
    lives: u32,
    streak: u32,
    ticks: u64,
    paused: bool,
    game_over: bool,
    level_complete: bool,
    movement_interval: Duration,
    spawn_interval: Duration,
    since_last_spawn: Duration,
    goal: String,
    mode: LevelMode,
    progress: Vec<char>,
    viewport: Option<(u16, u16)>,
    tuning: Tuning,
}

impl World {
    /// Creates a world ready to play the provided level.
    #[must_use]
    pub fn new(level: Level, tuning: Tuning) -> Self {
        let junctions = level
            .junctions
            .into_iter()
            .map(|junction| (junction.cell(), junction))
            .collect();
        let level_complete = level.mode.target_len() == 0;

        Self {
            banner: WELCOME_BANNER,
            level: level.number,
            grid: level.grid,
            junctions,
            packets: Vec::new(),
            next_packet_id: 0,
            score: 0,
            lives: tuning.lives,
            streak: 0,
            ticks: 0,
            paused: false,
            game_over: false,
            level_complete,
            movement_interval: tuning.movement_interval(),
            spawn_interval: level.spawn_interval,
            since_last_spawn: Duration::ZERO,
            goal: level.goal,
            mode: level.mode,
            progress: Vec::new(),
            viewport: None,
            tuning,
        }
    }

    /// Seeds the score, used to carry a running total into the next level.
    #[must_use]
    pub fn with_score(mut self, score: i64) -> Self {
        self.score = score;
        self
    }

    fn phase(&self) -> Phase {
        if self.level_complete {
            Phase::LevelComplete
        } else if self.game_over {
            Phase::GameOver
        } else if self.paused {
            Phase::Paused
        } else {
            Phase::Playing
        }
    }

    fn is_terminal(&self) -> bool {
        self.phase().is_terminal()
    }

    fn accepts_ticks(&self) -> bool {
        !self.paused && !self.is_terminal()
    }

    fn arm(&self, timer: Timer, out_events: &mut Vec<Event>) {
        let delay = match timer {
            Timer::Movement => self.movement_interval,
            Timer::Spawn => self.spawn_interval,
        };
        out_events.push(Event::TimerRequested { timer, delay });
    }

    fn arm_all(&self, out_events: &mut Vec<Event>) {
        self.arm(Timer::Movement, out_events);
        self.arm(Timer::Spawn, out_events);
    }

    fn toggle_pause(&mut self, out_events: &mut Vec<Event>) {
        self.paused = !self.paused;
        out_events.push(Event::PauseToggled {
            paused: self.paused,
        });
        if self.accepts_ticks() {
            self.arm_all(out_events);
        }
    }

    fn switch_junction(&mut self, id: JunctionId, out_events: &mut Vec<Event>) {
        if self.is_terminal() {
            return;
        }

        let Some(junction) = self
            .junctions
            .values_mut()
            .find(|junction| junction.id() == id)
        else {
            return;
        };

        junction.switch_route();
        out_events.push(Event::JunctionSwitched {
            id,
            direction: junction.active_direction(),
        });
    }

    fn movement_tick(&mut self, out_events: &mut Vec<Event>) {
        if !self.accepts_ticks() {
            return;
        }

        self.move_packets();
        self.resolve_destinations(out_events);
        self.sweep_lost_packets(out_events);
        self.ticks = self.ticks.saturating_add(1);

        if self.lives == 0 && !self.level_complete {
            self.game_over = true;
            info!("game over on level {} with score {}", self.level, self.score);
            out_events.push(Event::GameOver { score: self.score });
        }

        self.movement_interval = self.tuning.movement_interval_after(self.ticks);
        if !self.is_terminal() {
            self.arm(Timer::Movement, out_events);
        }
    }

    fn move_packets(&mut self) {
        let grid = &self.grid;
        let junctions = &self.junctions;
        for packet in &mut self.packets {
            if !packet.advance() {
                continue;
            }

            if let Some(junction) = junctions.get(&packet.cell) {
                packet.set_direction(junction.active_direction());
            }

            if grid.cell(packet.cell) == Cell::Wall {
                packet.set_direction(Direction::Halted);
            }
        }
    }

    fn resolve_destinations(&mut self, out_events: &mut Vec<Event>) {
        let target_len = self.mode.target_len();

        for index in (0..self.packets.len()).rev() {
            let cell = self.grid.cell(self.packets[index].cell);
            if self.mode.scored_marker(cell).is_none() {
                continue;
            }

            let packet = self.packets.swap_remove(index);
            if !packet.is_at_destination(cell) {
                self.misroute(&packet, out_events);
                continue;
            }

            let reward = self.delivery_reward();
            self.score = self.score.saturating_add(reward);
            self.streak = self.streak.saturating_add(1);
            self.progress.push(packet.kind.glyph());
            out_events.push(Event::PacketDelivered {
                packet: packet.id,
                kind: packet.kind,
                reward,
            });

            if self.progress.len() >= target_len {
                let bonus = self.tuning.level_complete_bonus;
                self.level_complete = true;
                self.score = self.score.saturating_add(bonus);
                info!("level {} complete with score {}", self.level, self.score);
                out_events.push(Event::LevelCompleted {
                    level: self.level,
                    bonus,
                });
                return;
            }
        }
    }

    fn sweep_lost_packets(&mut self, out_events: &mut Vec<Event>) {
        for index in (0..self.packets.len()).rev() {
            let cell = self.packets[index].cell;
            if self.grid.contains(cell) && self.grid.cell(cell) != Cell::Wall {
                continue;
            }

            let packet = self.packets.swap_remove(index);
            debug!("packet {} lost at {}", packet.id.get(), packet.cell);
            out_events.push(Event::PacketLost {
                packet: packet.id,
                kind: packet.kind,
            });
            if !self.level_complete {
                self.lose_life();
            }
        }
    }

    fn misroute(&mut self, packet: &Packet, out_events: &mut Vec<Event>) {
        debug!(
            "packet {} carrying {:?} misrouted at {}",
            packet.id.get(),
            packet.kind,
            packet.cell
        );
        if self.mode.rewards_streaks() {
            self.score = self.score.saturating_sub(self.tuning.miss_penalty);
        }
        self.lose_life();
        out_events.push(Event::PacketMisrouted {
            packet: packet.id,
            kind: packet.kind,
        });
    }

    fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.streak = 0;
    }

    fn delivery_reward(&self) -> i64 {
        let base = self.tuning.delivery_reward;
        if !self.mode.rewards_streaks() {
            return base;
        }
        base.saturating_add(i64::from(self.streak).saturating_mul(self.tuning.streak_bonus))
    }

    fn spawn_tick(&mut self, elapsed: Duration, out_events: &mut Vec<Event>) {
        if !self.accepts_ticks() {
            return;
        }

        self.since_last_spawn = self.since_last_spawn.saturating_add(elapsed);
        let below_cap = self.packets.len() < self.tuning.packet_cap;
        if below_cap && self.since_last_spawn >= self.spawn_interval && self.grid.spawn().is_some()
        {
            self.since_last_spawn = Duration::ZERO;
            self.spawn_interval = self.tuning.next_spawn_interval(self.spawn_interval);
            out_events.push(Event::SpawnDue {
                kinds: self.mode.packet_kinds(),
            });
        }

        self.arm(Timer::Spawn, out_events);
    }

    fn spawn_packet(&mut self, kind: PacketKind, out_events: &mut Vec<Event>) {
        if !self.accepts_ticks() || self.packets.len() >= self.tuning.packet_cap {
            return;
        }
        let Some(cell) = self.grid.spawn() else {
            return;
        };

        let id = PacketId::new(self.next_packet_id);
        self.next_packet_id = self.next_packet_id.wrapping_add(1);
        self.packets.push(Packet::spawn(id, cell, kind));
        out_events.push(Event::PacketSpawned {
            packet: id,
            cell,
            kind,
        });
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Start => {
            if world.accepts_ticks() {
                world.arm_all(out_events);
            }
        }
        Command::Quit => out_events.push(Event::QuitRequested),
        Command::TogglePause => world.toggle_pause(out_events),
        Command::SwitchJunction { id } => world.switch_junction(id, out_events),
        Command::Restart => {
            if world.game_over && !world.level_complete {
                out_events.push(Event::RestartRequested);
            }
        }
        Command::AdvanceLevel => {
            if world.level_complete {
                out_events.push(Event::LevelAdvanceRequested {
                    level: world.level,
                    score: world.score,
                });
            }
        }
        Command::Resize { columns, rows } => {
            world.viewport = Some((columns, rows));
            out_events.push(Event::Resized { columns, rows });
        }
        Command::MovementTick => world.movement_tick(out_events),
        Command::SpawnTick { elapsed } => world.spawn_tick(elapsed, out_events),
        Command::SpawnPacket { kind } => world.spawn_packet(kind, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use packet_rush_core::{JunctionView, LevelMode, PacketView, Phase};

    use super::{Grid, Junction, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current gameplay phase. Terminal phases take precedence over pause.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase()
    }

    /// One-based number of the level being played.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Running score, including any score carried from earlier levels.
    #[must_use]
    pub fn score(world: &World) -> i64 {
        world.score
    }

    /// Remaining lives.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Consecutive correct deliveries since the last miss.
    #[must_use]
    pub fn streak(world: &World) -> u32 {
        world.streak
    }

    /// Number of movement ticks processed on this level.
    #[must_use]
    pub fn ticks(world: &World) -> u64 {
        world.ticks
    }

    /// Delay the scheduler uses between movement ticks.
    #[must_use]
    pub fn movement_interval(world: &World) -> Duration {
        world.movement_interval
    }

    /// Delay the scheduler uses between spawn ticks.
    #[must_use]
    pub fn spawn_interval(world: &World) -> Duration {
        world.spawn_interval
    }

    /// Provides read-only access to the level grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Iterator over the junctions in cell order.
    pub fn junctions(world: &World) -> impl Iterator<Item = &Junction> {
        world.junctions.values()
    }

    /// Captures a read-only view of the junctions ordered by key.
    #[must_use]
    pub fn junction_view(world: &World) -> JunctionView {
        JunctionView::from_snapshots(world.junctions.values().map(Junction::snapshot).collect())
    }

    /// Captures a read-only view of the live packets.
    #[must_use]
    pub fn packet_view(world: &World) -> PacketView {
        PacketView::from_snapshots(world.packets.iter().map(|packet| packet.snapshot()).collect())
    }

    /// Goal description of the level.
    #[must_use]
    pub fn goal(world: &World) -> &str {
        &world.goal
    }

    /// Goal configuration of the level.
    #[must_use]
    pub fn mode(world: &World) -> &LevelMode {
        &world.mode
    }

    /// Markers delivered so far, in delivery order.
    #[must_use]
    pub fn progress(world: &World) -> &[char] {
        &world.progress
    }

    /// Display dimensions last reported through `Command::Resize`.
    #[must_use]
    pub fn viewport(world: &World) -> Option<(u16, u16)> {
        world.viewport
    }

    /// Captures everything a presentation layer needs to draw one frame.
    #[must_use]
    pub fn snapshot(world: &World) -> Snapshot<'_> {
        Snapshot {
            grid: &world.grid,
            packets: packet_view(world),
            junctions: junction_view(world),
            score: world.score,
            lives: world.lives,
            streak: world.streak,
            level: world.level,
            ticks: world.ticks,
            goal: &world.goal,
            progress: &world.progress,
            target: world.mode.target_text(),
            target_len: world.mode.target_len(),
            phase: world.phase(),
            paused: world.paused,
            game_over: world.game_over,
            level_complete: world.level_complete,
        }
    }

    /// Read-only frame snapshot consumed by renderers.
    #[derive(Clone, Debug)]
    pub struct Snapshot<'a> {
        /// Static grid of the level.
        pub grid: &'a Grid,
        /// Live packets.
        pub packets: PacketView,
        /// Junctions with their active routes.
        pub junctions: JunctionView,
        /// Running score.
        pub score: i64,
        /// Remaining lives.
        pub lives: u32,
        /// Consecutive correct deliveries.
        pub streak: u32,
        /// One-based level number.
        pub level: u32,
        /// Movement ticks processed on this level.
        pub ticks: u64,
        /// Goal description.
        pub goal: &'a str,
        /// Markers delivered so far.
        pub progress: &'a [char],
        /// Target shown to the player.
        pub target: String,
        /// Number of deliveries that completes the level.
        pub target_len: usize,
        /// Derived gameplay phase.
        pub phase: Phase,
        /// Raw pause flag.
        pub paused: bool,
        /// Raw game-over latch.
        pub game_over: bool,
        /// Raw level-complete latch.
        pub level_complete: bool,
    }
}
