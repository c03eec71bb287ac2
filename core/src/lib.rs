#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Packet Rush engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing scheduler ticks and player intent, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems and coordinators to react to deterministically. Timer arms are
//! requested through [`Event::TimerRequested`]; the engine never sleeps.

use std::{fmt, ops::Add, time::Duration};

use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Packet Rush.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Arms both timers for a freshly loaded level.
    Start,
    /// Asks the outer scheduler to terminate. Never mutates the world.
    Quit,
    /// Flips the pause flag.
    TogglePause,
    /// Cycles the active route of the junction bound to the identifier.
    SwitchJunction {
        /// Keyboard identifier of the junction to switch.
        id: JunctionId,
    },
    /// Requests a fresh first level after the game ended.
    Restart,
    /// Requests the next level after the current one was completed.
    AdvanceLevel,
    /// Reports new display dimensions. Has no simulation effect.
    Resize {
        /// Number of terminal columns available.
        columns: u16,
        /// Number of terminal rows available.
        rows: u16,
    },
    /// Movement timer fired: advance every packet by one step.
    MovementTick,
    /// Spawn timer fired.
    SpawnTick {
        /// Scheduler time that elapsed since the spawn timer was armed.
        elapsed: Duration,
    },
    /// Requests that a packet of the provided kind enters at the spawn cell.
    SpawnPacket {
        /// Destination tag carried by the new packet.
        kind: PacketKind,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Asks the scheduler to deliver the timer after the provided delay.
    TimerRequested {
        /// Timer that should be armed.
        timer: Timer,
        /// Delay before the timer fires.
        delay: Duration,
    },
    /// Relays a quit request to the outer scheduler.
    QuitRequested,
    /// Announces the pause flag after a toggle.
    PauseToggled {
        /// Whether the simulation is now paused.
        paused: bool,
    },
    /// Confirms that a junction switched to a new route.
    JunctionSwitched {
        /// Identifier of the switched junction.
        id: JunctionId,
        /// Route that became active.
        direction: Direction,
    },
    /// Signals that the spawn interval elapsed and a packet may enter.
    SpawnDue {
        /// Packet kinds the level accepts, in level order.
        kinds: Vec<PacketKind>,
    },
    /// Confirms that a packet entered the grid.
    PacketSpawned {
        /// Identifier assigned to the packet.
        packet: PacketId,
        /// Cell the packet occupies after spawning.
        cell: Position,
        /// Destination tag carried by the packet.
        kind: PacketKind,
    },
    /// A packet reached its matching destination.
    PacketDelivered {
        /// Identifier of the delivered packet.
        packet: PacketId,
        /// Destination tag carried by the packet.
        kind: PacketKind,
        /// Score awarded for the delivery.
        reward: i64,
    },
    /// A packet reached a destination that does not match its tag.
    PacketMisrouted {
        /// Identifier of the misrouted packet.
        packet: PacketId,
        /// Destination tag carried by the packet.
        kind: PacketKind,
    },
    /// A packet left the grid or crashed into a wall.
    PacketLost {
        /// Identifier of the lost packet.
        packet: PacketId,
        /// Destination tag carried by the packet.
        kind: PacketKind,
    },
    /// The level goal was met.
    LevelCompleted {
        /// One-based number of the completed level.
        level: u32,
        /// Bonus added to the score on completion.
        bonus: i64,
    },
    /// Lives ran out before the goal was met.
    GameOver {
        /// Final score of the run.
        score: i64,
    },
    /// Asks the coordinator to rebuild the first level from scratch.
    RestartRequested,
    /// Asks the coordinator to load the level that follows the completed one.
    LevelAdvanceRequested {
        /// One-based number of the completed level.
        level: u32,
        /// Score to carry into the next level.
        score: i64,
    },
    /// Confirms new display dimensions.
    Resized {
        /// Number of terminal columns available.
        columns: u16,
        /// Number of terminal rows available.
        rows: u16,
    },
}

/// Independent periodic signals delivered by the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Timer {
    /// Advances packets.
    Movement,
    /// Offers a spawn opportunity.
    Spawn,
}

/// Integer grid coordinate. Columns grow rightward, rows grow downward.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the neighbouring coordinate one step along the direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, other: Position) -> Position {
        Position::new(self.x + other.x, self.y + other.y)
    }
}

impl Add<Direction> for Position {
    type Output = Position;

    fn add(self, direction: Direction) -> Position {
        self.step(direction)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Heading of a packet or junction route.
///
/// `Halted` is the zero vector: packets carrying it no longer move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing rows.
    Up,
    /// Toward increasing rows.
    Down,
    /// Toward decreasing columns.
    Left,
    /// Toward increasing columns.
    Right,
    /// No movement.
    Halted,
}

impl Direction {
    /// Column and row offsets of a single step.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Halted => (0, 0),
        }
    }

    /// Direction expressed as a coordinate offset.
    #[must_use]
    pub const fn vector(self) -> Position {
        let (dx, dy) = self.delta();
        Position::new(dx, dy)
    }

    /// Reports whether the direction is the zero vector.
    #[must_use]
    pub const fn is_halted(self) -> bool {
        matches!(self, Self::Halted)
    }
}

/// Keyboard identifier bound to a junction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JunctionId(char);

impl JunctionId {
    /// Creates a new junction identifier from its key.
    #[must_use]
    pub const fn new(key: char) -> Self {
        Self(key)
    }

    /// Key that switches the junction.
    #[must_use]
    pub const fn key(&self) -> char {
        self.0
    }
}

/// Unique identifier assigned to a packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PacketId(u32);

impl PacketId {
    /// Creates a new packet identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Destination tag carried by a packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PacketKind {
    /// Letter of the level's target word; matches the identical letter cell.
    Letter(char),
    /// Numbered port; matches the digit cell with the same value.
    Port(u8),
}

impl PacketKind {
    /// Reports whether the destination marker accepts this packet.
    ///
    /// Letter packets compare the marker exactly, port packets compare the
    /// marker's numeric value.
    #[must_use]
    pub fn is_destination(self, marker: char) -> bool {
        match self {
            Self::Letter(letter) => marker == letter,
            Self::Port(port) => marker.to_digit(10) == Some(u32::from(port)),
        }
    }

    /// Character drawn for the packet and appended to progress on delivery.
    #[must_use]
    pub fn glyph(self) -> char {
        match self {
            Self::Letter(letter) => letter,
            Self::Port(port) => char::from_digit(u32::from(port), 10).unwrap_or('?'),
        }
    }
}

/// Classification of a single grid symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// `#`, and every coordinate outside the grid.
    Wall,
    /// Blank space. Packets cross it unguided.
    Empty,
    /// `-` or `|` pipe segment.
    Pipe,
    /// `+` placeholder where a junction may be bound.
    JunctionSlot,
    /// Cell where packets enter.
    Spawn,
    /// Digit destination.
    Port(u8),
    /// Uppercase letter destination.
    Letter(char),
}

impl Cell {
    /// Wall symbol.
    pub const WALL: char = '#';
    /// Spawn symbol.
    pub const SPAWN: char = 'S';
    /// Junction placeholder symbol.
    pub const JUNCTION: char = '+';

    /// Classifies a grid symbol. `S` is reported as a letter; the grid decides
    /// which `S` is the spawn.
    #[must_use]
    pub fn from_symbol(symbol: char) -> Self {
        match symbol {
            '#' => Self::Wall,
            '-' | '|' => Self::Pipe,
            '+' => Self::JunctionSlot,
            '0'..='9' => Self::Port(symbol as u8 - b'0'),
            'A'..='Z' => Self::Letter(symbol),
            _ => Self::Empty,
        }
    }

    /// Marker character of a destination cell, if the cell is one.
    #[must_use]
    pub fn destination_marker(self) -> Option<char> {
        match self {
            Self::Port(port) => char::from_digit(u32::from(port), 10),
            Self::Letter(letter) => Some(letter),
            _ => None,
        }
    }
}

/// Goal configuration of a level, selected by the level factory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelMode {
    /// Deliver letters to matching letter cells until the word is assembled.
    Spelling {
        /// Word whose length sets the number of deliveries required.
        word: String,
    },
    /// Deliver numbered packets to matching digit ports.
    NumericPorts {
        /// Port numbers packets may carry.
        ports: Vec<u8>,
        /// Number of correct deliveries that completes the level.
        quota: usize,
    },
}

impl LevelMode {
    /// Packet kinds the spawn rule draws from, one entry per word letter or port.
    #[must_use]
    pub fn packet_kinds(&self) -> Vec<PacketKind> {
        match self {
            Self::Spelling { word } => word.chars().map(PacketKind::Letter).collect(),
            Self::NumericPorts { ports, .. } => {
                ports.iter().copied().map(PacketKind::Port).collect()
            }
        }
    }

    /// Number of correct deliveries that completes the level.
    #[must_use]
    pub fn target_len(&self) -> usize {
        match self {
            Self::Spelling { word } => word.chars().count(),
            Self::NumericPorts { quota, .. } => *quota,
        }
    }

    /// Text shown as the level target: the word, or the accepted ports.
    #[must_use]
    pub fn target_text(&self) -> String {
        match self {
            Self::Spelling { word } => word.clone(),
            Self::NumericPorts { ports, quota } => {
                let ports: String = ports
                    .iter()
                    .filter_map(|port| char::from_digit(u32::from(*port), 10))
                    .collect();
                format!("{quota} deliveries to ports {ports}")
            }
        }
    }

    /// Returns the destination marker of `cell` when this mode scores it.
    ///
    /// Spelling levels only score letter cells and numeric levels only score
    /// digit cells; the other kind of marker is passed over.
    #[must_use]
    pub fn scored_marker(&self, cell: Cell) -> Option<char> {
        match (self, cell) {
            (Self::Spelling { .. }, Cell::Letter(_))
            | (Self::NumericPorts { .. }, Cell::Port(_)) => cell.destination_marker(),
            _ => None,
        }
    }

    /// Whether consecutive deliveries scale the reward.
    #[must_use]
    pub const fn rewards_streaks(&self) -> bool {
        matches!(self, Self::NumericPorts { .. })
    }
}

/// Gameplay phase derived from the world's pause and terminal flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Ticks advance the simulation.
    Playing,
    /// Ticks are ignored until the pause is toggled off.
    Paused,
    /// Goal met; only `AdvanceLevel` escapes.
    LevelComplete,
    /// Lives exhausted; only `Restart` escapes.
    GameOver,
}

impl Phase {
    /// Reports whether tick processing is latched off permanently.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::LevelComplete | Self::GameOver)
    }
}

/// Immutable representation of a single packet used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PacketSnapshot {
    /// Unique identifier assigned to the packet.
    pub id: PacketId,
    /// Cell currently occupied by the packet.
    pub cell: Position,
    /// Destination tag carried by the packet.
    pub kind: PacketKind,
    /// Current heading.
    pub direction: Direction,
}

/// Read-only snapshot describing all live packets.
#[derive(Clone, Debug, Default)]
pub struct PacketView {
    snapshots: Vec<PacketSnapshot>,
}

impl PacketView {
    /// Creates a new packet view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<PacketSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured packet snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &PacketSnapshot> {
        self.snapshots.iter()
    }

    /// Number of live packets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no packet is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<PacketSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single junction used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JunctionSnapshot {
    /// Key bound to the junction.
    pub id: JunctionId,
    /// Cell the junction occupies.
    pub cell: Position,
    /// Candidate exit directions in cycling order.
    pub routes: Vec<Direction>,
    /// Index of the active route.
    pub active: usize,
    /// Direction packets entering the junction will take.
    pub direction: Direction,
}

/// Read-only snapshot describing all junctions of the level.
#[derive(Clone, Debug, Default)]
pub struct JunctionView {
    snapshots: Vec<JunctionSnapshot>,
}

impl JunctionView {
    /// Creates a new junction view ordered by key.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<JunctionSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| (snapshot.id, snapshot.cell));
        Self { snapshots }
    }

    /// Iterator over the captured junction snapshots in key order.
    pub fn iter(&self) -> impl Iterator<Item = &JunctionSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the junction occupying the cell.
    #[must_use]
    pub fn at(&self, cell: Position) -> Option<&JunctionSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.cell == cell)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<JunctionSnapshot> {
        self.snapshots
    }
}

/// Tunable gameplay constants.
///
/// Durations are expressed in whole milliseconds so the structure reads
/// naturally from a TOML file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Tuning {
    /// Lives granted at the start of every level.
    pub lives: u32,
    /// Maximum number of packets alive at once.
    pub packet_cap: usize,
    /// Score awarded for a correct delivery.
    pub delivery_reward: i64,
    /// Extra score per consecutive delivery in streak-rewarding modes.
    pub streak_bonus: i64,
    /// Score subtracted for a misroute in streak-rewarding modes.
    pub miss_penalty: i64,
    /// Score awarded when the level goal is met.
    pub level_complete_bonus: i64,
    /// Movement interval at the start of a level.
    pub movement_interval_ms: u64,
    /// Lower bound of the movement interval.
    pub movement_floor_ms: u64,
    /// Movement interval reduction per elapsed tick.
    pub movement_decay_ms: u64,
    /// Lower bound of the spawn interval.
    pub spawn_floor_ms: u64,
    /// Spawn interval reduction per spawn.
    pub spawn_decay_ms: u64,
}

impl Tuning {
    /// Movement interval at the start of a level.
    #[must_use]
    pub const fn movement_interval(&self) -> Duration {
        Duration::from_millis(self.movement_interval_ms)
    }

    /// Movement interval after `ticks` elapsed ticks, floored.
    #[must_use]
    pub fn movement_interval_after(&self, ticks: u64) -> Duration {
        let decay = self.movement_decay_ms.saturating_mul(ticks);
        let interval = self.movement_interval_ms.saturating_sub(decay);
        Duration::from_millis(interval.max(self.movement_floor_ms))
    }

    /// Spawn interval that follows `current` after one spawn, floored.
    #[must_use]
    pub fn next_spawn_interval(&self, current: Duration) -> Duration {
        let floor = Duration::from_millis(self.spawn_floor_ms);
        if current <= floor {
            return current;
        }
        current
            .saturating_sub(Duration::from_millis(self.spawn_decay_ms))
            .max(floor)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            lives: 3,
            packet_cap: 10,
            delivery_reward: 10,
            streak_bonus: 5,
            miss_penalty: 5,
            level_complete_bonus: 100,
            movement_interval_ms: 200,
            movement_floor_ms: 50,
            movement_decay_ms: 1,
            spawn_floor_ms: 300,
            spawn_decay_ms: 50,
        }
    }
}
