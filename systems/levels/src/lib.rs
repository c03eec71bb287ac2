#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level factory for Packet Rush.
//!
//! Every level is drawn on a bordered canvas, bound to its junctions and then
//! validated before a [`Level`] is handed to the world. Validation failures
//! surface as [`LevelError`] so a broken layout never reaches play.

mod canvas;
mod layouts;

use std::{collections::BTreeSet, time::Duration};

use packet_rush_core::{Cell, JunctionId, LevelMode, PacketKind, Position};
use packet_rush_world::{Grid, Junction, Level};
use thiserror::Error;

/// Highest level number; play wraps back to level 1 after it.
pub const MAX_LEVEL: u32 = 10;

/// Level number reported by the practice level.
pub const PRACTICE_LEVEL: u32 = 0;

const JUNCTION_KEYS: &str = "1234567890abcdefghijklmnopstuvwxyz";
const DECOYS: [char; 2] = ['1', '2'];

struct Entry {
    word: &'static str,
    title: &'static str,
    spawn_interval_ms: u64,
}

const CATALOGUE: [Entry; MAX_LEVEL as usize] = [
    Entry {
        word: "GO",
        title: "Network basics",
        spawn_interval_ms: 4_000,
    },
    Entry {
        word: "HI",
        title: "Extended network",
        spawn_interval_ms: 3_500,
    },
    Entry {
        word: "WIN",
        title: "Complex routing",
        spawn_interval_ms: 3_000,
    },
    Entry {
        word: "CODE",
        title: "Multi-path routing",
        spawn_interval_ms: 2_500,
    },
    Entry {
        word: "RUSH",
        title: "Rush hour",
        spawn_interval_ms: 2_000,
    },
    Entry {
        word: "EXPERT",
        title: "Precision routing",
        spawn_interval_ms: 1_800,
    },
    Entry {
        word: "GENIUS",
        title: "Genius routing",
        spawn_interval_ms: 1_500,
    },
    Entry {
        word: "MASTER",
        title: "Network mastery",
        spawn_interval_ms: 1_300,
    },
    Entry {
        word: "LEGEND",
        title: "Legendary routing",
        spawn_interval_ms: 1_100,
    },
    Entry {
        word: "CHAMPION",
        title: "Final level",
        spawn_interval_ms: 1_000,
    },
];

/// Reasons a level cannot be produced.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    /// The requested level number is outside the catalogue.
    #[error("level {level} does not exist (levels run from 1 to {})", MAX_LEVEL)]
    UnknownLevel {
        /// Requested level number.
        level: u32,
    },
    /// A row differs in width from the first row.
    #[error("row {row} is {width} cells wide, expected {expected}")]
    RaggedGrid {
        /// Zero-based row index.
        row: usize,
        /// Width of the offending row.
        width: usize,
        /// Width of the first row.
        expected: usize,
    },
    /// The grid has no `S` cell.
    #[error("grid has no spawn cell")]
    MissingSpawn,
    /// The goal requires no delivery at all.
    #[error("level goal requires no deliveries")]
    EmptyTarget,
    /// More junctions were drawn than there are keys to bind them to.
    #[error("{count} junctions exceed the available keys")]
    TooManyJunctions {
        /// Number of junctions in the layout.
        count: usize,
    },
    /// Two junctions share a key.
    #[error("junction key '{key}' is bound twice")]
    DuplicateJunction {
        /// Shared key.
        key: char,
    },
    /// A junction is bound to a cell that is not `+`.
    #[error("junction '{key}' at {cell} is not on a junction cell")]
    JunctionOffSlot {
        /// Key of the junction.
        key: char,
        /// Cell the junction is bound to.
        cell: Position,
    },
    /// A junction has nothing to route packets to.
    #[error("junction '{key}' has no routes")]
    JunctionWithoutRoutes {
        /// Key of the junction.
        key: char,
    },
    /// A junction lists the same direction twice.
    #[error("junction '{key}' lists a route twice")]
    DuplicateRoute {
        /// Key of the junction.
        key: char,
    },
    /// A packet kind the level spawns has nowhere to be delivered.
    #[error("no destination cell for '{marker}'")]
    MissingDestination {
        /// Marker the packet kind needs.
        marker: char,
    },
}

/// Key bound to the junction with the provided index: `1-9`, `0`, then
/// lowercase letters other than `q` and `r`.
#[must_use]
pub fn junction_key(index: usize) -> Option<JunctionId> {
    JUNCTION_KEYS.chars().nth(index).map(JunctionId::new)
}

/// Builds the level with the provided one-based number.
pub fn load_level(number: u32) -> Result<Level, LevelError> {
    let index = number
        .checked_sub(1)
        .and_then(|index| usize::try_from(index).ok())
        .filter(|index| *index < CATALOGUE.len())
        .ok_or(LevelError::UnknownLevel { level: number })?;
    let entry = &CATALOGUE[index];

    let layout = if number == 1 {
        layouts::classic()?
    } else {
        let mut markers = distinct_letters(entry.word);
        markers.extend(DECOYS);
        let mut stubs = markers.split_off(2.min(markers.len()));
        if !stubs.is_empty() {
            let shift = index % stubs.len();
            stubs.rotate_left(shift);
        }
        let top = markers.first().copied().unwrap_or(DECOYS[0]);
        let bottom = markers.get(1).copied().unwrap_or(DECOYS[1]);
        layouts::comb(top, bottom, &stubs)?
    };

    assemble(
        number,
        layout,
        Duration::from_millis(entry.spawn_interval_ms),
        format!("{}: spell '{}'", entry.title, entry.word),
        LevelMode::Spelling {
            word: entry.word.to_owned(),
        },
    )
}

/// Builds the numbered-port practice level.
pub fn practice_level() -> Result<Level, LevelError> {
    assemble(
        PRACTICE_LEVEL,
        layouts::comb('1', '2', &['3', '4'])?,
        Duration::from_secs(3),
        "Practice: deliver each numbered packet to its port".to_owned(),
        LevelMode::NumericPorts {
            ports: vec![1, 2, 3, 4],
            quota: 10,
        },
    )
}

/// Checks that the rows, junctions and goal form a playable level.
pub fn validate<S: AsRef<str>>(
    rows: &[S],
    junctions: &[Junction],
    mode: &LevelMode,
) -> Result<(), LevelError> {
    let expected = rows.first().map_or(0, |row| row.as_ref().chars().count());
    for (row, line) in rows.iter().enumerate() {
        let width = line.as_ref().chars().count();
        if width != expected {
            return Err(LevelError::RaggedGrid {
                row,
                width,
                expected,
            });
        }
    }

    let grid = Grid::from_rows(rows);
    if grid.spawn().is_none() {
        return Err(LevelError::MissingSpawn);
    }
    if mode.target_len() == 0 {
        return Err(LevelError::EmptyTarget);
    }

    let mut keys = BTreeSet::new();
    for junction in junctions {
        let key = junction.id().key();
        if !keys.insert(key) {
            return Err(LevelError::DuplicateJunction { key });
        }
        if grid.symbol(junction.cell()) != Cell::JUNCTION {
            return Err(LevelError::JunctionOffSlot {
                key,
                cell: junction.cell(),
            });
        }
        let routes = junction.routes();
        if routes.is_empty() {
            return Err(LevelError::JunctionWithoutRoutes { key });
        }
        let duplicated = routes
            .iter()
            .enumerate()
            .any(|(index, route)| routes[..index].contains(route));
        if duplicated {
            return Err(LevelError::DuplicateRoute { key });
        }
    }

    for kind in mode.packet_kinds() {
        let cell = match kind {
            PacketKind::Letter(letter) => Cell::Letter(letter),
            PacketKind::Port(port) => Cell::Port(port),
        };
        if grid.positions_of(cell).is_empty() {
            return Err(LevelError::MissingDestination {
                marker: kind.glyph(),
            });
        }
    }

    Ok(())
}

fn assemble(
    number: u32,
    layout: layouts::Layout,
    spawn_interval: Duration,
    goal: String,
    mode: LevelMode,
) -> Result<Level, LevelError> {
    validate(&layout.rows, &layout.junctions, &mode)?;

    Ok(Level {
        number,
        grid: Grid::from_rows(&layout.rows),
        junctions: layout.junctions,
        spawn_interval,
        goal,
        mode,
    })
}

fn distinct_letters(word: &str) -> Vec<char> {
    let mut letters: Vec<char> = Vec::new();
    for letter in word.chars() {
        if !letters.contains(&letter) {
            letters.push(letter);
        }
    }
    letters
}
