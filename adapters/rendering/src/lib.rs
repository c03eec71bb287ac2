#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Packet Rush adapters.
//!
//! Backends never read the world directly. The CLI projects the world into a
//! [`Scene`] every frame and hands it to a [`RenderingBackend`], which draws
//! it and reports the keys pressed since the previous frame.

mod input;

use std::time::Duration;

use anyhow::Result as AnyResult;
use packet_rush_core::{Cell, Direction, PacketSnapshot, Phase, Position};
use packet_rush_world::{
    query::{self, Snapshot},
    World,
};

pub use input::{command_for_key, KeyPress};

/// Number of live packets listed individually under the grid.
const LISTED_PACKETS: usize = 5;

/// Semantic color of a glyph or text line; backends pick the palette.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tint {
    /// Terminal default foreground.
    #[default]
    Default,
    /// Wall cells.
    Wall,
    /// Pipe segments and unbound junction slots.
    Pipe,
    /// Spawn cell.
    Spawn,
    /// Bound junctions showing their active route.
    Junction,
    /// Live packets.
    Packet,
    /// Letter destinations.
    Destination,
    /// Digit ports.
    Port,
    /// Heads-up display text.
    Hud,
    /// Goal and progress text.
    Accent,
    /// Pause and failure messages.
    Warning,
    /// Completion messages.
    Success,
}

/// Single character cell of the play field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Glyph {
    /// Character drawn in the cell.
    pub symbol: char,
    /// Color hint for the character.
    pub tint: Tint,
}

impl Glyph {
    /// Creates a new glyph.
    #[must_use]
    pub const fn new(symbol: char, tint: Tint) -> Self {
        Self { symbol, tint }
    }
}

/// One line of text drawn below or over the play field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextLine {
    /// Text content.
    pub text: String,
    /// Color hint for the whole line.
    pub tint: Tint,
}

impl TextLine {
    /// Creates a new text line.
    #[must_use]
    pub fn new<T>(text: T, tint: Tint) -> Self
    where
        T: Into<String>,
    {
        Self {
            text: text.into(),
            tint,
        }
    }
}

/// Declarative description of one frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scene {
    /// Play field rows, top to bottom.
    pub grid: Vec<Vec<Glyph>>,
    /// Status lines drawn below the play field.
    pub status: Vec<TextLine>,
    /// Centered message drawn over the play field; empty while playing.
    pub overlay: Vec<TextLine>,
}

impl Scene {
    /// Projects the current world state into a scene.
    #[must_use]
    pub fn from_world(world: &World) -> Self {
        let snapshot = query::snapshot(world);
        let mut grid = field(&snapshot);

        for junction in query::junctions(world) {
            if let Some(glyph) = glyph_at(&mut grid, junction.cell()) {
                *glyph = Glyph::new(junction.symbol(), Tint::Junction);
            }
        }
        for packet in snapshot.packets.iter() {
            if let Some(glyph) = glyph_at(&mut grid, packet.cell) {
                *glyph = Glyph::new(packet.kind.glyph(), Tint::Packet);
            }
        }

        Self {
            grid,
            status: status_lines(&snapshot),
            overlay: overlay_lines(&snapshot),
        }
    }

    /// Widest play field row, in cells.
    #[must_use]
    pub fn grid_width(&self) -> usize {
        self.grid.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Plain-text rendering of the play field followed by the status lines.
    #[must_use]
    pub fn text(&self) -> String {
        let mut lines: Vec<String> = self
            .grid
            .iter()
            .map(|row| row.iter().map(|glyph| glyph.symbol).collect())
            .collect();
        lines.extend(self.status.iter().map(|line| line.text.clone()));
        lines.join("\n")
    }
}

fn field(snapshot: &Snapshot<'_>) -> Vec<Vec<Glyph>> {
    let grid = snapshot.grid;
    grid.lines()
        .enumerate()
        .map(|(y, line)| {
            line.iter()
                .enumerate()
                .map(|(x, symbol)| {
                    let cell = grid.cell(Position::new(x as i32, y as i32));
                    Glyph::new(*symbol, cell_tint(cell))
                })
                .collect()
        })
        .collect()
}

fn cell_tint(cell: Cell) -> Tint {
    match cell {
        Cell::Wall => Tint::Wall,
        Cell::Pipe | Cell::JunctionSlot => Tint::Pipe,
        Cell::Spawn => Tint::Spawn,
        Cell::Letter(_) => Tint::Destination,
        Cell::Port(_) => Tint::Port,
        Cell::Empty => Tint::Default,
    }
}

fn glyph_at(grid: &mut [Vec<Glyph>], cell: Position) -> Option<&mut Glyph> {
    let x = usize::try_from(cell.x()).ok()?;
    let y = usize::try_from(cell.y()).ok()?;
    grid.get_mut(y)?.get_mut(x)
}

fn status_lines(snapshot: &Snapshot<'_>) -> Vec<TextLine> {
    let level = if snapshot.level == 0 {
        "Practice".to_owned()
    } else {
        format!("Level: {}", snapshot.level)
    };
    let mut lines = vec![
        TextLine::new(
            format!(
                "{level} | Score: {} | Lives: {} | Streak: {} | Packets: {} | Ticks: {}",
                snapshot.score,
                snapshot.lives,
                snapshot.streak,
                snapshot.packets.len(),
                snapshot.ticks
            ),
            Tint::Hud,
        ),
        TextLine::new(format!("Goal: {}", snapshot.goal), Tint::Accent),
        TextLine::new(progress_text(snapshot), Tint::Accent),
        TextLine::new(legend_text(snapshot), Tint::Junction),
    ];
    if !snapshot.packets.is_empty() {
        lines.push(TextLine::new(packets_text(snapshot), Tint::Packet));
    }
    lines.push(TextLine::new(controls_text(snapshot.phase), Tint::Hud));
    lines
}

fn progress_text(snapshot: &Snapshot<'_>) -> String {
    let delivered: String = snapshot.progress.iter().collect();
    let remaining = snapshot.target_len.saturating_sub(snapshot.progress.len());
    if remaining == 0 {
        return format!("Progress: {delivered} (done)");
    }
    format!(
        "Progress: {delivered}{} (need {remaining} more: {})",
        "_".repeat(remaining),
        snapshot.target
    )
}

fn legend_text(snapshot: &Snapshot<'_>) -> String {
    let mut junctions: Vec<_> = snapshot.junctions.iter().collect();
    junctions.sort_by_key(|junction| key_rank(junction.id.key()));
    let entries: Vec<String> = junctions
        .iter()
        .map(|junction| format!("{}:{}", junction.id.key(), arrow(junction.direction)))
        .collect();
    format!("Junctions: {}", entries.join(" "))
}

/// Keyboard order of junction keys: digits `1-9`, then `0`, then letters.
fn key_rank(key: char) -> (u8, char) {
    match key {
        '1'..='9' => (0, key),
        '0' => (1, key),
        _ => (2, key),
    }
}

fn arrow(direction: Direction) -> char {
    match direction {
        Direction::Up => '↑',
        Direction::Down => '↓',
        Direction::Left => '←',
        Direction::Right => '→',
        Direction::Halted => '·',
    }
}

fn packets_text(snapshot: &Snapshot<'_>) -> String {
    let listed: Vec<String> = snapshot
        .packets
        .iter()
        .take(LISTED_PACKETS)
        .map(describe_packet)
        .collect();
    let mut text = format!("Active packets: {}", listed.join(" "));
    let hidden = snapshot.packets.len().saturating_sub(LISTED_PACKETS);
    if hidden > 0 {
        text.push_str(&format!(" +{hidden} more"));
    }
    text
}

fn describe_packet(packet: &PacketSnapshot) -> String {
    format!(
        "{}@{}{}",
        packet.kind.glyph(),
        packet.cell,
        arrow(packet.direction)
    )
}

fn controls_text(phase: Phase) -> String {
    let escape = match phase {
        Phase::GameOver => " | [R] Restart",
        Phase::LevelComplete => " | [R]/[Enter] Next level",
        Phase::Playing | Phase::Paused => "",
    };
    format!("Controls: [SPACE] Pause | [Q] Quit | [1-9, 0, a-z] Switch junctions{escape}")
}

fn overlay_lines(snapshot: &Snapshot<'_>) -> Vec<TextLine> {
    match snapshot.phase {
        Phase::Playing => Vec::new(),
        Phase::Paused => vec![
            TextLine::new("PAUSED", Tint::Warning),
            TextLine::new("Press SPACE to continue", Tint::Hud),
        ],
        Phase::LevelComplete => vec![
            TextLine::new("LEVEL COMPLETE!", Tint::Success),
            TextLine::new(format!("Score: {}", snapshot.score), Tint::Accent),
            TextLine::new("Press R for next level", Tint::Hud),
        ],
        Phase::GameOver => vec![
            TextLine::new("KERNEL PANIC!", Tint::Warning),
            TextLine::new(format!("Final Score: {}", snapshot.score), Tint::Accent),
            TextLine::new(format!("Level Reached: {}", snapshot.level), Tint::Accent),
            TextLine::new("Press R to restart or Q to quit", Tint::Hud),
        ],
    }
}

/// Input gathered by a backend since the previous frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Keys pressed, in arrival order.
    pub keys: Vec<KeyPress>,
    /// New display size as `(columns, rows)`, when it changed.
    pub resized: Option<(u16, u16)>,
}

/// Whether the backend should keep presenting frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Draw the updated scene and wait for the next frame.
    Continue,
    /// Restore the display and return.
    Exit,
}

/// Initial presentation state handed to a backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Presentation {
    /// Title shown above the play field.
    pub window_title: String,
    /// Scene content that should be displayed first.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            scene,
        }
    }
}

/// Rendering backend capable of presenting Packet Rush scenes.
pub trait RenderingBackend {
    /// Runs the backend until `update_scene` asks it to exit.
    ///
    /// The closure receives the wall time elapsed since the previous frame
    /// and the input gathered in between, and rewrites the scene that is
    /// drawn next. Errors returned by the closure stop the backend after the
    /// display has been restored.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> AnyResult<FrameControl>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use packet_rush_core::{Command, JunctionId, LevelMode, PacketKind, Tuning};
    use packet_rush_world::{self as world, Grid, Junction, Level};

    const FORK: [&str; 5] = [
        "#######", //
        "#S-+-G#", //
        "#  |  #", //
        "#  O  #", //
        "#######",
    ];

    fn fork_world(word: &str, tuning: Tuning) -> World {
        let level = Level {
            number: 3,
            grid: Grid::from_rows(FORK),
            junctions: vec![Junction::new(
                JunctionId::new('1'),
                Position::new(3, 1),
                vec![Direction::Right, Direction::Down],
            )],
            spawn_interval: Duration::from_secs(4),
            goal: "Spell it".to_owned(),
            mode: LevelMode::Spelling {
                word: word.to_owned(),
            },
        };
        World::new(level, tuning)
    }

    fn submit(world: &mut World, command: Command) {
        let mut events = Vec::new();
        world::apply(world, command, &mut events);
    }

    fn spawn(world: &mut World, letter: char) {
        submit(
            world,
            Command::SpawnPacket {
                kind: PacketKind::Letter(letter),
            },
        );
    }

    fn tick_until(world: &mut World, phase: Phase) {
        for _ in 0..10 {
            if query::phase(world) == phase {
                return;
            }
            submit(world, Command::MovementTick);
        }
        assert_eq!(query::phase(world), phase);
    }

    #[test]
    fn junctions_and_packets_replace_grid_symbols() {
        let mut world = fork_world("GO", Tuning::default());
        spawn(&mut world, 'G');

        let scene = Scene::from_world(&world);

        assert_eq!(scene.grid.len(), 5);
        assert_eq!(scene.grid_width(), 7);
        assert_eq!(scene.grid[1][1], Glyph::new('G', Tint::Packet));
        assert_eq!(scene.grid[1][3], Glyph::new('>', Tint::Junction));
        assert_eq!(scene.grid[1][5], Glyph::new('G', Tint::Destination));
        assert_eq!(scene.grid[2][3], Glyph::new('|', Tint::Pipe));
        assert_eq!(scene.grid[0][0], Glyph::new('#', Tint::Wall));
        assert!(scene.text().starts_with("#######\n#G->-G#\n"));
        assert!(scene.overlay.is_empty());
    }

    #[test]
    fn status_lines_report_progress_and_junctions() {
        let mut world = fork_world("GO", Tuning::default());
        spawn(&mut world, 'G');
        submit(
            &mut world,
            Command::SwitchJunction {
                id: JunctionId::new('1'),
            },
        );

        let status: Vec<String> = Scene::from_world(&world)
            .status
            .into_iter()
            .map(|line| line.text)
            .collect();

        assert_eq!(
            status[0],
            "Level: 3 | Score: 0 | Lives: 3 | Streak: 0 | Packets: 1 | Ticks: 0"
        );
        assert_eq!(status[1], "Goal: Spell it");
        assert_eq!(status[2], "Progress: __ (need 2 more: GO)");
        assert_eq!(status[3], "Junctions: 1:↓");
        assert_eq!(status[4], "Active packets: G@(1,1)→");
        assert!(status[5].starts_with("Controls: [SPACE] Pause | [Q] Quit"));
    }

    #[test]
    fn legend_lists_zero_after_nine() {
        let mut keys = vec!['a', '0', '2', '9', '1'];
        keys.sort_by_key(|key| key_rank(*key));
        assert_eq!(keys, vec!['1', '2', '9', '0', 'a']);
    }

    #[test]
    fn long_packet_lists_are_truncated() {
        let mut world = fork_world("GO", Tuning::default());
        for _ in 0..7 {
            spawn(&mut world, 'O');
        }

        let scene = Scene::from_world(&world);

        let listing = scene
            .status
            .iter()
            .find(|line| line.text.starts_with("Active packets"))
            .map(|line| line.text.clone())
            .unwrap_or_default();
        assert_eq!(listing.matches("O@(1,1)→").count(), LISTED_PACKETS);
        assert!(listing.ends_with(" +2 more"));
    }

    #[test]
    fn pause_shows_overlay() {
        let mut world = fork_world("GO", Tuning::default());
        submit(&mut world, Command::TogglePause);

        let scene = Scene::from_world(&world);

        assert_eq!(scene.overlay[0], TextLine::new("PAUSED", Tint::Warning));
    }

    #[test]
    fn completed_level_announces_itself() {
        let mut world = fork_world("G", Tuning::default());
        spawn(&mut world, 'G');
        tick_until(&mut world, Phase::LevelComplete);

        let scene = Scene::from_world(&world);

        assert_eq!(scene.overlay[0].text, "LEVEL COMPLETE!");
        assert_eq!(scene.overlay[1].text, "Score: 110");
        assert!(scene.status[2].text.starts_with("Progress: G (done)"));
        assert!(scene
            .status
            .last()
            .is_some_and(|line| line.text.ends_with("[R]/[Enter] Next level")));
    }

    #[test]
    fn game_over_reports_final_score_and_level() {
        let tuning = Tuning {
            lives: 1,
            ..Tuning::default()
        };
        let mut world = fork_world("GO", tuning);
        submit(
            &mut world,
            Command::SwitchJunction {
                id: JunctionId::new('1'),
            },
        );
        spawn(&mut world, 'G');
        tick_until(&mut world, Phase::GameOver);

        let overlay: Vec<String> = Scene::from_world(&world)
            .overlay
            .into_iter()
            .map(|line| line.text)
            .collect();

        assert_eq!(
            overlay,
            vec![
                "KERNEL PANIC!",
                "Final Score: 0",
                "Level Reached: 3",
                "Press R to restart or Q to quit",
            ]
        );
    }
}
