#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Crossterm-backed rendering adapter for Packet Rush.
//!
//! The backend switches the terminal into raw mode on the alternate screen,
//! redraws the whole scene every frame and restores the terminal on the way
//! out, including when the frame closure fails.

use std::{
    io::{self, Stdout, Write},
    mem,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand, QueueableCommand,
};
use packet_rush_rendering::{
    FrameControl, FrameInput, KeyPress, Presentation, RenderingBackend, Scene, TextLine, Tint,
};
use unicode_width::UnicodeWidthStr;

const DEFAULT_FRAMES_PER_SECOND: u32 = 30;

/// Rendering backend that draws into the controlling terminal.
#[derive(Debug)]
pub struct TerminalBackend {
    frame_time: Duration,
}

impl Default for TerminalBackend {
    fn default() -> Self {
        Self {
            frame_time: frame_time(DEFAULT_FRAMES_PER_SECOND),
        }
    }
}

impl TerminalBackend {
    /// Returns a backend redrawing at the default frame rate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn frames<F>(
        &self,
        stdout: &mut Stdout,
        presentation: Presentation,
        update_scene: &mut F,
    ) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> Result<FrameControl>,
    {
        let Presentation {
            window_title,
            mut scene,
        } = presentation;

        let mut input = FrameInput {
            keys: Vec::new(),
            resized: Some(terminal::size().context("failed to query terminal size")?),
        };
        let mut last_frame = Instant::now();

        loop {
            let frame_start = Instant::now();
            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(key) => {
                        if let Some(press) = key_press(key) {
                            input.keys.push(press);
                        }
                    }
                    Event::Resize(columns, rows) => input.resized = Some((columns, rows)),
                    _ => {}
                }
            }

            let resized = input.resized.is_some();
            let delta = frame_start.duration_since(last_frame);
            last_frame = frame_start;
            if update_scene(delta, mem::take(&mut input), &mut scene)? == FrameControl::Exit {
                return Ok(());
            }

            if resized {
                let _ = stdout.queue(Clear(ClearType::All))?;
            }
            draw(stdout, &window_title, &scene).context("failed to draw frame")?;

            let elapsed = frame_start.elapsed();
            if elapsed < self.frame_time {
                thread::sleep(self.frame_time - elapsed);
            }
        }
    }
}

impl RenderingBackend for TerminalBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> Result<FrameControl>,
    {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        let _ = stdout.execute(EnterAlternateScreen)?;
        let _ = stdout.execute(Hide)?;

        let result = self.frames(&mut stdout, presentation, &mut update_scene);

        let _ = stdout.execute(Show)?;
        let _ = stdout.execute(LeaveAlternateScreen)?;
        terminal::disable_raw_mode().context("failed to restore the terminal")?;
        result
    }
}

fn frame_time(frames_per_second: u32) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(frames_per_second.max(1)))
}

fn key_press(key: KeyEvent) -> Option<KeyPress> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyPress::Interrupt)
        }
        KeyCode::Char(' ') => Some(KeyPress::Space),
        KeyCode::Char(symbol) => Some(KeyPress::Char(symbol)),
        KeyCode::Enter => Some(KeyPress::Enter),
        KeyCode::Esc => Some(KeyPress::Escape),
        _ => None,
    }
}

fn color(tint: Tint) -> Color {
    match tint {
        Tint::Default => Color::Reset,
        Tint::Wall => Color::Blue,
        Tint::Pipe => Color::White,
        Tint::Spawn => Color::Green,
        Tint::Junction => Color::Magenta,
        Tint::Packet => Color::Cyan,
        Tint::Destination | Tint::Port | Tint::Accent => Color::Yellow,
        Tint::Hud => Color::White,
        Tint::Warning => Color::Red,
        Tint::Success => Color::Green,
    }
}

fn text_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Columns and rows needed to draw the title, play field and status lines.
fn required_size(title: &str, scene: &Scene) -> (usize, usize) {
    let width = scene
        .status
        .iter()
        .map(|line| text_width(&line.text))
        .chain([text_width(title), scene.grid_width()])
        .max()
        .unwrap_or(0);
    let height = 2 + scene.grid.len() + scene.status.len();
    (width, height)
}

/// Offset that centers `inner` columns within `outer` columns.
fn centered(outer: usize, inner: usize) -> usize {
    outer.saturating_sub(inner) / 2
}

fn to_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

fn draw(stdout: &mut Stdout, title: &str, scene: &Scene) -> io::Result<()> {
    let (columns, rows) = terminal::size()?;
    let (needed_width, needed_height) = required_size(title, scene);
    if usize::from(columns) < needed_width || usize::from(rows) < needed_height {
        let _ = stdout
            .queue(MoveTo(0, 0))?
            .queue(Clear(ClearType::All))?
            .queue(Print(format!(
                "Terminal too small. Need at least {needed_width}x{needed_height} (cols x rows). Current: {columns}x{rows}."
            )))?;
        return stdout.flush();
    }

    let left = centered(usize::from(columns), needed_width);
    let top = centered(usize::from(rows), needed_height);

    print_line(stdout, left, top, &TextLine::new(title, Tint::Accent))?;

    let field_top = top + 1;
    for (y, row) in scene.grid.iter().enumerate() {
        let _ = stdout.queue(MoveTo(to_u16(left), to_u16(field_top + y)))?;
        for glyph in row {
            let _ = stdout
                .queue(SetForegroundColor(color(glyph.tint)))?
                .queue(Print(glyph.symbol))?;
        }
        let _ = stdout.queue(ResetColor)?;
    }

    let status_top = field_top + scene.grid.len() + 1;
    for (index, line) in scene.status.iter().enumerate() {
        print_line(stdout, left, status_top + index, line)?;
    }

    let field_width = scene.grid_width();
    let overlay_top = field_top + centered(scene.grid.len(), scene.overlay.len());
    for (index, line) in scene.overlay.iter().enumerate() {
        let padded = TextLine::new(format!(" {} ", line.text), line.tint);
        let x = left + centered(field_width, text_width(&padded.text));
        let _ = stdout
            .queue(MoveTo(to_u16(x), to_u16(overlay_top + index)))?
            .queue(SetForegroundColor(color(padded.tint)))?
            .queue(Print(&padded.text))?
            .queue(ResetColor)?;
    }

    stdout.flush()
}

fn print_line(stdout: &mut Stdout, x: usize, y: usize, line: &TextLine) -> io::Result<()> {
    let _ = stdout
        .queue(MoveTo(to_u16(x), to_u16(y)))?
        .queue(SetForegroundColor(color(line.tint)))?
        .queue(Print(&line.text))?
        .queue(ResetColor)?
        .queue(Clear(ClearType::UntilNewLine))?;
    Ok(())
}
