use packet_rush_core::{Cell, Position};

/// Static character map of a level: walls, pipes, spawn and destinations.
///
/// Rows shorter than the widest row are padded with blanks so the map is
/// always rectangular. Every coordinate outside the map reads as a wall.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    symbols: Vec<char>,
    spawn: Option<Position>,
}

impl Grid {
    /// Builds a grid from its textual rows.
    ///
    /// The first `S` in row-major order becomes the spawn cell.
    #[must_use]
    pub fn from_rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines: Vec<Vec<char>> = rows
            .into_iter()
            .map(|row| row.as_ref().chars().collect())
            .collect();
        let width = lines.iter().map(Vec::len).max().unwrap_or(0);
        let height = lines.len();

        let mut symbols = Vec::with_capacity(width * height);
        let mut spawn = None;
        for (y, line) in lines.iter().enumerate() {
            for x in 0..width {
                let symbol = line.get(x).copied().unwrap_or(' ');
                if spawn.is_none() && symbol == Cell::SPAWN {
                    spawn = Some(Position::new(x as i32, y as i32));
                }
                symbols.push(symbol);
            }
        }

        Self {
            columns: u32::try_from(width).unwrap_or(u32::MAX),
            rows: u32::try_from(height).unwrap_or(u32::MAX),
            symbols,
            spawn,
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Cell where packets enter, if the map has one.
    #[must_use]
    pub const fn spawn(&self) -> Option<Position> {
        self.spawn
    }

    /// Reports whether the coordinate lies inside the map.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    /// Raw symbol at the coordinate; `#` outside the map.
    #[must_use]
    pub fn symbol(&self, position: Position) -> char {
        self.index(position)
            .and_then(|index| self.symbols.get(index).copied())
            .unwrap_or(Cell::WALL)
    }

    /// Classified cell at the coordinate. Out-of-bounds reads as a wall.
    #[must_use]
    pub fn cell(&self, position: Position) -> Cell {
        if self.spawn == Some(position) {
            return Cell::Spawn;
        }
        Cell::from_symbol(self.symbol(position))
    }

    /// Iterator over the rows as symbol slices, top to bottom.
    pub fn lines(&self) -> impl Iterator<Item = &[char]> {
        let width = usize::try_from(self.columns).unwrap_or(0).max(1);
        self.symbols.chunks(width)
    }

    /// Coordinates of every cell classified as `wanted`, in row-major order.
    #[must_use]
    pub fn positions_of(&self, wanted: Cell) -> Vec<Position> {
        let mut found = Vec::new();
        for y in 0..self.rows {
            for x in 0..self.columns {
                let position = Position::new(x as i32, y as i32);
                if self.cell(position) == wanted {
                    found.push(position);
                }
            }
        }
        found
    }

    fn index(&self, position: Position) -> Option<usize> {
        let x = u32::try_from(position.x()).ok()?;
        let y = u32::try_from(position.y()).ok()?;
        if x >= self.columns || y >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        Some(usize::try_from(y).ok()? * width + usize::try_from(x).ok()?)
    }
}
