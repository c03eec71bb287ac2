use packet_rush_core::{Cell, Position};

/// Mutable character map that layouts are drawn on before validation.
#[derive(Clone, Debug)]
pub(crate) struct Canvas {
    lines: Vec<Vec<char>>,
}

impl Canvas {
    /// Blank map of the requested size surrounded by a wall.
    pub(crate) fn bordered(columns: usize, rows: usize) -> Self {
        let mut lines = vec![vec![' '; columns]; rows];
        let last_row = rows.saturating_sub(1);
        for (y, line) in lines.iter_mut().enumerate() {
            if y == 0 || y == last_row {
                line.fill(Cell::WALL);
                continue;
            }
            if let Some(first) = line.first_mut() {
                *first = Cell::WALL;
            }
            if let Some(last) = line.last_mut() {
                *last = Cell::WALL;
            }
        }
        Self { lines }
    }

    /// Writes a symbol, ignoring coordinates outside the map.
    pub(crate) fn put(&mut self, x: i32, y: i32, symbol: char) {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        if let Some(slot) = self.lines.get_mut(y).and_then(|line| line.get_mut(x)) {
            *slot = symbol;
        }
    }

    /// Places a junction placeholder and returns its coordinate.
    pub(crate) fn junction(&mut self, x: i32, y: i32) -> Position {
        self.put(x, y, Cell::JUNCTION);
        Position::new(x, y)
    }

    /// Draws `-` from `from` to `to` inclusive along row `y`, over blanks only.
    pub(crate) fn horizontal(&mut self, y: i32, from: i32, to: i32) {
        for x in from..=to {
            self.pipe(x, y, '-');
        }
    }

    /// Draws `|` from `from` to `to` inclusive along column `x`, over blanks only.
    pub(crate) fn vertical(&mut self, x: i32, from: i32, to: i32) {
        for y in from..=to {
            self.pipe(x, y, '|');
        }
    }

    pub(crate) fn into_rows(self) -> Vec<String> {
        self.lines
            .into_iter()
            .map(|line| line.into_iter().collect())
            .collect()
    }

    fn pipe(&mut self, x: i32, y: i32, symbol: char) {
        let (Ok(column), Ok(row)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        let blank = self
            .lines
            .get(row)
            .and_then(|line| line.get(column))
            .is_some_and(|current| *current == ' ');
        if blank {
            self.put(x, y, symbol);
        }
    }
}
