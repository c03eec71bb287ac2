use packet_rush_core::{Direction, JunctionId, JunctionSnapshot, Position};

/// Player-switchable routing node bound to a grid cell.
///
/// The route list is fixed at construction; only the active index moves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Junction {
    id: JunctionId,
    cell: Position,
    routes: Vec<Direction>,
    active: usize,
}

impl Junction {
    /// Creates a junction whose first route is active.
    #[must_use]
    pub fn new(id: JunctionId, cell: Position, routes: Vec<Direction>) -> Self {
        Self {
            id,
            cell,
            routes,
            active: 0,
        }
    }

    /// Key bound to the junction.
    #[must_use]
    pub const fn id(&self) -> JunctionId {
        self.id
    }

    /// Cell the junction occupies.
    #[must_use]
    pub const fn cell(&self) -> Position {
        self.cell
    }

    /// Candidate exit directions in cycling order.
    #[must_use]
    pub fn routes(&self) -> &[Direction] {
        &self.routes
    }

    /// Advances to the next route, wrapping around. No-op without routes.
    pub fn switch_route(&mut self) {
        if !self.routes.is_empty() {
            self.active = (self.active + 1) % self.routes.len();
        }
    }

    /// Direction given to packets entering the junction; halted without routes.
    #[must_use]
    pub fn active_direction(&self) -> Direction {
        self.routes
            .get(self.active)
            .copied()
            .unwrap_or(Direction::Halted)
    }

    /// Glyph that shows the active route.
    #[must_use]
    pub fn symbol(&self) -> char {
        match self.active_direction() {
            Direction::Up => '^',
            Direction::Down => 'v',
            Direction::Left => '<',
            Direction::Right => '>',
            Direction::Halted => '+',
        }
    }

    pub(crate) fn snapshot(&self) -> JunctionSnapshot {
        JunctionSnapshot {
            id: self.id,
            cell: self.cell,
            routes: self.routes.clone(),
            active: self.active,
            direction: self.active_direction(),
        }
    }
}
