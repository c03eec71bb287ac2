use packet_rush_core::{Cell, Direction, PacketId, PacketKind, PacketSnapshot, Position};

/// Mobile entity travelling the grid toward a destination.
#[derive(Clone, Debug)]
pub(crate) struct Packet {
    pub(crate) id: PacketId,
    pub(crate) cell: Position,
    pub(crate) kind: PacketKind,
    pub(crate) direction: Direction,
}

impl Packet {
    pub(crate) fn spawn(id: PacketId, cell: Position, kind: PacketKind) -> Self {
        Self {
            id,
            cell,
            kind,
            direction: Direction::Right,
        }
    }

    /// Steps once along the current direction, returning whether the cell changed.
    pub(crate) fn advance(&mut self) -> bool {
        if self.direction.is_halted() {
            return false;
        }
        self.cell = self.cell + self.direction;
        true
    }

    pub(crate) fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Reports whether `cell` is a destination marker that accepts this packet.
    pub(crate) fn is_at_destination(&self, cell: Cell) -> bool {
        cell.destination_marker()
            .is_some_and(|marker| self.kind.is_destination(marker))
    }

    pub(crate) fn snapshot(&self) -> PacketSnapshot {
        PacketSnapshot {
            id: self.id,
            cell: self.cell,
            kind: self.kind,
            direction: self.direction,
        }
    }
}
