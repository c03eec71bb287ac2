use packet_rush_core::{Cell, Direction, Position};
use packet_rush_world::Junction;

use crate::{canvas::Canvas, junction_key, LevelError};

const COLUMNS: usize = 80;
const ROWS: usize = 21;
const SPAWN_X: i32 = 1;
const TOP_TRUNK: i32 = 4;
const BOTTOM_TRUNK: i32 = 14;
const STUB_MARKER: i32 = 18;
const FIRST_BRANCH: i32 = 8;
const BRANCH_SPACING: i32 = 7;

/// Drawn map plus the junctions bound to its `+` cells.
#[derive(Clone, Debug)]
pub(crate) struct Layout {
    pub(crate) rows: Vec<String>,
    pub(crate) junctions: Vec<Junction>,
}

/// Opening layout: two trunks, three branches and a pair of decoy stubs.
pub(crate) fn classic() -> Result<Layout, LevelError> {
    let mut canvas = Canvas::bordered(COLUMNS, ROWS);
    canvas.put(SPAWN_X, TOP_TRUNK, Cell::SPAWN);
    canvas.put(43, TOP_TRUNK, 'G');
    canvas.put(32, 10, 'O');
    canvas.put(43, BOTTOM_TRUNK, '1');
    canvas.put(32, 17, '2');
    canvas.put(21, 19, '3');

    let mut cells = Vec::new();
    for x in [10, 21, 32] {
        cells.push((canvas.junction(x, TOP_TRUNK), vec![Direction::Right, Direction::Down]));
    }
    cells.push((
        canvas.junction(10, BOTTOM_TRUNK),
        vec![Direction::Right, Direction::Up],
    ));
    for x in [21, 32] {
        cells.push((
            canvas.junction(x, BOTTOM_TRUNK),
            vec![Direction::Right, Direction::Down],
        ));
    }

    canvas.horizontal(TOP_TRUNK, SPAWN_X + 1, 42);
    canvas.horizontal(BOTTOM_TRUNK, 11, 42);
    canvas.vertical(10, TOP_TRUNK + 1, BOTTOM_TRUNK - 1);
    canvas.vertical(21, TOP_TRUNK + 1, BOTTOM_TRUNK - 1);
    canvas.vertical(32, TOP_TRUNK + 1, 9);
    canvas.vertical(21, BOTTOM_TRUNK + 1, 18);
    canvas.vertical(32, BOTTOM_TRUNK + 1, 16);

    Ok(Layout {
        rows: canvas.into_rows(),
        junctions: bind_keys(cells)?,
    })
}

/// Comb layout: a top and a bottom trunk joined by one branch per stub.
///
/// Each branch leaves the top trunk at a junction, crosses the bottom trunk
/// at a second junction and ends in a stub holding the next marker. The top
/// trunk ends at `top_end`, the bottom trunk at `bottom_end`.
pub(crate) fn comb(top_end: char, bottom_end: char, stubs: &[char]) -> Result<Layout, LevelError> {
    let mut canvas = Canvas::bordered(COLUMNS, ROWS);
    let branches: Vec<i32> = (0..stubs.len().max(1))
        .map(|index| FIRST_BRANCH + BRANCH_SPACING * index as i32)
        .collect();
    let first = branches.first().copied().unwrap_or(FIRST_BRANCH);
    let last = branches.last().copied().unwrap_or(FIRST_BRANCH);
    let end = last + BRANCH_SPACING;

    canvas.put(SPAWN_X, TOP_TRUNK, Cell::SPAWN);
    canvas.put(end, TOP_TRUNK, top_end);
    canvas.put(end, BOTTOM_TRUNK, bottom_end);

    let mut top = Vec::with_capacity(branches.len());
    let mut bottom = Vec::with_capacity(branches.len());
    for (index, x) in branches.iter().copied().enumerate() {
        top.push((canvas.junction(x, TOP_TRUNK), vec![Direction::Right, Direction::Down]));
        bottom.push((
            canvas.junction(x, BOTTOM_TRUNK),
            vec![Direction::Right, Direction::Down],
        ));
        if let Some(marker) = stubs.get(index) {
            canvas.put(x, STUB_MARKER, *marker);
        }
        canvas.vertical(x, TOP_TRUNK + 1, BOTTOM_TRUNK - 1);
        canvas.vertical(x, BOTTOM_TRUNK + 1, STUB_MARKER - 1);
    }

    canvas.horizontal(TOP_TRUNK, SPAWN_X + 1, end - 1);
    canvas.horizontal(BOTTOM_TRUNK, first + 1, end - 1);

    top.extend(bottom);
    Ok(Layout {
        rows: canvas.into_rows(),
        junctions: bind_keys(top)?,
    })
}

fn bind_keys(
    cells: Vec<(Position, Vec<Direction>)>,
) -> Result<Vec<Junction>, LevelError> {
    let count = cells.len();
    cells
        .into_iter()
        .enumerate()
        .map(|(index, (cell, routes))| {
            junction_key(index)
                .map(|id| Junction::new(id, cell, routes))
                .ok_or(LevelError::TooManyJunctions { count })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_layout_matches_reference_rows() {
        let layout = classic().expect("classic layout");

        assert_eq!(layout.rows.len(), ROWS);
        assert!(layout.rows.iter().all(|row| row.len() == COLUMNS));
        assert!(layout.rows[4].starts_with("#S--------+----------+----------+----------G "));
        assert!(layout.rows[14].starts_with("#         +----------+----------+----------1 "));
        assert_eq!(layout.rows[10].chars().nth(32), Some('O'));
        assert_eq!(layout.rows[19].chars().nth(21), Some('3'));
        assert_eq!(layout.junctions.len(), 6);
    }

    #[test]
    fn comb_places_markers_at_trunk_ends_and_stubs() {
        let layout = comb('W', 'I', &['N', '1']).expect("comb layout");

        assert_eq!(layout.rows[4].chars().nth(22), Some('W'));
        assert_eq!(layout.rows[14].chars().nth(22), Some('I'));
        assert_eq!(layout.rows[18].chars().nth(8), Some('N'));
        assert_eq!(layout.rows[18].chars().nth(15), Some('1'));
        assert_eq!(layout.rows[14].chars().nth(7), Some(' '));
        assert_eq!(layout.junctions.len(), 4);
    }

    #[test]
    fn too_many_branches_run_out_of_keys() {
        let stubs = ['1'; 20];

        assert_eq!(
            comb('A', 'B', &stubs).map(|layout| layout.junctions.len()),
            Err(LevelError::TooManyJunctions { count: 40 })
        );
    }
}
