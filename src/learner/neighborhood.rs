//! Discretisation of the cells around the controlled agent.

use crate::math::Vector2d;
use arrayvec::ArrayVec;
use itertools::iproduct;

/// The number of cells around the centre of a 3x3 neighbourhood.
pub const NEIGHBOURS: usize = 8;

/// The number of distinct cell classifications.
pub const CELL_KINDS: usize = 4;

/// The number of distinct encoded neighbourhoods, `CELL_KINDS ^ NEIGHBOURS`.
pub const STATE_COUNT: usize = CELL_KINDS.pow(NEIGHBOURS as u32);

/// What occupies a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    Free = 0,
    /// Outside the road.
    Wall = 1,
    /// Taken by another agent.
    Occupied = 2,
    Goal = 3,
}

/// A direction of travel in screen space, where "up" is `-y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Heading {
    Up,
    Right,
    Down,
    Left,
}

impl Heading {
    /// A unit vector pointing in this direction.
    pub fn vector(self) -> Vector2d {
        match self {
            Heading::Up => Vector2d::new(0.0, -1.0),
            Heading::Right => Vector2d::new(1.0, 0.0),
            Heading::Down => Vector2d::new(0.0, 1.0),
            Heading::Left => Vector2d::new(-1.0, 0.0),
        }
    }

    /// The heading after a quarter turn anticlockwise, as seen on screen.
    pub fn rotate_left(self) -> Self {
        match self {
            Heading::Up => Heading::Left,
            Heading::Left => Heading::Down,
            Heading::Down => Heading::Right,
            Heading::Right => Heading::Up,
        }
    }

    /// The heading after a quarter turn clockwise, as seen on screen.
    pub fn rotate_right(self) -> Self {
        match self {
            Heading::Up => Heading::Right,
            Heading::Right => Heading::Down,
            Heading::Down => Heading::Left,
            Heading::Left => Heading::Up,
        }
    }
}

/// A 3x3 grid of classified cells, row-major, centred on the controlled agent.
///
/// The centre cell is the agent itself and never contributes to the encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Neighborhood {
    pub cells: [[CellKind; 3]; 3],
}

impl Neighborhood {
    /// A neighbourhood with every cell free.
    pub fn free() -> Self {
        Self {
            cells: [[CellKind::Free; 3]; 3],
        }
    }

    /// Builds a neighbourhood by classifying each cell, given its offset
    /// `(dx, dy)` from the centre with both components in `-1..=1`.
    pub fn from_fn(mut classify: impl FnMut(i32, i32) -> CellKind) -> Self {
        let mut cells = [[CellKind::Free; 3]; 3];
        for (row, col) in iproduct!(0..3, 0..3) {
            cells[row][col] = classify(col as i32 - 1, row as i32 - 1);
        }
        Self { cells }
    }

    /// Rotates the grid so that `heading` points to the top row.
    pub fn oriented(&self, heading: Heading) -> Self {
        let c = &self.cells;
        let cells = match heading {
            Heading::Up => *c,
            Heading::Right => std::array::from_fn(|r| std::array::from_fn(|k| c[k][2 - r])),
            Heading::Down => std::array::from_fn(|r| std::array::from_fn(|k| c[2 - r][2 - k])),
            Heading::Left => std::array::from_fn(|r| std::array::from_fn(|k| c[2 - k][r])),
        };
        Self { cells }
    }

    /// The eight cells around the centre, row-major.
    pub fn neighbours(&self) -> ArrayVec<CellKind, NEIGHBOURS> {
        iproduct!(0..3, 0..3)
            .filter(|&(row, col)| (row, col) != (1, 1))
            .map(|(row, col)| self.cells[row][col])
            .collect()
    }

    /// Encodes the neighbours as an 8 digit base 4 number, most significant first.
    pub fn encode(&self) -> usize {
        self.neighbours()
            .iter()
            .fold(0, |acc, cell| acc * CELL_KINDS + *cell as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CellKind::*;

    #[test]
    fn free_encodes_as_zero() {
        assert_eq!(Neighborhood::free().encode(), 0);
    }

    #[test]
    fn first_cell_is_most_significant() {
        let mut grid = Neighborhood::free();
        grid.cells[0][0] = Goal;
        assert_eq!(grid.encode(), 3 * 4usize.pow(7));
        let mut grid = Neighborhood::free();
        grid.cells[2][2] = Wall;
        assert_eq!(grid.encode(), 1);
    }

    #[test]
    fn centre_is_ignored() {
        let mut grid = Neighborhood::free();
        grid.cells[1][1] = Occupied;
        assert_eq!(grid.encode(), 0);
    }

    #[test]
    fn encoding_stays_in_range() {
        let grid = Neighborhood {
            cells: [[Goal; 3]; 3],
        };
        assert_eq!(grid.encode(), STATE_COUNT - 1);
    }

    #[test]
    fn from_fn_maps_offsets_to_cells() {
        let grid = Neighborhood::from_fn(|dx, dy| if dx == -1 && dy == -1 { Occupied } else { Free });
        assert_eq!(grid.cells[0][0], Occupied);
        assert_eq!(grid.neighbours().len(), NEIGHBOURS);
    }

    #[test]
    fn orientation_puts_heading_on_top() {
        let grid = Neighborhood {
            cells: [[Free, Occupied, Free], [Wall, Free, Goal], [Free, Free, Free]],
        };
        assert_eq!(grid.oriented(Heading::Up), grid);
        assert_eq!(grid.oriented(Heading::Right).cells[0], [Free, Goal, Free]);
        assert_eq!(grid.oriented(Heading::Left).cells[0], [Free, Wall, Free]);
        assert_eq!(grid.oriented(Heading::Down).cells[0], [Free, Free, Free]);
        assert_eq!(grid.oriented(Heading::Down).cells[2], [Free, Occupied, Free]);
        // Facing right, the agent's left is the top of the screen.
        assert_eq!(grid.oriented(Heading::Right).cells[1][0], Occupied);
    }

    #[test]
    fn four_turns_are_identity() {
        let mut heading = Heading::Up;
        for _ in 0..4 {
            heading = heading.rotate_left();
        }
        assert_eq!(heading, Heading::Up);
        assert_eq!(Heading::Up.rotate_left().rotate_right(), Heading::Up);
    }
}
