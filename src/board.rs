use once_cell::sync::Lazy;

use crate::types::{Position, Stone};

pub const BOARD_SIZE: usize = 15;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;
pub const WIN_LENGTH: usize = 5;

/// One step along each scan axis; the opposite direction is the negation.
/// Horizontal, vertical, diagonal, anti-diagonal.
const AXES: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Every cell in row-major order.
static ALL_POSITIONS: Lazy<Vec<Position>> = Lazy::new(|| {
    (0..NUM_SQUARES)
        .map(|pos| Position::new((pos / BOARD_SIZE) as u8, (pos % BOARD_SIZE) as u8))
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceOutcome {
    Placed,
    /// The stone completed five in a row; the board is now finished.
    Won,
    Occupied,
    OutOfBounds,
    /// A previous move already won; nothing is accepted until `reset`.
    Finished,
}

impl PlaceOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, PlaceOutcome::Placed | PlaceOutcome::Won)
    }
}

/// 15x15 Gomoku grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [Option<Stone>; NUM_SQUARES],
    finished: bool,
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [None; NUM_SQUARES],
            finished: false,
        }
    }

    /// Places one stone and evaluates the win condition around it.
    /// Occupied cells and a finished board leave the board unchanged.
    pub fn place(&mut self, pos: Position, stone: Stone) -> PlaceOutcome {
        if !pos.in_bounds() {
            return PlaceOutcome::OutOfBounds;
        }
        if self.finished {
            return PlaceOutcome::Finished;
        }
        let cell = &mut self.cells[pos.index()];
        if cell.is_some() {
            return PlaceOutcome::Occupied;
        }
        *cell = Some(stone);

        if self.check_win(pos) {
            self.finished = true;
            PlaceOutcome::Won
        } else {
            PlaceOutcome::Placed
        }
    }

    /// Returns true when the stone at `pos` is part of a line of at least
    /// [`WIN_LENGTH`] on any axis.
    pub fn check_win(&self, pos: Position) -> bool {
        let Some(stone) = self.get(pos) else {
            return false;
        };
        let (row, col) = (pos.row as i32, pos.col as i32);

        AXES.iter().any(|&(dr, dc)| {
            let count = 1
                + self.count_run(row, col, dr, dc, stone)
                + self.count_run(row, col, -dr, -dc, stone);
            count >= WIN_LENGTH
        })
    }

    /// Clears every cell and leaves the terminal state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn get(&self, pos: Position) -> Option<Stone> {
        if pos.in_bounds() { self.cells[pos.index()] } else { None }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns `(black_count, white_count)`.
    pub fn count(&self) -> (usize, usize) {
        self.cells.iter().flatten().fold((0, 0), |(b, w), stone| match stone {
            Stone::Black => (b + 1, w),
            Stone::White => (b, w + 1),
        })
    }

    pub fn empty_cells(&self) -> Vec<Position> {
        ALL_POSITIONS
            .iter()
            .copied()
            .filter(|pos| self.cells[pos.index()].is_none())
            .collect()
    }

    /// Converts board to `[u8; 225]` where 0=empty, 1=black, 2=white.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        let mut board = [0u8; NUM_SQUARES];
        for (out, cell) in board.iter_mut().zip(self.cells.iter()) {
            *out = cell.map_or(0, Stone::code);
        }
        board
    }

    /// CRC32 of the cell array. Equal boards always hash equal, so peers
    /// can compare projections cheaply.
    pub fn checksum(&self) -> u32 {
        crc32fast::hash(&self.to_array())
    }

    fn count_run(&self, row: i32, col: i32, dr: i32, dc: i32, stone: Stone) -> usize {
        let mut count = 0;
        let mut r = row + dr;
        let mut c = col + dc;

        while in_bounds(r, c) && self.cells[(r as usize) * BOARD_SIZE + c as usize] == Some(stone) {
            count += 1;
            r += dr;
            c += dc;
        }

        count
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}
