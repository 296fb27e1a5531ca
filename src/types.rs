use serde::{Deserialize, Serialize};

use crate::board::BOARD_SIZE;

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(self) -> bool {
        (self.row as usize) < BOARD_SIZE && (self.col as usize) < BOARD_SIZE
    }

    /// Flat index into a row-major cell array. Caller checks bounds.
    pub(crate) fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stone {
    Black,
    White,
}

impl Stone {
    /// Stone whose turn it is after `applied` moves.
    pub fn for_move_count(applied: usize) -> Self {
        if applied % 2 == 0 { Stone::Black } else { Stone::White }
    }

    /// Cell encoding used by [`GameState::board`]: 1=black, 2=white.
    pub fn code(self) -> u8 {
        match self {
            Stone::Black => 1,
            Stone::White => 2,
        }
    }
}

/// Seat derived from join rank. Never stored on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Black,
    White,
    Observer,
}

impl Role {
    pub fn from_rank(rank: usize) -> Self {
        match rank {
            0 => Role::Black,
            1 => Role::White,
            _ => Role::Observer,
        }
    }

    pub fn stone(self) -> Option<Stone> {
        match self {
            Role::Black => Some(Stone::Black),
            Role::White => Some(Stone::White),
            Role::Observer => None,
        }
    }
}

/// Join record on the `players` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub timestamp: u64,
}

/// Move record on the `moves` channel. The timestamp is client-supplied and
/// plays no part in ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub row: u8,
    pub col: u8,
    pub player: String,
    pub timestamp: u64,
}

impl Move {
    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

/// Chat record on the `chat` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub name: String,
    pub message: String,
    pub timestamp: u64,
}

/// Terminal marker set once five in a row is detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameResult {
    pub winner: String,
    pub stone: Stone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameStatus {
    NotJoined,
    Spectating,
    MyTurn,
    Waiting,
    GameOver { winner: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub name: String,
    pub role: Role,
    pub is_me: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerView {
    /// `None` while the local countdown is idle.
    pub remaining: Option<u32>,
    pub warning: bool,
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    /// Row-major cells: 0=empty, 1=black, 2=white.
    pub board: Vec<u8>,
    pub turn: Stone,
    pub move_count: usize,
    pub my_role: Option<Role>,
    pub is_my_turn: bool,
    pub status: GameStatus,
    pub timer: TimerView,
    pub roster: Vec<RosterEntry>,
    pub winner: Option<String>,
    pub board_disabled: bool,
    pub checksum: u32,
}
