use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

/// How the UI should treat a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad local input; prompt the user, nothing changed.
    UserInput,
    /// Acting out of turn or outside one's seat; never touches the log.
    TurnViolation,
    /// Rejected by the board; never appended.
    IllegalMove,
    Config,
    Codec,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("player name must not be empty")]
    EmptyName,
    #[error("already joined as {0}")]
    AlreadyJoined(String),
    #[error("join the game first")]
    NotJoined,
    #[error("chat message must not be empty")]
    EmptyMessage,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("the game is already over")]
    GameOver,
    #[error("there is no move to undo")]
    NothingToUndo,
    #[error("cannot undo your own move")]
    CannotUndoOwnMove,
    #[error("only the black player can restart the game")]
    NotBlackPlayer,
    #[error("cell ({row}, {col}) is already occupied")]
    CellOccupied { row: u8, col: u8 },
    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: u8, col: u8 },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("malformed record: {0}")]
    Codec(String),
}

impl GameError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GameError::EmptyName
            | GameError::AlreadyJoined(_)
            | GameError::NotJoined
            | GameError::EmptyMessage => ErrorCategory::UserInput,
            GameError::NotYourTurn
            | GameError::GameOver
            | GameError::NothingToUndo
            | GameError::CannotUndoOwnMove
            | GameError::NotBlackPlayer => ErrorCategory::TurnViolation,
            GameError::CellOccupied { .. } | GameError::OutOfBounds { .. } => {
                ErrorCategory::IllegalMove
            }
            GameError::InvalidConfig(_) => ErrorCategory::Config,
            GameError::Codec(_) => ErrorCategory::Codec,
        }
    }
}
