//! Gate checks for log rewrites. Both undo and restart tombstone the whole
//! `moves` channel; undo then re-appends the surviving history.

use crate::error::{GameError, Result};
use crate::types::{Move, Role};

/// A validated rewrite of the `moves` channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// Moves to re-append after the tombstone, in original order.
    pub replay: Vec<Move>,
    /// The move the rewrite removes, if any.
    pub dropped: Option<Move>,
}

/// Plans an undo of the opponent's most recent move.
///
/// A requester whose own move is on top gets `CannotUndoOwnMove` even though
/// moving also handed the turn away.
pub fn plan_undo(requester: &str, holds_turn: bool, history: &[Move]) -> Result<Rewrite> {
    let Some((last, rest)) = history.split_last() else {
        return Err(GameError::NothingToUndo);
    };
    if last.player == requester {
        return Err(GameError::CannotUndoOwnMove);
    }
    if !holds_turn {
        return Err(GameError::NotYourTurn);
    }

    Ok(Rewrite { replay: rest.to_vec(), dropped: Some(last.clone()) })
}

/// Plans a restart. Only the black seat may clear the board.
pub fn plan_restart(role: Option<Role>) -> Result<Rewrite> {
    if role != Some(Role::Black) {
        return Err(GameError::NotBlackPlayer);
    }
    Ok(Rewrite { replay: Vec::new(), dropped: None })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(player: &str, row: u8) -> Move {
        Move { row, col: 0, player: player.to_string(), timestamp: row as u64 }
    }

    #[test]
    fn undo_drops_opponents_last_move() {
        let history = vec![mv("black", 0), mv("white", 1)];

        let rewrite = plan_undo("black", true, &history).unwrap();

        assert_eq!(rewrite.replay, vec![mv("black", 0)]);
        assert_eq!(rewrite.dropped, Some(mv("white", 1)));
    }

    #[test]
    fn undo_of_opponent_move_out_of_turn_is_rejected() {
        let err = plan_undo("black", false, &[mv("white", 0)]).unwrap_err();

        assert_eq!(err, GameError::NotYourTurn);
    }

    #[test]
    fn undo_on_empty_log_has_nothing_to_undo() {
        assert_eq!(plan_undo("black", true, &[]), Err(GameError::NothingToUndo));
        assert_eq!(plan_undo("white", false, &[]), Err(GameError::NothingToUndo));
    }

    #[test]
    fn undo_of_own_move_is_rejected() {
        assert_eq!(plan_undo("black", true, &[mv("black", 0)]), Err(GameError::CannotUndoOwnMove));
        assert_eq!(plan_undo("black", false, &[mv("black", 0)]), Err(GameError::CannotUndoOwnMove));
    }

    #[test]
    fn restart_requires_black_seat() {
        assert_eq!(plan_restart(Some(Role::White)), Err(GameError::NotBlackPlayer));
        assert_eq!(plan_restart(Some(Role::Observer)), Err(GameError::NotBlackPlayer));
        assert_eq!(plan_restart(None), Err(GameError::NotBlackPlayer));

        let rewrite = plan_restart(Some(Role::Black)).unwrap();
        assert!(rewrite.replay.is_empty());
        assert!(rewrite.dropped.is_none());
    }
}
