//! Folds the `moves` channel into board and turn state.
//!
//! Moves are applied in local arrival order. The turn is never stored: it is
//! the parity of an applied-move counter that only this fold touches. Moves
//! rejected by the board (occupied cell, finished game, no seat) stay in the
//! history but do not advance the counter.
//!
//! Nothing here checks that a move was made by the player holding the turn.
//! Two appends for the same turn slot are both applied when they target
//! different cells; the log offers no primitive to arbitrate between them.

use tracing::{debug, warn};

use crate::board::{Board, PlaceOutcome};
use crate::roster::Roster;
use crate::types::{GameResult, Move, Position, Stone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Occupied,
    OutOfBounds,
    Finished,
    /// The mover has no black/white seat in the roster observed so far.
    NoSeat,
}

/// What folding one move did to the projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Placed { position: Position, stone: Stone },
    Won { position: Position, stone: Stone, winner: String },
    Rejected { position: Position, reason: Rejection },
}

impl Applied {
    pub fn is_applied(&self) -> bool {
        !matches!(self, Applied::Rejected { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciler {
    history: Vec<Move>,
    board: Board,
    applied: usize,
    result: Option<GameResult>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a projection from scratch over `moves` in the given order.
    pub fn fold<'a, I>(moves: I, roster: &Roster) -> Self
    where
        I: IntoIterator<Item = &'a Move>,
    {
        let mut reconciler = Self::new();
        for mv in moves {
            reconciler.observe(mv.clone(), roster);
        }
        reconciler
    }

    /// Appends one delivered move to the history and applies it.
    pub fn observe(&mut self, mv: Move, roster: &Roster) -> Applied {
        let applied = self.apply(&mv, roster);
        self.history.push(mv);
        applied
    }

    /// A tombstone: every prior entry is gone.
    pub fn clear(&mut self) {
        self.history.clear();
        self.reset_projection();
    }

    /// Re-applies the whole history, e.g. after the roster changed seats.
    pub fn rebuild(&mut self, roster: &Roster) -> Vec<Applied> {
        self.reset_projection();
        let history = std::mem::take(&mut self.history);
        let outcomes = history.iter().map(|mv| self.apply(mv, roster)).collect();
        self.history = history;
        outcomes
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn applied_count(&self) -> usize {
        self.applied
    }

    pub fn turn(&self) -> Stone {
        Stone::for_move_count(self.applied)
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    /// Every move delivered since the last tombstone, in arrival order.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    fn reset_projection(&mut self) {
        self.board.reset();
        self.applied = 0;
        self.result = None;
    }

    fn apply(&mut self, mv: &Move, roster: &Roster) -> Applied {
        let position = mv.position();
        let Some(stone) = roster.stone_of(&mv.player) else {
            warn!(player = %mv.player, row = mv.row, col = mv.col, "move from unseated player ignored");
            return Applied::Rejected { position, reason: Rejection::NoSeat };
        };

        let outcome = self.board.place(position, stone);
        let reason = match outcome {
            PlaceOutcome::Placed | PlaceOutcome::Won => None,
            PlaceOutcome::Occupied => Some(Rejection::Occupied),
            PlaceOutcome::OutOfBounds => Some(Rejection::OutOfBounds),
            PlaceOutcome::Finished => Some(Rejection::Finished),
        };
        if let Some(reason) = reason {
            warn!(player = %mv.player, row = mv.row, col = mv.col, ?reason, "move rejected");
            return Applied::Rejected { position, reason };
        }

        self.applied += 1;
        debug!(player = %mv.player, row = mv.row, col = mv.col, applied = self.applied, "move applied");

        if outcome == PlaceOutcome::Won {
            self.result = Some(GameResult { winner: mv.player.clone(), stone });
            Applied::Won { position, stone, winner: mv.player.clone() }
        } else {
            Applied::Placed { position, stone }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Player;

    fn roster() -> Roster {
        let mut roster = Roster::new();
        roster.add(Player { name: "black".to_string(), timestamp: 1 });
        roster.add(Player { name: "white".to_string(), timestamp: 2 });
        roster
    }

    fn mv(player: &str, row: u8, col: u8) -> Move {
        Move { row, col, player: player.to_string(), timestamp: 0 }
    }

    #[test]
    fn turn_alternates_with_applied_moves() {
        let roster = roster();
        let mut rec = Reconciler::new();
        assert_eq!(rec.turn(), Stone::Black);

        let moves = [mv("black", 0, 0), mv("white", 1, 0), mv("black", 0, 1), mv("white", 1, 1)];
        let mut expected = Stone::White;
        for m in moves {
            assert!(rec.observe(m, &roster).is_applied());
            assert_eq!(rec.turn(), expected);
            expected = if expected == Stone::Black { Stone::White } else { Stone::Black };
        }
        assert_eq!(rec.applied_count(), 4);
    }

    #[test]
    fn colour_comes_from_mover_seat() {
        let roster = roster();
        let mut rec = Reconciler::new();

        rec.observe(mv("white", 3, 3), &roster);

        assert_eq!(rec.board().get(Position::new(3, 3)), Some(Stone::White));
    }

    #[test]
    fn occupied_cell_is_rejected_without_advancing_turn() {
        let roster = roster();
        let mut rec = Reconciler::new();
        rec.observe(mv("black", 7, 7), &roster);

        let outcome = rec.observe(mv("white", 7, 7), &roster);

        assert_eq!(
            outcome,
            Applied::Rejected { position: Position::new(7, 7), reason: Rejection::Occupied }
        );
        assert_eq!(rec.applied_count(), 1);
        assert_eq!(rec.turn(), Stone::White);
        assert_eq!(rec.history().len(), 2);
    }

    #[test]
    fn unseated_mover_is_rejected() {
        let mut roster = roster();
        roster.add(Player { name: "watcher".to_string(), timestamp: 3 });
        let mut rec = Reconciler::new();

        let outcome = rec.observe(mv("watcher", 0, 0), &roster);
        assert!(matches!(outcome, Applied::Rejected { reason: Rejection::NoSeat, .. }));

        let outcome = rec.observe(mv("stranger", 0, 0), &roster);
        assert!(matches!(outcome, Applied::Rejected { reason: Rejection::NoSeat, .. }));
        assert_eq!(rec.applied_count(), 0);
    }

    #[test]
    fn win_records_result_and_freezes_board() {
        let roster = roster();
        let mut rec = Reconciler::new();
        for col in 0..4 {
            rec.observe(mv("black", 0, col), &roster);
            rec.observe(mv("white", 1, col), &roster);
        }

        let outcome = rec.observe(mv("black", 0, 4), &roster);
        assert!(matches!(outcome, Applied::Won { ref winner, .. } if winner == "black"));
        assert_eq!(rec.result().map(|r| r.winner.as_str()), Some("black"));

        let late = rec.observe(mv("white", 1, 4), &roster);
        assert!(matches!(late, Applied::Rejected { reason: Rejection::Finished, .. }));
        assert_eq!(rec.applied_count(), 9);
    }

    #[test]
    fn clear_drops_history_and_board() {
        let roster = roster();
        let mut rec = Reconciler::new();
        rec.observe(mv("black", 2, 2), &roster);

        rec.clear();

        assert!(rec.history().is_empty());
        assert_eq!(rec.applied_count(), 0);
        assert_eq!(rec.board(), &Board::new());
        assert_eq!(rec.turn(), Stone::Black);
    }

    #[test]
    fn rebuild_applies_moves_that_arrived_before_their_join() {
        let mut roster = Roster::new();
        roster.add(Player { name: "black".to_string(), timestamp: 1 });
        let mut rec = Reconciler::new();
        rec.observe(mv("black", 0, 0), &roster);
        let early = rec.observe(mv("white", 1, 1), &roster);
        assert!(!early.is_applied());

        roster.add(Player { name: "white".to_string(), timestamp: 2 });
        let outcomes = rec.rebuild(&roster);

        assert!(outcomes.iter().all(Applied::is_applied));
        assert_eq!(rec.applied_count(), 2);
        assert_eq!(rec.board().get(Position::new(1, 1)), Some(Stone::White));
    }

    #[test]
    fn fold_is_deterministic() {
        let roster = roster();
        let log = vec![mv("black", 7, 7), mv("white", 7, 8), mv("black", 8, 8), mv("white", 7, 7)];

        let first = Reconciler::fold(&log, &roster);
        let second = Reconciler::fold(&log, &roster);

        assert_eq!(first, second);
        assert_eq!(first.board().checksum(), second.board().checksum());
    }

    #[test]
    fn same_slot_double_submission_is_applied_twice() {
        // Two appends for black's first turn land on different cells. Both
        // are applied and the turn parity no longer matches who moved.
        let roster = roster();
        let mut rec = Reconciler::new();

        assert!(rec.observe(mv("black", 0, 0), &roster).is_applied());
        assert!(rec.observe(mv("black", 5, 5), &roster).is_applied());

        assert_eq!(rec.board().count(), (2, 0));
        assert_eq!(rec.turn(), Stone::Black);
    }
}
