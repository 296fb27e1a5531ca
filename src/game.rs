use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::board::Board;
use crate::config::GameConfig;
use crate::error::{GameError, Result};
use crate::log::{Channel, Delivery, Record, ReplicatedLog};
use crate::reconciler::{Applied, Reconciler};
use crate::roster::Roster;
use crate::timer::{TickOutcome, TurnTimer};
use crate::types::{
    ChatMessage, GameResult, GameState, GameStatus, Move, Player, Position, Role, RosterEntry,
    Stone, TimerView,
};
use crate::undo::{self, Rewrite};

/// Picks the cell for a forced move when the local countdown runs out.
pub trait MoveSelector {
    fn select_move(&mut self, board: &Board) -> Option<Position>;
}

/// Uniform choice among the empty cells.
#[derive(Debug, Clone)]
pub struct RandomMoveSelector {
    rng: StdRng,
}

impl RandomMoveSelector {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl MoveSelector for RandomMoveSelector {
    fn select_move(&mut self, board: &Board) -> Option<Position> {
        board.empty_cells().choose(&mut self.rng).copied()
    }
}

/// Notifications for the UI, drained with [`GameSession::take_events`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    PiecePlaced { position: Position, stone: Stone },
    BoardCleared,
    GameOver { winner: String, stone: Stone },
    TurnChanged { my_turn: bool },
    RosterChanged,
    ChatAppended { message: ChatMessage },
    ForcedMove { position: Position },
}

/// Current Unix epoch in milliseconds.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// One client's view of a game: every piece of state is a projection of the
/// replicated log, rebuilt by folding deliveries in arrival order.
pub struct GameSession {
    config: GameConfig,
    local_name: Option<String>,
    roster: Roster,
    reconciler: Reconciler,
    timer: TurnTimer,
    chat: Vec<ChatMessage>,
    was_my_turn: bool,
    /// Own move appends not yet delivered back by the log.
    pending_moves: Vec<Position>,
    events: Vec<SessionEvent>,
    log: Box<dyn ReplicatedLog>,
    selector: Box<dyn MoveSelector>,
}

impl GameSession {
    pub fn new(
        config: GameConfig,
        log: Box<dyn ReplicatedLog>,
        selector: Box<dyn MoveSelector>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            timer: TurnTimer::new(&config),
            config,
            local_name: None,
            roster: Roster::new(),
            reconciler: Reconciler::new(),
            chat: Vec::new(),
            was_my_turn: false,
            pending_moves: Vec::new(),
            events: Vec::new(),
            log,
            selector,
        })
    }

    pub fn new_with_random_selector(config: GameConfig, log: Box<dyn ReplicatedLog>) -> Result<Self> {
        let selector = RandomMoveSelector::new(config.rng_seed);
        Self::new(config, log, Box::new(selector))
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Drops every projection. The local name survives; the log is untouched.
    pub fn reset(&mut self) {
        self.roster.clear();
        self.reconciler.clear();
        self.timer.cancel();
        self.chat.clear();
        self.pending_moves.clear();
        self.was_my_turn = false;
        self.events.push(SessionEvent::BoardCleared);
    }

    /// Rebuilds all state from a fresh delivery of the full history.
    pub fn resubscribe(&mut self) -> usize {
        self.reset();
        self.log.resubscribe();
        self.sync()
    }

    /// Folds every pending delivery. Returns how many were handled.
    pub fn sync(&mut self) -> usize {
        let deliveries = self.log.poll();
        let count = deliveries.len();
        for delivery in deliveries {
            self.handle(delivery);
        }
        count
    }

    pub fn join(&mut self, name: &str) -> Result<()> {
        self.join_at(name, now_ms())
    }

    /// Joins with an explicit join timestamp.
    pub fn join_at(&mut self, name: &str, timestamp: u64) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::EmptyName);
        }
        if let Some(existing) = &self.local_name {
            return Err(GameError::AlreadyJoined(existing.clone()));
        }

        info!(player = name, timestamp, "joining game");
        self.local_name = Some(name.to_string());
        self.log.append(
            Channel::Players,
            Record::Player(Player { name: name.to_string(), timestamp }),
        );
        self.sync();
        Ok(())
    }

    /// Appends a move for the local player after checking it against the
    /// local projection.
    pub fn place(&mut self, row: u8, col: u8) -> Result<()> {
        let name = self.local_name.clone().ok_or(GameError::NotJoined)?;
        if self.reconciler.result().is_some() {
            return Err(GameError::GameOver);
        }
        if !self.is_my_turn() || self.has_pending_move() {
            return Err(GameError::NotYourTurn);
        }
        let position = Position::new(row, col);
        if !position.in_bounds() {
            return Err(GameError::OutOfBounds { row, col });
        }
        if self.reconciler.board().get(position).is_some() {
            return Err(GameError::CellOccupied { row, col });
        }

        self.append_move(position, name);
        self.sync();
        Ok(())
    }

    /// Takes back the opponent's last move by rewriting the `moves` channel.
    #[instrument(skip(self), fields(player = ?self.local_name))]
    pub fn request_undo(&mut self) -> Result<()> {
        let name = self.local_name.clone().ok_or(GameError::NotJoined)?;
        let rewrite = undo::plan_undo(&name, self.holds_turn(), self.reconciler.history())?;
        info!(replayed = rewrite.replay.len(), "undoing last move");
        self.rewrite_moves(rewrite);
        Ok(())
    }

    /// Clears the `moves` channel. Black seat only.
    #[instrument(skip(self), fields(player = ?self.local_name))]
    pub fn request_restart(&mut self) -> Result<()> {
        let rewrite = undo::plan_restart(self.my_role())?;
        info!("restarting game");
        self.rewrite_moves(rewrite);
        Ok(())
    }

    pub fn send_chat(&mut self, text: &str) -> Result<()> {
        let name = self.local_name.clone().ok_or(GameError::NotJoined)?;
        let message = text.trim();
        if message.is_empty() {
            return Err(GameError::EmptyMessage);
        }

        self.log.append(
            Channel::Chat,
            Record::Chat(ChatMessage { name, message: message.to_string(), timestamp: now_ms() }),
        );
        self.sync();
        Ok(())
    }

    /// Advances the local countdown by one second. On expiry a random legal
    /// move is appended for the local player.
    pub fn tick(&mut self) -> TimerView {
        if self.timer.tick() == TickOutcome::Expired {
            self.timer.cancel();
            if self.is_my_turn() {
                self.force_move();
            }
        }
        self.timer.view()
    }

    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// True while an own move is appended but not yet folded. The local
    /// projection still shows the turn as ours until the echo arrives.
    pub fn has_pending_move(&self) -> bool {
        !self.pending_moves.is_empty()
    }

    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    pub fn board(&self) -> &Board {
        self.reconciler.board()
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn timer(&self) -> &TurnTimer {
        &self.timer
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    pub fn turn(&self) -> Stone {
        self.reconciler.turn()
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.reconciler.result()
    }

    pub fn my_role(&self) -> Option<Role> {
        self.local_name.as_deref().and_then(|name| self.roster.role_of(name))
    }

    /// The local seat matches the turn parity, regardless of game over.
    pub fn holds_turn(&self) -> bool {
        self.my_role().and_then(Role::stone) == Some(self.reconciler.turn())
    }

    pub fn is_my_turn(&self) -> bool {
        self.reconciler.result().is_none() && self.holds_turn()
    }

    pub fn to_game_state(&self) -> GameState {
        let result = self.reconciler.result();
        let my_role = self.my_role();
        let is_my_turn = self.is_my_turn();

        let status = match (&self.local_name, result, my_role) {
            (None, None, _) => GameStatus::NotJoined,
            (_, Some(result), _) => GameStatus::GameOver { winner: result.winner.clone() },
            (Some(_), None, None | Some(Role::Observer)) => GameStatus::Spectating,
            (Some(_), None, Some(_)) if is_my_turn => GameStatus::MyTurn,
            (Some(_), None, Some(_)) => GameStatus::Waiting,
        };

        let roster = self
            .roster
            .ranked()
            .into_iter()
            .map(|(player, role)| RosterEntry {
                name: player.name.clone(),
                role,
                is_me: self.local_name.as_deref() == Some(player.name.as_str()),
            })
            .collect();

        let board = self.reconciler.board();
        GameState {
            board: board.to_array().to_vec(),
            turn: self.reconciler.turn(),
            move_count: self.reconciler.applied_count(),
            my_role,
            is_my_turn,
            status,
            timer: self.timer.view(),
            roster,
            winner: result.map(|r| r.winner.clone()),
            board_disabled: result.is_some(),
            checksum: board.checksum(),
        }
    }

    fn handle(&mut self, delivery: Delivery) {
        match (delivery.channel, delivery.record) {
            (Channel::Moves, Record::Move(mv)) => {
                if self.local_name.as_deref() == Some(mv.player.as_str())
                    && let Some(idx) = self.pending_moves.iter().position(|p| *p == mv.position())
                {
                    self.pending_moves.remove(idx);
                }
                let applied = self.reconciler.observe(mv, &self.roster);
                self.push_applied(applied);
                self.refresh_turn(true);
            }
            (Channel::Moves, Record::Tombstone) => {
                debug!("moves channel cleared");
                self.pending_moves.clear();
                self.reconciler.clear();
                self.events.push(SessionEvent::BoardCleared);
                self.rearm();
            }
            (Channel::Players, Record::Player(player)) => {
                let seats = self.roster.seats();
                self.roster.add(player);
                self.events.push(SessionEvent::RosterChanged);
                if self.roster.seats() != seats {
                    self.reproject();
                }
                self.refresh_turn(false);
            }
            (Channel::Players, Record::Tombstone) => {
                self.roster.clear();
                self.events.push(SessionEvent::RosterChanged);
                self.reproject();
                self.refresh_turn(false);
            }
            (Channel::Chat, Record::Chat(message)) => {
                self.chat.push(message.clone());
                self.events.push(SessionEvent::ChatAppended { message });
            }
            (Channel::Chat, Record::Tombstone) => self.chat.clear(),
            (channel, record) => {
                warn!(?channel, ?record, "record on unexpected channel ignored");
            }
        }
    }

    /// Seats changed, so every historical move may have a different colour.
    fn reproject(&mut self) {
        let outcomes = self.reconciler.rebuild(&self.roster);
        self.events.push(SessionEvent::BoardCleared);
        for applied in outcomes {
            self.push_applied(applied);
        }
    }

    fn push_applied(&mut self, applied: Applied) {
        match applied {
            Applied::Placed { position, stone } => {
                self.events.push(SessionEvent::PiecePlaced { position, stone });
            }
            Applied::Won { position, stone, winner } => {
                info!(%winner, ?stone, "five in a row");
                self.events.push(SessionEvent::PiecePlaced { position, stone });
                self.events.push(SessionEvent::GameOver { winner, stone });
            }
            Applied::Rejected { .. } => {}
        }
    }

    /// Tracks turn-boundary crossings for the countdown. Any move observed
    /// while the local player keeps the turn restarts it, including moves
    /// the board rejected.
    fn refresh_turn(&mut self, observed_move: bool) {
        let mine = self.is_my_turn();
        match (self.was_my_turn, mine) {
            (false, true) => self.timer.start(),
            (true, false) => self.timer.cancel(),
            (true, true) if observed_move => self.timer.start(),
            _ => {}
        }
        self.note_turn(mine);
    }

    /// After a rewrite the countdown starts over from the recomputed turn.
    fn rearm(&mut self) {
        let mine = self.is_my_turn();
        if mine {
            self.timer.start();
        } else {
            self.timer.cancel();
        }
        self.note_turn(mine);
    }

    fn note_turn(&mut self, mine: bool) {
        if mine != self.was_my_turn {
            self.events.push(SessionEvent::TurnChanged { my_turn: mine });
        }
        self.was_my_turn = mine;
    }

    fn rewrite_moves(&mut self, rewrite: Rewrite) {
        self.log.append(Channel::Moves, Record::Tombstone);
        for mv in rewrite.replay {
            self.log.append(Channel::Moves, Record::Move(mv));
        }
        self.sync();
    }

    fn force_move(&mut self) {
        let Some(name) = self.local_name.clone() else {
            return;
        };
        if self.has_pending_move() {
            debug!("countdown expired with own move still in flight");
            return;
        }
        let Some(position) = self.selector.select_move(self.reconciler.board()) else {
            warn!("countdown expired with no empty cell left");
            return;
        };

        info!(player = %name, row = position.row, col = position.col, "forced move after timeout");
        self.events.push(SessionEvent::ForcedMove { position });
        self.append_move(position, name);
        self.sync();
    }

    fn append_move(&mut self, position: Position, player: String) {
        self.pending_moves.push(position);
        self.log.append(
            Channel::Moves,
            Record::Move(Move { row: position.row, col: position.col, player, timestamp: now_ms() }),
        );
    }
}
