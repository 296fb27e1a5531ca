//! The replication layer as seen by a client: an append-only, multi-writer
//! log split into channels.
//!
//! Delivery guarantees are weak. A subscriber sees every record eventually,
//! each writer's own appends in submission order, and its own appends like
//! anyone else's. Nothing orders appends from different writers.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::types::{ChatMessage, Move, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Players,
    Moves,
    Chat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Player(Player),
    Move(Move),
    Chat(ChatMessage),
    /// Everything appended to the channel before this entry is cleared.
    Tombstone,
}

/// A record as delivered to a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub channel: Channel,
    pub record: Record,
}

/// One client's handle on the replicated log.
pub trait ReplicatedLog {
    /// Fire-and-forget write. The record comes back through [`poll`] like
    /// any peer's.
    ///
    /// [`poll`]: ReplicatedLog::poll
    fn append(&mut self, channel: Channel, record: Record);

    /// Records delivered since the previous poll, in local arrival order.
    fn poll(&mut self) -> Vec<Delivery>;

    /// Starts the subscription over so history is delivered again.
    fn resubscribe(&mut self);
}

/// In-process log shared by any number of peers. Appends are totally
/// ordered, which is one permissible delivery order under the weak model;
/// interleavings come from when each peer polls.
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    entries: Rc<RefCell<Vec<Delivery>>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new subscriber positioned at the start of history.
    pub fn peer(&self) -> MemoryPeer {
        MemoryPeer { entries: Rc::clone(&self.entries), cursor: 0 }
    }

    /// Appends on behalf of a writer that has no session of its own.
    pub fn append(&self, channel: Channel, record: Record) {
        self.entries.borrow_mut().push(Delivery { channel, record });
    }

    pub fn entries(&self) -> Vec<Delivery> {
        self.entries.borrow().clone()
    }

    /// Moves still visible on the `moves` channel, i.e. after the last
    /// tombstone.
    pub fn live_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for delivery in self.entries.borrow().iter().filter(|d| d.channel == Channel::Moves) {
            match &delivery.record {
                Record::Move(mv) => moves.push(mv.clone()),
                Record::Tombstone => moves.clear(),
                _ => {}
            }
        }
        moves
    }
}

#[derive(Debug)]
pub struct MemoryPeer {
    entries: Rc<RefCell<Vec<Delivery>>>,
    cursor: usize,
}

impl MemoryPeer {
    /// Deliveries appended but not yet polled.
    pub fn pending(&self) -> usize {
        self.entries.borrow().len().saturating_sub(self.cursor)
    }
}

impl ReplicatedLog for MemoryPeer {
    fn append(&mut self, channel: Channel, record: Record) {
        self.entries.borrow_mut().push(Delivery { channel, record });
    }

    fn poll(&mut self) -> Vec<Delivery> {
        let entries = self.entries.borrow();
        let fresh = entries[self.cursor.min(entries.len())..].to_vec();
        self.cursor = entries.len();
        fresh
    }

    fn resubscribe(&mut self) {
        self.cursor = 0;
    }
}
