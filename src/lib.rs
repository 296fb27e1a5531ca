use wasm_bindgen::prelude::*;

pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod log;
pub mod reconciler;
pub mod roster;
pub mod timer;
pub mod types;
pub mod undo;
pub mod wasm;

pub use config::GameConfig;
pub use error::{ErrorCategory, GameError};
pub use game::{GameSession, MoveSelector, RandomMoveSelector, SessionEvent};
pub use log::{Channel, Delivery, MemoryLog, Record, ReplicatedLog};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
