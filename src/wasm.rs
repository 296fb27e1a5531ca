//! Browser surface. The host page owns the replication transport and the
//! DOM: it feeds every delivered record to [`WasmGame::receive`], appends
//! whatever [`WasmGame::take_outbound`] returns, and calls
//! [`WasmGame::tick`] once a second.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::error::GameError;
use crate::game::GameSession;
use crate::log::{Channel, Delivery, Record, ReplicatedLog};

#[derive(Debug, Default)]
struct Queues {
    inbox: VecDeque<Delivery>,
    outbox: Vec<Delivery>,
}

/// Log adapter whose two ends are a JS transport. Appends wait in the
/// outbox until the host publishes them; they are not echoed locally, the
/// transport's own subscription delivers them back.
#[derive(Debug, Clone, Default)]
pub struct BridgeLog {
    queues: Rc<RefCell<Queues>>,
}

impl BridgeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one record delivered by the transport.
    pub fn deliver(&self, delivery: Delivery) {
        self.queues.borrow_mut().inbox.push_back(delivery);
    }

    pub fn drain_outbound(&self) -> Vec<Delivery> {
        std::mem::take(&mut self.queues.borrow_mut().outbox)
    }
}

impl ReplicatedLog for BridgeLog {
    fn append(&mut self, channel: Channel, record: Record) {
        self.queues.borrow_mut().outbox.push(Delivery { channel, record });
    }

    fn poll(&mut self) -> Vec<Delivery> {
        self.queues.borrow_mut().inbox.drain(..).collect()
    }

    /// The host re-delivers history after this; anything still queued is
    /// superseded by that replay.
    fn resubscribe(&mut self) {
        self.queues.borrow_mut().inbox.clear();
    }
}

impl From<GameError> for JsValue {
    fn from(err: GameError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| GameError::Codec(e.to_string()).into())
}

#[wasm_bindgen]
pub struct WasmGame {
    session: GameSession,
    bridge: BridgeLog,
}

#[wasm_bindgen]
impl WasmGame {
    /// `config` may be `undefined`, `null` or a partial `GameConfig` object.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmGame, JsValue> {
        let config: GameConfig = if config.is_undefined() || config.is_null() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| GameError::InvalidConfig(e.to_string()))?
        };
        let bridge = BridgeLog::new();
        let session = GameSession::new_with_random_selector(config, Box::new(bridge.clone()))?;
        Ok(Self { session, bridge })
    }

    pub fn join(&mut self, name: &str) -> Result<(), JsValue> {
        Ok(self.session.join(name)?)
    }

    pub fn place(&mut self, row: u8, col: u8) -> Result<(), JsValue> {
        Ok(self.session.place(row, col)?)
    }

    pub fn undo(&mut self) -> Result<(), JsValue> {
        Ok(self.session.request_undo()?)
    }

    pub fn restart(&mut self) -> Result<(), JsValue> {
        Ok(self.session.request_restart()?)
    }

    pub fn send_chat(&mut self, text: &str) -> Result<(), JsValue> {
        Ok(self.session.send_chat(text)?)
    }

    /// Returns the timer view `{ remaining, warning }`.
    pub fn tick(&mut self) -> Result<JsValue, JsValue> {
        let view = self.session.tick();
        to_js(&view)
    }

    /// Accepts one `{ channel, record }` delivery from the transport.
    pub fn receive(&mut self, delivery: JsValue) -> Result<(), JsValue> {
        let delivery: Delivery =
            serde_wasm_bindgen::from_value(delivery).map_err(|e| GameError::Codec(e.to_string()))?;
        self.bridge.deliver(delivery);
        self.session.sync();
        Ok(())
    }

    /// Array of `{ channel, record }` the host must append to the log.
    pub fn take_outbound(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.bridge.drain_outbound())
    }

    pub fn take_events(&mut self) -> Result<JsValue, JsValue> {
        to_js(&self.session.take_events())
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.to_game_state())
    }

    /// Drops local projections; the host must then re-deliver history.
    pub fn resubscribe(&mut self) {
        self.session.resubscribe();
    }
}
