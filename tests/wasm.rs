#![cfg(target_arch = "wasm32")]

use gomoku_log::wasm::WasmGame;
use js_sys::{Array, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

fn field(value: &JsValue, key: &str) -> JsValue {
    Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

/// Publishes the game's outbound records and feeds them straight back, as
/// a transport that echoes local appends would.
fn echo(game: &mut WasmGame) -> u32 {
    let outbound = Array::from(&game.take_outbound().unwrap());
    for delivery in outbound.iter() {
        game.receive(delivery).unwrap();
    }
    outbound.length()
}

#[wasm_bindgen_test]
fn wasm_ready_returns_true() {
    assert!(gomoku_log::wasm_ready());
}

#[wasm_bindgen_test]
fn join_and_move_round_trip_through_host() {
    let mut game = WasmGame::new(JsValue::UNDEFINED).unwrap();

    game.join("ann").unwrap();
    assert_eq!(echo(&mut game), 1);
    let state = game.state().unwrap();
    assert_eq!(field(&state, "is_my_turn"), JsValue::TRUE);

    game.place(7, 7).unwrap();
    assert_eq!(echo(&mut game), 1);

    let state = game.state().unwrap();
    assert_eq!(field(&state, "move_count").as_f64(), Some(1.0));
    let board = Array::from(&field(&state, "board"));
    assert_eq!(board.length(), 225);
    assert_eq!(board.get(7 * 15 + 7).as_f64(), Some(1.0));
}

#[wasm_bindgen_test]
fn errors_surface_as_strings() {
    let mut game = WasmGame::new(JsValue::NULL).unwrap();

    let err = game.place(0, 0).unwrap_err();

    assert_eq!(err.as_string().as_deref(), Some("join the game first"));
}

#[wasm_bindgen_test]
fn malformed_delivery_is_rejected() {
    let mut game = WasmGame::new(JsValue::UNDEFINED).unwrap();

    assert!(game.receive(JsValue::from_str("not a record")).is_err());
}
