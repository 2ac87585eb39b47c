use crate::{compress_game, compress_pgn, decompress_game, decompress_pgn, EncodedGame};
use js_sys::Uint8Array; // Use this type for better TS compatibility
use wasm_bindgen::prelude::*;

fn to_js(error: impl ToString) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Compresses space separated moves into the packed form: coder state
/// followed by the encoded bytes.
#[wasm_bindgen]
pub fn wasm_compress_game(moves: &str) -> Result<Uint8Array, JsValue> {
    let moves: Vec<&str> = moves.split_whitespace().collect();
    let compressed = compress_game(&moves).map_err(to_js)?;
    Ok(Uint8Array::from(compressed.to_bytes().as_slice()))
}

#[wasm_bindgen]
pub fn wasm_decompress_game(packed: &[u8], plies: usize) -> Result<String, JsValue> {
    let compressed = EncodedGame::from_bytes(packed).map_err(to_js)?;
    let game = decompress_game(&compressed, plies).map_err(to_js)?;
    Ok(game.moves.join(" "))
}

#[wasm_bindgen]
pub fn wasm_compress_pgn(moves: &str) -> Result<Uint8Array, JsValue> {
    let moves: Vec<&str> = moves.split_whitespace().collect();
    let compressed = compress_pgn(&moves).map_err(to_js)?;
    Ok(Uint8Array::from(compressed.as_slice()))
}

#[wasm_bindgen]
pub fn wasm_decompress_pgn(compressed: &[u8], plies: usize) -> Result<String, JsValue> {
    let moves = decompress_pgn(compressed, plies).map_err(to_js)?;
    Ok(moves.join(" "))
}
