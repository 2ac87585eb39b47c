//! Chess compression library
//!
//! This library compresses chess games by replacing every move with its rank
//! among the legal moves of the position, ordered so that likely moves come
//! first. The ranks are entropy coded with a rANS coder (or, for the
//! [`compress_pgn`] format, a Huffman code). Games that start with a common
//! opening store a short code for the opening instead of its first moves.

pub mod bitstream;
pub mod error;
pub mod histogram;
mod huffman_code;
pub mod move_order;
pub mod opening;
pub mod pgn;
pub mod pgn_compress;
pub mod rans;
pub mod san;
#[cfg(feature = "wasm")]
pub mod wasm;
#[cfg(feature = "wasm")]
pub use wasm::*;

pub use bitstream::{BitReader, BitWriter};
pub use error::{CompressionError, Result};
pub use histogram::{move_index_table, FrequencyTable};
pub use opening::{most_common_openings, OpeningMatch, OpeningTrie};
pub use pgn_compress::{DecodedGame, EncodedGame, Encoder};
pub use rans::{RansConfig, RansDecoder, RansEncoder};

// Re-export types from shakmaty that are used in our public API
pub use shakmaty::{Chess, Position};

/// Compress a game
///
/// This function takes the move texts of a game played from the starting
/// position and returns the final coder state with the encoded bytes.
///
/// # Examples
///
/// ```
/// use chess_compression::compress_game;
///
/// let moves = ["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"];
/// let compressed = compress_game(&moves).unwrap();
/// assert!(!compressed.bytes.is_empty());
/// ```
pub fn compress_game<S: AsRef<str>>(moves: &[S]) -> Result<EncodedGame> {
    Encoder::new().encode(moves)
}

/// Decompress a game
///
/// This function takes a game produced by [`compress_game`] and its number of
/// plies, and returns the moves together with the final position, half-move
/// clock, recent position hashes and last move.
///
/// # Examples
///
/// ```
/// use chess_compression::{compress_game, decompress_game};
/// use shakmaty::Position;
///
/// let moves = ["f3", "e5", "g4", "Qh4#"];
/// let compressed = compress_game(&moves).unwrap();
/// let decompressed = decompress_game(&compressed, moves.len()).unwrap();
/// assert_eq!(decompressed.moves, moves);
/// assert!(decompressed.position.is_checkmate());
/// assert_eq!(decompressed.last_uci.as_deref(), Some("d8h4"));
/// ```
pub fn decompress_game(compressed: &EncodedGame, plies: usize) -> Result<DecodedGame> {
    Encoder::new().decode(compressed, plies)
}

/// Compress a sequence of chess moves (PGN)
///
/// This function takes a slice of PGN move strings and returns the moves
/// Huffman coded, without an opening code or coder state.
///
/// # Examples
///
/// ```
/// use chess_compression::compress_pgn;
///
/// let moves = vec!["e4".to_string(), "e5".to_string(), "Nf3".to_string(), "Nc6".to_string()];
/// let compressed = compress_pgn(&moves).unwrap();
/// ```
pub fn compress_pgn<S: AsRef<str>>(moves: &[S]) -> Result<Vec<u8>> {
    Ok(Encoder::new().encode_with_huffman(moves)?.to_bytes())
}

/// Decompress a sequence of chess moves (PGN)
///
/// This function takes a slice of compressed bytes and the number of plies,
/// and returns the move texts.
///
/// # Examples
///
/// ```
/// use chess_compression::{compress_pgn, decompress_pgn};
///
/// let moves = vec!["e4".to_string(), "e5".to_string(), "Nf3".to_string(), "Nc6".to_string()];
/// let compressed = compress_pgn(&moves).unwrap();
/// let decompressed = decompress_pgn(&compressed, moves.len()).unwrap();
/// assert_eq!(moves, decompressed);
/// ```
pub fn decompress_pgn(compressed: &[u8], plies: usize) -> Result<Vec<String>> {
    let data = bit_vec::BitVec::from_bytes(compressed);
    Ok(Encoder::new().decode_with_huffman(&data, plies)?.moves)
}
