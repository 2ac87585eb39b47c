// src/pgn_compress.rs
//! Game compression by move index.
//!
//! Each ply is replaced by the rank of the played move in the canonically
//! ordered list of legal moves. Ranks are small for typical play, which is what
//! the entropy coders exploit. A game that starts with a catalogued opening
//! stores the opening's code instead of its first plies.
//!
//! Payload bit layout: a presence bit, the opening code if present, then the
//! rANS chunks, zero padded to whole bytes. The final coder state and the ply
//! count travel next to the bytes.

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{CompressionError, Result};
use crate::histogram::{move_index_table, FrequencyTable, MOVE_INDEX_ALPHABET};
use crate::huffman_code::get_huffman_code;
use crate::move_order::{sort_legal_moves, ScoredMove};
use crate::opening::{most_common_openings, OpeningTrie};
use crate::rans::{RansConfig, RansDecoder, RansEncoder};
use crate::san::MoveDescriptor;
use bit_vec::BitVec;
use huffman_compress::{Book, Tree};
use log::{debug, trace};
use shakmaty::san::{San, SanPlus, Suffix};
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position};

/// Output of [`Encoder::encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedGame {
    /// Final rANS state, needed to start decoding.
    pub state: u32,
    /// Opening header and rANS chunks, padded to whole bytes.
    pub bytes: Vec<u8>,
}

impl EncodedGame {
    /// Packs the state (4 bytes, big endian) in front of the stream.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packed = Vec::with_capacity(4 + self.bytes.len());
        packed.extend_from_slice(&self.state.to_be_bytes());
        packed.extend_from_slice(&self.bytes);
        packed
    }

    pub fn from_bytes(packed: &[u8]) -> Result<Self> {
        if packed.len() < 4 {
            return Err(CompressionError::TruncatedStream);
        }
        let (state, bytes) = packed.split_at(4);
        Ok(EncodedGame {
            state: u32::from_be_bytes([state[0], state[1], state[2], state[3]]),
            bytes: bytes.to_vec(),
        })
    }
}

/// A game rebuilt from its compressed form.
#[derive(Debug, Clone)]
pub struct DecodedGame {
    /// Move texts in short algebraic notation, with check and mate marks.
    pub moves: Vec<String>,
    /// Position after the last ply.
    pub position: Chess,
    /// Plies since the last capture or pawn move.
    pub half_move_clock: u32,
    /// 24-bit position hashes, 3 bytes each, most recent position first. Only
    /// positions since the last irreversible move are kept, since no earlier
    /// position can repeat.
    pub position_hashes: Vec<u8>,
    /// The final move in UCI notation.
    pub last_uci: Option<String>,
}

/// Compresses and decompresses games.
///
/// Holds a scratch buffer for legal moves, so each thread needs its own
/// encoder. The statistics it refers to are shared.
pub struct Encoder<'a> {
    config: RansConfig,
    table: &'a FrequencyTable,
    openings: &'a OpeningTrie,
    codebook: &'static Book<u32>,
    tree: &'static Tree<u32>,
    scratch: Vec<ScoredMove>,
}

impl Default for Encoder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<'static> {
    /// An encoder using the built-in move statistics and opening catalogue.
    pub fn new() -> Self {
        let (codebook, tree) = get_huffman_code();
        Encoder {
            config: RansConfig::default(),
            table: move_index_table(),
            openings: most_common_openings(),
            codebook,
            tree,
            scratch: Vec::with_capacity(64),
        }
    }
}

impl<'a> Encoder<'a> {
    /// An encoder with custom statistics. Payloads are only readable by an
    /// encoder built from the same tables.
    pub fn with_tables(
        config: RansConfig,
        table: &'a FrequencyTable,
        openings: &'a OpeningTrie,
    ) -> Result<Self> {
        config.check_table(table)?;
        let (codebook, tree) = get_huffman_code();
        Ok(Encoder {
            config,
            table,
            openings,
            codebook,
            tree,
            scratch: Vec::with_capacity(64),
        })
    }

    /// Ranks of every move of a game in its canonical legal-move list, from
    /// the standard starting position.
    pub fn move_indexes<S: AsRef<str>>(&mut self, moves: &[S]) -> Result<Vec<u32>> {
        let mut board = Chess::default();
        moves
            .iter()
            .enumerate()
            .map(|(ply, text)| {
                let index = find_move_index(&board, &mut self.scratch, text.as_ref(), ply)?;
                board.play_unchecked(&self.scratch[index].mv);
                Ok(index as u32)
            })
            .collect()
    }

    /// Compresses a game given as move texts from the starting position.
    pub fn encode<S: AsRef<str>>(&mut self, moves: &[S]) -> Result<EncodedGame> {
        let openings = self.openings;
        let mut writer = BitWriter::new();
        let opening = openings.find_longest_common_opening(moves);
        let opening_plies = match opening {
            Some(found) => {
                writer.write_bit(true);
                writer.write_bits(found.code, openings.code_width());
                found.plies
            }
            None => {
                writer.write_bit(false);
                0
            }
        };

        let mut board = Chess::default();
        let mut indexes = Vec::with_capacity(moves.len());
        for (ply, text) in moves.iter().enumerate() {
            let text = text.as_ref();
            let index = find_move_index(&board, &mut self.scratch, text, ply)?;
            if ply >= opening_plies {
                trace!("ply {ply}: {text} is move {index} of {}", self.scratch.len());
                indexes.push(index);
            }
            board.play_unchecked(&self.scratch[index].mv);
        }

        let mut encoder = RansEncoder::new(self.config, self.table)?;
        for &index in indexes.iter().rev() {
            encoder.encode(index)?;
        }
        let state = encoder.finish_into(&mut writer);
        let bytes = writer.to_bytes();

        debug!(
            "Encoded {} plies ({} from opening {:?}) into {} bytes",
            moves.len(),
            opening_plies,
            opening.map(|found| found.code),
            bytes.len()
        );
        Ok(EncodedGame { state, bytes })
    }

    /// Rebuilds the first `plies` plies of a game compressed with
    /// [`Encoder::encode`]. `plies` must be the length of the encoded game.
    pub fn decode(&mut self, game: &EncodedGame, plies: usize) -> Result<DecodedGame> {
        let mut reader = BitReader::from_bytes(&game.bytes);
        let openings = self.openings;
        let opening: Vec<&str> = if reader.read_bit()? {
            let code = reader.read_bits(openings.code_width())?;
            let line = openings
                .opening(code)
                .ok_or(CompressionError::UnknownOpening { code })?;
            line.split_whitespace().collect()
        } else {
            Vec::new()
        };
        if opening.len() > plies {
            return Err(CompressionError::InvalidPlyCount {
                plies,
                reason: "the opening is longer than the game",
            });
        }

        let mut replay = Replay::new();
        for (ply, &text) in opening.iter().enumerate() {
            let index = find_move_index(&replay.board, &mut self.scratch, text, ply)?;
            let mv = self.scratch[index].mv.clone();
            replay.play_literal(&mv, text.to_owned());
        }

        let mut decoder = RansDecoder::new(self.config, self.table, game.state)?;
        for ply in opening.len()..plies {
            sort_legal_moves(&replay.board, &mut self.scratch);
            if self.scratch.is_empty() {
                return Err(CompressionError::InvalidPlyCount {
                    plies,
                    reason: "the game ends before the last ply",
                });
            }
            let index = decoder.decode(&mut reader)?;
            let mv = self.pick(ply, index)?;
            replay.play_rendered(&mv);
        }

        if !decoder.is_initial() || reader.remaining() >= 8 {
            return Err(CompressionError::InvalidPlyCount {
                plies,
                reason: "the stream holds more moves",
            });
        }

        debug!(
            "Decoded {plies} plies ({} from opening) from {} bytes",
            opening.len(),
            game.bytes.len()
        );
        Ok(replay.finish())
    }

    /// Compresses a game with the Huffman code instead of rANS. No opening
    /// header and no final state: the bits alone decode.
    pub fn encode_with_huffman<S: AsRef<str>>(&mut self, moves: &[S]) -> Result<BitVec> {
        let mut buffer = BitVec::new();
        for index in self.move_indexes(moves)? {
            self.codebook
                .encode(&mut buffer, &index)
                .map_err(|_| CompressionError::SymbolOutOfRange {
                    symbol: index as usize,
                    alphabet: MOVE_INDEX_ALPHABET,
                })?;
        }
        debug!("Encoded {} plies into {} bits", moves.len(), buffer.len());
        Ok(buffer)
    }

    /// Rebuilds a game compressed with [`Encoder::encode_with_huffman`].
    /// `plies` must be the length of the encoded game.
    pub fn decode_with_huffman(&mut self, data: &BitVec, plies: usize) -> Result<DecodedGame> {
        let tree = self.tree;
        let mut replay = Replay::new();
        let mut bits = data.iter();
        let mut decoder = tree.decoder(bits.by_ref(), plies);

        for ply in 0..plies {
            sort_legal_moves(&replay.board, &mut self.scratch);
            if self.scratch.is_empty() {
                return Err(CompressionError::InvalidPlyCount {
                    plies,
                    reason: "the game ends before the last ply",
                });
            }
            let index = decoder.next().ok_or(CompressionError::TruncatedStream)? as usize;
            let mv = self.pick(ply, index)?;
            replay.play_rendered(&mv);
        }
        drop(decoder);

        // only the zero padding of the last byte may be left
        let (unread, set) = bits.fold((0, false), |(unread, set), bit| (unread + 1, set || bit));
        if unread >= 8 || set {
            return Err(CompressionError::InvalidPlyCount {
                plies,
                reason: "the stream holds more moves",
            });
        }

        Ok(replay.finish())
    }

    fn pick(&self, ply: usize, index: usize) -> Result<Move> {
        let scored = self
            .scratch
            .get(index)
            .ok_or(CompressionError::InvalidMoveIndex {
                ply,
                index,
                legal: self.scratch.len(),
            })?;
        trace!("ply {ply}: move {index} of {}", self.scratch.len());
        Ok(scored.mv.clone())
    }
}

/// Finds the position of the move named by `text` among the legal moves of
/// `board`. On success `buffer` holds the sorted legal moves.
pub fn find_move_index(
    board: &Chess,
    buffer: &mut Vec<ScoredMove>,
    text: &str,
    ply: usize,
) -> Result<usize> {
    let descriptor =
        MoveDescriptor::parse(text, board).ok_or_else(|| CompressionError::NotationParse {
            ply,
            text: text.to_owned(),
        })?;

    sort_legal_moves(board, buffer);
    let mut candidates = buffer
        .iter()
        .enumerate()
        .filter(|(_, scored)| descriptor.matches(&scored.mv))
        .map(|(index, _)| index);

    match (candidates.next(), candidates.next()) {
        (Some(index), None) => Ok(index),
        (None, _) => Err(CompressionError::IllegalMove {
            ply,
            text: text.to_owned(),
        }),
        (Some(_), Some(_)) => Err(CompressionError::AmbiguousMove {
            ply,
            text: text.to_owned(),
        }),
    }
}

/// Top 24 bits of the PolyGlot key.
pub fn position_hash(board: &Chess) -> u32 {
    let key: Zobrist64 = board.zobrist_hash(EnPassantMode::Legal);
    (key.0 >> 40) as u32
}

// Board state and bookkeeping shared by all decoders.
struct Replay {
    board: Chess,
    moves: Vec<String>,
    // hashes[k] is the position after k plies
    hashes: Vec<u32>,
    last_zeroing: Option<usize>,
    last_irreversible: Option<usize>,
    last_move: Option<Move>,
}

impl Replay {
    fn new() -> Self {
        let board = Chess::default();
        let hashes = vec![position_hash(&board)];
        Replay {
            board,
            moves: Vec::new(),
            hashes,
            last_zeroing: None,
            last_irreversible: None,
            last_move: None,
        }
    }

    /// Plays `mv` and records it in short algebraic notation.
    fn play_rendered(&mut self, mv: &Move) {
        let san = San::from_move(&self.board, mv);
        self.advance(mv);
        let suffix = Suffix::from_position(&self.board);
        self.moves.push(SanPlus { san, suffix }.to_string());
    }

    /// Plays `mv` and records `text` as given.
    fn play_literal(&mut self, mv: &Move, text: String) {
        self.advance(mv);
        self.moves.push(text);
    }

    fn advance(&mut self, mv: &Move) {
        let ply = self.moves.len();
        let rights = self.board.castles().castling_rights();

        self.board.play_unchecked(mv);

        if mv.is_zeroing() {
            self.last_zeroing = Some(ply);
        }
        if mv.is_zeroing() || self.board.castles().castling_rights() != rights {
            self.last_irreversible = Some(ply);
        }
        self.hashes.push(position_hash(&self.board));
        self.last_move = Some(mv.clone());
    }

    fn finish(self) -> DecodedGame {
        let plies = self.moves.len();
        let half_move_clock = match self.last_zeroing {
            Some(ply) => plies - 1 - ply,
            None => plies,
        };
        let kept = match self.last_irreversible {
            Some(ply) => plies - ply,
            None => plies + 1,
        };
        let mut position_hashes = Vec::with_capacity(3 * kept);
        for hash in self.hashes.iter().rev().take(kept) {
            position_hashes.extend_from_slice(&hash.to_be_bytes()[1..]);
        }

        DecodedGame {
            moves: self.moves,
            position: self.board,
            half_move_clock: half_move_clock as u32,
            position_hashes,
            last_uci: self
                .last_move
                .map(|mv| mv.to_uci(CastlingMode::Standard).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GAME: [&str; 64] = [
        "e4", "c5", "Nf3", "d6", "Bb5+", "Bd7", "Bxd7+", "Nxd7", "O-O", "Ngf6", "Re1", "e6", "d4",
        "cxd4", "Nxd4", "Be7", "c4", "a6", "Nc3", "O-O", "Be3", "Rc8", "b3", "e5", "Nf5", "b5",
        "Nxd6", "Bxd6", "Qxd6", "bxc4", "b4", "a5", "a3", "Re8", "Rad1", "Re6", "Qd2", "Rb8",
        "Bg5", "Qb6", "Be3", "Qb7", "f3", "axb4", "axb4", "Qxb4", "Rb1", "Qd6", "Rxb8+", "Qxb8",
        "Rb1", "Qc7", "Nd5", "Nxd5", "exd5", "Rd6", "f4", "c3", "Qc2", "Rxd5", "fxe5", "Nxe5",
        "Qxc3", "h6",
    ];

    #[test]
    fn test_encode_decode() {
        let mut encoder = Encoder::new();

        let compressed = encoder.encode(&GAME).unwrap();
        println!("Compressed data size: {} bytes", compressed.bytes.len());

        let decoded = encoder.decode(&compressed, GAME.len()).unwrap();
        assert_eq!(decoded.moves, GAME);
        assert_eq!(decoded.last_uci.as_deref(), Some("h7h6"));
        assert_eq!(decoded.half_move_clock, 0);
    }

    #[test]
    fn test_encode_decode_with_huffman() {
        let mut encoder = Encoder::new();
        let compressed = encoder.encode_with_huffman(&GAME).unwrap();
        let decoded = encoder.decode_with_huffman(&compressed, GAME.len()).unwrap();
        assert_eq!(decoded.moves, GAME);
    }

    #[test]
    fn test_huffman_leftover_bits() {
        let mut encoder = Encoder::new();
        let compressed = encoder.encode_with_huffman(&GAME).unwrap();

        let mut padded = compressed.clone();
        padded.grow(7, false);
        assert!(encoder.decode_with_huffman(&padded, GAME.len()).is_ok());

        let mut marked = compressed;
        marked.push(true);
        assert!(matches!(
            encoder.decode_with_huffman(&marked, GAME.len()),
            Err(CompressionError::InvalidPlyCount { .. })
        ));
    }

    #[test]
    fn test_opening_header_bytes() {
        let mut encoder = Encoder::new();
        // presence bit, then code 0 in six bits
        let e4 = encoder.encode(&["e4"]).unwrap();
        assert_eq!(e4.bytes, vec![0b1000_0000]);
        assert_eq!(e4.state, 1 << 16);

        let e4_e5 = encoder.encode(&["e4", "e5"]).unwrap();
        assert_eq!(e4_e5.bytes, vec![0b1000_0100]);
    }

    #[test]
    fn test_game_without_opening() {
        let mut encoder = Encoder::new();
        let moves = ["a3", "h6", "a4"];
        let compressed = encoder.encode(&moves).unwrap();
        assert_eq!(compressed.bytes[0] & 0x80, 0);
        let decoded = encoder.decode(&compressed, moves.len()).unwrap();
        assert_eq!(decoded.moves, moves);
    }

    #[test]
    fn test_move_indexes() {
        let mut encoder = Encoder::new();
        let indexes = encoder.move_indexes(&GAME[..8]).unwrap();
        assert_eq!(indexes.len(), 8);
        // 1. e4 is the top ranked first move
        assert_eq!(indexes[0], 0);
        assert!(indexes.iter().all(|&index| index < 64));
    }

    #[test]
    fn test_find_move_index_errors() {
        let board = Chess::default();
        let mut buffer = Vec::new();
        assert_eq!(
            find_move_index(&board, &mut buffer, "e5", 3),
            Err(CompressionError::IllegalMove {
                ply: 3,
                text: "e5".to_owned()
            })
        );
        assert_eq!(
            find_move_index(&board, &mut buffer, "hello", 0),
            Err(CompressionError::NotationParse {
                ply: 0,
                text: "hello".to_owned()
            })
        );
        let index = find_move_index(&board, &mut buffer, "Nf3", 0).unwrap();
        assert_eq!(buffer[index].mv.to(), shakmaty::Square::F3);
    }

    #[test]
    fn test_packed_roundtrip() {
        let game = EncodedGame {
            state: 0x0012_3456,
            bytes: vec![1, 2, 3],
        };
        let packed = game.to_bytes();
        assert_eq!(packed, vec![0, 0x12, 0x34, 0x56, 1, 2, 3]);
        assert_eq!(EncodedGame::from_bytes(&packed).unwrap(), game);
        assert_eq!(
            EncodedGame::from_bytes(&[1, 2]),
            Err(CompressionError::TruncatedStream)
        );
    }

    #[test]
    fn test_position_hash_is_24_bits() {
        let board = Chess::default();
        // PolyGlot key of the starting position is 0x463b96181691fc9c
        assert_eq!(position_hash(&board), 0x46_3b96);
    }
}
