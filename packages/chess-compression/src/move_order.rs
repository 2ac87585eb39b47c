// src/move_order.rs
//! Canonical ordering of legal moves.
//!
//! Encoder and decoder must agree on the index of every legal move, so the
//! order is defined here once. Moves are scored the way lichess orders them
//! for its own game compression: likely moves (promotions, captures, moves to
//! squares no enemy pawn guards, moves that improve piece placement) come
//! first. Scores are unique per legal move, so the order is total.

use shakmaty::{attacks, Chess, Color, Move, Position, Role, Square};
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct ScoredMove {
    pub mv: Move,
    score: i32,
}

impl ScoredMove {
    pub fn new(board: &Chess, mv: Move) -> Self {
        let score = Self::compute_score(board, &mv);
        ScoredMove { mv, score }
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    fn compute_score(board: &Chess, mv: &Move) -> i32 {
        let us = board.turn();
        let piece_role = mv.role();
        let to_square = mv.to();
        let from_square = mv.from().unwrap_or(to_square);

        let mut score = 0;

        if let Some(promotion_role) = mv.promotion() {
            score += (promotion_role as i32) << 26;
        }

        if mv.is_capture() {
            score += 1 << 25;
        }

        let defending_pawns =
            attacks::pawn_attacks(us, to_square) & board.board().pawns() & board.them();

        let defending_pawns_score = if defending_pawns.is_empty() {
            6
        } else {
            6 - piece_role as i32
        } << 22;
        score += defending_pawns_score;

        let move_value =
            piece_value(us, piece_role, to_square) - piece_value(us, piece_role, from_square);
        score += (512 + move_value) << 12;

        score += (to_square as i32) << 6;
        score += from_square as i32;

        score
    }
}

impl PartialEq for ScoredMove {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}

impl Eq for ScoredMove {}

// Highest score first.
impl Ord for ScoredMove {
    fn cmp(&self, other: &Self) -> Ordering {
        other.score.cmp(&self.score)
    }
}

impl PartialOrd for ScoredMove {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Fills `buffer` with the legal moves of `board` in canonical order. The
/// buffer is cleared first, so callers can reuse one allocation across plies.
pub fn sort_legal_moves(board: &Chess, buffer: &mut Vec<ScoredMove>) {
    buffer.clear();
    buffer.extend(
        board
            .legal_moves()
            .into_iter()
            .map(|mv| ScoredMove::new(board, mv)),
    );
    buffer.sort_unstable();
}

// Piece-square tables, written from white's point of view with a8 first.
static PSQT: [[i32; 64]; 6] = [
    // Pawn
    [
        0, 0, 0, 0, 0, 0, 0, 0, 50, 50, 50, 50, 50, 50, 50, 50, 10, 10, 20, 30, 30, 20, 10, 10, 5,
        5, 10, 25, 25, 10, 5, 5, 0, 0, 0, 20, 21, 0, 0, 0, 5, -5, -10, 0, 0, -10, -5, 5, 5, 10, 10,
        -31, -31, 10, 10, 5, 0, 0, 0, 0, 0, 0, 0, 0,
    ],
    // Knight
    [
        -50, -40, -30, -30, -30, -30, -40, -50, -40, -20, 0, 0, 0, 0, -20, -40, -30, 0, 10, 15, 15,
        10, 0, -30, -30, 5, 15, 20, 20, 15, 5, -30, -30, 0, 15, 20, 20, 15, 0, -30, -30, 5, 10, 15,
        15, 11, 5, -30, -40, -20, 0, 5, 5, 0, -20, -40, -50, -40, -30, -30, -30, -30, -40, -50,
    ],
    // Bishop
    [
        -20, -10, -10, -10, -10, -10, -10, -20, -10, 0, 0, 0, 0, 0, 0, -10, -10, 0, 5, 10, 10, 5,
        0, -10, -10, 5, 5, 10, 10, 5, 5, -10, -10, 0, 10, 10, 10, 10, 0, -10, -10, 10, 10, 10, 10,
        10, 10, -10, -10, 5, 0, 0, 0, 0, 5, -10, -20, -10, -10, -10, -10, -10, -10, -20,
    ],
    // Rook
    [
        0, 0, 0, 0, 0, 0, 0, 0, 5, 10, 10, 10, 10, 10, 10, 5, -5, 0, 0, 0, 0, 0, 0, -5, -5, 0, 0,
        0, 0, 0, 0, -5, -5, 0, 0, 0, 0, 0, 0, -5, -5, 0, 0, 0, 0, 0, 0, -5, -5, 0, 0, 0, 0, 0, 0,
        -5, 0, 0, 0, 5, 5, 0, 0, 0,
    ],
    // Queen
    [
        -20, -10, -10, -5, -5, -10, -10, -20, -10, 0, 0, 0, 0, 0, 0, -10, -10, 0, 5, 5, 5, 5, 0,
        -10, -5, 0, 5, 5, 5, 5, 0, -5, 0, 0, 5, 5, 5, 5, 0, -5, -10, 5, 5, 5, 5, 5, 0, -10, -10, 0,
        5, 0, 0, 0, 0, -10, -20, -10, -10, -5, -5, -10, -10, -20,
    ],
    // King
    [
        -30, -40, -40, -50, -50, -40, -40, -30, -30, -40, -40, -50, -50, -40, -40, -30, -30, -40,
        -40, -50, -50, -40, -40, -30, -30, -40, -40, -50, -50, -40, -40, -30, -20, -30, -30, -40,
        -40, -30, -30, -20, -10, -20, -20, -20, -20, -20, -20, -10, 20, 20, 0, 0, 0, 0, 20, 20, 0,
        30, 10, 0, 0, 10, 30, 0,
    ],
];

fn piece_value(us: Color, role: Role, square: Square) -> i32 {
    // tables start at a8, so white squares are flipped and black ones are not
    let square = match us {
        Color::White => square.flip_vertical(),
        Color::Black => square,
    };
    PSQT[role as usize - 1][square as usize]
}
