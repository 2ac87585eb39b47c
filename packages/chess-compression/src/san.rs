// src/san.rs
//! Matching move text against legal moves.

use shakmaty::san::{San, SanPlus};
use shakmaty::{Bitboard, CastlingSide, Chess, Color, Move, Position, Role, Square};

/// What a move text says about the move it names. Check marks and the capture
/// marker are not part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveDescriptor {
    pub role: Role,
    pub promotion: Option<Role>,
    /// Squares the moving piece may start from.
    pub from: Bitboard,
    pub to: Square,
}

impl MoveDescriptor {
    /// Parses `text` for the side to move on `board`. Returns `None` for text
    /// that is not a board move in short algebraic notation.
    pub fn parse(text: &str, board: &Chess) -> Option<Self> {
        let san_plus: SanPlus = text.parse().ok()?;
        Self::from_san(&san_plus.san, board)
    }

    pub fn from_san(san: &San, board: &Chess) -> Option<Self> {
        match *san {
            San::Normal {
                role,
                file,
                rank,
                to,
                promotion,
                ..
            } => {
                let mut from = Bitboard::FULL;
                if let Some(file) = file {
                    from &= Bitboard::from_file(file);
                }
                if let Some(rank) = rank {
                    from &= Bitboard::from_rank(rank);
                }
                Some(MoveDescriptor {
                    role,
                    promotion,
                    from,
                    to,
                })
            }
            San::Castle(side) => {
                let turn = board.turn();
                // castling is king takes own rook
                let to = board
                    .castles()
                    .rook(turn, side)
                    .unwrap_or_else(|| corner(turn, side));
                Some(MoveDescriptor {
                    role: Role::King,
                    promotion: None,
                    from: board.board().king_of(turn).map_or(Bitboard::EMPTY, Bitboard::from),
                    to,
                })
            }
            San::Put { .. } | San::Null => None,
        }
    }

    pub fn matches(&self, mv: &Move) -> bool {
        mv.role() == self.role
            && mv.to() == self.to
            && mv.promotion() == self.promotion
            && mv.from().is_some_and(|from| self.from.contains(from))
    }
}

fn corner(color: Color, side: CastlingSide) -> Square {
    match (color, side) {
        (Color::White, CastlingSide::KingSide) => Square::H1,
        (Color::White, CastlingSide::QueenSide) => Square::A1,
        (Color::Black, CastlingSide::KingSide) => Square::H8,
        (Color::Black, CastlingSide::QueenSide) => Square::A8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::fen::Fen;
    use shakmaty::CastlingMode;

    fn position(fen: &str) -> Chess {
        fen.parse::<Fen>()
            .unwrap()
            .into_position(CastlingMode::Standard)
            .unwrap()
    }

    fn matching(text: &str, board: &Chess) -> Vec<Move> {
        let descriptor = MoveDescriptor::parse(text, board).unwrap();
        board
            .legal_moves()
            .into_iter()
            .filter(|mv| descriptor.matches(mv))
            .collect()
    }

    #[test]
    fn test_pawn_push_and_piece_move() {
        let board = Chess::default();
        let e4 = MoveDescriptor::parse("e4", &board).unwrap();
        assert_eq!(e4.role, Role::Pawn);
        assert_eq!(e4.to, Square::E4);
        assert_eq!(e4.from, Bitboard::FULL);
        assert_eq!(matching("e4", &board).len(), 1);
        assert_eq!(matching("Nf3+", &board).len(), 1);
        assert!(matching("e5", &board).is_empty());
    }

    #[test]
    fn test_disambiguation_narrows_sources() {
        // both knights reach e2
        let board = position("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/2N5/PPPP1PPP/R1BQKBNR w KQkq - 2 3");
        assert_eq!(matching("Ne2", &board).len(), 2);
        assert_eq!(matching("Nce2", &board).len(), 1);
        assert_eq!(matching("Nge2", &board).len(), 1);
        assert_eq!(matching("N1e2", &board).len(), 1);
        assert!(matching("Nde2", &board).is_empty());
    }

    #[test]
    fn test_castling_targets_rook_square() {
        let board = position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let short = MoveDescriptor::parse("O-O", &board).unwrap();
        assert_eq!(short.role, Role::King);
        assert_eq!(short.to, Square::H1);
        assert_eq!(short.from, Bitboard::from(Square::E1));
        assert_eq!(matching("O-O", &board).len(), 1);
        assert_eq!(matching("O-O-O+", &board).len(), 1);
        assert_eq!(MoveDescriptor::parse("O-O-O", &board).unwrap().to, Square::A1);
    }

    #[test]
    fn test_castling_without_rights_matches_nothing() {
        let board = position("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1");
        assert!(matching("O-O", &board).is_empty());
    }

    #[test]
    fn test_promotion_must_agree() {
        let board = position("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(matching("e8=Q+", &board).len(), 1);
        assert_eq!(matching("e8=N", &board).len(), 1);
        assert!(matching("e8", &board).is_empty());
    }

    #[test]
    fn test_rejects_non_moves() {
        let board = Chess::default();
        assert!(MoveDescriptor::parse("", &board).is_none());
        assert!(MoveDescriptor::parse("Zz9", &board).is_none());
        assert!(MoveDescriptor::parse("--", &board).is_none());
        assert!(MoveDescriptor::parse("N@f3", &board).is_none());
    }
}
