use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompressionError {
    #[error("Could not parse move {text:?} at ply {ply}")]
    NotationParse { ply: usize, text: String },
    #[error("No legal move matches {text:?} at ply {ply}")]
    IllegalMove { ply: usize, text: String },
    #[error("Move {text:?} at ply {ply} matches more than one legal move")]
    AmbiguousMove { ply: usize, text: String },
    #[error("Bit stream ended before decoding finished")]
    TruncatedStream,
    #[error("Ply count {plies} does not match the encoded stream: {reason}")]
    InvalidPlyCount { plies: usize, reason: &'static str },
    #[error("Decoded index {index} at ply {ply} exceeds {legal} legal moves")]
    InvalidMoveIndex {
        ply: usize,
        index: usize,
        legal: usize,
    },
    #[error("Symbol {symbol} is outside the alphabet of {alphabet} symbols")]
    SymbolOutOfRange { symbol: usize, alphabet: usize },
    #[error("Opening code {code} is not in the catalogue")]
    UnknownOpening { code: u32 },
    #[error("rANS state {state} is outside the normalized range")]
    InvalidState { state: u32 },
    #[error("Invalid frequency table: {0}")]
    InvalidFrequencyTable(String),
    #[error("Invalid rANS configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, CompressionError>;
