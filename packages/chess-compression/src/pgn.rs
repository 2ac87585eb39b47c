// src/pgn.rs
//! Reading mainline moves out of PGN text.

use pgn_reader::{BufferedReader, RawHeader, SanPlus, Skip, Visitor};
use std::{io, mem};

const STARTING_FEN: &[u8] = b"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Headers and mainline of one PGN game.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PgnGame {
    pub headers: Vec<(String, String)>,
    pub moves: Vec<String>,
}

impl PgnGame {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Default)]
struct Importer {
    current: PgnGame,
    skip: bool,
}

impl Visitor for Importer {
    type Result = Option<PgnGame>;

    fn begin_game(&mut self) {
        self.skip = false;
        self.current = PgnGame::default();
    }

    fn header(&mut self, key: &[u8], value: RawHeader<'_>) {
        match key {
            // only games from the standard starting position can be compressed
            b"FEN" => self.skip |= value.as_bytes() != STARTING_FEN,
            b"Variant" => {
                self.skip |= !matches!(value.as_bytes(), b"Standard" | b"From Position")
            }
            _ => {}
        }
        self.current.headers.push((
            String::from_utf8_lossy(key).into_owned(),
            value.decode_utf8_lossy().into_owned(),
        ));
    }

    fn end_headers(&mut self) -> Skip {
        Skip(self.skip)
    }

    fn san(&mut self, san_plus: SanPlus) {
        self.current.moves.push(san_plus.to_string());
    }

    fn begin_variation(&mut self) -> Skip {
        Skip(true) // stay in the mainline
    }

    fn end_game(&mut self) -> Self::Result {
        if self.skip {
            None
        } else {
            Some(mem::take(&mut self.current))
        }
    }
}

/// Reads every game of a PGN file. Games that do not start from the standard
/// position are left out.
pub fn read_games(pgn: &[u8]) -> io::Result<Vec<PgnGame>> {
    let mut reader = BufferedReader::new_cursor(pgn);
    let mut importer = Importer::default();
    let mut games = Vec::new();
    while let Some(game) = reader.read_game(&mut importer)? {
        games.extend(game);
    }
    Ok(games)
}

/// Mainline move texts of the first game in `pgn`.
pub fn mainline_moves(pgn: &[u8]) -> io::Result<Option<Vec<String>>> {
    let mut reader = BufferedReader::new_cursor(pgn);
    let mut importer = Importer::default();
    while let Some(game) = reader.read_game(&mut importer)? {
        if let Some(game) = game {
            return Ok(Some(game.moves));
        }
    }
    Ok(None)
}
