// src/opening.rs
//! Catalogue of common opening lines, keyed by their literal move texts.
//!
//! A game that starts with a catalogued line stores the line's code instead of
//! entropy coding its first plies. Codes are catalogue ranks, so the most
//! common opening has code 0.

use log::debug;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Ranked opening lines, one per line, most common first.
pub const OPENING_CATALOGUE: &str = include_str!("../data/openings.txt");

#[derive(Debug, Default, Clone)]
struct Node {
    children: HashMap<String, usize>,
    code: Option<u32>,
}

/// Ply-level trie over opening lines. Every node that ends a catalogued line
/// carries that line's code.
#[derive(Debug, Clone)]
pub struct OpeningTrie {
    nodes: Vec<Node>,
    lines: HashMap<u32, String>,
    code_width: u32,
    max_plies: usize,
}

/// The longest catalogued line that a game starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningMatch<'a> {
    pub code: u32,
    pub plies: usize,
    pub line: &'a str,
}

impl OpeningTrie {
    /// Builds a trie wide enough for the largest code among `entries`.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: AsRef<str>,
    {
        let entries: Vec<(u32, S)> = entries.into_iter().collect();
        let largest = entries.iter().map(|(code, _)| *code).max().unwrap_or(0);
        let code_width = (u32::BITS - largest.leading_zeros()).max(1);
        Self::with_code_width(entries, code_width)
    }

    /// Builds a trie with a fixed code width. Entries whose code needs more
    /// than `code_width` bits are left out.
    pub fn with_code_width<I, S>(entries: I, code_width: u32) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: AsRef<str>,
    {
        let code_width = code_width.clamp(1, 32);
        let mut trie = OpeningTrie {
            nodes: vec![Node::default()],
            lines: HashMap::new(),
            code_width,
            max_plies: 0,
        };
        for (code, line) in entries {
            let line = line.as_ref();
            if u64::from(code) >> code_width != 0 {
                debug!("Skipping opening {line:?}: code {code} needs more than {code_width} bits");
                continue;
            }
            trie.insert(code, line);
        }
        trie
    }

    /// Parses a catalogue with one line per opening. Blank lines are ignored;
    /// the code of a line is its position among the non-blank ones.
    pub fn from_catalogue(catalogue: &str) -> Self {
        Self::new(
            catalogue
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .enumerate()
                .map(|(rank, line)| (rank as u32, line)),
        )
    }

    fn insert(&mut self, code: u32, line: &str) {
        let mut node = 0;
        let mut plies = 0;
        for text in line.split_whitespace() {
            node = match self.nodes[node].children.get(text) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node].children.insert(text.to_owned(), child);
                    child
                }
            };
            plies += 1;
        }
        if plies == 0 {
            return;
        }

        // the same line listed twice keeps its better rank
        let slot = &mut self.nodes[node].code;
        match *slot {
            Some(existing) if existing <= code => return,
            Some(existing) => {
                self.lines.remove(&existing);
            }
            None => {}
        }
        *slot = Some(code);
        self.lines
            .insert(code, line.split_whitespace().collect::<Vec<_>>().join(" "));
        self.max_plies = self.max_plies.max(plies);
    }

    /// Code of an exact catalogued line, given as space separated move texts.
    pub fn get(&self, opening: &str) -> Option<u32> {
        let mut node = 0;
        for text in opening.split_whitespace() {
            node = *self.nodes[node].children.get(text)?;
        }
        self.nodes[node].code
    }

    /// The line with the given code.
    pub fn opening(&self, code: u32) -> Option<&str> {
        self.lines.get(&code).map(String::as_str)
    }

    /// Number of bits a code occupies in an encoded game.
    pub fn code_width(&self) -> u32 {
        self.code_width
    }

    /// Plies in the longest catalogued line.
    pub fn max_plies(&self) -> usize {
        self.max_plies
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Finds the longest catalogued line that `moves` starts with. Only
    /// complete lines count; a prefix of a longer line is not a match unless
    /// it is catalogued itself.
    pub fn find_longest_common_opening<S: AsRef<str>>(
        &self,
        moves: &[S],
    ) -> Option<OpeningMatch<'_>> {
        let mut node = 0;
        let mut best = None;
        for (ply, text) in moves.iter().take(self.max_plies).enumerate() {
            match self.nodes[node].children.get(text.as_ref()) {
                Some(&child) => node = child,
                None => break,
            }
            if let Some(code) = self.nodes[node].code {
                best = Some((code, ply + 1));
            }
        }
        let (code, plies) = best?;
        Some(OpeningMatch {
            code,
            plies,
            line: self.opening(code)?,
        })
    }
}

/// The compiled-in catalogue, built on first use.
pub fn most_common_openings() -> &'static OpeningTrie {
    static OPENINGS: OnceLock<OpeningTrie> = OnceLock::new();
    OPENINGS.get_or_init(|| OpeningTrie::from_catalogue(OPENING_CATALOGUE))
}
