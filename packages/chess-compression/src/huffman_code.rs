// src/huffman_code.rs
use crate::histogram::MOVE_INDEX_FREQUENCIES;
use huffman_compress::{Book, CodeBuilder, Tree};
use std::sync::OnceLock;

/// Prefix code over move indexes, built from the same statistics as the rANS
/// frequency table.
pub fn get_huffman_code() -> (&'static Book<u32>, &'static Tree<u32>) {
    static CODE: OnceLock<(Book<u32>, Tree<u32>)> = OnceLock::new();
    let (book, tree) = CODE.get_or_init(|| {
        MOVE_INDEX_FREQUENCIES
            .iter()
            .enumerate()
            .map(|(index, &weight)| (index as u32, weight))
            .collect::<CodeBuilder<u32, u64>>()
            .finish()
    });
    (book, tree)
}
