//! Mapping of a bit index to its place in the paged storage.
//!
//! Nothing here is checked against the allocated storage.

use crate::word::Word;

/// Where a bit lives: page, word inside the page, bit inside the word.
///
/// Always recomputed from the bit index, never stored in the pages.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitLocation {
    pub page: usize,
    pub word: usize,
    pub bit: usize,
}

/// Bits per word
#[inline]
pub const fn bit_stride<W: Word>() -> usize {
    W::BITS
}

/// Bits per page
#[inline]
pub const fn page_stride<W: Word, const PAGE_SIZE: usize>() -> usize {
    PAGE_SIZE * W::BITS
}

#[inline]
pub const fn resolve_page_index<W: Word, const PAGE_SIZE: usize>(index: usize) -> usize {
    index / page_stride::<W, PAGE_SIZE>()
}

#[inline]
pub const fn resolve_word_index<W: Word, const PAGE_SIZE: usize>(index: usize) -> usize {
    (index / W::BITS) % PAGE_SIZE
}

#[inline]
pub const fn resolve_bit_offset<W: Word>(index: usize) -> usize {
    index % W::BITS
}

#[inline]
pub const fn resolve_index<W: Word, const PAGE_SIZE: usize>(index: usize) -> BitLocation {
    BitLocation {
        page: resolve_page_index::<W, PAGE_SIZE>(index),
        word: resolve_word_index::<W, PAGE_SIZE>(index),
        bit: resolve_bit_offset::<W>(index),
    }
}

impl BitLocation {
    /// Inverse of [`resolve_index`]
    #[inline]
    pub const fn to_index<W: Word, const PAGE_SIZE: usize>(self) -> usize {
        self.page * page_stride::<W, PAGE_SIZE>() + self.word * W::BITS + self.bit
    }
}
