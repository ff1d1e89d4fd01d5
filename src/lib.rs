//! A growable bitset whose bits can be read and written concurrently
//! without locks.
//!
//! Bits are packed in atomic words, grouped in fixed-size pages allocated on
//! demand. Growing the bitset appends pages and never moves the words of the
//! existing ones. Each bit operation is a compare-and-swap loop on a single
//! word.
//!
//! ## Example
//!
//! ```
//! use paged_atomic_bitset::AtomicBitset;
//!
//! // Every bit of a new page is set
//! let mut bitset = AtomicBitset::with_default(!0);
//!
//! bitset.speculative_set(0, false);
//! bitset.speculative_set(99, false);
//!
//! assert_eq!(bitset.len(), 100);
//! assert_eq!(bitset.count_ones(), 98);
//! ```

mod common;
mod config;
mod error;
mod iter;
mod page;
mod reference;

mod bitset;
pub mod bits;
pub mod location;
pub mod word;

pub use {
    self::bitset::{AtomicBitset, Bitset},
    common::DEFAULT_PAGE_SIZE,
    config::Config,
    error::BitsetError,
    iter::{Iter, Refs},
    location::BitLocation,
    reference::BitRef,
    word::{AtomicWord, Word},
};
