//! Lock-free operations on a single bit of an atomic word.
//!
//! Every mutation is a compare-and-swap loop on the whole word: other bits of
//! the word may change concurrently, the loop retries until our transformation
//! is applied on top of them. Nothing is lost between bits sharing a word.
//!
//! Mutations return the full word as it was before the update.

use std::sync::atomic::Ordering::SeqCst;

use crate::word::{AtomicWord, Word};

/// Applies `operation(word, mask)` to `word` atomically, where `mask` has
/// only `bit` set. Returns the previous value of the word.
#[inline]
pub fn update_bit<W, F>(word: &W::Atomic, bit: usize, operation: F) -> W
where
    W: Word,
    F: Fn(W, W) -> W,
{
    debug_assert!(bit < W::BITS, "bit offset {} out of a {} bits word", bit, W::BITS);

    let mask = W::mask(bit);
    let mut current = word.load(SeqCst);

    loop {
        match word.compare_exchange_weak(current, operation(current, mask), SeqCst, SeqCst) {
            Ok(previous) => return previous,
            Err(actual) => current = actual,
        }
    }
}

#[inline]
pub fn enable_bit<W: Word>(word: &W::Atomic, bit: usize) -> W {
    update_bit::<W, _>(word, bit, |value, mask| value | mask)
}

#[inline]
pub fn disable_bit<W: Word>(word: &W::Atomic, bit: usize) -> W {
    update_bit::<W, _>(word, bit, |value, mask| value & !mask)
}

#[inline]
pub fn toggle_bit<W: Word>(word: &W::Atomic, bit: usize) -> W {
    update_bit::<W, _>(word, bit, |value, mask| value ^ mask)
}

/// Enables or disables `bit` depending on `value`
#[inline]
pub fn set_bit<W: Word>(word: &W::Atomic, bit: usize, value: bool) -> W {
    if value {
        enable_bit::<W>(word, bit)
    } else {
        disable_bit::<W>(word, bit)
    }
}

/// Reads `bit` with a single atomic load.
#[inline]
pub fn get_bit<W: Word>(word: &W::Atomic, bit: usize) -> bool {
    debug_assert!(bit < W::BITS, "bit offset {} out of a {} bits word", bit, W::BITS);

    word.load(SeqCst) & W::mask(bit) != W::ZERO
}
