use std::alloc::{alloc, alloc_zeroed, dealloc, handle_alloc_error, Layout};
use std::ptr::NonNull;

use crate::common::{BITS_PER_BYTE, CACHE_LINE_SIZE};
use crate::word::{AtomicWord, Word};

pub(crate) mod table;

/// A fixed block of `PAGE_SIZE` atomic words.
///
/// The words are allocated once, in a single heap block, and never move
/// nor get resized until the page is dropped.
pub(crate) struct Page<W: Word, const PAGE_SIZE: usize> {
    words: NonNull<W::Atomic>,
}

// The page owns its words like a Box<[W::Atomic]> would, and atomics
// are Send + Sync.
unsafe impl<W: Word, const PAGE_SIZE: usize> Send for Page<W, PAGE_SIZE> {}
unsafe impl<W: Word, const PAGE_SIZE: usize> Sync for Page<W, PAGE_SIZE> {}

impl<W: Word, const PAGE_SIZE: usize> std::fmt::Debug for Page<W, PAGE_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
         .field("words", &self.words.as_ptr())
         .field("size", &PAGE_SIZE)
         .finish()
    }
}

impl<W: Word, const PAGE_SIZE: usize> Page<W, PAGE_SIZE> {
    const NON_EMPTY: () = assert!(PAGE_SIZE > 0, "A page must hold at least one word");

    /// Bytes used by the words of one page
    pub(crate) const SIZE_IN_MEMORY: usize = PAGE_SIZE * W::BITS / BITS_PER_BYTE;

    fn layout() -> Layout {
        match Layout::array::<W::Atomic>(PAGE_SIZE).and_then(|l| l.align_to(CACHE_LINE_SIZE)) {
            Ok(layout) => layout,
            Err(_) => panic!("Page of {} words overflows the address space", PAGE_SIZE),
        }
    }

    /// Allocates a page where every word is `value`.
    ///
    /// Zero is the common case and comes straight from the allocator.
    pub(crate) fn new(value: W) -> Page<W, PAGE_SIZE> {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;

        let layout = Self::layout();

        let words = if value == W::ZERO {
            // The atomic has the layout of its word, all zeroes is a valid 0
            unsafe { alloc_zeroed(layout) as *mut W::Atomic }
        } else {
            unsafe { alloc(layout) as *mut W::Atomic }
        };

        let words = match NonNull::new(words) {
            Some(words) => words,
            None => handle_alloc_error(layout),
        };

        if value != W::ZERO {
            // Initialize the words in place.
            // Nothing to drop here, the memory is uninitialized
            for index in 0..PAGE_SIZE {
                unsafe {
                    words.as_ptr().add(index).write(W::Atomic::new(value));
                }
            }
        }

        Page { words }
    }

    pub(crate) fn words(&self) -> &[W::Atomic] {
        unsafe { std::slice::from_raw_parts(self.words.as_ptr(), PAGE_SIZE) }
    }

    #[inline]
    pub(crate) fn word(&self, index: usize) -> Option<&W::Atomic> {
        self.words().get(index)
    }
}

impl<W: Word, const PAGE_SIZE: usize> Drop for Page<W, PAGE_SIZE> {
    fn drop(&mut self) {
        // Atomics don't implement Drop, releasing the block is enough
        unsafe {
            dealloc(self.words.as_ptr() as *mut u8, Self::layout());
        }
    }
}
