use std::sync::atomic::Ordering::SeqCst;

use crate::bits;
use crate::common::DEFAULT_PAGE_SIZE;
use crate::config::Config;
use crate::iter::{Iter, Refs};
use crate::location::{self, BitLocation};
use crate::page::table::PageTable;
use crate::page::Page;
use crate::reference::BitRef;
use crate::word::{AtomicWord, Word};

/// A growable bitset with lock-free bit operations
///
/// Bits are stored in words of type `W`, `PAGE_SIZE` words per page. Pages
/// are allocated on demand and never freed nor moved until the bitset is
/// dropped.
///
/// ## Concurrency
///
/// Every method changing the storage or the length takes `&mut self`:
/// [`reserve`], [`resize`], [`push`], [`request_index`], the `speculative_*`
/// family, etc. Growth is therefore serialized by the borrow checker.
///
/// Reading and writing bits only needs `&self` ([`get`], [`set`],
/// [`enable`], [`disable`], [`toggle`], [`get_reference`]). Those are
/// lock-free and can be called from any number of threads once the
/// capacity has been established:
///
/// ```
/// use paged_atomic_bitset::AtomicBitset;
///
/// let mut bitset = AtomicBitset::new();
/// bitset.resize(3000);
///
/// std::thread::scope(|scope| {
///     for residue in 0..3 {
///         let bitset = &bitset;
///         scope.spawn(move || {
///             for index in (residue..3000).step_by(3) {
///                 bitset.set(index, true);
///             }
///         });
///     }
/// });
///
/// assert_eq!(bitset.count_ones(), 3000);
/// ```
///
/// Bits sharing a word never lose updates from each other, but no ordering
/// is guaranteed between operations on different words.
///
/// [`reserve`]: #method.reserve
/// [`resize`]: #method.resize
/// [`push`]: #method.push
/// [`request_index`]: #method.request_index
/// [`get`]: #method.get
/// [`set`]: #method.set
/// [`enable`]: #method.enable
/// [`disable`]: #method.disable
/// [`toggle`]: #method.toggle
/// [`get_reference`]: #method.get_reference
pub struct Bitset<W: Word = u64, const PAGE_SIZE: usize = DEFAULT_PAGE_SIZE> {
    pages: PageTable<W, PAGE_SIZE>,
    len: usize,
}

/// 64 bits words, 512 words per page
pub type AtomicBitset = Bitset<u64, DEFAULT_PAGE_SIZE>;

impl<W: Word, const PAGE_SIZE: usize> Bitset<W, PAGE_SIZE> {
    /// Words per page
    pub const WORDS_PER_PAGE: usize = PAGE_SIZE;
    /// Bits per word
    pub const BIT_STRIDE: usize = location::bit_stride::<W>();
    /// Bits per page
    pub const PAGE_STRIDE: usize = location::page_stride::<W, PAGE_SIZE>();
    /// Bytes used by a page
    pub const PAGE_SIZE_IN_MEMORY: usize = Page::<W, PAGE_SIZE>::SIZE_IN_MEMORY;

    /// Constructs an empty bitset with zeroed pages
    ///
    /// Nothing is allocated until the first growth.
    ///
    /// ## Example
    ///
    /// ```
    /// use paged_atomic_bitset::AtomicBitset;
    ///
    /// let bitset = AtomicBitset::new();
    /// assert_eq!(bitset.capacity(), 0);
    /// ```
    pub fn new() -> Bitset<W, PAGE_SIZE> {
        Bitset::with_config(Config::new())
    }

    /// Constructs an empty bitset where every word of a new page is
    /// `default_word`.
    ///
    /// ## Example
    ///
    /// ```
    /// use paged_atomic_bitset::AtomicBitset;
    ///
    /// let mut bitset = AtomicBitset::with_default(!0);
    /// bitset.resize(100);
    ///
    /// assert!(bitset.iter().all(|bit| bit));
    /// ```
    pub fn with_default(default_word: W) -> Bitset<W, PAGE_SIZE> {
        Bitset::with_config(Config::new().default_word(default_word))
    }

    /// Constructs an empty bitset with storage for at least `bits` bits
    /// already allocated.
    ///
    /// Because the bitset allocates by page, it might hold more than `bits`.
    ///
    /// ## Example
    ///
    /// ```
    /// use paged_atomic_bitset::Bitset;
    ///
    /// let bitset = Bitset::<u8, 4>::with_capacity(33);
    /// assert_eq!(bitset.capacity(), 64);
    /// assert_eq!(bitset.len(), 0);
    /// ```
    pub fn with_capacity(bits: usize) -> Bitset<W, PAGE_SIZE> {
        Bitset::with_config(Config::new().capacity(bits))
    }

    pub fn with_config(config: Config<W>) -> Bitset<W, PAGE_SIZE> {
        let mut bitset = Bitset {
            pages: PageTable::new(config.page_word()),
            len: 0,
        };

        bitset.reserve(config.capacity);
        bitset
    }

    #[inline]
    pub fn resolve_page_index(index: usize) -> usize {
        location::resolve_page_index::<W, PAGE_SIZE>(index)
    }

    #[inline]
    pub fn resolve_word_index(index: usize) -> usize {
        location::resolve_word_index::<W, PAGE_SIZE>(index)
    }

    #[inline]
    pub fn resolve_bit_offset(index: usize) -> usize {
        location::resolve_bit_offset::<W>(index)
    }

    #[inline]
    pub fn resolve_index(index: usize) -> BitLocation {
        location::resolve_index::<W, PAGE_SIZE>(index)
    }

    /// Number of bits in the bitset.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` when the length is 0. A bitset is "truthy" when this
    /// is `false`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bits allocated
    #[inline]
    pub fn capacity(&self) -> usize {
        self.pages.bits_allocated()
    }

    /// Number of pages allocated
    pub fn pages_allocated(&self) -> usize {
        self.pages.pages_allocated()
    }

    /// Number of words allocated
    pub fn words_allocated(&self) -> usize {
        self.pages.words_allocated()
    }

    /// Index that the next [`push`](#method.push) will write
    pub fn next_index(&self) -> usize {
        self.len
    }

    /// Index of the last bit, or 0 when empty
    pub fn last_index(&self) -> usize {
        self.len.saturating_sub(1)
    }

    /// Number of pages covering the length.
    ///
    /// This is `len() / PAGE_STRIDE`, except that it is 1 while the length
    /// fits in a single page, including when the bitset is empty.
    pub fn page_count(&self) -> usize {
        if self.len <= Self::PAGE_STRIDE {
            return 1;
        }

        self.len / Self::PAGE_STRIDE
    }

    /// Number of words covering the length.
    ///
    /// This is `len() / BIT_STRIDE`, except that it is 1 while the length
    /// fits in a single word, including when the bitset is empty.
    pub fn element_count(&self) -> usize {
        if self.len <= Self::BIT_STRIDE {
            return 1;
        }

        self.len / Self::BIT_STRIDE
    }

    #[inline]
    fn atomic(&self, index: usize) -> Option<&W::Atomic> {
        self.pages.word(Self::resolve_index(index))
    }

    #[inline]
    fn covered_atomic(&self, index: usize) -> &W::Atomic {
        match self.atomic(index) {
            Some(word) => word,
            None => panic!(
                "Bitset: bit {} isn't allocated (capacity {})",
                index,
                self.capacity()
            ),
        }
    }

    /// Reads the bit `index`.
    ///
    /// The length isn't checked: a bit past the length but inside the
    /// capacity is read from storage. A bit outside the capacity reads as
    /// `false`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        match self.atomic(index) {
            Some(word) => bits::get_bit::<W>(word, Self::resolve_bit_offset(index)),
            None => false,
        }
    }

    /// Reads the bit `index`, or returns `false` when `index >= len()`
    /// without touching the storage.
    #[inline]
    pub fn speculative_get(&self, index: usize) -> bool {
        if index < self.len {
            return self.get(index);
        }

        false
    }

    /// Current value of the whole word holding the bit `index`
    pub fn get_word(&self, index: usize) -> Option<W> {
        self.atomic(index).map(|word| word.load(SeqCst))
    }

    /// Sets the bit `index` to `value` and returns the previous value of
    /// its word.
    ///
    /// ## Panics
    ///
    /// Panics if `index` isn't covered by the capacity.
    #[inline]
    pub fn set(&self, index: usize, value: bool) -> W {
        bits::set_bit::<W>(self.covered_atomic(index), Self::resolve_bit_offset(index), value)
    }

    /// Sets the bit `index` to `true`. See [`set`](#method.set)
    #[inline]
    pub fn enable(&self, index: usize) -> W {
        bits::enable_bit::<W>(self.covered_atomic(index), Self::resolve_bit_offset(index))
    }

    /// Sets the bit `index` to `false`. See [`set`](#method.set)
    #[inline]
    pub fn disable(&self, index: usize) -> W {
        bits::disable_bit::<W>(self.covered_atomic(index), Self::resolve_bit_offset(index))
    }

    /// Flips the bit `index`. See [`set`](#method.set)
    #[inline]
    pub fn toggle(&self, index: usize) -> W {
        bits::toggle_bit::<W>(self.covered_atomic(index), Self::resolve_bit_offset(index))
    }

    /// Grows the bitset to cover `index` if needed, then sets the bit.
    ///
    /// ## Example
    ///
    /// ```
    /// use paged_atomic_bitset::AtomicBitset;
    ///
    /// let mut bitset = AtomicBitset::new();
    /// bitset.speculative_set(99, true);
    ///
    /// assert_eq!(bitset.len(), 100);
    /// assert!(bitset.get(99));
    /// ```
    pub fn speculative_set(&mut self, index: usize, value: bool) -> W {
        self.request_index(index);
        self.set(index, value)
    }

    pub fn speculative_enable(&mut self, index: usize) -> W {
        self.request_index(index);
        self.enable(index)
    }

    pub fn speculative_disable(&mut self, index: usize) -> W {
        self.request_index(index);
        self.disable(index)
    }

    pub fn speculative_toggle(&mut self, index: usize) -> W {
        self.request_index(index);
        self.toggle(index)
    }

    /// Returns a handle to the bit `index`, without growing.
    ///
    /// The handle is null if the page of `index` isn't allocated.
    pub fn get_reference(&self, index: usize) -> BitRef<'_, W, PAGE_SIZE> {
        let location = Self::resolve_index(index);

        if self.pages.page(location.page).is_none() {
            return BitRef::null();
        }

        BitRef::new(&self.pages, location)
    }

    /// Grows the bitset to cover `index` if needed and returns a handle to
    /// the bit.
    pub fn speculative_get_reference(&mut self, index: usize) -> BitRef<'_, W, PAGE_SIZE> {
        self.request_index(index);
        self.get_reference(index)
    }

    /// Makes sure `index` is part of the bitset.
    ///
    /// If `index >= len()`, the storage grows and the length becomes
    /// `index + 1`. Returns the length.
    pub fn request_index(&mut self, index: usize) -> usize {
        if index >= self.len {
            self.pages.allocate_pages_for_index(index);
            self.len = index + 1;
        }

        self.len
    }

    /// Appends a bit and returns the previous value of its word.
    ///
    /// ## Example
    ///
    /// ```
    /// use paged_atomic_bitset::AtomicBitset;
    ///
    /// let mut bitset = AtomicBitset::new();
    ///
    /// bitset.push(true);
    /// assert_eq!(bitset.push(true), 0b01);
    ///
    /// assert_eq!(bitset.pop(), true);
    /// assert_eq!(bitset.len(), 1);
    /// ```
    pub fn push(&mut self, value: bool) -> W {
        let index = self.next_index();

        self.pages.allocate_pages_for_index(index);
        self.len += 1;

        self.set(index, value)
    }

    /// Removes the last bit and returns its value, or `false` when empty.
    ///
    /// The bit isn't cleared in the storage: growing the bitset again
    /// exposes it with its old value.
    pub fn pop(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }

        let index = self.len - 1;
        let value = self.get(index);

        self.len = index;

        value
    }

    /// Makes sure the capacity is at least `bits`, without changing the
    /// length. Returns the capacity.
    pub fn reserve(&mut self, bits: usize) -> usize {
        if bits > 0 {
            self.pages.allocate_pages_for_index(bits - 1);
        }

        self.capacity()
    }

    /// Sets the length to `len` and returns it.
    ///
    /// Shrinking doesn't clear any bit nor free any page. Growing allocates
    /// what is needed, and the newly exposed bits keep whatever value is in
    /// storage: the default word of their page if they were never written.
    ///
    /// ## Example
    ///
    /// ```
    /// use paged_atomic_bitset::AtomicBitset;
    ///
    /// let mut bitset = AtomicBitset::new();
    /// bitset.speculative_set(5, true);
    ///
    /// bitset.resize(2);
    /// assert_eq!(bitset.speculative_get(5), false);
    ///
    /// bitset.resize(6);
    /// assert_eq!(bitset.get(5), true);
    /// ```
    pub fn resize(&mut self, len: usize) -> usize {
        if len < self.len {
            tracing::trace!(from = self.len, to = len, "bitset truncated");
        } else if len > self.len {
            self.reserve(len);
        }

        self.len = len;
        self.len
    }

    /// Sets the length to 0, keeping every allocated page and their bits.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Number of bits set to `true` in `[0, len())`
    pub fn count_ones(&self) -> usize {
        self.iter().filter(|bit| *bit).count()
    }

    pub fn iter(&self) -> Iter<'_, W, PAGE_SIZE> {
        Iter::new(self)
    }

    /// Iterates handles to the bits in `[0, len())`
    pub fn refs(&self) -> Refs<'_, W, PAGE_SIZE> {
        Refs::new(self)
    }
}

impl<W: Word, const PAGE_SIZE: usize> Default for Bitset<W, PAGE_SIZE> {
    fn default() -> Bitset<W, PAGE_SIZE> {
        Bitset::new()
    }
}

impl<W: Word, const PAGE_SIZE: usize> std::ops::Index<usize> for Bitset<W, PAGE_SIZE> {
    type Output = bool;

    /// Same as [`Bitset::get`]
    fn index(&self, index: usize) -> &bool {
        if self.get(index) {
            &true
        } else {
            &false
        }
    }
}

impl<W: Word, const PAGE_SIZE: usize> std::fmt::Debug for Bitset<W, PAGE_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Bitset")
         .field("len", &self.len)
         .field("capacity", &self.capacity())
         .field("npages", &self.pages.pages_allocated())
         .field("page_size", &PAGE_SIZE)
         .field("word_bits", &W::BITS)
         .field("page_word", &format!("{:#b}", self.pages.page_word()))
         .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{AtomicBitset, Bitset};
    use crate::config::Config;
    use crate::location::BitLocation;

    #[test]
    fn bitset_new() {
        let bitset = AtomicBitset::new();

        assert_eq!(bitset.len(), 0);
        assert!(bitset.is_empty());
        assert_eq!(bitset.capacity(), 0);
        assert_eq!(bitset.pages_allocated(), 0);
        assert!(!bitset.get(0));
        assert!(!bitset.speculative_get(12345));
        assert!(bitset.get_reference(0).is_null());
        assert_eq!(AtomicBitset::PAGE_SIZE_IN_MEMORY, 4096);
        assert_eq!(AtomicBitset::PAGE_STRIDE, 32768);
        assert_eq!(AtomicBitset::BIT_STRIDE, 64);
        assert_eq!(AtomicBitset::WORDS_PER_PAGE, 512);
    }

    #[test]
    fn bitset_counts_when_empty() {
        let bitset = AtomicBitset::new();

        assert_eq!(bitset.len(), 0);
        assert_eq!(bitset.page_count(), 1);
        assert_eq!(bitset.element_count(), 1);
        assert_eq!(bitset.next_index(), 0);
        assert_eq!(bitset.last_index(), 0);
    }

    #[test]
    fn bitset_counts() {
        let mut bitset = Bitset::<u8, 2>::new();

        bitset.resize(8);
        assert_eq!(bitset.element_count(), 1);
        bitset.resize(9);
        assert_eq!(bitset.element_count(), 1);
        bitset.resize(24);
        assert_eq!(bitset.element_count(), 3);

        bitset.resize(16);
        assert_eq!(bitset.page_count(), 1);
        bitset.resize(33);
        assert_eq!(bitset.page_count(), 2);
        bitset.resize(48);
        assert_eq!(bitset.page_count(), 3);
        assert_eq!(bitset.last_index(), 47);
        assert_eq!(bitset.words_allocated(), 6);
    }

    #[test]
    fn bitset_round_trip() {
        let mut bitset = Bitset::<u32, 3>::new();

        for index in (0..1000).step_by(7) {
            bitset.speculative_set(index, true);
            assert!(bitset.get(index));
            bitset.speculative_set(index, false);
            assert!(!bitset.get(index));
            bitset.speculative_set(index, index % 2 == 0);
            assert_eq!(bitset.get(index), index % 2 == 0);
        }
    }

    #[test]
    fn bitset_growth_exposes_default() {
        let mut bitset = Bitset::<u64, 4>::with_default(!0);

        bitset.speculative_set(300, false);

        assert_eq!(bitset.len(), 301);
        assert!((0..300).all(|index| bitset.get(index)));
        assert!(!bitset.get(300));
        assert_eq!(bitset.count_ones(), 300);
    }

    #[test]
    fn bitset_indexing() {
        let mut bitset = AtomicBitset::with_default(u64::MAX);

        bitset.speculative_get_reference(0).set(false).unwrap();
        bitset.speculative_get_reference(99).set(false).unwrap();

        assert_eq!(bitset.len(), 100);
        assert_eq!(bitset.iter().map(|bit| bit as usize).sum::<usize>(), 98);
        assert_eq!(bitset.capacity(), 32768);
        assert_eq!(bitset.page_count(), 1);

        assert!(!bitset[0]);
        assert!(bitset[1]);
        assert!(!bitset[99]);
    }

    #[test]
    fn bitset_speculative_ops() {
        let mut bitset = Bitset::<u8, 1>::new();

        assert_eq!(bitset.speculative_enable(3), 0);
        assert_eq!(bitset.len(), 4);
        assert_eq!(bitset.speculative_toggle(1), 0b1000);
        assert_eq!(bitset.speculative_disable(3), 0b1010);
        assert_eq!(bitset.get_word(0), Some(0b0010));

        // Next word, next page
        assert_eq!(bitset.speculative_toggle(8), 0);
        assert_eq!(bitset.len(), 9);
        assert_eq!(bitset.pages_allocated(), 2);
        assert_eq!(bitset.get_word(8), Some(1));
        assert_eq!(bitset.get_word(16), None);

        // Doesn't shrink
        assert_eq!(bitset.request_index(2), 9);
    }

    #[test]
    fn bitset_word_ops() {
        let bitset = Bitset::<u16, 2>::with_capacity(32);

        assert_eq!(bitset.enable(17), 0);
        assert_eq!(bitset.enable(18), 0b010);
        assert_eq!(bitset.toggle(16), 0b110);
        assert_eq!(bitset.disable(17), 0b111);
        assert_eq!(bitset.set(17, true), 0b101);
        assert_eq!(bitset.get_word(16), Some(0b111));
        assert_eq!(bitset.len(), 0);
    }

    #[test]
    #[should_panic(expected = "isn't allocated")]
    fn bitset_set_unallocated() {
        let bitset = AtomicBitset::new();
        bitset.set(0, true);
    }

    #[test]
    fn bitset_stack() {
        let mut bitset = Bitset::<u8, 2>::new();
        let values: Vec<bool> = (0..100).map(|i| i % 3 == 0 || i % 7 == 0).collect();

        bitset.push(true);

        for value in &values {
            bitset.push(*value);
        }
        assert_eq!(bitset.len(), 101);

        for value in values.iter().rev() {
            assert_eq!(bitset.pop(), *value);
        }
        assert_eq!(bitset.len(), 1);
        assert!(bitset.pop());
        assert!(!bitset.pop());
        assert!(bitset.is_empty());
    }

    #[test]
    fn bitset_push_returns_previous_word() {
        let mut bitset = Bitset::<u8, 1>::new();

        assert_eq!(bitset.push(true), 0);
        assert_eq!(bitset.push(false), 0b1);
        assert_eq!(bitset.push(true), 0b01);
        assert_eq!(bitset.get_word(0), Some(0b101));
    }

    #[test]
    fn bitset_pop_is_soft() {
        let mut bitset = AtomicBitset::new();

        bitset.push(true);
        bitset.push(true);
        assert!(bitset.pop());

        assert!(!bitset.speculative_get(1));
        assert!(bitset.get(1));

        bitset.resize(2);
        assert!(bitset.get(1));
    }

    #[test]
    fn bitset_resize_keeps_bits() {
        let mut bitset = Bitset::<u32, 2>::new();

        for index in 0..200 {
            bitset.push(index % 5 == 1);
        }
        let before: Vec<bool> = bitset.iter().collect();

        assert_eq!(bitset.resize(120), 120);
        assert_eq!(bitset.iter().count(), 120);
        assert_eq!(bitset.capacity(), 256);

        assert_eq!(bitset.resize(200), 200);
        assert_eq!(bitset.iter().collect::<Vec<_>>(), before);

        assert_eq!(bitset.resize(200), 200);
    }

    #[test]
    fn bitset_clear_keeps_pages() {
        let mut bitset = Bitset::<u64, 1>::new();

        bitset.speculative_set(1000, true);
        let capacity = bitset.capacity();

        bitset.clear();

        assert!(bitset.is_empty());
        assert_eq!(bitset.capacity(), capacity);
        assert!(bitset.get(1000));
    }

    #[test]
    fn bitset_reserve() {
        let mut bitset = Bitset::<u8, 4>::new();

        assert_eq!(bitset.reserve(0), 0);
        assert_eq!(bitset.reserve(1), 32);
        assert_eq!(bitset.reserve(32), 32);
        assert_eq!(bitset.reserve(33), 64);
        assert_eq!(bitset.reserve(10), 64);
        assert_eq!(bitset.len(), 0);
    }

    #[test]
    fn bitset_config() {
        let config = Config::new().default_word(0b1010u8).capacity(20);
        let mut bitset = Bitset::<u8, 2>::with_config(config);

        assert_eq!(bitset.capacity(), 32);
        bitset.resize(8);
        assert_eq!(
            bitset.iter().collect::<Vec<_>>(),
            [false, true, false, true, false, false, false, false]
        );

        let config = Config::new().default_word(!0u8).fill_pages(false);
        let mut bitset = Bitset::<u8, 2>::with_config(config);
        bitset.resize(16);
        assert_eq!(bitset.count_ones(), 0);
    }

    #[test]
    fn bitset_references() {
        let mut bitset = Bitset::<u16, 1>::new();

        let bit = bitset.speculative_get_reference(20);
        assert_eq!(bit.location(), BitLocation { page: 1, word: 0, bit: 4 });
        bit.enable().unwrap();

        assert_eq!(bitset.len(), 21);
        assert!(bitset.get(20));

        // Allocated but past the length: still a valid handle
        let bit = bitset.get_reference(25);
        assert!(!bit.is_null());
        assert!(bit.toggle().is_ok());
        assert!(bitset.get(25));

        assert!(bitset.get_reference(32).is_null());
    }

    #[test]
    fn bitset_debug() {
        let mut bitset = AtomicBitset::new();
        bitset.push(true);
        println!("{:?}", bitset);
        println!("{:?}", Bitset::<u8, 1>::default());
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn bitset_with_threads() {
        test_with_threads(4096 * 64, 3);
    }

    #[test]
    fn miri_bitset_with_threads() {
        test_with_threads(256, 3);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn bitset_with_threads_and_toggles() {
        test_toggles_with_threads(12, 1024 * 4);
    }

    #[test]
    fn miri_bitset_with_threads_and_toggles() {
        test_toggles_with_threads(4, 64);
    }

    // Each thread writes its residue class, every bit ends up set exactly once
    fn test_with_threads(nbits: usize, nthreads: usize) {
        use std::sync::{Arc, Barrier};
        use std::thread;

        let mut bitset = AtomicBitset::new();
        bitset.reserve(nbits);
        bitset.resize(nbits);

        let bitset = Arc::new(bitset);
        let barrier = Arc::new(Barrier::new(nthreads));

        let mut handles = Vec::with_capacity(nthreads);

        for residue in 0..nthreads {
            let c = barrier.clone();
            let bitset = bitset.clone();
            handles.push(thread::spawn(move || {
                c.wait();

                for index in (residue..nbits).step_by(nthreads) {
                    bitset.set(index, true);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(bitset.count_ones(), nbits);
    }

    // Threads hammer the same words through toggles, only their own bits.
    // An even number of toggles per bit must leave the bitset as it was.
    fn test_toggles_with_threads(nthreads: usize, nrounds: usize) {
        use std::sync::Barrier;
        use std::thread;

        let mut bitset = Bitset::<u64, 1>::with_default(0xAAAA_AAAA_AAAA_AAAA);
        bitset.resize(64 * 4);

        let barrier = Barrier::new(nthreads);

        thread::scope(|scope| {
            for thread_index in 0..nthreads {
                let bitset = &bitset;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();

                    for _ in 0..nrounds {
                        for index in (thread_index..bitset.len()).step_by(nthreads) {
                            bitset.toggle(index);
                        }
                    }
                    for index in (thread_index..bitset.len()).step_by(nthreads) {
                        bitset.toggle(index);
                        bitset.toggle(index);
                    }
                });
            }
        });

        for index in 0..bitset.len() {
            let expected = if nrounds % 2 == 0 { index % 2 == 1 } else { index % 2 == 0 };
            assert_eq!(bitset.get(index), expected, "bit {}", index);
        }
    }
}
