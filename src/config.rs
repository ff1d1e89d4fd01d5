use crate::word::Word;

/// Construction parameters of a [`Bitset`](crate::Bitset)
///
/// The word type and the page size are part of the bitset type. Everything
/// else is resolved once, when the bitset is built, and stays fixed for its
/// whole life.
///
/// ## Example
///
/// ```
/// use paged_atomic_bitset::{AtomicBitset, Config};
///
/// // New pages have all their bits set
/// let config = Config::new().default_word(!0u64).capacity(4096);
/// let bitset = AtomicBitset::with_config(config);
///
/// assert!(bitset.capacity() >= 4096);
/// assert!(bitset.is_empty());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config<W> {
    pub(crate) default_word: W,
    pub(crate) fill_pages: bool,
    pub(crate) capacity: usize,
}

impl<W: Word> Config<W> {
    /// Zeroed pages and no capacity reserved
    pub fn new() -> Config<W> {
        Config {
            default_word: W::ZERO,
            fill_pages: true,
            capacity: 0,
        }
    }

    /// Value written in every word of a newly allocated page.
    pub fn default_word(mut self, word: W) -> Config<W> {
        self.default_word = word;
        self
    }

    /// When `false`, new pages are zeroed and `default_word` is ignored.
    ///
    /// Defaults to `true`.
    pub fn fill_pages(mut self, fill: bool) -> Config<W> {
        self.fill_pages = fill;
        self
    }

    /// Number of bits to allocate when the bitset is built.
    pub fn capacity(mut self, bits: usize) -> Config<W> {
        self.capacity = bits;
        self
    }

    /// The word that new pages are really initialized with
    pub(crate) fn page_word(&self) -> W {
        if self.fill_pages {
            self.default_word
        } else {
            W::ZERO
        }
    }
}

impl<W: Word> Default for Config<W> {
    fn default() -> Config<W> {
        Config::new()
    }
}
