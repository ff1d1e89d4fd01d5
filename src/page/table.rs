use crate::location::{page_stride, resolve_page_index, BitLocation};
use crate::page::Page;
use crate::word::Word;

/// Append-only list of pages
///
/// Pages are boxed behind their own allocation: growing the table moves
/// the `Vec` of handles, never the words themselves. Pages are released
/// only when the table is dropped.
pub(crate) struct PageTable<W: Word, const PAGE_SIZE: usize> {
    pages: Vec<Page<W, PAGE_SIZE>>,
    /// Value of every word of a new page
    page_word: W,
}

impl<W: Word, const PAGE_SIZE: usize> PageTable<W, PAGE_SIZE> {
    pub(crate) fn new(page_word: W) -> PageTable<W, PAGE_SIZE> {
        PageTable {
            pages: Vec::new(),
            page_word,
        }
    }

    pub(crate) fn page_word(&self) -> W {
        self.page_word
    }

    #[inline]
    pub(crate) fn pages_allocated(&self) -> usize {
        self.pages.len()
    }

    pub(crate) fn words_allocated(&self) -> usize {
        self.pages_allocated() * PAGE_SIZE
    }

    #[inline]
    pub(crate) fn bits_allocated(&self) -> usize {
        self.pages_allocated() * page_stride::<W, PAGE_SIZE>()
    }

    #[inline]
    pub(crate) fn page(&self, page_index: usize) -> Option<&Page<W, PAGE_SIZE>> {
        self.pages.get(page_index)
    }

    /// Returns the word holding the bit at `location`, if its page exists
    #[inline]
    pub(crate) fn word(&self, location: BitLocation) -> Option<&W::Atomic> {
        self.page(location.page)?.word(location.word)
    }

    /// Appends pages until the table holds `npages` pages.
    ///
    /// Returns the number of pages allocated.
    pub(crate) fn resize_pages(&mut self, npages: usize) -> usize {
        let before = self.pages_allocated();

        if npages > before {
            self.pages.reserve(npages - before);

            while self.pages_allocated() < npages {
                self.pages.push(Page::new(self.page_word));
            }

            tracing::debug!(
                added = npages - before,
                pages = npages,
                page_size = PAGE_SIZE,
                "allocated bitset pages"
            );
        }

        self.pages_allocated()
    }

    /// Makes sure the page `page_index` exists
    pub(crate) fn allocate_pages_up_to(&mut self, page_index: usize) -> usize {
        self.resize_pages(page_index + 1)
    }

    /// Makes sure the page holding the bit `index` exists
    pub(crate) fn allocate_pages_for_index(&mut self, index: usize) -> usize {
        self.allocate_pages_up_to(resolve_page_index::<W, PAGE_SIZE>(index))
    }
}

impl<W: Word, const PAGE_SIZE: usize> std::fmt::Debug for PageTable<W, PAGE_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageTable")
         .field("npages", &self.pages_allocated())
         .field("page_word", &format!("{:#b}", self.page_word))
         .finish()
    }
}
