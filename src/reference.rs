use std::sync::atomic::Ordering::SeqCst;

use crate::bits;
use crate::error::BitsetError;
use crate::location::BitLocation;
use crate::page::table::PageTable;
use crate::word::{AtomicWord, Word};

/// A handle to one bit of a [`Bitset`](crate::Bitset)
///
/// The handle keeps the location of the bit and looks its word up again on
/// every access, it never caches the bit value nor a pointer to the word.
/// Reads and writes are atomic and can be done from any thread holding the
/// handle.
///
/// A handle created with [`BitRef::null`] points to nothing: it reads as
/// `false` and every write returns [`BitsetError::NullReference`].
///
/// ## Example
///
/// ```
/// use paged_atomic_bitset::AtomicBitset;
///
/// let mut bitset = AtomicBitset::new();
///
/// let bit = bitset.speculative_get_reference(10);
/// assert!(!bit.get());
///
/// bit.set(true).unwrap();
/// assert!(bit.get());
///
/// assert!(bitset.get(10));
/// assert_eq!(bitset.len(), 11);
/// ```
pub struct BitRef<'a, W: Word, const PAGE_SIZE: usize> {
    table: Option<&'a PageTable<W, PAGE_SIZE>>,
    location: BitLocation,
}

impl<W: Word, const PAGE_SIZE: usize> Clone for BitRef<'_, W, PAGE_SIZE> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W: Word, const PAGE_SIZE: usize> Copy for BitRef<'_, W, PAGE_SIZE> {}

impl<'a, W: Word, const PAGE_SIZE: usize> BitRef<'a, W, PAGE_SIZE> {
    pub(crate) fn new(table: &'a PageTable<W, PAGE_SIZE>, location: BitLocation) -> Self {
        BitRef {
            table: Some(table),
            location,
        }
    }

    /// A handle pointing to no bit
    pub fn null() -> Self {
        BitRef {
            table: None,
            location: BitLocation { page: 0, word: 0, bit: 0 },
        }
    }

    pub fn is_null(&self) -> bool {
        self.table.is_none()
    }

    pub fn location(&self) -> BitLocation {
        self.location
    }

    /// Offset of the bit inside its word
    pub fn bit_offset(&self) -> usize {
        self.location.bit
    }

    fn atomic(&self) -> Result<&'a W::Atomic, BitsetError> {
        let table = self.table.ok_or(BitsetError::NullReference)?;

        table.word(self.location).ok_or(BitsetError::Unallocated {
            location: self.location,
            pages: table.pages_allocated(),
        })
    }

    /// Reads the bit. A null handle reads as `false`.
    pub fn get(&self) -> bool {
        match self.atomic() {
            Ok(word) => bits::get_bit::<W>(word, self.location.bit),
            Err(_) => false,
        }
    }

    /// Current value of the whole word holding the bit
    pub fn word(&self) -> Option<W> {
        self.atomic().ok().map(|word| word.load(SeqCst))
    }

    /// Writes the bit and returns the previous value of its word
    pub fn set(&self, value: bool) -> Result<W, BitsetError> {
        Ok(bits::set_bit::<W>(self.atomic()?, self.location.bit, value))
    }

    pub fn enable(&self) -> Result<W, BitsetError> {
        Ok(bits::enable_bit::<W>(self.atomic()?, self.location.bit))
    }

    pub fn disable(&self) -> Result<W, BitsetError> {
        Ok(bits::disable_bit::<W>(self.atomic()?, self.location.bit))
    }

    pub fn toggle(&self) -> Result<W, BitsetError> {
        Ok(bits::toggle_bit::<W>(self.atomic()?, self.location.bit))
    }
}

impl<W: Word, const PAGE_SIZE: usize> Default for BitRef<'_, W, PAGE_SIZE> {
    fn default() -> Self {
        BitRef::null()
    }
}

impl<W: Word, const PAGE_SIZE: usize> From<BitRef<'_, W, PAGE_SIZE>> for bool {
    fn from(bit: BitRef<'_, W, PAGE_SIZE>) -> bool {
        bit.get()
    }
}

impl<W: Word, const PAGE_SIZE: usize> PartialEq<bool> for BitRef<'_, W, PAGE_SIZE> {
    fn eq(&self, other: &bool) -> bool {
        self.get() == *other
    }
}

impl<W: Word, const PAGE_SIZE: usize> std::fmt::Debug for BitRef<'_, W, PAGE_SIZE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            return f.write_str("BitRef(null)");
        }

        f.debug_struct("BitRef")
         .field("location", &self.location)
         .field("value", &self.get())
         .finish()
    }
}
