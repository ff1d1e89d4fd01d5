use crate::bitset::Bitset;
use crate::reference::BitRef;
use crate::word::Word;

/// Iterator over the bits of a [`Bitset`], as `bool`
///
/// The end of the iteration is the length of the bitset read at each step,
/// not a snapshot taken at creation. The bits themselves can be changed by
/// other threads while iterating, each one is read when it is reached.
pub struct Iter<'a, W: Word, const PAGE_SIZE: usize> {
    bitset: &'a Bitset<W, PAGE_SIZE>,
    index: usize,
}

impl<'a, W: Word, const PAGE_SIZE: usize> Iter<'a, W, PAGE_SIZE> {
    pub(crate) fn new(bitset: &'a Bitset<W, PAGE_SIZE>) -> Self {
        Iter { bitset, index: 0 }
    }
}

impl<W: Word, const PAGE_SIZE: usize> Iterator for Iter<'_, W, PAGE_SIZE> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        if self.index >= self.bitset.len() {
            return None;
        }

        let value = self.bitset.get(self.index);
        self.index += 1;

        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bitset.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

/// Iterator over handles to the bits of a [`Bitset`]
///
/// Same end semantic as [`Iter`].
pub struct Refs<'a, W: Word, const PAGE_SIZE: usize> {
    bitset: &'a Bitset<W, PAGE_SIZE>,
    index: usize,
}

impl<'a, W: Word, const PAGE_SIZE: usize> Refs<'a, W, PAGE_SIZE> {
    pub(crate) fn new(bitset: &'a Bitset<W, PAGE_SIZE>) -> Self {
        Refs { bitset, index: 0 }
    }
}

impl<'a, W: Word, const PAGE_SIZE: usize> Iterator for Refs<'a, W, PAGE_SIZE> {
    type Item = BitRef<'a, W, PAGE_SIZE>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.bitset.len() {
            return None;
        }

        let bit = self.bitset.get_reference(self.index);
        self.index += 1;

        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bitset.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'a, W: Word, const PAGE_SIZE: usize> IntoIterator for &'a Bitset<W, PAGE_SIZE> {
    type Item = bool;
    type IntoIter = Iter<'a, W, PAGE_SIZE>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
