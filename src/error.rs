use std::fmt;

use crate::location::BitLocation;

/// Errors reported by writes through a [`BitRef`](crate::BitRef)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitsetError {
    /// The handle was built with [`BitRef::null`](crate::BitRef::null)
    /// and doesn't point to any bit.
    NullReference,

    /// The handle points to a page that isn't allocated.
    Unallocated {
        /// Location of the bit
        location: BitLocation,
        /// Number of pages allocated
        pages: usize,
    },
}

impl fmt::Display for BitsetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullReference => write!(f, "write through a null bit reference"),
            Self::Unallocated { location, pages } => {
                write!(
                    f,
                    "bit {} of word {} is in page {} but only {} pages are allocated",
                    location.bit, location.word, location.page, pages
                )
            }
        }
    }
}

impl std::error::Error for BitsetError {}
