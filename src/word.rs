//! Integer types usable as the storage word of a bitset.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not, Shl};
use std::sync::atomic::{AtomicU16, AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering};

use static_assertions::assert_eq_size;

/// An unsigned integer that stores `BITS` bits of a bitset.
///
/// Every word type has an atomic counterpart with the exact same layout,
/// which is what pages are made of.
pub trait Word:
    Copy
    + Eq
    + Default
    + fmt::Debug
    + fmt::Binary
    + Send
    + Sync
    + 'static
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + Shl<usize, Output = Self>
{
    type Atomic: AtomicWord<Self>;

    /// Number of bits in the word, also called the bit stride.
    const BITS: usize;
    const ZERO: Self;
    const ONE: Self;

    /// Word with only `bit` set
    #[inline]
    fn mask(bit: usize) -> Self {
        Self::ONE << bit
    }
}

/// The subset of the std atomic integer API used by the bit operations.
pub trait AtomicWord<W>: Send + Sync + fmt::Debug {
    fn new(value: W) -> Self;

    fn load(&self, order: Ordering) -> W;

    fn compare_exchange_weak(
        &self,
        current: W,
        new: W,
        success: Ordering,
        failure: Ordering,
    ) -> Result<W, W>;
}

macro_rules! impl_word {
    ($($word:ty => $atomic:ty),* $(,)?) => {
        $(
            assert_eq_size!($word, $atomic);

            impl AtomicWord<$word> for $atomic {
                #[inline]
                fn new(value: $word) -> Self {
                    <$atomic>::new(value)
                }

                #[inline]
                fn load(&self, order: Ordering) -> $word {
                    <$atomic>::load(self, order)
                }

                #[inline]
                fn compare_exchange_weak(
                    &self,
                    current: $word,
                    new: $word,
                    success: Ordering,
                    failure: Ordering,
                ) -> Result<$word, $word> {
                    <$atomic>::compare_exchange_weak(self, current, new, success, failure)
                }
            }

            impl Word for $word {
                type Atomic = $atomic;

                const BITS: usize = <$word>::BITS as usize;
                const ZERO: Self = 0;
                const ONE: Self = 1;
            }
        )*
    };
}

impl_word! {
    u8 => AtomicU8,
    u16 => AtomicU16,
    u32 => AtomicU32,
    u64 => AtomicU64,
    usize => AtomicUsize,
}
