use static_assertions::const_assert;

/// Words per page of [`AtomicBitset`](crate::AtomicBitset).
///
/// 512 x 64 bits: a page is 4096 bytes and holds 32768 bits.
pub const DEFAULT_PAGE_SIZE: usize = 512;

pub(crate) const BITS_PER_BYTE: usize = 8;

// Pages are aligned on a cache line so that two pages never share one.
#[cfg(any(
    target_arch = "x86_64",
    target_arch = "aarch64",
    target_arch = "powerpc64",
))]
pub(crate) const CACHE_LINE_SIZE: usize = 128;

#[cfg(target_arch = "s390x")]
pub(crate) const CACHE_LINE_SIZE: usize = 256;

#[cfg(not(any(
    target_arch = "x86_64",
    target_arch = "aarch64",
    target_arch = "powerpc64",
    target_arch = "s390x",
)))]
pub(crate) const CACHE_LINE_SIZE: usize = 64;

const_assert!(CACHE_LINE_SIZE.is_power_of_two());
const_assert!(DEFAULT_PAGE_SIZE > 0);
