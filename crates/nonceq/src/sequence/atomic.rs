use portable_atomic::{AtomicU64, Ordering};

use crate::{Result, sequence::NonceSequence};

/// A lock-free nonce sequence suitable for multi-threaded environments.
///
/// This strategy stores the current nonce in an [`AtomicU64`], allowing safe
/// shared use across threads without a lock. It holds no reference to the
/// authority: once seeded at construction, it is a pure local counter.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Lock-free on every operation
/// - ❌ Reconciles against the authority
///
/// ## Recommended When
/// - This process is the only writer for the identity
/// - You want the lowest possible latency under contention
///
/// ## See Also
/// - [`EnsuredNonceSequence`]
///
/// [`EnsuredNonceSequence`]: crate::EnsuredNonceSequence
#[derive(Debug)]
pub struct AtomicNonceSequence {
    #[cfg(feature = "cache-padded")]
    pub(crate) current: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    pub(crate) current: AtomicU64,
}

impl AtomicNonceSequence {
    /// Creates a sequence whose next minted nonce is `start`.
    ///
    /// # Example
    /// ```
    /// use nonceq::AtomicNonceSequence;
    ///
    /// let seq = AtomicNonceSequence::new(7);
    /// assert_eq!(seq.increment(), 7);
    /// assert_eq!(seq.current(), 8);
    /// ```
    pub fn new(start: u64) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            current: crossbeam_utils::CachePadded::new(AtomicU64::new(start)),
            #[cfg(not(feature = "cache-padded"))]
            current: AtomicU64::new(start),
        }
    }

    /// Returns the nonce to use and advances the sequence past it.
    pub fn increment(&self) -> u64 {
        self.current.fetch_add(1, Ordering::Relaxed)
    }

    /// Rolls the sequence back by one, returning the new current value.
    ///
    /// Wraps on underflow, matching unsigned counter arithmetic.
    pub fn decrement(&self) -> u64 {
        self.current.fetch_sub(1, Ordering::Relaxed).wrapping_sub(1)
    }

    /// Returns the nonce the next mint would produce, without advancing.
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }

    /// Unconditionally overwrites the sequence position.
    pub fn reset(&self, nonce: u64) {
        self.current.store(nonce, Ordering::Relaxed);
    }
}

impl NonceSequence for AtomicNonceSequence {
    fn try_increment(&self) -> Result<u64> {
        Ok(self.increment())
    }

    fn try_decrement(&self) -> Result<u64> {
        Ok(self.decrement())
    }

    fn try_current(&self) -> Result<u64> {
        Ok(self.current())
    }

    fn reset(&self, nonce: u64) {
        Self::reset(self, nonce);
    }
}
