use crate::Result;

/// A minimal interface for minting nonce values.
///
/// The allocator is generic over how the next value is produced. Two
/// strategies implement this trait:
///
/// - [`AtomicNonceSequence`]: a lock-free local counter, seeded once from
///   the authority and independent of it afterwards.
/// - [`EnsuredNonceSequence`]: re-queries the authority inside every
///   operation, so the sequence never falls behind external reality.
///
/// [`AtomicNonceSequence`]: crate::AtomicNonceSequence
/// [`EnsuredNonceSequence`]: crate::EnsuredNonceSequence
pub trait NonceSequence {
    /// Returns the nonce to use and advances the sequence past it.
    ///
    /// # Errors
    ///
    /// May return an error if the strategy queries the authority or takes a
    /// lock and either fails.
    fn try_increment(&self) -> Result<u64>;

    /// Rolls the sequence back by one, returning the new current value.
    ///
    /// # Errors
    ///
    /// May return an error if the strategy queries the authority or takes a
    /// lock and either fails.
    fn try_decrement(&self) -> Result<u64>;

    /// Returns the nonce the next mint would produce, without advancing.
    ///
    /// # Errors
    ///
    /// May return an error if the strategy queries the authority or takes a
    /// lock and either fails.
    fn try_current(&self) -> Result<u64>;

    /// Unconditionally overwrites the sequence position.
    ///
    /// No reconciliation and no locking beyond an atomic store. Intended
    /// for recovery and bootstrap, not normal operation.
    fn reset(&self, nonce: u64);
}
