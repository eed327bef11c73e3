use std::sync::Arc;

/// A source of truth for the next authoritative nonce of an identity.
///
/// This abstraction lets you plug in a real chain client, an RPC wrapper, or
/// a mocked authority in tests. The allocator consumes exactly one operation
/// from it: the next-usable sequence number for a given identity (for
/// example, an account's pending-transaction counter).
///
/// The query may block on I/O. The allocator performs no retries and applies
/// no timeout of its own; a failure is surfaced synchronously to whichever
/// allocator operation triggered the query.
///
/// # Example
///
/// ```
/// use core::convert::Infallible;
/// use nonceq::Authority;
///
/// struct StaticAuthority(u64);
///
/// impl Authority for StaticAuthority {
///     type Err = Infallible;
///
///     fn pending_nonce(&self, _identity: &str) -> Result<u64, Self::Err> {
///         Ok(self.0)
///     }
/// }
///
/// let authority = StaticAuthority(7);
/// assert_eq!(authority.pending_nonce("0xabc"), Ok(7));
/// ```
pub trait Authority {
    /// The error type produced when the query fails.
    type Err: core::error::Error + Send + Sync + 'static;

    /// Returns the authoritative next-usable nonce for `identity`.
    fn pending_nonce(&self, identity: &str) -> Result<u64, Self::Err>;
}

impl<A: Authority + ?Sized> Authority for &A {
    type Err = A::Err;

    fn pending_nonce(&self, identity: &str) -> Result<u64, Self::Err> {
        (**self).pending_nonce(identity)
    }
}

// Shared clients are common: one RPC connection feeding a per-identity
// allocator each.
impl<A: Authority + ?Sized> Authority for Arc<A> {
    type Err = A::Err;

    fn pending_nonce(&self, identity: &str) -> Result<u64, Self::Err> {
        (**self).pending_nonce(identity)
    }
}
