//! Error types for nonce allocation.
//!
//! This module defines the central `Error` enum, which captures all
//! recoverable error cases within the allocator. Authority failures are
//! propagated verbatim as the boxed source of [`Error::Authority`]; the
//! allocator never retries a failed query on its own.
//!
//! ## Error Cases
//! - `Authority`: the external authority query failed.
//! - `RetryOverflow`: a failed nonce was reported while every retry slot is
//!   occupied.
//! - `RetryUnderflow`: a reuse was attempted while no failed nonces are
//!   queued.
//! - `NonceOutOfRange`: the reported nonce collides with the retry queue's
//!   empty-slot sentinel.
//! - `LockPoisoned`: a thread panicked while holding a shared lock. Not
//!   available when the `parking-lot` feature is enabled (those mutexes do
//!   not poison).

pub type Result<T> = core::result::Result<T, Error>;

/// Boxed source error produced by an [`Authority`] implementation.
///
/// [`Authority`]: crate::Authority
pub type AuthorityError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Unified error type for nonce allocation.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The external authority query failed.
    ///
    /// The source error is whatever the [`Authority`] implementation
    /// returned, boxed and otherwise untouched.
    ///
    /// [`Authority`]: crate::Authority
    #[error("authority query failed: {0}")]
    Authority(#[source] AuthorityError),

    /// A failed nonce was reported while the retry queue is at capacity.
    ///
    /// Recoverable: the caller must handle the value some other way (drop
    /// it, log it, or construct the allocator with a larger capacity).
    #[error("retry queue overflow: all {capacity} slots are occupied")]
    RetryOverflow { capacity: usize },

    /// A reuse was attempted while the retry queue is empty.
    #[error("retry queue underflow: no failed nonces are queued")]
    RetryUnderflow,

    /// The nonce collides with the sentinel marking empty retry slots.
    #[error("nonce {0} is outside the retry queue's representable range")]
    NonceOutOfRange(u64),

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is not available.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("lock poisoned by a panicked holder")]
    LockPoisoned,
}

impl Error {
    /// Wraps a failed authority query, boxing the source error.
    pub fn authority<E>(source: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        Self::Authority(Box::new(source))
    }
}

#[cfg(not(feature = "parking-lot"))]
use crate::mutex::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
// Convert all poisoned lock errors to a simplified `LockPoisoned`
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
