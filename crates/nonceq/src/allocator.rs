#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    AtomicNonceSequence, Authority, EnsuredNonceSequence, Error, Result, mutex::Mutex,
    retry::RetryQueue, sequence::NonceSequence,
};

/// An allocator over a lock-free local counter, seeded once from the
/// authority and independent of it afterwards.
pub type DetachedNonceAllocator = NonceAllocator<AtomicNonceSequence>;

/// An allocator that reconciles against the authority on every operation.
pub type EnsuredNonceAllocator<A> = NonceAllocator<EnsuredNonceSequence<A>>;

/// Allocates transaction nonces for one identity.
///
/// The allocator couples a mint strategy (see [`NonceSequence`]) with a
/// bounded retry queue of previously allocated values that failed
/// downstream. [`assign`] serves the queue's minimum first, so failed
/// nonces are reissued in ascending order before any fresh value is minted;
/// [`add_failed_nonce`] is how callers report a failure.
///
/// One allocator owns its counter and queue exclusively. Multiple
/// allocators (one per identity) are fully independent and share nothing —
/// except, if you choose, the authority client behind them.
///
/// [`assign`]: Self::assign
/// [`add_failed_nonce`]: Self::add_failed_nonce
///
/// # Example
/// ```
/// use core::convert::Infallible;
/// use nonceq::{Authority, NonceAllocator};
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
/// let allocator = NonceAllocator::detached(&StaticAuthority(0), "0xabc", 0)?;
///
/// assert_eq!(allocator.assign()?, 0);
/// assert_eq!(allocator.assign()?, 1);
///
/// // Transaction 0 failed downstream; it is reissued before minting 2.
/// allocator.add_failed_nonce(0)?;
/// assert_eq!(allocator.next()?, 0);
/// assert_eq!(allocator.assign()?, 0);
/// assert_eq!(allocator.assign()?, 2);
/// # Ok::<(), nonceq::Error>(())
/// ```
#[derive(Debug)]
pub struct NonceAllocator<S> {
    seq: S,
    retry: Mutex<RetryQueue>,
}

impl NonceAllocator<AtomicNonceSequence> {
    /// Creates a detached allocator: one seed query against `authority`,
    /// after which the sequence is a pure local counter.
    ///
    /// A `retry_capacity` of `0` selects [`DEFAULT_RETRY_CAPACITY`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authority`] if the seed query fails.
    ///
    /// [`DEFAULT_RETRY_CAPACITY`]: crate::DEFAULT_RETRY_CAPACITY
    pub fn detached<A: Authority>(
        authority: &A,
        identity: &str,
        retry_capacity: usize,
    ) -> Result<Self> {
        let seed = authority
            .pending_nonce(identity)
            .map_err(Error::authority)?;
        Ok(Self::from_sequence(
            AtomicNonceSequence::new(seed),
            retry_capacity,
        ))
    }
}

impl<A: Authority> NonceAllocator<EnsuredNonceSequence<A>> {
    /// Creates an ensured allocator: the authority is retained and
    /// re-queried inside every counter operation.
    ///
    /// A `retry_capacity` of `0` selects [`DEFAULT_RETRY_CAPACITY`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authority`] if the seed query fails.
    ///
    /// [`DEFAULT_RETRY_CAPACITY`]: crate::DEFAULT_RETRY_CAPACITY
    pub fn ensured(
        authority: A,
        identity: impl Into<String>,
        retry_capacity: usize,
    ) -> Result<Self> {
        Ok(Self::from_sequence(
            EnsuredNonceSequence::new(authority, identity)?,
            retry_capacity,
        ))
    }
}

impl<S: NonceSequence> NonceAllocator<S> {
    /// Creates an allocator over an explicit mint strategy.
    ///
    /// A `retry_capacity` of `0` selects [`DEFAULT_RETRY_CAPACITY`].
    ///
    /// [`DEFAULT_RETRY_CAPACITY`]: crate::DEFAULT_RETRY_CAPACITY
    pub fn from_sequence(seq: S, retry_capacity: usize) -> Self {
        Self {
            seq,
            retry: Mutex::new(RetryQueue::with_capacity(retry_capacity)),
        }
    }

    /// Returns the nonce to use: the retry queue's minimum if any failed
    /// nonce is waiting, otherwise a freshly minted value.
    ///
    /// Reuse has strict priority over minting, and a value is never handed
    /// out from both paths at once: the pop happens under the queue lock,
    /// and the mint path only runs when the queue was observed empty.
    ///
    /// # Errors
    ///
    /// Propagates authority and lock failures from the mint strategy.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn assign(&self) -> Result<u64> {
        {
            let mut retry = {
                #[cfg(feature = "parking-lot")]
                {
                    self.retry.lock()
                }
                #[cfg(not(feature = "parking-lot"))]
                {
                    self.retry.lock()?
                }
            };

            if !retry.is_empty() {
                return retry.pop();
            }
        }

        self.seq.try_increment()
    }

    /// Returns what [`assign`] would currently hand out, mutating nothing:
    /// the retry queue's minimum if non-empty, else the strategy's current
    /// value.
    ///
    /// [`assign`]: Self::assign
    ///
    /// # Errors
    ///
    /// Propagates authority and lock failures from the mint strategy.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next(&self) -> Result<u64> {
        {
            let retry = {
                #[cfg(feature = "parking-lot")]
                {
                    self.retry.lock()
                }
                #[cfg(not(feature = "parking-lot"))]
                {
                    self.retry.lock()?
                }
            };

            if let Some(nonce) = retry.peek() {
                return Ok(nonce);
            }
        }

        self.seq.try_current()
    }

    /// Reports a previously assigned nonce as failed downstream, queueing
    /// it for reissue.
    ///
    /// # Errors
    ///
    /// - [`Error::RetryOverflow`] if the queue is at capacity
    /// - [`Error::NonceOutOfRange`] if `nonce` collides with the queue's
    ///   empty-slot sentinel
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn add_failed_nonce(&self, nonce: u64) -> Result<()> {
        let mut retry = {
            #[cfg(feature = "parking-lot")]
            {
                self.retry.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.retry.lock()?
            }
        };

        retry.push(nonce)
    }

    /// Returns the nonce to use and advances the sequence past it, minting
    /// fresh regardless of the retry queue.
    ///
    /// # Errors
    ///
    /// Propagates authority and lock failures from the mint strategy.
    pub fn increment(&self) -> Result<u64> {
        self.seq.try_increment()
    }

    /// Rolls the sequence back by one, returning the new current value.
    ///
    /// The two strategies deliberately differ here: the detached counter
    /// blindly decrements, while the ensured sequence clamps upward to the
    /// authority's floor afterwards.
    ///
    /// # Errors
    ///
    /// Propagates authority and lock failures from the mint strategy.
    pub fn decrement(&self) -> Result<u64> {
        self.seq.try_decrement()
    }

    /// Returns the nonce the next mint would produce, ignoring the retry
    /// queue and advancing nothing.
    ///
    /// # Errors
    ///
    /// Propagates authority and lock failures from the mint strategy.
    pub fn current(&self) -> Result<u64> {
        self.seq.try_current()
    }

    /// Unconditionally overwrites the sequence position. Recovery and
    /// bootstrap only; queued failed nonces are left untouched.
    pub fn reset(&self, nonce: u64) {
        self.seq.reset(nonce);
    }

    /// Number of failed nonces currently queued for reissue.
    ///
    /// # Errors
    ///
    /// Fails only if the queue lock is poisoned.
    pub fn failed_len(&self) -> Result<usize> {
        let retry = {
            #[cfg(feature = "parking-lot")]
            {
                self.retry.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.retry.lock()?
            }
        };

        Ok(retry.len())
    }
}
