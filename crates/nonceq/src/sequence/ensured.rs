use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Authority, Error, Result, mutex::Mutex, sequence::NonceSequence};

/// A nonce sequence that reconciles against the authority on every
/// operation.
///
/// This strategy retains the authority and identity it was constructed
/// with. Each increment, decrement, and read re-queries the authority under
/// an exclusive gate, so the query and the local mutation form one atomic
/// unit: no two callers can interleave such that a stale authoritative read
/// feeds both results. The sequence therefore never falls behind external
/// reality — another process or a direct submission advancing the real
/// counter is adopted on the next operation.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Reconciles against the authority
/// - ❌ Lock-free (operations serialize on the gate and may block on the
///   authority's I/O)
///
/// ## Recommended When
/// - Other writers may advance the identity's counter behind your back
/// - Correctness against the mempool matters more than latency
///
/// ## See Also
/// - [`AtomicNonceSequence`]
///
/// [`AtomicNonceSequence`]: crate::AtomicNonceSequence
#[derive(Debug)]
pub struct EnsuredNonceSequence<A: Authority> {
    // Writers other than `reset` hold `gate`.
    pub(crate) current: AtomicU64,
    gate: Mutex<()>,
    authority: A,
    identity: String,
}

impl<A: Authority> EnsuredNonceSequence<A> {
    /// Creates a sequence seeded with one query against `authority`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authority`] if the seed query fails.
    ///
    /// # Example
    /// ```
    /// use core::convert::Infallible;
    /// use nonceq::{Authority, EnsuredNonceSequence};
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
    /// let seq = EnsuredNonceSequence::new(StaticAuthority(10), "0xabc")?;
    /// assert_eq!(seq.try_increment()?, 10);
    /// # Ok::<(), nonceq::Error>(())
    /// ```
    pub fn new(authority: A, identity: impl Into<String>) -> Result<Self> {
        let identity = identity.into();
        let seed = authority
            .pending_nonce(&identity)
            .map_err(Error::authority)?;
        Ok(Self::with_start(authority, identity, seed))
    }

    /// Creates a sequence at an explicit starting position, without
    /// querying the authority.
    ///
    /// Useful for restoring state from storage or pinning a starting point
    /// in tests. In typical use, prefer [`Self::new`] and let the seed
    /// query position the sequence.
    pub fn with_start(authority: A, identity: impl Into<String>, start: u64) -> Self {
        Self {
            current: AtomicU64::new(start),
            gate: Mutex::new(()),
            authority,
            identity: identity.into(),
        }
    }

    /// Returns the nonce to use and advances the sequence past it.
    ///
    /// Under the gate: queries the authority, adopts the authoritative
    /// value if it exceeds the locally tracked one, then advances by one
    /// and returns the pre-increment value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authority`] if the query fails; the local position
    /// is left untouched in that case.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_increment(&self) -> Result<u64> {
        let _gate = {
            #[cfg(feature = "parking-lot")]
            {
                self.gate.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.gate.lock()?
            }
        };

        let pending = self.query()?;
        let current = self.current.load(Ordering::Relaxed).max(pending);
        self.current.store(current.wrapping_add(1), Ordering::Relaxed);

        Ok(current)
    }

    /// Rolls the sequence back by one, clamped to the authority's floor.
    ///
    /// Under the gate: subtracts one from the local position, then queries
    /// the authority and clamps the position upward to the authoritative
    /// value — the sequence never rolls back below ground truth. Returns
    /// the resulting current value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authority`] if the query fails. The subtraction has
    /// already been applied by then and persists.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_decrement(&self) -> Result<u64> {
        let _gate = {
            #[cfg(feature = "parking-lot")]
            {
                self.gate.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.gate.lock()?
            }
        };

        let rolled = self.current.load(Ordering::Relaxed).wrapping_sub(1);
        self.current.store(rolled, Ordering::Relaxed);

        let pending = self.query()?;
        let current = rolled.max(pending);
        self.current.store(current, Ordering::Relaxed);

        Ok(current)
    }

    /// Returns the nonce the next mint would produce, without advancing.
    ///
    /// Under the gate: queries the authority and returns the maximum of the
    /// authoritative value and the local position. Mutates nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authority`] if the query fails.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_current(&self) -> Result<u64> {
        let _gate = {
            #[cfg(feature = "parking-lot")]
            {
                self.gate.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.gate.lock()?
            }
        };

        let pending = self.query()?;
        Ok(self.current.load(Ordering::Relaxed).max(pending))
    }

    /// Unconditionally overwrites the sequence position.
    ///
    /// A bare atomic store: no reconciliation and no gate. Intended for
    /// recovery and bootstrap, not normal operation.
    pub fn reset(&self, nonce: u64) {
        self.current.store(nonce, Ordering::Relaxed);
    }

    fn query(&self) -> Result<u64> {
        self.authority
            .pending_nonce(&self.identity)
            .map_err(Error::authority)
    }
}

impl<A: Authority> NonceSequence for EnsuredNonceSequence<A> {
    fn try_increment(&self) -> Result<u64> {
        Self::try_increment(self)
    }

    fn try_decrement(&self) -> Result<u64> {
        Self::try_decrement(self)
    }

    fn try_current(&self) -> Result<u64> {
        Self::try_current(self)
    }

    fn reset(&self, nonce: u64) {
        Self::reset(self, nonce);
    }
}
