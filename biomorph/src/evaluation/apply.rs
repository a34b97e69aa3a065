use crate::{Error, Result};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// State of a [`GeneApplicator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyState {
    /// No genes are being applied; new requests are accepted.
    Idle,
    /// Genes are being applied to the host; new requests are rejected.
    ApplyingGenes,
}

/// Guards the host against re-entrant apply requests.
///
/// Applying genes usually triggers a host recompute, which
/// may in turn ask for genes to be applied again. Every party
/// applying genes to the same host holds a clone of one
/// applicator; while one of them holds an [`ApplyGuard`] all
/// other requests fail with [`Error::ApplyInProgress`].
///
/// # Examples
/// ```
/// use biomorph::{ApplyState, Error, GeneApplicator};
///
/// let applicator = GeneApplicator::new();
/// let reader = applicator.clone();
///
/// let guard = applicator.begin().unwrap();
/// assert_eq!(reader.state(), ApplyState::ApplyingGenes);
/// assert_eq!(reader.begin().unwrap_err(), Error::ApplyInProgress);
///
/// drop(guard);
/// assert_eq!(reader.state(), ApplyState::Idle);
/// ```
#[derive(Clone, Debug, Default)]
pub struct GeneApplicator {
    applying: Arc<AtomicBool>,
}

impl GeneApplicator {
    pub fn new() -> GeneApplicator {
        GeneApplicator::default()
    }

    pub fn state(&self) -> ApplyState {
        if self.applying.load(Ordering::SeqCst) {
            ApplyState::ApplyingGenes
        } else {
            ApplyState::Idle
        }
    }

    /// Moves from `Idle` to `ApplyingGenes`. The applicator
    /// returns to `Idle` when the guard is dropped.
    ///
    /// # Errors
    /// Returns [`Error::ApplyInProgress`] if genes are already
    /// being applied.
    pub fn begin(&self) -> Result<ApplyGuard> {
        self.applying
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| Error::ApplyInProgress)?;
        Ok(ApplyGuard {
            applying: Arc::clone(&self.applying),
        })
    }
}

/// Proof that genes are being applied. Returns its
/// applicator to `Idle` on drop.
#[derive(Debug)]
pub struct ApplyGuard {
    applying: Arc<AtomicBool>,
}

impl Drop for ApplyGuard {
    fn drop(&mut self) {
        self.applying.store(false, Ordering::SeqCst);
    }
}
