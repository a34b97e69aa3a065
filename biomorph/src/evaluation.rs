//! The boundary between the engine and its host.
//!
//! The host realizes phenotypes through the [`Evaluator`]
//! trait. Access to the host's shared document goes through
//! a [`SharedResource`], and re-entrant apply requests are
//! rejected by a [`GeneApplicator`].
mod apply;
mod resource;

pub use apply::{ApplyGuard, ApplyState, GeneApplicator};
pub use resource::SharedResource;

use crate::{EvaluationError, GeneVector};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An interface for hosts that turn gene vectors into phenotypes.
pub trait Evaluator {
    type Phenotype;

    /// Returns the number of controls the host currently
    /// exposes, which must equal the gene vector length.
    fn gene_count(&self) -> usize;

    /// Realizes the phenotype of a gene vector.
    ///
    /// May be slow; the engine calls it once per chromosome,
    /// strictly one call at a time.
    fn evaluate(&mut self, genes: &GeneVector) -> Result<Vec<Self::Phenotype>, EvaluationError>;
}

/// A cloneable flag used to abort the evaluation of
/// a generation from another thread.
///
/// # Examples
/// ```
/// use biomorph::CancellationToken;
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
///
/// assert!(!token.is_cancelled());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> CancellationToken {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clears the flag so the token can be reused.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Outcome of an evaluation pass over a population.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvaluationReport {
    /// Number of chromosomes successfully evaluated in this pass.
    pub evaluated: usize,
    /// Indices of chromosomes whose evaluation failed in this pass.
    pub failed: Vec<usize>,
    /// Number of chromosomes still awaiting evaluation.
    pub pending: usize,
    /// Whether the pass stopped early on cancellation.
    pub cancelled: bool,
}

impl EvaluationReport {
    /// Returns whether every chromosome has been dealt with.
    pub fn is_complete(&self) -> bool {
        self.pending == 0
    }
}
