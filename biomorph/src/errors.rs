use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the exploration engine.
///
/// Per-chromosome evaluation failures are not part of this
/// type; they are recorded against the chromosome as an
/// [`EvaluationError`] and never abort a generation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed sizes, rates, lengths or indices.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Every chromosome in the population has a zero selection weight.
    #[error("no chromosome has been selected for breeding")]
    NoSelection,

    /// The requested generation is not in the history.
    #[error("generation {requested} not found (history holds {len} generations)")]
    NotFound { requested: usize, len: usize },

    /// The history holds no generations yet.
    #[error("generation history is empty")]
    Empty,

    /// Internal consistency has been broken. Not recoverable.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// The host's control set no longer matches the gene vector length.
    #[error("gene vectors have {expected} genes but the host exposes {found} controls")]
    ControlCountMismatch { expected: usize, found: usize },

    /// Genes are already being applied to the host.
    #[error("an apply request is already in progress")]
    ApplyInProgress,

    /// Evaluation of a generation was cancelled and the generation discarded.
    #[error("generation cancelled after {evaluated} of {total} evaluations")]
    Cancelled { evaluated: usize, total: usize },
}

/// A failure to realize the phenotype of a single gene vector.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("evaluation failed: {message}")]
pub struct EvaluationError {
    message: String,
}

impl EvaluationError {
    /// Returns a new evaluation error with the given description.
    ///
    /// # Examples
    /// ```
    /// use biomorph::EvaluationError;
    ///
    /// let error = EvaluationError::new("self-intersecting surface");
    /// assert_eq!(error.message(), "self-intersecting surface");
    /// assert_eq!(error.to_string(), "evaluation failed: self-intersecting surface");
    /// ```
    pub fn new(message: impl Into<String>) -> EvaluationError {
        EvaluationError {
            message: message.into(),
        }
    }

    /// Returns the error's description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type Result<T> = std::result::Result<T, Error>;
