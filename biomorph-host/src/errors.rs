use biomorph::EvaluationError;
use thiserror::Error;

/// Errors raised while binding a parametric document to the engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// Two controls share an identifier.
    #[error("control identifier {0:?} is used more than once")]
    DuplicateControl(String),

    /// A control's range is empty, inverted or not finite.
    #[error("control {id:?} has invalid range [{min}, {max}]")]
    InvalidRange { id: String, min: f64, max: f64 },

    /// A gene pool without any slots.
    #[error("gene pool {0:?} has no slots")]
    EmptyGenePool(String),

    /// The document exposes no controls to evolve.
    #[error("no controls to evolve")]
    NoControls,

    /// The requested design is not in the exported population.
    #[error("design {requested} not found (population holds {available} designs)")]
    DesignNotFound { requested: usize, available: usize },

    #[error(transparent)]
    Engine(#[from] biomorph::Error),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

pub type Result<T> = std::result::Result<T, HostError>;
