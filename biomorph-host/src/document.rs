use crate::controls::{ControlSet, ParameterValues};

use biomorph::{EvaluationError, GeneVector};

/// A parametric model that solves real-valued inputs into
/// geometric outputs.
pub trait Model {
    type Output;

    /// Recomputes the model for `values`.
    fn solve(&mut self, values: &ParameterValues) -> Result<Vec<Self::Output>, EvaluationError>;
}

/// A model bound to the controls that drive it.
///
/// The document is the host resource every evaluation mutates.
/// Share it between an evaluator and a reader by wrapping it in
/// a [`biomorph::SharedResource`].
#[derive(Debug)]
pub struct Document<M> {
    model: M,
    controls: ControlSet,
    values: Option<ParameterValues>,
    solves: usize,
}

impl<M: Model> Document<M> {
    pub fn new(model: M, controls: ControlSet) -> Document<M> {
        Document {
            model,
            controls,
            values: None,
            solves: 0,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn controls(&self) -> &ControlSet {
        &self.controls
    }

    /// Replaces the control set. Sessions bound to the old
    /// set will fail with a control count mismatch if the
    /// gene count changes.
    pub fn set_controls(&mut self, controls: ControlSet) {
        self.controls = controls;
    }

    /// Returns the values most recently applied to the controls.
    pub fn values(&self) -> Option<&ParameterValues> {
        self.values.as_ref()
    }

    /// Returns the number of recomputes so far.
    pub fn solve_count(&self) -> usize {
        self.solves
    }

    /// Sets every control from `genes`, then recomputes
    /// the model once.
    ///
    /// # Errors
    /// Returns an [`EvaluationError`] if the genes do not fit
    /// the controls or the model fails to solve. The controls
    /// are left untouched in the first case.
    pub fn apply_and_solve(&mut self, genes: &GeneVector) -> Result<Vec<M::Output>, EvaluationError> {
        let values = self
            .controls
            .decode(genes)
            .map_err(|e| EvaluationError::new(e.to_string()))?;
        self.solves += 1;
        let outputs = self.model.solve(&values);
        self.values = Some(values);
        outputs
    }
}
