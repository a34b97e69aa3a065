use crate::document::{Document, Model};

use biomorph::{EvaluationError, Evaluator, GeneApplicator, GeneVector, SharedResource};

/// An [`Evaluator`] that realizes gene vectors by applying them
/// to a shared [`Document`] and solving it.
///
/// Each evaluation is one critical section: the document is
/// locked, its controls set, the model solved and the outputs
/// read back before the lock is released.
///
/// # Examples
/// ```
/// use biomorph::{CancellationToken, EvaluationError, Explorer, GeneApplicator, PopulationConfig, SharedResource};
/// use biomorph_host::{ControlSet, Document, Model, ParameterEvaluator, ParameterValues, Slider};
///
/// struct Area;
///
/// impl Model for Area {
///     type Output = f64;
///
///     fn solve(&mut self, values: &ParameterValues) -> Result<Vec<f64>, EvaluationError> {
///         Ok(vec![values.sliders[0] * values.sliders[1]])
///     }
/// }
///
/// let controls = ControlSet::resolve(
///     vec![Slider::new("width", 1.0, 5.0, 2), Slider::new("depth", 1.0, 5.0, 2)],
///     vec![],
/// )
/// .unwrap();
/// let document = SharedResource::new(Document::new(Area, controls));
/// let mut evaluator = ParameterEvaluator::new(document.clone(), GeneApplicator::new());
///
/// let mut explorer = Explorer::new(PopulationConfig::default(), 2, Some(0)).unwrap();
/// explorer.evaluate_current(&mut evaluator, &CancellationToken::new()).unwrap();
///
/// assert!(explorer.population().is_complete());
/// assert_eq!(document.with_exclusive(|d| d.solve_count()).unwrap(), 12);
/// ```
#[derive(Debug)]
pub struct ParameterEvaluator<M> {
    document: SharedResource<Document<M>>,
    applicator: GeneApplicator,
}

impl<M: Model> ParameterEvaluator<M> {
    /// Binds an evaluator to a document. Readers applying
    /// designs to the same document must share `applicator`.
    pub fn new(document: SharedResource<Document<M>>, applicator: GeneApplicator) -> ParameterEvaluator<M> {
        ParameterEvaluator {
            document,
            applicator,
        }
    }

    pub fn document(&self) -> &SharedResource<Document<M>> {
        &self.document
    }
}

impl<M: Model> Evaluator for ParameterEvaluator<M> {
    type Phenotype = M::Output;

    /// Counts the document's controls. A poisoned document still
    /// reports its real count, so the failure surfaces from
    /// [`evaluate`](Evaluator::evaluate) instead of as a control
    /// count mismatch.
    fn gene_count(&self) -> usize {
        if self.document.is_poisoned() {
            log::error!("parametric document is poisoned, evaluations will fail");
        }
        self.document.inspect(|d| d.controls().gene_count())
    }

    fn evaluate(&mut self, genes: &GeneVector) -> Result<Vec<M::Output>, EvaluationError> {
        let _guard = self
            .applicator
            .begin()
            .map_err(|e| EvaluationError::new(e.to_string()))?;
        self.document.with_exclusive(|d| d.apply_and_solve(genes))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{ControlSet, GenePool, ParameterValues, Slider};
    use biomorph::{ApplyState, CancellationToken, Error, Explorer, PopulationConfig};

    /// Sums all inputs; fails when the sum is above `limit`.
    struct Budget {
        limit: f64,
    }

    impl Model for Budget {
        type Output = f64;

        fn solve(&mut self, values: &ParameterValues) -> Result<Vec<f64>, EvaluationError> {
            let total = values.sliders.iter().sum::<f64>()
                + values.gene_pools.iter().flatten().sum::<f64>();
            if total > self.limit {
                Err(EvaluationError::new(format!("over budget: {}", total)))
            } else {
                Ok(vec![total])
            }
        }
    }

    fn document(limit: f64) -> SharedResource<Document<Budget>> {
        let controls = ControlSet::resolve(
            vec![Slider::new("a", 0.0, 1.0, 3)],
            vec![GenePool::new("p", 0.0, 1.0, 2)],
        )
        .unwrap();
        SharedResource::new(Document::new(Budget { limit }, controls))
    }

    #[test]
    fn failing_solves_are_recorded_and_the_rest_evaluated() {
        let document = document(1.5);
        let mut evaluator = ParameterEvaluator::new(document.clone(), GeneApplicator::new());
        let mut explorer = Explorer::new(PopulationConfig::default(), 3, Some(11)).unwrap();

        let report = explorer
            .evaluate_current(&mut evaluator, &CancellationToken::new())
            .unwrap();
        assert!(report.is_complete());
        assert_eq!(report.evaluated + report.failed.len(), 12);
        for c in explorer.population().chromosomes() {
            let sum: f64 = c.genes().iter().sum();
            if c.evaluation_failed() {
                assert!(sum > 1.4);
            } else {
                assert_eq!(c.phenotype().len(), 1);
            }
        }
        assert_eq!(document.with_exclusive(|d| d.solve_count()).unwrap(), 12);
    }

    #[test]
    fn changed_controls_are_detected_before_breeding() {
        let document = document(10.0);
        let mut evaluator = ParameterEvaluator::new(document.clone(), GeneApplicator::new());
        let mut explorer = Explorer::new(PopulationConfig::default(), 3, Some(1)).unwrap();
        explorer.select(0).unwrap();

        document
            .with_exclusive(|d| {
                d.set_controls(
                    ControlSet::resolve(vec![Slider::new("only", 0.0, 1.0, 0)], vec![]).unwrap(),
                )
            })
            .unwrap();
        assert_eq!(
            explorer
                .breed_next_generation(&mut evaluator, &CancellationToken::new())
                .unwrap_err(),
            Error::ControlCountMismatch {
                expected: 3,
                found: 1
            }
        );
    }

    #[test]
    fn poisoned_document_fails_evaluations_not_the_control_count() {
        let document = document(10.0);
        let handle = document.clone();
        let _ = std::thread::spawn(move || {
            let _ = handle.with_exclusive(|_| panic!("solver crashed"));
        })
        .join();

        let mut evaluator = ParameterEvaluator::new(document.clone(), GeneApplicator::new());
        assert!(evaluator.document().is_poisoned());
        assert_eq!(evaluator.gene_count(), 3);
        let genes = GeneVector::from_values(vec![0.1, 0.2, 0.3]).unwrap();
        assert!(evaluator
            .evaluate(&genes)
            .unwrap_err()
            .message()
            .contains("poisoned"));

        let mut explorer = Explorer::new(PopulationConfig::default(), 3, Some(2)).unwrap();
        let report = explorer
            .evaluate_current(&mut evaluator, &CancellationToken::new())
            .unwrap();
        assert_eq!(report.failed.len(), 12);
    }

    #[test]
    fn evaluation_is_refused_while_applying() {
        let applicator = GeneApplicator::new();
        let mut evaluator = ParameterEvaluator::new(document(10.0), applicator.clone());
        let genes = GeneVector::from_values(vec![0.1, 0.2, 0.3]).unwrap();

        let guard = applicator.begin().unwrap();
        assert!(evaluator.evaluate(&genes).is_err());
        drop(guard);

        assert_eq!(evaluator.evaluate(&genes).unwrap().len(), 1);
        assert_eq!(applicator.state(), ApplyState::Idle);
    }
}
