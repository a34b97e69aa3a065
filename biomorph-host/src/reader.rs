use crate::document::{Document, Model};
use crate::errors::{HostError, Result};

use biomorph::{GeneApplicator, GeneVector, SharedResource};

/// Applies one design of an exported population back onto
/// the document, so the user can inspect or keep it.
///
/// The reader and the session's evaluator share one
/// [`GeneApplicator`], so a design is never applied while
/// another one is being evaluated.
#[derive(Debug)]
pub struct DesignReader<M> {
    document: SharedResource<Document<M>>,
    applicator: GeneApplicator,
}

impl<M: Model> DesignReader<M> {
    pub fn new(document: SharedResource<Document<M>>, applicator: GeneApplicator) -> DesignReader<M> {
        DesignReader {
            document,
            applicator,
        }
    }

    /// Applies row `design` of `population`, as produced by
    /// `Population::export_genes`, and returns the solved outputs.
    ///
    /// # Errors
    /// Returns [`HostError::DesignNotFound`] for a row outside the
    /// population, a [`HostError::Engine`] error if the row does
    /// not fit the document's controls or genes are already being
    /// applied, and [`HostError::Evaluation`] if the model fails.
    ///
    /// # Examples
    /// ```
    /// use biomorph::{EvaluationError, GeneApplicator, SharedResource};
    /// use biomorph_host::{ControlSet, DesignReader, Document, HostError, Model, ParameterValues, Slider};
    ///
    /// struct Echo;
    ///
    /// impl Model for Echo {
    ///     type Output = f64;
    ///
    ///     fn solve(&mut self, values: &ParameterValues) -> Result<Vec<f64>, EvaluationError> {
    ///         Ok(values.sliders.clone())
    ///     }
    /// }
    ///
    /// let controls = ControlSet::resolve(vec![Slider::new("x", 0.0, 100.0, 0)], vec![]).unwrap();
    /// let document = SharedResource::new(Document::new(Echo, controls));
    /// let reader = DesignReader::new(document, GeneApplicator::new());
    ///
    /// let population = vec![vec![0.25], vec![0.5]];
    /// assert_eq!(reader.apply(&population, 1).unwrap(), vec![50.0]);
    /// assert_eq!(
    ///     reader.apply(&population, 2).unwrap_err(),
    ///     HostError::DesignNotFound { requested: 2, available: 2 }
    /// );
    /// ```
    pub fn apply(&self, population: &[Vec<f64>], design: usize) -> Result<Vec<M::Output>> {
        let row = population.get(design).ok_or(HostError::DesignNotFound {
            requested: design,
            available: population.len(),
        })?;
        let genes = GeneVector::from_values(row.clone())?;

        let _guard = self.applicator.begin()?;
        let outputs = self.document.with_exclusive(|d| {
            let expected = d.controls().gene_count();
            if genes.len() != expected {
                return Err(HostError::Engine(biomorph::Error::ControlCountMismatch {
                    expected: genes.len(),
                    found: expected,
                }));
            }
            Ok(d.apply_and_solve(&genes)?)
        })??;
        log::debug!("applied design {}", design);
        Ok(outputs)
    }
}
