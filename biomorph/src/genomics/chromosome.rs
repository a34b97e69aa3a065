use crate::genomics::GeneVector;
use crate::{Error, EvaluationError, Result};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Evaluation state of a chromosome's phenotype.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum EvaluationStatus {
    /// The phenotype has not been computed yet.
    Unevaluated,
    /// The phenotype has been computed.
    Evaluated,
    /// The evaluator failed; the phenotype is empty.
    Failed(EvaluationError),
}

/// A gene vector together with its realized phenotype
/// and the selection weight assigned by the user.
///
/// `P` is the host's phenotype type, and is opaque
/// to the engine.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Chromosome<P> {
    genes: GeneVector,
    phenotype: Vec<P>,
    selection_weight: f64,
    index: usize,
    status: EvaluationStatus,
    parents: Option<(usize, usize)>,
}

impl<P> Chromosome<P> {
    /// Creates an unevaluated, unselected chromosome at
    /// position `index` of its population. No evaluation
    /// takes place.
    ///
    /// # Examples
    /// ```
    /// use biomorph::{Chromosome, EvaluationStatus, GeneVector};
    ///
    /// let genes = GeneVector::from_values(vec![0.25, 0.75]).unwrap();
    /// let chromosome = Chromosome::<()>::new(3, genes.clone());
    ///
    /// assert_eq!(chromosome.index(), 3);
    /// assert_eq!(chromosome.genes(), &genes);
    /// assert_eq!(chromosome.selection_weight(), 0.0);
    /// assert_eq!(chromosome.status(), &EvaluationStatus::Unevaluated);
    /// assert!(chromosome.phenotype().is_empty());
    /// ```
    pub fn new(index: usize, genes: GeneVector) -> Chromosome<P> {
        Chromosome {
            genes,
            phenotype: vec![],
            selection_weight: 0.0,
            index,
            status: EvaluationStatus::Unevaluated,
            parents: None,
        }
    }

    /// Creates an unevaluated child of the chromosomes at
    /// `parents` in the previous generation.
    pub(crate) fn offspring(
        index: usize,
        genes: GeneVector,
        parents: (usize, usize),
    ) -> Chromosome<P> {
        Chromosome {
            parents: Some(parents),
            ..Chromosome::new(index, genes)
        }
    }

    /// Copies the chromosome into position `index` of a new
    /// generation, keeping its genes and phenotype but
    /// resetting its selection weight.
    pub(crate) fn carried_over(&self, index: usize) -> Chromosome<P>
    where
        P: Clone,
    {
        Chromosome {
            genes: self.genes.clone(),
            phenotype: self.phenotype.clone(),
            selection_weight: 0.0,
            index,
            status: self.status.clone(),
            parents: Some((self.index, self.index)),
        }
    }

    /// Returns the chromosome's gene vector.
    pub fn genes(&self) -> &GeneVector {
        &self.genes
    }

    /// Returns the chromosome's phenotype, which is empty
    /// until evaluation succeeds.
    pub fn phenotype(&self) -> &[P] {
        &self.phenotype
    }

    pub fn selection_weight(&self) -> f64 {
        self.selection_weight
    }

    /// Sets the chromosome's selection weight.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `weight` is
    /// negative or not finite.
    ///
    /// # Examples
    /// ```
    /// use biomorph::{Chromosome, GeneVector};
    ///
    /// let genes = GeneVector::from_values(vec![0.5]).unwrap();
    /// let mut chromosome = Chromosome::<()>::new(0, genes);
    ///
    /// chromosome.set_selection_weight(2.5).unwrap();
    /// assert_eq!(chromosome.selection_weight(), 2.5);
    ///
    /// assert!(chromosome.set_selection_weight(-1.0).is_err());
    /// assert!(chromosome.set_selection_weight(f64::INFINITY).is_err());
    /// ```
    pub fn set_selection_weight(&mut self, weight: f64) -> Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "selection weight {} must be finite and non-negative",
                weight
            )));
        }
        self.selection_weight = weight;
        Ok(())
    }

    pub(crate) fn clear_selection_weight(&mut self) {
        self.selection_weight = 0.0;
    }

    /// Returns the chromosome's position within its population.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn status(&self) -> &EvaluationStatus {
        &self.status
    }

    /// Returns the indices of the chromosome's parents in
    /// the previous generation, or `None` for chromosomes
    /// of an initial population.
    pub fn parents(&self) -> Option<(usize, usize)> {
        self.parents
    }

    pub fn is_evaluated(&self) -> bool {
        self.status == EvaluationStatus::Evaluated
    }

    pub fn is_pending(&self) -> bool {
        self.status == EvaluationStatus::Unevaluated
    }

    pub fn evaluation_failed(&self) -> bool {
        matches!(self.status, EvaluationStatus::Failed(_))
    }

    /// Stores the outcome of an evaluation.
    pub(crate) fn record_evaluation(
        &mut self,
        outcome: std::result::Result<Vec<P>, EvaluationError>,
    ) {
        match outcome {
            Ok(phenotype) => {
                self.phenotype = phenotype;
                self.status = EvaluationStatus::Evaluated;
            }
            Err(e) => {
                self.phenotype.clear();
                self.status = EvaluationStatus::Failed(e);
            }
        }
    }
}

impl<P> fmt::Display for Chromosome<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} w={:.3}{}",
            self.index,
            self.genes,
            self.selection_weight,
            match &self.status {
                EvaluationStatus::Unevaluated => " (unevaluated)",
                EvaluationStatus::Evaluated => "",
                EvaluationStatus::Failed(_) => " (failed)",
            }
        )
    }
}
