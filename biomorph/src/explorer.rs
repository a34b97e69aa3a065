use crate::evaluation::{CancellationToken, EvaluationReport, Evaluator};
use crate::history::GenerationHistory;
use crate::logging::GenerationSummary;
use crate::populations::sampling::SamplingStrategy;
use crate::populations::{PartialGenerationPolicy, Population, PopulationConfig};
use crate::{Error, GeneVector, Result};

use rand::{rngs::StdRng, SeedableRng};

/// An exploration session: the live population, the
/// history of every generation before it, and the random
/// source they are bred with.
///
/// # Examples
/// ```
/// use biomorph::{CancellationToken, EvaluationError, Evaluator, Explorer, GeneVector, PopulationConfig};
///
/// struct Mean;
///
/// impl Evaluator for Mean {
///     type Phenotype = f64;
///
///     fn gene_count(&self) -> usize {
///         3
///     }
///
///     fn evaluate(&mut self, genes: &GeneVector) -> Result<Vec<f64>, EvaluationError> {
///         Ok(vec![genes.iter().sum::<f64>() / 3.0])
///     }
/// }
///
/// let cancel = CancellationToken::new();
/// let mut explorer = Explorer::new(PopulationConfig::default(), 3, Some(7)).unwrap();
/// explorer.evaluate_current(&mut Mean, &cancel).unwrap();
///
/// explorer.select(2).unwrap();
/// explorer.select(5).unwrap();
/// explorer.breed_next_generation(&mut Mean, &cancel).unwrap();
///
/// assert_eq!(explorer.generation(), 1);
/// assert_eq!(explorer.history().len(), 1);
/// assert!(explorer.population().is_complete());
/// ```
#[derive(Debug)]
pub struct Explorer<P> {
    population: Population<P>,
    history: GenerationHistory<P>,
    rng: StdRng,
}

impl<P> Explorer<P> {
    /// Starts a session with a random generation 0.
    ///
    /// A `seed` makes the whole session reproducible; without
    /// one the random source is seeded from system entropy.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] for an invalid
    /// config or a `gene_count` of 0.
    pub fn new(config: PopulationConfig, gene_count: usize, seed: Option<u64>) -> Result<Explorer<P>> {
        Self::seeded(vec![], gene_count, config, seed)
    }

    /// Starts a session whose generation 0 begins with the
    /// given gene vectors.
    ///
    /// # Errors
    /// As [`Population::new_seeded`].
    pub fn seeded(
        seeds: Vec<GeneVector>,
        gene_count: usize,
        config: PopulationConfig,
        seed: Option<u64>,
    ) -> Result<Explorer<P>> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let population = Population::new_seeded(seeds, gene_count, config, &mut rng)?;
        Ok(Explorer {
            population,
            history: GenerationHistory::new(),
            rng,
        })
    }

    /// Returns the live population.
    pub fn population(&self) -> &Population<P> {
        &self.population
    }

    /// Returns every generation before the live one.
    pub fn history(&self) -> &GenerationHistory<P> {
        &self.history
    }

    pub fn generation(&self) -> usize {
        self.population.generation()
    }

    pub fn set_selection_weight(&mut self, index: usize, weight: f64) -> Result<()> {
        self.population.set_selection_weight(index, weight)
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        self.population.select(index)
    }

    pub fn clear_selections(&mut self) {
        self.population.clear_selections()
    }

    /// Evaluates the live population's pending chromosomes.
    ///
    /// # Errors
    /// As [`Population::evaluate`].
    pub fn evaluate_current<E>(
        &mut self,
        evaluator: &mut E,
        cancel: &CancellationToken,
    ) -> Result<EvaluationReport>
    where
        E: Evaluator<Phenotype = P> + ?Sized,
    {
        self.population.evaluate(evaluator, cancel)
    }

    /// Breeds, evaluates and commits the next generation.
    /// The live population moves into the history and its
    /// offspring take its place.
    ///
    /// If `cancel` fires during evaluation, the configured
    /// [`PartialGenerationPolicy`] decides the outcome:
    /// `Discard` drops the offspring and leaves the session
    /// as it was, `RetainDegraded` commits them with their
    /// remaining chromosomes pending.
    ///
    /// # Errors
    /// Returns [`Error::ControlCountMismatch`] before breeding
    /// if the evaluator no longer matches the gene vector
    /// length, [`Error::NoSelection`] if nothing is selected,
    /// and [`Error::Cancelled`] for a discarded generation.
    /// The session is unchanged on every error.
    pub fn breed_next_generation<E>(
        &mut self,
        evaluator: &mut E,
        cancel: &CancellationToken,
    ) -> Result<EvaluationReport>
    where
        P: Clone,
        E: Evaluator<Phenotype = P> + ?Sized,
    {
        if evaluator.gene_count() != self.population.gene_count() {
            return Err(Error::ControlCountMismatch {
                expected: self.population.gene_count(),
                found: evaluator.gene_count(),
            });
        }
        let mut offspring = self.population.breed(&mut self.rng)?;
        let report = offspring.evaluate(evaluator, cancel)?;

        if report.cancelled {
            match self.population.config().partial_generation_policy {
                PartialGenerationPolicy::Discard => {
                    log::info!(
                        "generation {} cancelled, discarding {} offspring",
                        offspring.generation(),
                        offspring.size()
                    );
                    // Carried-over elites need no evaluation.
                    let evaluated = report.evaluated + report.failed.len();
                    return Err(Error::Cancelled {
                        evaluated,
                        total: evaluated + report.pending,
                    });
                }
                PartialGenerationPolicy::RetainDegraded => log::warn!(
                    "generation {} cancelled, keeping it with {} pending chromosomes",
                    offspring.generation(),
                    report.pending
                ),
            }
        }

        self.commit(offspring)?;
        Ok(report)
    }

    /// Makes a copy of generation `generation` the live
    /// population, with selections cleared. The restored
    /// designs become a new generation, so the history
    /// stays append-only.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the generation does
    /// not exist.
    pub fn revert_to(&mut self, generation: usize) -> Result<()>
    where
        P: Clone,
    {
        let restored = self
            .snapshot(generation)?
            .restored_as(self.population.generation() + 1);
        log::info!(
            "restoring generation {} as generation {}",
            generation,
            restored.generation()
        );
        self.commit(restored)
    }

    /// Returns generation `generation`, whether it is in the
    /// history or is the live population.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if it does not exist yet.
    pub fn snapshot(&self, generation: usize) -> Result<&Population<P>> {
        if generation == self.population.generation() {
            return Ok(&self.population);
        }
        self.history.get(generation).map_err(|_| Error::NotFound {
            requested: generation,
            len: self.history.len() + 1,
        })
    }

    /// Returns the indices of up to `count` chromosomes of
    /// the live population, picked by `strategy`.
    pub fn representatives<S>(&self, strategy: &S, count: usize) -> Vec<usize>
    where
        S: SamplingStrategy,
    {
        strategy.sample(&self.population, count)
    }

    pub fn summary(&self) -> GenerationSummary {
        GenerationSummary::from(&self.population)
    }

    fn commit(&mut self, next: Population<P>) -> Result<()>
    where
        P: Clone,
    {
        self.history.append(&self.population)?;
        self.population = next;
        log::info!("{}", self.summary());
        Ok(())
    }
}
