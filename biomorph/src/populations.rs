//! A Population is one generation of chromosomes.
//! Users assign selection weights to the designs they
//! prefer, and the next generation is bred from them
//! through roulette-wheel selection, crossover and mutation.
mod config;
mod offspring_factory;
mod roulette;
pub mod sampling;

use crate::evaluation::{CancellationToken, EvaluationReport, Evaluator};
use crate::genomics::{Chromosome, GeneVector};
use crate::{Error, Result};
pub use config::{PartialGenerationPolicy, PopulationConfig, ZeroWeightPolicy};
use offspring_factory::OffspringFactory;
pub use roulette::RouletteWheel;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// One generation of chromosomes.
///
/// `P` is the host's phenotype type.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Population<P> {
    generation: usize,
    chromosomes: Vec<Chromosome<P>>,
    gene_count: usize,
    config: PopulationConfig,
}

impl<P> Population<P> {
    /// Creates generation 0 with `config.size` random gene
    /// vectors of length `gene_count`. Nothing is evaluated.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the config is
    /// invalid or `gene_count` is 0.
    ///
    /// # Examples
    /// ```
    /// use biomorph::{Population, PopulationConfig};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let population = Population::<()>::new(PopulationConfig::default(), 5, &mut rng).unwrap();
    ///
    /// assert_eq!(population.generation(), 0);
    /// assert_eq!(population.size(), 12);
    /// assert!(population.chromosomes().iter().all(|c| c.genes().len() == 5));
    /// ```
    pub fn new<R: Rng + ?Sized>(
        config: PopulationConfig,
        gene_count: usize,
        rng: &mut R,
    ) -> Result<Population<P>> {
        Self::new_seeded(vec![], gene_count, config, rng)
    }

    /// Creates generation 0 starting with the given gene
    /// vectors, filling the remaining space with random ones.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the config is
    /// invalid, `gene_count` is 0, there are more seeds than
    /// the configured size, or a seed's length is not `gene_count`.
    ///
    /// # Examples
    /// ```
    /// use biomorph::{GeneVector, Population, PopulationConfig};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let seed = GeneVector::from_values(vec![0.5, 0.5, 0.5]).unwrap();
    /// let population = Population::<()>::new_seeded(
    ///     vec![seed.clone()],
    ///     3,
    ///     PopulationConfig::default(),
    ///     &mut rng,
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(population.chromosomes()[0].genes(), &seed);
    /// assert_eq!(population.size(), 12);
    /// ```
    pub fn new_seeded<R: Rng + ?Sized>(
        seeds: Vec<GeneVector>,
        gene_count: usize,
        config: PopulationConfig,
        rng: &mut R,
    ) -> Result<Population<P>> {
        config.validate()?;
        if gene_count == 0 {
            return Err(Error::InvalidArgument(
                "gene vector length must be positive".into(),
            ));
        }
        if seeds.len() > config.size {
            return Err(Error::InvalidArgument(format!(
                "{} seed gene vectors exceed population size {}",
                seeds.len(),
                config.size
            )));
        }
        if let Some(seed) = seeds.iter().find(|s| s.len() != gene_count) {
            return Err(Error::InvalidArgument(format!(
                "seed gene vector has length {}, expected {}",
                seed.len(),
                gene_count
            )));
        }

        let random_count = config.size - seeds.len();
        let mut genes = seeds;
        for _ in 0..random_count {
            genes.push(GeneVector::random(gene_count, rng)?);
        }

        Ok(Population {
            generation: 0,
            chromosomes: genes
                .into_iter()
                .enumerate()
                .map(|(i, g)| Chromosome::new(i, g))
                .collect(),
            gene_count,
            config,
        })
    }

    /// Returns the generation number.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the number of chromosomes.
    pub fn size(&self) -> usize {
        self.chromosomes.len()
    }

    /// Returns the length shared by all gene vectors.
    pub fn gene_count(&self) -> usize {
        self.gene_count
    }

    pub fn mutation_rate(&self) -> f64 {
        self.config.mutation_rate
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    /// Returns all chromosomes in population order.
    pub fn chromosomes(&self) -> &[Chromosome<P>] {
        &self.chromosomes
    }

    pub fn chromosome(&self, index: usize) -> Option<&Chromosome<P>> {
        self.chromosomes.get(index)
    }

    /// Sets the selection weight of chromosome `index`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `index` is out of
    /// range, or the weight is negative or not finite.
    pub fn set_selection_weight(&mut self, index: usize, weight: f64) -> Result<()> {
        let size = self.size();
        self.chromosomes
            .get_mut(index)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "chromosome {} out of range for population of {}",
                    index, size
                ))
            })?
            .set_selection_weight(weight)
    }

    /// Marks chromosome `index` as preferred (weight 1).
    pub fn select(&mut self, index: usize) -> Result<()> {
        self.set_selection_weight(index, 1.0)
    }

    /// Resets every selection weight to 0.
    pub fn clear_selections(&mut self) {
        for c in &mut self.chromosomes {
            c.clear_selection_weight();
        }
    }

    /// Returns the indices of all chromosomes with a nonzero weight.
    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.chromosomes
            .iter()
            .filter(|c| c.selection_weight() > 0.0)
            .map(|c| c.index())
    }

    /// Returns each chromosome's chance of being drawn as a
    /// parent, honouring the configured [`ZeroWeightPolicy`].
    ///
    /// # Errors
    /// Returns [`Error::NoSelection`] if all weights are zero
    /// and the policy is [`ZeroWeightPolicy::Fail`].
    pub fn selection_probabilities(&self) -> Result<Vec<f64>> {
        Ok(RouletteWheel::new(&self.breeding_weights()?)?.probabilities())
    }

    /// Returns the weights parents are drawn with.
    fn breeding_weights(&self) -> Result<Vec<f64>> {
        let weights: Vec<f64> = self
            .chromosomes
            .iter()
            .map(|c| c.selection_weight())
            .collect();
        if weights.iter().any(|w| *w > 0.0) {
            return Ok(weights);
        }
        match self.config.zero_weight_policy {
            ZeroWeightPolicy::Fail => Err(Error::NoSelection),
            ZeroWeightPolicy::Uniform => {
                log::warn!(
                    "no chromosomes selected in generation {}, breeding with uniform weights",
                    self.generation
                );
                Ok(vec![1.0; weights.len()])
            }
        }
    }

    /// Breeds the next generation from the current selection
    /// weights. The population itself is left untouched.
    ///
    /// Parents are drawn independently by roulette-wheel
    /// selection, recombined with the configured crossover
    /// policy and mutated at the configured rate. The top
    /// [`elitism`] selected chromosomes are copied first,
    /// phenotypes included. Offspring start unselected and
    /// unevaluated.
    ///
    /// # Errors
    /// Returns [`Error::NoSelection`] if no chromosome is
    /// selected (see [`ZeroWeightPolicy`]),
    /// [`Error::InvalidArgument`] for an invalid config, and
    /// [`Error::InvariantViolation`] if the population is
    /// internally inconsistent.
    ///
    /// [`elitism`]: PopulationConfig::elitism
    ///
    /// # Examples
    /// ```
    /// use biomorph::{Error, Population, PopulationConfig};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let mut population = Population::<()>::new(PopulationConfig::default(), 5, &mut rng).unwrap();
    ///
    /// assert_eq!(population.breed(&mut rng).unwrap_err(), Error::NoSelection);
    ///
    /// population.select(3).unwrap();
    /// let offspring = population.breed(&mut rng).unwrap();
    /// assert_eq!(offspring.generation(), 1);
    /// assert!(offspring.chromosomes().iter().all(|c| c.parents() == Some((3, 3))));
    /// ```
    pub fn breed<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Population<P>>
    where
        P: Clone,
    {
        self.config.validate()?;
        self.check_invariants()?;
        let wheel = RouletteWheel::new(&self.breeding_weights()?)?;
        let chromosomes =
            OffspringFactory::new(&self.chromosomes, &wheel, &self.config).generate_offspring(rng)?;
        Ok(Population {
            generation: self.generation + 1,
            chromosomes,
            gene_count: self.gene_count,
            config: self.config.clone(),
        })
    }

    /// Evaluates every pending chromosome, in order, through
    /// `evaluator`. Failures are recorded against their
    /// chromosome and do not stop the pass. Chromosomes that
    /// were already evaluated, or already failed, are skipped.
    ///
    /// `cancel` is checked before each evaluation.
    ///
    /// # Errors
    /// Returns [`Error::ControlCountMismatch`] if the evaluator's
    /// control count differs from the gene vector length, and
    /// [`Error::InvariantViolation`] if the population is
    /// internally inconsistent. No chromosome is touched in
    /// either case.
    pub fn evaluate<E>(
        &mut self,
        evaluator: &mut E,
        cancel: &CancellationToken,
    ) -> Result<EvaluationReport>
    where
        E: Evaluator<Phenotype = P> + ?Sized,
    {
        self.check_invariants()?;
        if evaluator.gene_count() != self.gene_count {
            return Err(Error::ControlCountMismatch {
                expected: self.gene_count,
                found: evaluator.gene_count(),
            });
        }

        let mut report = EvaluationReport::default();
        for chromosome in self.chromosomes.iter_mut().filter(|c| c.is_pending()) {
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            log::debug!(
                "evaluating chromosome {} of generation {}",
                chromosome.index(),
                self.generation
            );
            let outcome = evaluator.evaluate(chromosome.genes());
            if let Err(e) = &outcome {
                log::warn!(
                    "chromosome {} of generation {}: {}",
                    chromosome.index(),
                    self.generation,
                    e
                );
                report.failed.push(chromosome.index());
            } else {
                report.evaluated += 1;
            }
            chromosome.record_evaluation(outcome);
        }
        report.pending = self.pending_count();
        Ok(report)
    }

    /// Returns the number of chromosomes awaiting evaluation.
    pub fn pending_count(&self) -> usize {
        self.chromosomes.iter().filter(|c| c.is_pending()).count()
    }

    /// Returns the number of chromosomes whose evaluation failed.
    pub fn failed_count(&self) -> usize {
        self.chromosomes
            .iter()
            .filter(|c| c.evaluation_failed())
            .count()
    }

    /// Returns whether no chromosome awaits evaluation.
    pub fn is_complete(&self) -> bool {
        self.pending_count() == 0
    }

    /// Returns every gene vector as a row of numbers, in
    /// population order.
    ///
    /// # Examples
    /// ```
    /// use biomorph::{Population, PopulationConfig};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(5);
    /// let population = Population::<()>::new(PopulationConfig::default(), 4, &mut rng).unwrap();
    /// let rows = population.export_genes();
    ///
    /// assert_eq!(rows.len(), 12);
    /// assert_eq!(rows[2], population.chromosomes()[2].genes().as_slice());
    /// ```
    pub fn export_genes(&self) -> Vec<Vec<f64>> {
        self.chromosomes
            .iter()
            .map(|c| c.genes().as_slice().to_vec())
            .collect()
    }

    /// Checks the population's structural invariants: the
    /// configured size, one gene vector length throughout,
    /// and indices matching positions.
    ///
    /// # Errors
    /// Returns [`Error::InvariantViolation`] describing the
    /// first broken invariant.
    pub fn check_invariants(&self) -> Result<()> {
        if self.chromosomes.len() != self.config.size {
            return Err(Error::InvariantViolation(format!(
                "generation {} holds {} chromosomes, configured size is {}",
                self.generation,
                self.chromosomes.len(),
                self.config.size
            )));
        }
        for (position, c) in self.chromosomes.iter().enumerate() {
            if c.genes().len() != self.gene_count {
                return Err(Error::InvariantViolation(format!(
                    "chromosome {} of generation {} has {} genes, expected {}",
                    position,
                    self.generation,
                    c.genes().len(),
                    self.gene_count
                )));
            }
            if let Some(g) = c.genes().iter().find(|g| !(0.0..=1.0).contains(g)) {
                return Err(Error::InvariantViolation(format!(
                    "chromosome {} of generation {} has gene {} outside [0, 1]",
                    position, self.generation, g
                )));
            }
            if c.index() != position {
                return Err(Error::InvariantViolation(format!(
                    "chromosome at position {} of generation {} is indexed {}",
                    position,
                    self.generation,
                    c.index()
                )));
            }
        }
        Ok(())
    }

    /// Returns a copy of this population renumbered as
    /// `generation`, with selections cleared and each
    /// chromosome recorded as its own parent.
    pub(crate) fn restored_as(&self, generation: usize) -> Population<P>
    where
        P: Clone,
    {
        Population {
            generation,
            chromosomes: self
                .chromosomes
                .iter()
                .map(|c| c.carried_over(c.index()))
                .collect(),
            gene_count: self.gene_count,
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::EvaluationStatus;
    use crate::EvaluationError;
    use rand::{rngs::StdRng, SeedableRng};

    /// Evaluates designs to the sum of their genes, failing
    /// on the listed call numbers.
    struct SumEvaluator {
        gene_count: usize,
        calls: usize,
        fail_on: Vec<usize>,
        cancel_after: Option<(usize, CancellationToken)>,
    }

    impl SumEvaluator {
        fn new(gene_count: usize) -> SumEvaluator {
            SumEvaluator {
                gene_count,
                calls: 0,
                fail_on: vec![],
                cancel_after: None,
            }
        }
    }

    impl Evaluator for SumEvaluator {
        type Phenotype = f64;

        fn gene_count(&self) -> usize {
            self.gene_count
        }

        fn evaluate(&mut self, genes: &GeneVector) -> std::result::Result<Vec<f64>, EvaluationError> {
            let call = self.calls;
            self.calls += 1;
            if let Some((n, token)) = &self.cancel_after {
                if self.calls == *n {
                    token.cancel();
                }
            }
            if self.fail_on.contains(&call) {
                Err(EvaluationError::new(format!("call {} failed", call)))
            } else {
                Ok(vec![genes.iter().sum()])
            }
        }
    }

    fn population(config: PopulationConfig, gene_count: usize, seed: u64) -> Population<f64> {
        Population::new(config, gene_count, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn new_rejects_invalid_arguments() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(Population::<()>::new(PopulationConfig::default(), 0, &mut rng).is_err());
        let cfg = PopulationConfig {
            size: 0,
            ..PopulationConfig::default()
        };
        assert!(Population::<()>::new(cfg, 3, &mut rng).is_err());
    }

    #[test]
    fn new_seeded_rejects_bad_seeds() {
        let mut rng = StdRng::seed_from_u64(0);
        let cfg = PopulationConfig {
            size: 2,
            ..PopulationConfig::default()
        };
        let seed = || GeneVector::from_values(vec![0.5, 0.5]).unwrap();
        assert!(
            Population::<()>::new_seeded(vec![seed(), seed(), seed()], 2, cfg.clone(), &mut rng)
                .is_err()
        );
        assert!(Population::<()>::new_seeded(vec![seed()], 3, cfg, &mut rng).is_err());
    }

    #[test]
    fn breeding_is_deterministic_for_a_fixed_seed() {
        let mut parents = population(PopulationConfig::default(), 6, 7);
        parents.select(1).unwrap();
        parents.set_selection_weight(4, 2.5).unwrap();
        parents.select(9).unwrap();

        let first = parents.breed(&mut StdRng::seed_from_u64(99)).unwrap();
        let second = parents.breed(&mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn offspring_descend_only_from_selected_chromosomes() {
        let mut parents = population(PopulationConfig::default(), 5, 42);
        for i in [0, 3, 7] {
            parents.set_selection_weight(i, 1.0).unwrap();
        }
        let offspring = parents.breed(&mut StdRng::seed_from_u64(42)).unwrap();

        assert_eq!(offspring.size(), 12);
        assert_eq!(offspring.generation(), 1);
        for c in offspring.chromosomes() {
            let (a, b) = c.parents().unwrap();
            assert!([0, 3, 7].contains(&a) && [0, 3, 7].contains(&b), "{:?}", (a, b));
            assert_eq!(c.selection_weight(), 0.0);
            assert!(c.is_pending());
            assert!(c.phenotype().is_empty());
        }
    }

    #[test]
    fn unmutated_offspring_genes_trace_to_their_parents() {
        let cfg = PopulationConfig {
            mutation_rate: 0.0,
            ..PopulationConfig::default()
        };
        let mut parents = population(cfg, 5, 42);
        for i in [0, 3, 7] {
            parents.select(i).unwrap();
        }
        let offspring = parents.breed(&mut StdRng::seed_from_u64(3)).unwrap();
        for c in offspring.chromosomes() {
            let (a, b) = c.parents().unwrap();
            let (a, b) = (parents.chromosomes()[a].genes(), parents.chromosomes()[b].genes());
            for i in 0..5 {
                assert!(c.genes()[i] == a[i] || c.genes()[i] == b[i]);
            }
        }
    }

    #[test]
    fn zero_weights_fail_without_touching_the_population() {
        let parents = population(PopulationConfig::default(), 3, 1);
        let before = parents.clone();
        assert_eq!(
            parents.breed(&mut StdRng::seed_from_u64(0)).unwrap_err(),
            Error::NoSelection
        );
        assert_eq!(parents.selection_probabilities().unwrap_err(), Error::NoSelection);
        assert_eq!(parents, before);
    }

    #[test]
    fn uniform_policy_breeds_from_everyone() {
        let cfg = PopulationConfig {
            zero_weight_policy: ZeroWeightPolicy::Uniform,
            ..PopulationConfig::default()
        };
        let parents = population(cfg, 3, 1);
        let probabilities = parents.selection_probabilities().unwrap();
        assert!(probabilities.iter().all(|p| (p - 1.0 / 12.0).abs() < 1e-12));
        assert_eq!(parents.breed(&mut StdRng::seed_from_u64(0)).unwrap().size(), 12);
    }

    #[test]
    fn selection_probabilities_follow_weights() {
        let mut parents = population(PopulationConfig::default(), 2, 1);
        parents.set_selection_weight(2, 1.0).unwrap();
        parents.set_selection_weight(5, 3.0).unwrap();
        let probabilities = parents.selection_probabilities().unwrap();
        assert_eq!(probabilities[2], 0.25);
        assert_eq!(probabilities[5], 0.75);
        assert_eq!(probabilities.iter().filter(|p| **p == 0.0).count(), 10);
        assert_eq!(parents.selected().collect::<Vec<_>>(), vec![2, 5]);

        parents.clear_selections();
        assert_eq!(parents.selected().count(), 0);
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let mut parents = population(PopulationConfig::default(), 2, 1);
        assert!(matches!(
            parents.set_selection_weight(12, 1.0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(parents.set_selection_weight(0, -2.0).is_err());
    }

    #[test]
    fn self_pairing_can_be_excluded() {
        let cfg = PopulationConfig {
            allow_self_pairing: false,
            ..PopulationConfig::default()
        };
        let mut parents = population(cfg, 4, 8);
        parents.select(2).unwrap();
        parents.select(10).unwrap();
        let offspring = parents.breed(&mut StdRng::seed_from_u64(8)).unwrap();
        for c in offspring.chromosomes() {
            let (a, b) = c.parents().unwrap();
            assert_ne!(a, b);
        }
    }

    #[test]
    fn lopsided_weights_still_pair_distinct_parents() {
        let cfg = PopulationConfig {
            allow_self_pairing: false,
            ..PopulationConfig::default()
        };
        let mut parents = population(cfg, 4, 13);
        parents.set_selection_weight(0, 1e20).unwrap();
        parents.set_selection_weight(1, 1.0).unwrap();
        let offspring = parents.breed(&mut StdRng::seed_from_u64(13)).unwrap();
        for c in offspring.chromosomes() {
            let (a, b) = c.parents().unwrap();
            assert_ne!(a, b);
            assert!(a <= 1 && b <= 1);
        }
    }

    #[test]
    fn huge_weights_breed_normally() {
        let mut parents = population(PopulationConfig::default(), 4, 14);
        parents.set_selection_weight(3, 1e308).unwrap();
        parents.set_selection_weight(5, 1e308).unwrap();
        let probabilities = parents.selection_probabilities().unwrap();
        assert_eq!(probabilities[3], 0.5);
        assert_eq!(probabilities[5], 0.5);

        let offspring = parents.breed(&mut StdRng::seed_from_u64(14)).unwrap();
        assert_eq!(offspring.size(), parents.size());
        for c in offspring.chromosomes() {
            let (a, b) = c.parents().unwrap();
            assert!([3, 5].contains(&a) && [3, 5].contains(&b));
        }
    }

    #[test]
    fn elite_are_carried_over_with_phenotypes() {
        let cfg = PopulationConfig {
            elitism: 2,
            ..PopulationConfig::default()
        };
        let mut parents = population(cfg, 3, 4);
        parents
            .evaluate(&mut SumEvaluator::new(3), &CancellationToken::new())
            .unwrap();
        parents.set_selection_weight(1, 1.0).unwrap();
        parents.set_selection_weight(6, 5.0).unwrap();
        parents.set_selection_weight(8, 1.0).unwrap();

        let offspring = parents.breed(&mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(offspring.chromosomes()[0].genes(), parents.chromosomes()[6].genes());
        assert_eq!(offspring.chromosomes()[0].parents(), Some((6, 6)));
        assert!(offspring.chromosomes()[0].is_evaluated());
        assert_eq!(
            offspring.chromosomes()[0].phenotype(),
            parents.chromosomes()[6].phenotype()
        );
        // Ties keep population order.
        assert_eq!(offspring.chromosomes()[1].parents(), Some((1, 1)));
        assert_eq!(offspring.pending_count(), 10);
    }

    #[test]
    fn evaluation_failures_are_recorded_per_chromosome() {
        let mut pop = population(PopulationConfig::default(), 5, 42);
        let mut evaluator = SumEvaluator::new(5);
        evaluator.fail_on = vec![4];

        let report = pop.evaluate(&mut evaluator, &CancellationToken::new()).unwrap();
        assert_eq!(report.evaluated, 11);
        assert_eq!(report.failed, vec![4]);
        assert!(report.is_complete());
        assert!(!report.cancelled);

        for c in pop.chromosomes() {
            if c.index() == 4 {
                assert!(c.evaluation_failed());
                assert!(c.phenotype().is_empty());
            } else {
                assert!(c.is_evaluated());
                assert_eq!(c.phenotype(), &[c.genes().iter().sum::<f64>()]);
            }
        }
        assert_eq!(pop.failed_count(), 1);
    }

    #[test]
    fn evaluation_runs_once_per_chromosome() {
        let mut pop = population(PopulationConfig::default(), 2, 0);
        let mut evaluator = SumEvaluator::new(2);
        pop.evaluate(&mut evaluator, &CancellationToken::new()).unwrap();
        let report = pop.evaluate(&mut evaluator, &CancellationToken::new()).unwrap();
        assert_eq!(evaluator.calls, 12);
        assert_eq!(report, EvaluationReport::default());
    }

    #[test]
    fn cancellation_leaves_remaining_chromosomes_pending() {
        let mut pop = population(PopulationConfig::default(), 2, 0);
        let token = CancellationToken::new();
        let mut evaluator = SumEvaluator::new(2);
        evaluator.cancel_after = Some((5, token.clone()));

        let report = pop.evaluate(&mut evaluator, &token).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.evaluated, 5);
        assert_eq!(report.pending, 7);
        assert!(!pop.is_complete());
        assert!(pop.chromosomes()[..5].iter().all(|c| c.is_evaluated()));
        assert!(pop.chromosomes()[5..]
            .iter()
            .all(|c| c.status() == &EvaluationStatus::Unevaluated));

        token.reset();
        let report = pop.evaluate(&mut SumEvaluator::new(2), &token).unwrap();
        assert_eq!(report.evaluated, 7);
        assert!(pop.is_complete());
    }

    #[test]
    fn control_count_mismatch_fails_fast() {
        let mut pop = population(PopulationConfig::default(), 4, 0);
        let mut evaluator = SumEvaluator::new(5);
        assert_eq!(
            pop.evaluate(&mut evaluator, &CancellationToken::new()).unwrap_err(),
            Error::ControlCountMismatch {
                expected: 4,
                found: 5
            }
        );
        assert_eq!(evaluator.calls, 0);
        assert_eq!(pop.pending_count(), 12);
    }

    #[test]
    fn inconsistent_gene_lengths_are_invariant_violations() {
        let mut pop = population(PopulationConfig::default(), 4, 0);
        pop.chromosomes[7] = Chromosome::new(7, GeneVector::from_values(vec![0.5; 3]).unwrap());
        pop.select(0).unwrap();
        assert!(matches!(
            pop.breed(&mut StdRng::seed_from_u64(0)),
            Err(Error::InvariantViolation(_))
        ));
        assert!(matches!(
            pop.evaluate(&mut SumEvaluator::new(4), &CancellationToken::new()),
            Err(Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn restored_population_keeps_designs() {
        let mut pop = population(PopulationConfig::default(), 3, 2);
        pop.evaluate(&mut SumEvaluator::new(3), &CancellationToken::new())
            .unwrap();
        pop.select(4).unwrap();
        let restored = pop.restored_as(9);
        assert_eq!(restored.generation(), 9);
        assert_eq!(restored.selected().count(), 0);
        assert_eq!(restored.export_genes(), pop.export_genes());
        assert!(restored.is_complete());
        assert!(restored.check_invariants().is_ok());
    }

    #[test]
    fn serializes_to_json() {
        let cfg = PopulationConfig {
            size: 2,
            ..PopulationConfig::default()
        };
        let seeds = vec![
            GeneVector::from_values(vec![0.25, 0.5]).unwrap(),
            GeneVector::from_values(vec![0.75, 1.0]).unwrap(),
        ];
        let mut pop =
            Population::new_seeded(seeds, 2, cfg, &mut StdRng::seed_from_u64(0)).unwrap();
        pop.set_selection_weight(1, 1.5).unwrap();
        let json = serde_json::to_string(&pop).unwrap();
        let back: Population<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pop);
        assert!(back.check_invariants().is_ok());

        let tampered = json.replacen("0.75", "1.75", 1);
        assert_ne!(tampered, json);
        assert!(serde_json::from_str::<Population<f64>>(&tampered).is_err());
    }
}
