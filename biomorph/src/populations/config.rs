use crate::genomics::CrossoverPolicy;
use crate::{Error, Result};

use serde::{Deserialize, Serialize};

/// What breeding does when no chromosome has been selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZeroWeightPolicy {
    /// Breeding fails with [`Error::NoSelection`].
    Fail,
    /// Every chromosome is treated as having weight 1.
    Uniform,
}

/// What happens to a generation whose evaluation is cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartialGenerationPolicy {
    /// The bred generation is dropped; the current
    /// population and history are left untouched.
    Discard,
    /// The bred generation is committed with its pending
    /// chromosomes left unevaluated.
    RetainDegraded,
}

/// Configuration data for population generation
/// and breeding.
///
/// # Note
/// All quantities expressing probabilities
/// should be in the range [0.0, 1.0]. They are
/// checked by [`validate`] before every breeding step.
///
/// [`validate`]: PopulationConfig::validate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of chromosomes in each generation.
    pub size: usize,
    /// Per-gene chance of being replaced by a fresh
    /// random value in offspring.
    pub mutation_rate: f64,
    /// How parent gene vectors are combined.
    pub crossover: CrossoverPolicy,
    /// Number of highest-weighted selected chromosomes
    /// copied as-is, phenotype included, to the next generation.
    pub elitism: usize,
    /// Whether a chromosome may be chosen as both
    /// parents of the same child.
    pub allow_self_pairing: bool,
    /// Behaviour when every selection weight is zero.
    pub zero_weight_policy: ZeroWeightPolicy,
    /// Behaviour when evaluation of a new generation is cancelled.
    pub partial_generation_policy: PartialGenerationPolicy,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        PopulationConfig {
            size: 12,
            mutation_rate: 0.01,
            crossover: CrossoverPolicy::Uniform,
            elitism: 0,
            allow_self_pairing: true,
            zero_weight_policy: ZeroWeightPolicy::Fail,
            partial_generation_policy: PartialGenerationPolicy::Discard,
        }
    }
}

impl PopulationConfig {
    /// Checks that the configuration describes a usable population.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `size` is 0, the
    /// mutation rate is outside `[0, 1]`, or `elitism`
    /// exceeds `size`.
    ///
    /// # Examples
    /// ```
    /// use biomorph::PopulationConfig;
    ///
    /// assert!(PopulationConfig::default().validate().is_ok());
    ///
    /// let cfg = PopulationConfig {
    ///     mutation_rate: 2.0,
    ///     ..PopulationConfig::default()
    /// };
    /// assert!(cfg.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(Error::InvalidArgument(
                "population size must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(Error::InvalidArgument(format!(
                "mutation rate {} outside [0, 1]",
                self.mutation_rate
            )));
        }
        if self.elitism > self.size {
            return Err(Error::InvalidArgument(format!(
                "elitism {} exceeds population size {}",
                self.elitism, self.size
            )));
        }
        Ok(())
    }
}
