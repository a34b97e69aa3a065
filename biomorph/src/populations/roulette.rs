use crate::{Error, Result};

use rand::distributions::{Distribution, WeightedError, WeightedIndex};
use rand::Rng;

/// Fitness-proportionate parent selection: index `i`
/// is drawn with probability `weights[i] / Σ weights`.
///
/// Weights are divided by the largest one before building
/// the distribution, so very large finite weights never
/// overflow the running sum.
#[derive(Clone, Debug)]
pub struct RouletteWheel {
    weights: Vec<f64>,
    scaled: Vec<f64>,
    total: f64,
    distribution: WeightedIndex<f64>,
}

fn weighted_index(weights: &[f64]) -> Result<WeightedIndex<f64>> {
    WeightedIndex::new(weights).map_err(|e| match e {
        WeightedError::AllWeightsZero => Error::NoSelection,
        WeightedError::NoItem => Error::InvalidArgument("roulette wheel over no chromosomes".into()),
        WeightedError::InvalidWeight => Error::InvalidArgument("negative selection weight".into()),
        _ => Error::InvalidArgument(format!("invalid roulette wheel: {}", e)),
    })
}

impl RouletteWheel {
    /// Builds a wheel over the given weights.
    ///
    /// # Errors
    /// Returns [`Error::NoSelection`] if all weights are zero,
    /// and [`Error::InvalidArgument`] if `weights` is empty or
    /// contains a negative or non-finite weight.
    ///
    /// # Examples
    /// ```
    /// use biomorph::{Error, RouletteWheel};
    ///
    /// let wheel = RouletteWheel::new(&[1.0, 0.0, 3.0]).unwrap();
    /// assert_eq!(wheel.probability(2), 0.75);
    ///
    /// let huge = RouletteWheel::new(&[f64::MAX, f64::MAX]).unwrap();
    /// assert_eq!(huge.probability(0), 0.5);
    ///
    /// assert_eq!(RouletteWheel::new(&[0.0, 0.0]).unwrap_err(), Error::NoSelection);
    /// ```
    pub fn new(weights: &[f64]) -> Result<RouletteWheel> {
        if let Some(w) = weights.iter().find(|w| !w.is_finite()) {
            return Err(Error::InvalidArgument(format!(
                "selection weight {} is not finite",
                w
            )));
        }
        let max = weights.iter().copied().fold(0.0, f64::max);
        let scaled: Vec<f64> = if max > 0.0 {
            weights.iter().map(|w| w / max).collect()
        } else {
            weights.to_vec()
        };
        let distribution = weighted_index(&scaled)?;
        Ok(RouletteWheel {
            weights: weights.to_vec(),
            total: scaled.iter().sum(),
            scaled,
            distribution,
        })
    }

    /// Draws one index.
    pub fn spin<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.distribution.sample(rng)
    }

    /// Draws one index different from `excluded`, with the
    /// remaining weights kept proportional. If `excluded`
    /// holds the only nonzero weight it is returned anyway.
    pub fn spin_excluding<R: Rng + ?Sized>(&self, excluded: usize, rng: &mut R) -> usize {
        let mut others = self.scaled.clone();
        match others.get_mut(excluded) {
            Some(w) => *w = 0.0,
            None => return self.spin(rng),
        }
        match WeightedIndex::<f64>::new(&others) {
            Ok(distribution) => distribution.sample(rng),
            Err(_) => excluded,
        }
    }

    /// Returns the probability of drawing index `i`.
    pub fn probability(&self, i: usize) -> f64 {
        self.scaled.get(i).map_or(0.0, |w| w / self.total)
    }

    /// Returns the probability of every index, in order.
    pub fn probabilities(&self) -> Vec<f64> {
        self.scaled.iter().map(|w| w / self.total).collect()
    }

    /// Raw weights, as passed to [`RouletteWheel::new`].
    pub(crate) fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Returns the number of slots on the wheel.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
