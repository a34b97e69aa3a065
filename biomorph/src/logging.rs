//! Summaries of populations, used for progress logging.
use crate::populations::Population;

use std::fmt;

use serde::{Deserialize, Serialize};

/// A struct for reporting basic statistical data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub maximum: f64,
    pub minimum: f64,
    pub mean: f64,
    pub median: f64,
}

impl Stats {
    /// Returns statistics about numbers in a sequence,
    /// or `None` if it is empty.
    ///
    /// # Examples
    /// ```
    /// use biomorph::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied()).unwrap();
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    ///
    /// assert!(Stats::from(std::iter::empty()).is_none());
    /// ```
    pub fn from(data: impl Iterator<Item = f64>) -> Option<Stats> {
        let mut data: Vec<f64> = data.collect();
        if data.is_empty() {
            return None;
        }
        data.sort_unstable_by(|a, b| a.total_cmp(b));
        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Some(Stats {
            maximum: data[data.len() - 1],
            minimum: data[0],
            mean: data.iter().sum::<f64>() / data.len() as f64,
            median,
        })
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max {:.4}, min {:.4}, mean {:.4}, median {:.4}",
            self.maximum, self.minimum, self.mean, self.median
        )
    }
}

/// A one-line snapshot of a population's state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    pub generation: usize,
    pub size: usize,
    pub selected: usize,
    pub failed: usize,
    pub pending: usize,
    /// Statistics over the standard deviation of each gene
    /// position across the population.
    pub diversity: Option<Stats>,
}

impl<P> From<&Population<P>> for GenerationSummary {
    fn from(population: &Population<P>) -> Self {
        GenerationSummary {
            generation: population.generation(),
            size: population.size(),
            selected: population.selected().count(),
            failed: population.failed_count(),
            pending: population.pending_count(),
            diversity: Stats::from(gene_deviations(population).into_iter()),
        }
    }
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation {}: {} chromosomes, {} selected, {} failed, {} pending",
            self.generation, self.size, self.selected, self.failed, self.pending
        )?;
        if let Some(diversity) = &self.diversity {
            write!(f, "; gene deviation {}", diversity)?;
        }
        Ok(())
    }
}

/// Population standard deviation of every gene position.
fn gene_deviations<P>(population: &Population<P>) -> Vec<f64> {
    let n = population.size() as f64;
    (0..population.gene_count())
        .map(|i| {
            let values = population.chromosomes().iter().map(|c| c.genes()[i]);
            let mean = values.clone().sum::<f64>() / n;
            (values.map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GeneVector, PopulationConfig};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn even_length_median_averages_middle_values() {
        let stats = Stats::from([4.0, 1.0, 3.0, 2.0].iter().copied()).unwrap();
        assert_eq!(stats.median, 2.5);
        assert_eq!(stats.mean, 2.5);
        assert_eq!(stats.maximum, 4.0);
        assert_eq!(stats.minimum, 1.0);
    }

    #[test]
    fn summary_of_identical_designs_has_no_diversity() {
        let cfg = PopulationConfig {
            size: 3,
            ..PopulationConfig::default()
        };
        let seeds = vec![GeneVector::from_values(vec![0.5, 0.25]).unwrap(); 3];
        let mut population =
            Population::<()>::new_seeded(seeds, 2, cfg, &mut StdRng::seed_from_u64(0)).unwrap();
        population.select(1).unwrap();

        let summary = GenerationSummary::from(&population);
        assert_eq!(summary.generation, 0);
        assert_eq!(summary.size, 3);
        assert_eq!(summary.selected, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.pending, 3);
        let diversity = summary.diversity.unwrap();
        assert_eq!(diversity.maximum, 0.0);
        assert_eq!(diversity.minimum, 0.0);
    }

    #[test]
    fn summary_display_is_one_line() {
        let population =
            Population::<()>::new(PopulationConfig::default(), 4, &mut StdRng::seed_from_u64(3))
                .unwrap();
        let line = GenerationSummary::from(&population).to_string();
        assert!(line.starts_with("generation 0: 12 chromosomes, 0 selected"));
        assert!(!line.contains('\n'));
    }
}
