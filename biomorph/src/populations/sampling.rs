//! Strategies for choosing which chromosomes of a
//! population to show the user.

use super::Population;

/// Picks up to `count` representative chromosomes.
pub trait SamplingStrategy {
    /// Returns distinct chromosome indices, at most `count`
    /// of them.
    fn sample<P>(&self, population: &Population<P>, count: usize) -> Vec<usize>;
}

/// The first `count` chromosomes in population order.
///
/// # Examples
/// ```
/// use biomorph::{Population, PopulationConfig};
/// use biomorph::sampling::{Leading, SamplingStrategy};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let population = Population::<()>::new(PopulationConfig::default(), 3, &mut rng).unwrap();
///
/// assert_eq!(Leading.sample(&population, 4), vec![0, 1, 2, 3]);
/// assert_eq!(Leading.sample(&population, 40).len(), 12);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Leading;

impl SamplingStrategy for Leading {
    fn sample<P>(&self, population: &Population<P>, count: usize) -> Vec<usize> {
        (0..count.min(population.size())).collect()
    }
}

/// The chromosomes closest to the centroids of a k-means
/// clustering of the population's gene vectors.
///
/// Centroids are initialized by farthest-point traversal
/// from the first chromosome, so sampling is deterministic.
#[derive(Clone, Copy, Debug)]
pub struct KMeansCentroids {
    /// Maximum number of refinement iterations.
    pub iterations: usize,
}

impl Default for KMeansCentroids {
    fn default() -> Self {
        KMeansCentroids { iterations: 20 }
    }
}

impl SamplingStrategy for KMeansCentroids {
    fn sample<P>(&self, population: &Population<P>, count: usize) -> Vec<usize> {
        let chromosomes = population.chromosomes();
        if count >= chromosomes.len() {
            return (0..chromosomes.len()).collect();
        }
        if count == 0 {
            return vec![];
        }

        let mut centroids = farthest_points(population, count);
        let mut assignment = vec![0; chromosomes.len()];
        for _ in 0..self.iterations {
            let changed = assign(population, &centroids, &mut assignment);
            centroids = recompute(population, &centroids, &assignment);
            if !changed {
                break;
            }
        }

        // Nearest distinct chromosome to each centroid.
        let mut chosen: Vec<usize> = Vec::with_capacity(count);
        for centroid in &centroids {
            let nearest = chromosomes
                .iter()
                .filter(|c| !chosen.contains(&c.index()))
                .min_by(|a, b| {
                    a.genes()
                        .distance_squared(centroid)
                        .total_cmp(&b.genes().distance_squared(centroid))
                })
                .map(|c| c.index());
            if let Some(i) = nearest {
                chosen.push(i);
            }
        }
        chosen
    }
}

/// Returns `count` gene vectors spread out by repeatedly
/// taking the one farthest from all those already taken.
fn farthest_points<P>(population: &Population<P>, count: usize) -> Vec<Vec<f64>> {
    let chromosomes = population.chromosomes();
    let mut picked = vec![0];
    let mut nearest: Vec<f64> = chromosomes
        .iter()
        .map(|c| c.genes().distance_squared(chromosomes[0].genes().as_slice()))
        .collect();
    while picked.len() < count {
        let next = (0..chromosomes.len())
            .filter(|i| !picked.contains(i))
            .max_by(|a, b| nearest[*a].total_cmp(&nearest[*b]))
            .unwrap_or(0);
        picked.push(next);
        for (i, c) in chromosomes.iter().enumerate() {
            let d = c.genes().distance_squared(chromosomes[next].genes().as_slice());
            nearest[i] = nearest[i].min(d);
        }
    }
    picked
        .into_iter()
        .map(|i| chromosomes[i].genes().as_slice().to_vec())
        .collect()
}

/// Assigns every chromosome to its nearest centroid.
/// Returns whether any assignment changed.
fn assign<P>(population: &Population<P>, centroids: &[Vec<f64>], assignment: &mut [usize]) -> bool {
    let mut changed = false;
    for (i, c) in population.chromosomes().iter().enumerate() {
        let nearest = centroids
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                c.genes()
                    .distance_squared(a)
                    .total_cmp(&c.genes().distance_squared(b))
            })
            .map_or(0, |(k, _)| k);
        if assignment[i] != nearest {
            assignment[i] = nearest;
            changed = true;
        }
    }
    changed
}

/// Moves each centroid to the mean of its members.
/// Centroids without members stay where they are.
fn recompute<P>(
    population: &Population<P>,
    centroids: &[Vec<f64>],
    assignment: &[usize],
) -> Vec<Vec<f64>> {
    let mut sums = vec![vec![0.0; population.gene_count()]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];
    for (c, k) in population.chromosomes().iter().zip(assignment) {
        counts[*k] += 1;
        for (sum, g) in sums[*k].iter_mut().zip(c.genes().iter()) {
            *sum += g;
        }
    }
    sums.into_iter()
        .zip(counts)
        .zip(centroids)
        .map(|((sum, n), old)| {
            if n == 0 {
                old.clone()
            } else {
                sum.into_iter().map(|s| s / n as f64).collect()
            }
        })
        .collect()
}
