use crate::{Error, Result};

use std::fmt;
use std::ops::Index;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Policy used to combine two parent gene vectors.
///
/// Both policies only ever copy parent genes, so every
/// component of a child equals the corresponding component
/// of one of its parents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverPolicy {
    /// Each gene is taken from either parent with equal chance.
    Uniform,
    /// Genes before a random cut point come from the first
    /// parent, the rest from the second.
    OnePoint,
}

impl Default for CrossoverPolicy {
    fn default() -> Self {
        CrossoverPolicy::Uniform
    }
}

/// A normalized parameter encoding of one design.
///
/// All genes lie in `[0, 1]`, deserialized ones included.
/// Mapping a gene to the real range of its parameter is
/// left to the evaluator.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>")]
pub struct GeneVector(Vec<f64>);

impl GeneVector {
    /// Returns a gene vector of `length` independent uniform
    /// draws from `[0, 1]`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `length` is 0.
    ///
    /// # Examples
    /// ```
    /// use biomorph::GeneVector;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let genes = GeneVector::random(5, &mut rng).unwrap();
    ///
    /// assert_eq!(genes.len(), 5);
    /// assert!(genes.iter().all(|g| (0.0..=1.0).contains(&g)));
    /// assert!(GeneVector::random(0, &mut rng).is_err());
    /// ```
    pub fn random<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Result<GeneVector> {
        if length == 0 {
            return Err(Error::InvalidArgument(
                "gene vector length must be positive".into(),
            ));
        }
        Ok(GeneVector(
            (0..length).map(|_| Self::random_gene(rng)).collect(),
        ))
    }

    /// Wraps existing normalized values.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `values` is empty,
    /// or any value is not a finite number in `[0, 1]`.
    ///
    /// # Examples
    /// ```
    /// use biomorph::GeneVector;
    ///
    /// let genes = GeneVector::from_values(vec![0.0, 0.5, 1.0]).unwrap();
    /// assert_eq!(genes[1], 0.5);
    ///
    /// assert!(GeneVector::from_values(vec![]).is_err());
    /// assert!(GeneVector::from_values(vec![0.2, 1.5]).is_err());
    /// ```
    pub fn from_values(values: Vec<f64>) -> Result<GeneVector> {
        if values.is_empty() {
            return Err(Error::InvalidArgument(
                "gene vector length must be positive".into(),
            ));
        }
        if let Some((i, v)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(Error::InvalidArgument(format!(
                "gene {} has value {} outside [0, 1]",
                i, v
            )));
        }
        Ok(GeneVector(values))
    }

    fn random_gene<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        rng.gen_range(0.0..=1.0)
    }

    /// Combines two parents into a single child according
    /// to `policy`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if the parents
    /// differ in length.
    ///
    /// # Examples
    /// ```
    /// use biomorph::{CrossoverPolicy, GeneVector};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(3);
    /// let a = GeneVector::from_values(vec![0.0; 4]).unwrap();
    /// let b = GeneVector::from_values(vec![1.0; 4]).unwrap();
    ///
    /// let child = GeneVector::crossover(&a, &b, CrossoverPolicy::Uniform, &mut rng).unwrap();
    /// assert!(child.iter().all(|g| g == 0.0 || g == 1.0));
    /// ```
    pub fn crossover<R: Rng + ?Sized>(
        a: &GeneVector,
        b: &GeneVector,
        policy: CrossoverPolicy,
        rng: &mut R,
    ) -> Result<GeneVector> {
        if a.len() != b.len() {
            return Err(Error::InvalidArgument(format!(
                "crossover between gene vectors of lengths {} and {}",
                a.len(),
                b.len()
            )));
        }
        let genes = match policy {
            CrossoverPolicy::Uniform => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| if rng.gen::<bool>() { x } else { y })
                .collect(),
            CrossoverPolicy::OnePoint => {
                let cut = rng.gen_range(0..=a.len());
                a.0[..cut].iter().chain(&b.0[cut..]).copied().collect()
            }
        };
        Ok(GeneVector(genes))
    }

    /// Returns a mutated copy, in which every gene is
    /// independently replaced by a fresh uniform draw with
    /// probability `rate`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `rate` is not
    /// in `[0, 1]`.
    ///
    /// # Examples
    /// ```
    /// use biomorph::GeneVector;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(11);
    /// let genes = GeneVector::random(8, &mut rng).unwrap();
    ///
    /// assert_eq!(genes.mutate(0.0, &mut rng).unwrap(), genes);
    /// assert!(genes.mutate(1.5, &mut rng).is_err());
    /// ```
    pub fn mutate<R: Rng + ?Sized>(&self, rate: f64, rng: &mut R) -> Result<GeneVector> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(Error::InvalidArgument(format!(
                "mutation rate {} outside [0, 1]",
                rate
            )));
        }
        Ok(GeneVector(
            self.iter()
                .map(|g| {
                    if rng.gen_bool(rate) {
                        Self::random_gene(rng)
                    } else {
                        g
                    }
                })
                .collect(),
        ))
    }

    /// Returns the number of genes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for vectors built through the public
    /// constructors.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the genes.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().copied()
    }

    /// Returns the genes as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Returns the squared euclidean distance to `other`.
    pub(crate) fn distance_squared(&self, other: &[f64]) -> f64 {
        self.0
            .iter()
            .zip(other)
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

impl Index<usize> for GeneVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl TryFrom<Vec<f64>> for GeneVector {
    type Error = Error;

    fn try_from(values: Vec<f64>) -> Result<GeneVector> {
        GeneVector::from_values(values)
    }
}

impl From<GeneVector> for Vec<f64> {
    fn from(genes: GeneVector) -> Vec<f64> {
        genes.0
    }
}

impl fmt::Display for GeneVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]",
            self.0
                .iter()
                .map(|g| format!("{:.3}", g))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
