use crate::populations::Population;
use crate::{Error, Result};

use serde::{Deserialize, Serialize};

/// An append-only record of past generations.
///
/// Snapshots are copies taken at append time and are only
/// ever handed out by shared reference, so they cannot change
/// afterwards. Generation `k` is always stored at position `k`.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct GenerationHistory<P> {
    snapshots: Vec<Population<P>>,
}

impl<P> Default for GenerationHistory<P> {
    fn default() -> Self {
        GenerationHistory { snapshots: vec![] }
    }
}

impl<P> GenerationHistory<P> {
    pub fn new() -> GenerationHistory<P> {
        GenerationHistory::default()
    }

    /// Stores a copy of `population` and returns its
    /// generation number.
    ///
    /// # Errors
    /// Returns [`Error::InvariantViolation`] if the population's
    /// generation number is not the next one in sequence.
    ///
    /// # Examples
    /// ```
    /// use biomorph::{GenerationHistory, Population, PopulationConfig};
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut rng = StdRng::seed_from_u64(0);
    /// let mut population = Population::<()>::new(PopulationConfig::default(), 4, &mut rng).unwrap();
    /// let mut history = GenerationHistory::new();
    ///
    /// assert_eq!(history.append(&population).unwrap(), 0);
    ///
    /// // Later changes to the live population do not reach the snapshot.
    /// population.select(2).unwrap();
    /// assert_eq!(history.get(0).unwrap().selected().count(), 0);
    ///
    /// // Generation 0 cannot be appended twice.
    /// assert!(history.append(&population).is_err());
    /// ```
    pub fn append(&mut self, population: &Population<P>) -> Result<usize>
    where
        P: Clone,
    {
        let next = self.snapshots.len();
        if population.generation() != next {
            return Err(Error::InvariantViolation(format!(
                "appending generation {} to a history expecting generation {}",
                population.generation(),
                next
            )));
        }
        self.snapshots.push(population.clone());
        Ok(next)
    }

    /// Returns the snapshot of `generation`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if it has not been recorded.
    pub fn get(&self, generation: usize) -> Result<&Population<P>> {
        self.snapshots.get(generation).ok_or(Error::NotFound {
            requested: generation,
            len: self.snapshots.len(),
        })
    }

    /// Returns the most recently appended snapshot.
    ///
    /// # Errors
    /// Returns [`Error::Empty`] if nothing has been appended.
    pub fn latest(&self) -> Result<&Population<P>> {
        self.snapshots.last().ok_or(Error::Empty)
    }

    /// Returns the number of recorded generations.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Returns an iterator over all snapshots, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Population<P>> {
        self.snapshots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PopulationConfig;
    use rand::{rngs::StdRng, SeedableRng};

    fn generations(count: usize) -> Vec<Population<u8>> {
        let mut rng = StdRng::seed_from_u64(21);
        let mut current = Population::new(PopulationConfig::default(), 3, &mut rng).unwrap();
        let mut all = vec![];
        for _ in 0..count {
            current.select(0).unwrap();
            let next = current.breed(&mut rng).unwrap();
            all.push(current);
            current = next;
        }
        all
    }

    #[test]
    fn get_returns_what_was_appended() {
        let mut history = GenerationHistory::new();
        for population in generations(4) {
            let generation = history.append(&population).unwrap();
            assert_eq!(history.get(generation).unwrap(), &population);
        }
        assert_eq!(history.len(), 4);
        assert_eq!(history.latest().unwrap().generation(), 3);
        assert_eq!(
            history.iter().map(|p| p.generation()).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn snapshots_are_copies() {
        let mut history = GenerationHistory::new();
        let mut population = generations(1).remove(0);
        history.append(&population).unwrap();
        let before = history.get(0).unwrap().clone();

        population.clear_selections();
        population.set_selection_weight(5, 3.0).unwrap();
        assert_eq!(history.get(0).unwrap(), &before);
        assert_ne!(history.get(0).unwrap(), &population);
    }

    #[test]
    fn out_of_range_access() {
        let mut history = GenerationHistory::<u8>::new();
        assert_eq!(history.latest().unwrap_err(), Error::Empty);
        assert_eq!(
            history.get(0).unwrap_err(),
            Error::NotFound {
                requested: 0,
                len: 0
            }
        );
        history.append(&generations(1)[0]).unwrap();
        assert_eq!(
            history.get(1).unwrap_err(),
            Error::NotFound {
                requested: 1,
                len: 1
            }
        );
    }

    #[test]
    fn gaps_are_rejected() {
        let mut history = GenerationHistory::new();
        let all = generations(3);
        history.append(&all[0]).unwrap();
        assert!(matches!(
            history.append(&all[2]),
            Err(Error::InvariantViolation(_))
        ));
        assert_eq!(history.len(), 1);
    }
}
