use super::*;

/// Auxiliary type for offspring generation.
/// Handles all the tasks of generating a population's
/// offspring according to the population config
/// and the roulette wheel built from selection weights.
pub(super) struct OffspringFactory<'a, P> {
    parents: &'a [Chromosome<P>],
    wheel: &'a RouletteWheel,
    config: &'a PopulationConfig,
}

impl<'a, P: Clone> OffspringFactory<'a, P> {
    pub(super) fn new(
        parents: &'a [Chromosome<P>],
        wheel: &'a RouletteWheel,
        config: &'a PopulationConfig,
    ) -> OffspringFactory<'a, P> {
        OffspringFactory {
            parents,
            wheel,
            config,
        }
    }

    /// Generate a full generation of offspring.
    pub(super) fn generate_offspring<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<Chromosome<P>>> {
        let mut offspring = Vec::with_capacity(self.config.size);
        self.add_elite(&mut offspring);
        self.add_mated_offspring(&mut offspring, rng)?;
        Ok(offspring)
    }

    /// Copy the top "elite" selected chromosomes
    /// to the offspring, heaviest first.
    fn add_elite(&self, offspring: &mut Vec<Chromosome<P>>) {
        let weights = self.wheel.weights();
        let mut ranked: Vec<usize> = (0..self.parents.len())
            .filter(|i| weights[*i] > 0.0)
            .collect();
        // Stable sort keeps ties in population order.
        ranked.sort_by(|a, b| weights[*b].total_cmp(&weights[*a]));
        for i in ranked.into_iter().take(self.config.elitism) {
            log::debug!("carrying over elite chromosome {}", i);
            offspring.push(self.parents[i].carried_over(offspring.len()));
        }
    }

    /// Choose parent pairs from the wheel and mate them
    /// until the generation is full.
    fn add_mated_offspring<R: Rng + ?Sized>(
        &self,
        offspring: &mut Vec<Chromosome<P>>,
        rng: &mut R,
    ) -> Result<()> {
        while offspring.len() < self.config.size {
            let (a, b) = self.choose_parents(rng);
            let genes = GeneVector::crossover(
                self.parents[a].genes(),
                self.parents[b].genes(),
                self.config.crossover,
                rng,
            )?
            .mutate(self.config.mutation_rate, rng)?;
            log::debug!("offspring {} bred from {} x {}", offspring.len(), a, b);
            offspring.push(Chromosome::offspring(offspring.len(), genes, (a, b)));
        }
        Ok(())
    }

    /// Draw two parents independently. Unless self-pairing
    /// is allowed, the second parent is redrawn from the
    /// remaining selected chromosomes.
    fn choose_parents<R: Rng + ?Sized>(&self, rng: &mut R) -> (usize, usize) {
        let first = self.wheel.spin(rng);
        let second = if self.config.allow_self_pairing {
            self.wheel.spin(rng)
        } else {
            self.wheel.spin_excluding(first, rng)
        };
        (first, second)
    }
}
