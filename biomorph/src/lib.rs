//! An engine for interactive evolutionary design exploration.
//!
//! A user explores the continuous inputs of a parametric model by
//! repeatedly picking the designs they prefer from a displayed
//! population. The engine breeds the next generation from those
//! picks through roulette-wheel selection, crossover and mutation,
//! and keeps every past generation in an append-only history.
//!
//! The engine never builds geometry itself. The host realizes each
//! gene vector into a phenotype through the [`Evaluator`] trait;
//! a reference host is supplied by the `biomorph-host` crate.
//!
//! # Example usage: steering towards tall, narrow designs
//! ```
//! use biomorph::{CancellationToken, EvaluationError, Evaluator, Explorer, GeneVector, PopulationConfig};
//!
//! /// Turns (height, width) genes into a slenderness ratio.
//! struct Slenderness;
//!
//! impl Evaluator for Slenderness {
//!     type Phenotype = f64;
//!
//!     fn gene_count(&self) -> usize {
//!         2
//!     }
//!
//!     fn evaluate(&mut self, genes: &GeneVector) -> Result<Vec<f64>, EvaluationError> {
//!         if genes[1] < 0.01 {
//!             return Err(EvaluationError::new("width too small"));
//!         }
//!         Ok(vec![genes[0] / genes[1]])
//!     }
//! }
//!
//! fn main() {
//!     let config = PopulationConfig {
//!         mutation_rate: 0.05,
//!         elitism: 1,
//!         ..PopulationConfig::default()
//!     };
//!     let cancel = CancellationToken::new();
//!     let mut explorer = Explorer::new(config, 2, Some(3)).unwrap();
//!     explorer.evaluate_current(&mut Slenderness, &cancel).unwrap();
//!
//!     for _ in 0..10 {
//!         // Stand-in for the user: pick the three most slender designs.
//!         let mut ranked: Vec<(usize, f64)> = explorer
//!             .population()
//!             .chromosomes()
//!             .iter()
//!             .filter_map(|c| c.phenotype().first().map(|s| (c.index(), *s)))
//!             .collect();
//!         ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
//!         for (index, _) in ranked.into_iter().take(3) {
//!             explorer.select(index).unwrap();
//!         }
//!         if let Err(e) = explorer.breed_next_generation(&mut Slenderness, &cancel) {
//!             eprintln!("{}", e);
//!             break;
//!         }
//!     }
//!
//!     assert_eq!(explorer.generation(), 10);
//!     println!("{}", explorer.summary());
//! }
//! ```

mod errors;
mod evaluation;
mod explorer;
mod genomics;
mod history;
pub mod logging;
mod populations;

pub use errors::{Error, EvaluationError, Result};
pub use evaluation::{
    ApplyGuard, ApplyState, CancellationToken, EvaluationReport, Evaluator, GeneApplicator,
    SharedResource,
};
pub use explorer::Explorer;
pub use genomics::{Chromosome, CrossoverPolicy, EvaluationStatus, GeneVector};
pub use history::GenerationHistory;
pub use populations::sampling;
pub use populations::{
    PartialGenerationPolicy, Population, PopulationConfig, RouletteWheel, ZeroWeightPolicy,
};
