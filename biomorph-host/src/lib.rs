//! # Biomorph-Host
//! A parametric-document implementation of the [`Biomorph` crate](biomorph)'s `Evaluator` trait.
//!
//! A [`Document`] binds a user-supplied [`Model`] to a resolved [`ControlSet`] of
//! sliders and gene pools. Two parties then work on the shared document:
//! - [`ParameterEvaluator`]: realizes the phenotypes of a session's chromosomes.
//! - [`DesignReader`]: applies a chosen design of an exported population back onto the document.
//!
//! # Example usage: exploring box proportions
//! ```
//! use biomorph::{CancellationToken, EvaluationError, Explorer, GeneApplicator, PopulationConfig, SharedResource};
//! use biomorph_host::{
//!     ControlSet, DesignReader, Document, GenePool, Model, ParameterEvaluator, ParameterValues, Slider,
//! };
//!
//! /// Volume of a box whose floor is scaled by each gene pool slot.
//! struct Volume;
//!
//! impl Model for Volume {
//!     type Output = f64;
//!
//!     fn solve(&mut self, values: &ParameterValues) -> Result<Vec<f64>, EvaluationError> {
//!         let height = values.sliders[0];
//!         Ok(values.gene_pools[0].iter().map(|scale| scale * scale * height).collect())
//!     }
//! }
//!
//! fn main() {
//!     let controls = ControlSet::resolve(
//!         vec![Slider::new("height", 1.0, 3.0, 1)],
//!         vec![GenePool::new("scales", 0.5, 2.0, 3)],
//!     )
//!     .unwrap();
//!     let gene_count = controls.gene_count();
//!     let document = SharedResource::new(Document::new(Volume, controls));
//!     let applicator = GeneApplicator::new();
//!     let mut evaluator = ParameterEvaluator::new(document.clone(), applicator.clone());
//!     let reader = DesignReader::new(document, applicator);
//!
//!     let cancel = CancellationToken::new();
//!     let mut explorer = Explorer::new(PopulationConfig::default(), gene_count, Some(9)).unwrap();
//!     explorer.evaluate_current(&mut evaluator, &cancel).unwrap();
//!     for _ in 0..5 {
//!         explorer.select(0).unwrap();
//!         explorer.select(1).unwrap();
//!         explorer.breed_next_generation(&mut evaluator, &cancel).unwrap();
//!     }
//!
//!     let designs = explorer.population().export_genes();
//!     let volumes = reader.apply(&designs, 0).unwrap();
//!     assert_eq!(volumes.len(), 3);
//! }
//! ```

mod controls;
mod document;
mod errors;
mod evaluator;
mod reader;

pub use controls::{ControlSet, GenePool, ParameterValues, Slider};
pub use document::{Document, Model};
pub use errors::{HostError, Result};
pub use evaluator::ParameterEvaluator;
pub use reader::DesignReader;
