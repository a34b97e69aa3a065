//! Gene vectors are the focus of evolution in Biomorph.
//! They encode a design as normalized parameter values,
//! and are recombined and mutated between generations.
//! A chromosome pairs a gene vector with the phenotype
//! the host realizes from it.

mod chromosome;
mod gene_vector;

pub use chromosome::{Chromosome, EvaluationStatus};
pub use gene_vector::{CrossoverPolicy, GeneVector};
