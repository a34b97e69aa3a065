use crate::errors::{HostError, Result};

use ahash::RandomState;
use biomorph::GeneVector;
use serde::{Deserialize, Serialize};

use std::collections::HashSet;

/// A numeric slider mapped from a single gene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Slider {
    pub id: String,
    pub min: f64,
    pub max: f64,
    /// Number of decimal places the slider displays.
    pub decimals: u32,
}

impl Slider {
    pub fn new(id: impl Into<String>, min: f64, max: f64, decimals: u32) -> Slider {
        Slider {
            id: id.into(),
            min,
            max,
            decimals,
        }
    }

    /// Maps a normalized gene into the slider's range,
    /// rounded to its decimal places.
    ///
    /// # Examples
    /// ```
    /// use biomorph_host::Slider;
    ///
    /// let height = Slider::new("height", 10.0, 20.0, 1);
    /// assert_eq!(height.value_at(0.0), 10.0);
    /// assert_eq!(height.value_at(0.333), 13.3);
    /// assert_eq!(height.value_at(1.0), 20.0);
    /// ```
    pub fn value_at(&self, gene: f64) -> f64 {
        let value = self.min + gene * (self.max - self.min);
        let scale = 10f64.powi(self.decimals as i32);
        ((value * scale).round() / scale).clamp(self.min, self.max)
    }
}

/// A list of values, each mapped from its own gene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenePool {
    pub id: String,
    pub min: f64,
    pub max: f64,
    pub slots: usize,
}

impl GenePool {
    pub fn new(id: impl Into<String>, min: f64, max: f64, slots: usize) -> GenePool {
        GenePool {
            id: id.into(),
            min,
            max,
            slots,
        }
    }

    /// Maps a normalized gene into the pool's range.
    pub fn value_at(&self, gene: f64) -> f64 {
        self.min + gene * (self.max - self.min)
    }
}

/// Real-valued inputs decoded from a gene vector.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterValues {
    /// One value per slider.
    pub sliders: Vec<f64>,
    /// One list per gene pool, one value per slot.
    pub gene_pools: Vec<Vec<f64>>,
}

/// The ordered controls a session evolves.
///
/// Genes map to sliders first, in order, then to the
/// slots of each gene pool in order. The order is fixed
/// once resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlSet {
    sliders: Vec<Slider>,
    gene_pools: Vec<GenePool>,
}

impl ControlSet {
    /// Validates and fixes the order of a set of controls.
    ///
    /// # Errors
    /// Returns [`HostError::NoControls`] if there is nothing to
    /// evolve, [`HostError::DuplicateControl`] for a repeated
    /// identifier, [`HostError::InvalidRange`] for a range that
    /// is inverted or not finite, and [`HostError::EmptyGenePool`]
    /// for a pool without slots.
    ///
    /// # Examples
    /// ```
    /// use biomorph_host::{ControlSet, GenePool, HostError, Slider};
    ///
    /// let controls = ControlSet::resolve(
    ///     vec![Slider::new("height", 10.0, 40.0, 1)],
    ///     vec![GenePool::new("floors", 0.0, 1.0, 4)],
    /// )
    /// .unwrap();
    /// assert_eq!(controls.gene_count(), 5);
    ///
    /// let duplicate = ControlSet::resolve(
    ///     vec![Slider::new("a", 0.0, 1.0, 2), Slider::new("a", 0.0, 1.0, 2)],
    ///     vec![],
    /// );
    /// assert_eq!(duplicate.unwrap_err(), HostError::DuplicateControl("a".into()));
    /// ```
    pub fn resolve(sliders: Vec<Slider>, gene_pools: Vec<GenePool>) -> Result<ControlSet> {
        if sliders.is_empty() && gene_pools.is_empty() {
            return Err(HostError::NoControls);
        }

        let mut seen = HashSet::with_hasher(RandomState::new());
        let ranges = sliders
            .iter()
            .map(|s| (&s.id, s.min, s.max))
            .chain(gene_pools.iter().map(|p| (&p.id, p.min, p.max)));
        for (id, min, max) in ranges {
            if !seen.insert(id.as_str()) {
                return Err(HostError::DuplicateControl(id.clone()));
            }
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(HostError::InvalidRange {
                    id: id.clone(),
                    min,
                    max,
                });
            }
        }
        if let Some(pool) = gene_pools.iter().find(|p| p.slots == 0) {
            return Err(HostError::EmptyGenePool(pool.id.clone()));
        }

        let controls = ControlSet {
            sliders,
            gene_pools,
        };
        log::debug!(
            "resolved {} sliders and {} gene pools into {} genes",
            controls.sliders.len(),
            controls.gene_pools.len(),
            controls.gene_count()
        );
        Ok(controls)
    }

    /// Returns the gene vector length this set needs.
    pub fn gene_count(&self) -> usize {
        self.sliders.len() + self.gene_pools.iter().map(|p| p.slots).sum::<usize>()
    }

    pub fn sliders(&self) -> &[Slider] {
        &self.sliders
    }

    pub fn gene_pools(&self) -> &[GenePool] {
        &self.gene_pools
    }

    /// Maps a gene vector onto the controls.
    ///
    /// # Errors
    /// Returns [`biomorph::Error::ControlCountMismatch`] if the
    /// vector's length differs from [`gene_count`].
    ///
    /// [`gene_count`]: ControlSet::gene_count
    pub fn decode(&self, genes: &GeneVector) -> std::result::Result<ParameterValues, biomorph::Error> {
        if genes.len() != self.gene_count() {
            return Err(biomorph::Error::ControlCountMismatch {
                expected: genes.len(),
                found: self.gene_count(),
            });
        }
        let mut genes = genes.iter();
        let sliders = self
            .sliders
            .iter()
            .zip(genes.by_ref())
            .map(|(s, g)| s.value_at(g))
            .collect();
        let gene_pools = self
            .gene_pools
            .iter()
            .map(|p| {
                genes
                    .by_ref()
                    .take(p.slots)
                    .map(|g| p.value_at(g))
                    .collect::<Vec<f64>>()
            })
            .collect();
        Ok(ParameterValues {
            sliders,
            gene_pools,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controls() -> ControlSet {
        ControlSet::resolve(
            vec![
                Slider::new("height", 10.0, 40.0, 0),
                Slider::new("taper", 0.0, 1.0, 2),
            ],
            vec![
                GenePool::new("floor-widths", 2.0, 6.0, 3),
                GenePool::new("twist", -1.0, 1.0, 2),
            ],
        )
        .unwrap()
    }

    #[test]
    fn sliders_come_before_gene_pool_slots() {
        let genes =
            GeneVector::from_values(vec![0.5, 0.257, 0.0, 0.5, 1.0, 0.25, 0.75]).unwrap();
        let values = controls().decode(&genes).unwrap();
        assert_eq!(values.sliders, vec![25.0, 0.26]);
        assert_eq!(values.gene_pools, vec![vec![2.0, 4.0, 6.0], vec![-0.5, 0.5]]);
    }

    #[test]
    fn wrong_length_is_a_control_count_mismatch() {
        let genes = GeneVector::from_values(vec![0.5; 6]).unwrap();
        assert_eq!(
            controls().decode(&genes).unwrap_err(),
            biomorph::Error::ControlCountMismatch {
                expected: 6,
                found: 7
            }
        );
    }

    #[test]
    fn rounding_never_leaves_the_range() {
        let slider = Slider::new("odd", 0.0, 1.05, 1);
        assert_eq!(slider.value_at(1.0), 1.05);
        assert_eq!(slider.value_at(0.5), 0.5);
    }

    #[test]
    fn invalid_controls_are_rejected() {
        assert_eq!(
            ControlSet::resolve(vec![], vec![]).unwrap_err(),
            HostError::NoControls
        );
        assert_eq!(
            ControlSet::resolve(vec![Slider::new("s", 2.0, 1.0, 0)], vec![]).unwrap_err(),
            HostError::InvalidRange {
                id: "s".into(),
                min: 2.0,
                max: 1.0
            }
        );
        assert_eq!(
            ControlSet::resolve(vec![], vec![GenePool::new("p", 0.0, 1.0, 0)]).unwrap_err(),
            HostError::EmptyGenePool("p".into())
        );
        assert_eq!(
            ControlSet::resolve(
                vec![Slider::new("x", 0.0, 1.0, 0)],
                vec![GenePool::new("x", 0.0, 1.0, 2)]
            )
            .unwrap_err(),
            HostError::DuplicateControl("x".into())
        );
    }
}
