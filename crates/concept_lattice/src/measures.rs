use std::collections::BTreeMap;

use formal_concept::{Concept, Intent, MeasureName};

use crate::config::PruningMeasure;
use crate::order::{Adjacency, all_descendants, canonical_order};
use crate::{ConceptLattice, ConfigError, Result};

/// Scores a concept by its position in a lattice.
pub trait ConceptMeasure<I: Intent> {
    fn name(&self) -> MeasureName;

    fn compute(&self, index: usize, lattice: &ConceptLattice<I>) -> f64;

    fn compute_all(&self, lattice: &ConceptLattice<I>) -> Vec<f64> {
        (0..lattice.len()).map(|i| self.compute(i, lattice)).collect()
    }
}

/// `1 - Σ 2^-(|ext c| - |ext d|)` over direct subconcepts `d`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StabilityLowerBound;

/// `1 - max 2^-(|ext c| - |ext d|)` over direct subconcepts `d`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StabilityUpperBound;

/// `|ext c| - max |ext d|` over direct subconcepts `d`: the base-2 logarithm
/// scale of the stability lower bound.
#[derive(Clone, Copy, Debug, Default)]
pub struct StabilityLogBound;

/// Share of extent subsets whose closure is the concept itself.
///
/// Derived from the order alone, so it is exact only on a complete lattice.
/// The value of one concept depends on every concept below it, so
/// [`ConceptMeasure::compute`] runs the whole pass; prefer
/// [`ConceptMeasure::compute_all`] when scoring more than one concept.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stability;

fn gaps<'a, I: Intent>(
    concepts: &'a [Concept<I>],
    subconcepts: &'a Adjacency,
    index: usize,
) -> impl Iterator<Item = f64> + 'a {
    let support = concepts[index].support();
    subconcepts[index]
        .iter()
        .map(move |&d| (-((support - concepts[d].support()) as f64)).exp2())
}

pub(crate) fn stability_bound<I: Intent>(
    concepts: &[Concept<I>],
    subconcepts: &Adjacency,
    index: usize,
    measure: PruningMeasure,
) -> f64 {
    match measure {
        PruningMeasure::LogLStab => {
            let support = concepts[index].support();
            let largest_child = subconcepts[index].iter().map(|&d| concepts[d].support()).max();
            (support - largest_child.unwrap_or(0)) as f64
        }
        _ if subconcepts[index].is_empty() => 1.0,
        PruningMeasure::LStab => 1.0 - gaps(concepts, subconcepts, index).sum::<f64>(),
        PruningMeasure::UStab => 1.0 - gaps(concepts, subconcepts, index).fold(0.0, f64::max),
    }
}

pub(crate) fn stability_bounds<I: Intent>(
    concepts: &[Concept<I>],
    subconcepts: &Adjacency,
    measure: PruningMeasure,
) -> Vec<f64> {
    (0..concepts.len())
        .map(|i| stability_bound(concepts, subconcepts, i, measure))
        .collect()
}

impl<I: Intent> ConceptMeasure<I> for StabilityLowerBound {
    fn name(&self) -> MeasureName {
        MeasureName::LStab
    }

    fn compute(&self, index: usize, lattice: &ConceptLattice<I>) -> f64 {
        stability_bound(
            lattice.concepts(),
            lattice.subconcepts_dict(),
            index,
            PruningMeasure::LStab,
        )
    }
}

impl<I: Intent> ConceptMeasure<I> for StabilityUpperBound {
    fn name(&self) -> MeasureName {
        MeasureName::UStab
    }

    fn compute(&self, index: usize, lattice: &ConceptLattice<I>) -> f64 {
        stability_bound(
            lattice.concepts(),
            lattice.subconcepts_dict(),
            index,
            PruningMeasure::UStab,
        )
    }
}

impl<I: Intent> ConceptMeasure<I> for StabilityLogBound {
    fn name(&self) -> MeasureName {
        MeasureName::LogLStab
    }

    fn compute(&self, index: usize, lattice: &ConceptLattice<I>) -> f64 {
        stability_bound(
            lattice.concepts(),
            lattice.subconcepts_dict(),
            index,
            PruningMeasure::LogLStab,
        )
    }
}

impl<I: Intent> ConceptMeasure<I> for Stability {
    fn name(&self) -> MeasureName {
        MeasureName::Stab
    }

    fn compute(&self, index: usize, lattice: &ConceptLattice<I>) -> f64 {
        self.compute_all(lattice).get(index).copied().unwrap_or(f64::NAN)
    }

    fn compute_all(&self, lattice: &ConceptLattice<I>) -> Vec<f64> {
        let concepts = lattice.concepts();
        let below = all_descendants(concepts, lattice.subconcepts_dict());
        let mut stability = vec![0.0; concepts.len()];
        // every subset of ext(c) closes to exactly one e <= c
        for c in canonical_order(concepts).into_iter().rev() {
            let support = concepts[c].support();
            let elsewhere: f64 = below[c]
                .iter()
                .map(|&e| stability[e] * (concepts[e].support() as f64 - support as f64).exp2())
                .sum();
            stability[c] = 1.0 - elsewhere;
        }
        stability
    }
}

impl<I: Intent> ConceptLattice<I> {
    /// Attaches one of the built-in measures to every concept.
    pub fn calc_concepts_measures(&mut self, name: &MeasureName) -> Result<()> {
        match name {
            MeasureName::LStab => self.calc_custom_measure(&StabilityLowerBound),
            MeasureName::UStab => self.calc_custom_measure(&StabilityUpperBound),
            MeasureName::LogLStab => self.calc_custom_measure(&StabilityLogBound),
            MeasureName::Stab => self.calc_custom_measure(&Stability),
            MeasureName::Custom(other) => {
                return Err(ConfigError::UnknownMeasure(other.clone()).into());
            }
        }
        Ok(())
    }

    pub fn calc_custom_measure(&mut self, measure: &dyn ConceptMeasure<I>) {
        let name = measure.name();
        let values = measure.compute_all(self);
        for (concept, value) in self.concepts_mut().iter_mut().zip(values) {
            concept.measures_mut().insert(name.clone(), value);
        }
    }

    /// One value per concept, `None` where the measure is missing.
    pub fn measure_values(&self, name: &MeasureName) -> Vec<Option<f64>> {
        self.concepts().iter().map(|c| c.measure(name)).collect()
    }

    /// Every attached measure as a column over the concepts.
    pub fn measures(&self) -> BTreeMap<MeasureName, Vec<Option<f64>>> {
        let names: Vec<MeasureName> = self
            .concepts()
            .iter()
            .flat_map(|c| c.measures().iter().map(|(name, _)| name.clone()))
            .collect();
        names
            .into_iter()
            .map(|name| {
                let column = self.measure_values(&name);
                (name, column)
            })
            .collect()
    }
}
