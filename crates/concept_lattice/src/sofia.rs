use std::cmp::Reverse;
use std::collections::HashMap;

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use concept_construction::{CbOParams, ClosedPair, TransposedContext, close_by_one};
use formal_concept::{Concept, Intent, ItemSet};
use formal_context::{BinaryContext, ClosureContext, IntervalContext};

use crate::config::{OrderAlgorithm, ProjectionSorting, SofiaConfig};
use crate::measures::{
    StabilityLogBound, StabilityLowerBound, StabilityUpperBound, stability_bounds,
};
use crate::order::canonical_order;
use crate::{ConceptLattice, PruningMeasure, Result};

/// Contexts SOFIA can grow one projection at a time.
///
/// Binary contexts are projected on attributes, interval contexts on objects.
pub trait SofiaContext: ClosureContext + Sized {
    fn n_projections(&self) -> usize;

    /// Weight used by ascending/descending projection sorting.
    fn projection_support(&self, projection: usize) -> usize;

    /// Largest extent a concept refined by this projection can have, if bounded.
    fn projection_extent_bound(&self, projection: usize) -> Option<usize>;

    fn sofia(&self, config: &SofiaConfig) -> Result<ConceptLattice<Self::Intent>>;
}

impl<I: Intent> ConceptLattice<I> {
    /// Approximate lattice of at most `config.l_max` concepts plus top and bottom.
    pub fn sofia<C>(ctx: &C, config: &SofiaConfig) -> Result<Self>
    where
        C: SofiaContext<Intent = I>,
    {
        ctx.sofia(config)
    }
}

/// How closed pairs of the projected view map onto concepts of the context.
trait Axis<V: ClosureContext, I: Intent> {
    fn concept(&self, pair: ClosedPair<V::Intent>) -> Concept<I>;

    /// Elements of the view that regenerate the concept.
    fn seed(&self, concept: &Concept<I>) -> Vec<usize>;

    /// The part that stays fixed while the concept is refined.
    fn sideset(&self, concept: &Concept<I>) -> V::Intent;
}

struct AttributeAxis<'a> {
    ctx: &'a BinaryContext,
}

impl<'a> Axis<TransposedContext<'a>, ItemSet> for AttributeAxis<'a> {
    fn concept(&self, pair: ClosedPair<ItemSet>) -> Concept<ItemSet> {
        let intent = ItemSet::from_indices(pair.elements, self.ctx.attribute_names());
        Concept::new(pair.sideset, intent, Some(self.ctx.context_hash()))
    }

    fn seed(&self, concept: &Concept<ItemSet>) -> Vec<usize> {
        concept.intent().indices().to_vec()
    }

    fn sideset(&self, concept: &Concept<ItemSet>) -> ItemSet {
        concept.extent().clone()
    }
}

struct ObjectAxis<'a, C> {
    ctx: &'a C,
}

impl<C: ClosureContext> Axis<C, C::Intent> for ObjectAxis<'_, C> {
    fn concept(&self, pair: ClosedPair<C::Intent>) -> Concept<C::Intent> {
        let extent = ItemSet::from_indices(pair.elements, self.ctx.object_names());
        Concept::new(extent, pair.sideset, Some(self.ctx.context_hash()))
    }

    fn seed(&self, concept: &Concept<C::Intent>) -> Vec<usize> {
        concept.extent().indices().to_vec()
    }

    fn sideset(&self, concept: &Concept<C::Intent>) -> C::Intent {
        concept.intent().clone()
    }
}

impl SofiaContext for BinaryContext {
    fn n_projections(&self) -> usize {
        self.n_attributes()
    }

    fn projection_support(&self, projection: usize) -> usize {
        self.column_support(projection)
    }

    fn projection_extent_bound(&self, projection: usize) -> Option<usize> {
        Some(self.column_support(projection))
    }

    fn sofia(&self, config: &SofiaConfig) -> Result<ConceptLattice<ItemSet>> {
        let order = projection_order(self, config)?;
        let min_support = config.min_support(self.n_objects());
        let view = TransposedContext::new(self);
        run(&view, &AttributeAxis { ctx: self }, &order, min_support, config)
    }
}

impl SofiaContext for IntervalContext {
    fn n_projections(&self) -> usize {
        self.n_objects()
    }

    /// Number of objects indistinguishable from this one.
    fn projection_support(&self, projection: usize) -> usize {
        self.extension(&self.intention(&[projection]), None).len()
    }

    /// Adding an object only grows extents, so nothing bounds them.
    fn projection_extent_bound(&self, _projection: usize) -> Option<usize> {
        None
    }

    fn sofia(&self, config: &SofiaConfig) -> Result<ConceptLattice<Self::Intent>> {
        let order = projection_order(self, config)?;
        let min_support = config.min_support(self.n_objects());
        run(self, &ObjectAxis { ctx: self }, &order, min_support, config)
    }
}

fn projection_order<C: SofiaContext>(ctx: &C, config: &SofiaConfig) -> Result<Vec<usize>> {
    let n = ctx.n_projections();
    config.validate(n)?;
    let mut order: Vec<usize> = (0..n).collect();
    match &config.projection_sorting {
        ProjectionSorting::Ascending => order.sort_by_key(|&p| (ctx.projection_support(p), p)),
        ProjectionSorting::Descending => {
            order.sort_by_key(|&p| (Reverse(ctx.projection_support(p)), p))
        }
        ProjectionSorting::Random(seed) => order.shuffle(&mut StdRng::seed_from_u64(*seed)),
        ProjectionSorting::Given(given) => order.clone_from(given),
    }
    let min_support = config.min_support(ctx.n_objects());
    order.retain(|&p| ctx.projection_extent_bound(p).is_none_or(|bound| bound >= min_support));
    if order.len() < n {
        debug!("sofia: {} projections below support {min_support} skipped", n - order.len());
    }
    Ok(order)
}

fn run<V, I, A>(
    view: &V,
    axis: &A,
    order: &[usize],
    min_support: usize,
    config: &SofiaConfig,
) -> Result<ConceptLattice<I>>
where
    V: ClosureContext,
    I: Intent,
    A: Axis<V, I>,
{
    let start = config.start_size(order.len());
    let mut domain: Vec<usize> = order[..start].to_vec();
    let initial = CbOParams {
        domain: Some(domain.clone()),
        ..CbOParams::default()
    };
    let concepts: Vec<Concept<I>> = close_by_one(view, &initial, config.parallelism)?
        .into_iter()
        .map(|pair| axis.concept(pair))
        .collect();
    let mut lattice = ConceptLattice::from_concepts(
        concepts,
        OrderAlgorithm::CompleteComparison,
        config.parallelism,
    )?
    .sorted();
    debug!("sofia: {} concepts on the first {start} projections", lattice.len());
    drop_rare(&mut lattice, min_support)?;
    prune(&mut lattice, config)?;

    for &projection in &order[start..] {
        domain.push(projection);
        let params = CbOParams {
            domain: Some(domain.clone()),
            initial_combinations: Some(lattice.concepts().iter().map(|c| axis.seed(c)).collect()),
            iter_elements_to_check: Some(vec![projection]),
        };
        let by_sideset: HashMap<V::Intent, usize> = lattice
            .concepts()
            .iter()
            .enumerate()
            .map(|(i, c)| (axis.sideset(c), i))
            .collect();

        let mut fresh = Vec::new();
        let mut refined = 0;
        for pair in close_by_one(view, &params, config.parallelism)? {
            match by_sideset.get(&pair.sideset).copied() {
                // a later pair with the same sideset overwrites an earlier one
                Some(i) => {
                    lattice.replace_concept(i, axis.concept(pair));
                    refined += 1;
                }
                None => fresh.push(axis.concept(pair)),
            }
        }

        // rare concepts only get in as the new bottom
        let bottom = lattice.bottom_concept();
        fresh.retain(|c| c.support() >= min_support || c.extent_lt(bottom));
        let n_fresh = fresh.len();
        for concept in insertion_order(&lattice, fresh) {
            lattice.add(concept)?;
        }
        let rare = drop_rare(&mut lattice, min_support)?;
        let pruned = prune(&mut lattice, config)?;
        debug!(
            "sofia: projection {projection}: {refined} refined, {n_fresh} new, {rare} rare, {pruned} pruned, {} kept",
            lattice.len()
        );
    }

    match config.measure {
        PruningMeasure::LStab => lattice.calc_custom_measure(&StabilityLowerBound),
        PruningMeasure::UStab => lattice.calc_custom_measure(&StabilityUpperBound),
        PruningMeasure::LogLStab => lattice.calc_custom_measure(&StabilityLogBound),
    }
    info!(
        "sofia: {} concepts over {} projections (l_max {})",
        lattice.len(),
        order.len(),
        config.l_max
    );
    Ok(lattice.sorted())
}

/// New top first, then new bottom, then the rest by descending support.
///
/// Keeps a single top and bottom between insertions.
fn insertion_order<I: Intent>(lattice: &ConceptLattice<I>, fresh: Vec<Concept<I>>) -> Vec<Concept<I>> {
    let top = lattice.top_concept();
    let bottom = lattice.bottom_concept();
    let mut first = Vec::new();
    let mut second = Vec::new();
    let mut rest = Vec::new();
    let order = canonical_order(&fresh);
    let mut slots: Vec<Option<Concept<I>>> = fresh.into_iter().map(Some).collect();
    for concept in order.into_iter().filter_map(|i| slots[i].take()) {
        if top.extent_lt(&concept) {
            first.push(concept);
        } else if concept.extent_lt(bottom) {
            second.push(concept);
        } else {
            rest.push(concept);
        }
    }
    first.into_iter().chain(second).chain(rest).collect()
}

/// Drops concepts supported by fewer than `min_support` objects, except top and bottom.
fn drop_rare<I: Intent>(lattice: &mut ConceptLattice<I>, min_support: usize) -> Result<usize> {
    if min_support == 0 {
        return Ok(0);
    }
    let (top, bottom) = (lattice.top(), lattice.bottom());
    let rare: Vec<usize> = (0..lattice.len())
        .filter(|&i| i != top && i != bottom && lattice.concepts()[i].support() < min_support)
        .collect();
    for &index in rare.iter().rev() {
        lattice.remove(index)?;
    }
    Ok(rare.len())
}

/// Drops every concept scoring at or below the `l_max`-th best, except top and bottom.
fn prune<I: Intent>(lattice: &mut ConceptLattice<I>, config: &SofiaConfig) -> Result<usize> {
    if lattice.len() <= config.l_max {
        return Ok(0);
    }
    let values = stability_bounds(lattice.concepts(), lattice.subconcepts_dict(), config.measure);
    let mut ranked = values.clone();
    ranked.sort_by(|a, b| b.total_cmp(a));
    let cutoff = ranked[config.l_max];
    let (top, bottom) = (lattice.top(), lattice.bottom());
    let doomed: Vec<usize> = (0..values.len())
        .filter(|&i| values[i] <= cutoff && i != top && i != bottom)
        .collect();
    for &index in doomed.iter().rev() {
        lattice.remove(index)?;
    }
    debug!("sofia: pruned {} concepts at cutoff {cutoff}", doomed.len());
    Ok(doomed.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::complete_comparison;
    use crate::order::fixtures::contranominal;
    use crate::{ConceptLattice, LatticeConfig};
    use concept_construction::Parallelism;

    #[test]
    fn large_l_max_reproduces_the_full_lattice() {
        let ctx = contranominal(4);
        let config = SofiaConfig {
            proj_to_start: Some(1),
            ..SofiaConfig::with_l_max(1000)
        };
        let approx = ConceptLattice::sofia(&ctx, &config).expect("valid config");
        let exact = ConceptLattice::from_context(&ctx, &LatticeConfig::default()).expect("valid config");
        assert_eq!(approx, exact);
    }

    #[test]
    fn interval_contexts_grow_by_objects() {
        let ctx = IntervalContext::new(
            None,
            None,
            vec![
                vec![1.0, 5.0],
                vec![2.0, 4.0],
                vec![2.0, 1.0],
                vec![4.0, 1.0],
                vec![3.0, 3.0],
            ],
        )
        .expect("finite values");
        let config = SofiaConfig {
            proj_to_start: Some(2),
            projection_sorting: ProjectionSorting::Random(3),
            ..SofiaConfig::with_l_max(1000)
        };
        let approx = ConceptLattice::sofia(&ctx, &config).expect("valid config");
        let exact = ConceptLattice::from_context(&ctx, &LatticeConfig::default()).expect("valid config");
        assert_eq!(approx, exact);
        assert_eq!(approx.top_concept().support(), 5);
        assert_eq!(approx.bottom_concept().support(), 0);
    }

    #[test]
    fn l_max_bounds_the_lattice_size() {
        let ctx = contranominal(5);
        let lattice = ConceptLattice::sofia(&ctx, &SofiaConfig::with_l_max(6)).expect("valid config");
        assert!(lattice.len() <= 6 + 2);
        assert_eq!(lattice.top_concept().support(), 5);
        assert_eq!(lattice.bottom_concept().support(), 0);
        let lstab = formal_concept::MeasureName::LStab;
        assert!(lattice.concepts().iter().all(|c| c.measure(&lstab).is_some()));
    }

    #[test]
    fn min_supp_keeps_frequent_concepts_and_the_bottom() {
        let ctx = contranominal(4);
        let config = SofiaConfig {
            min_supp: 0.5,
            proj_to_start: Some(1),
            ..SofiaConfig::with_l_max(1000)
        };
        let lattice = ConceptLattice::sofia(&ctx, &config).expect("valid config");
        // supports 4, 3 and 2 survive; the empty extent stays as bottom
        assert_eq!(lattice.len(), 1 + 4 + 6 + 1);
        assert_eq!(lattice.bottom_concept().support(), 0);
        let bottom = lattice.bottom();
        assert!(
            (0..lattice.len())
                .filter(|&i| i != bottom)
                .all(|i| lattice.concepts()[i].support() >= 2)
        );
        let expected = complete_comparison(lattice.concepts(), Parallelism::Sequential)
            .expect("no pool");
        assert_eq!(lattice.subconcepts_dict(), &expected);
    }

    #[test]
    fn rare_projections_are_skipped() {
        let ctx = BinaryContext::from_bools(&[
            vec![true, true, false],
            vec![false, true, false],
            vec![false, true, true],
        ])
        .expect("valid context");
        let config = SofiaConfig {
            min_supp: 2.0,
            ..SofiaConfig::with_l_max(4)
        };
        assert_eq!(projection_order(&ctx, &config).expect("valid config"), vec![1]);
        let lattice = ConceptLattice::sofia(&ctx, &config).expect("valid config");
        // only the full column is ever added, so top and bottom coincide
        assert_eq!(lattice.len(), 1);
        assert_eq!(lattice.top_concept().support(), 3);
    }

    #[test]
    fn log_bound_prunes_to_l_max() {
        let ctx = contranominal(5);
        let config = SofiaConfig {
            measure: PruningMeasure::LogLStab,
            ..SofiaConfig::with_l_max(6)
        };
        let lattice = ConceptLattice::sofia(&ctx, &config).expect("valid config");
        assert!(lattice.len() <= 6 + 2);
        assert_eq!(lattice.top_concept().support(), 5);
        assert_eq!(lattice.bottom_concept().support(), 0);
        let log = formal_concept::MeasureName::LogLStab;
        assert!(lattice.concepts().iter().all(|c| c.measure(&log).is_some()));
    }

    #[test]
    fn projection_orders() {
        let ctx = BinaryContext::from_bools(&[
            vec![true, true, false],
            vec![false, true, false],
            vec![false, true, true],
        ])
        .expect("valid context");
        let order = |sorting| {
            let config = SofiaConfig {
                projection_sorting: sorting,
                ..SofiaConfig::with_l_max(4)
            };
            projection_order(&ctx, &config).expect("valid config")
        };
        assert_eq!(order(ProjectionSorting::Ascending), vec![0, 2, 1]);
        assert_eq!(order(ProjectionSorting::Descending), vec![1, 0, 2]);
        assert_eq!(order(ProjectionSorting::Given(vec![2, 0, 1])), vec![2, 0, 1]);
        let shuffled = order(ProjectionSorting::Random(9));
        assert_eq!(shuffled, order(ProjectionSorting::Random(9)));
        let mut sorted = shuffled.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
    }
}
