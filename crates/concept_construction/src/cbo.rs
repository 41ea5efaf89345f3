use std::collections::HashSet;

use log::debug;
use rayon::prelude::*;

use formal_context::ClosureContext;

use crate::{CbOParams, ConstructionError, Parallelism, Result};

/// Closed set over the iterated axis together with its derived description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClosedPair<S> {
    /// Sorted closed elements of the iterated axis.
    pub elements: Vec<usize>,
    /// What those elements share, as computed by `intention`.
    pub sideset: S,
}

#[derive(Clone, Debug)]
struct Candidate {
    combination: Vec<usize>,
    last: Option<usize>,
    seeded: bool,
}

struct Plan {
    domain: Vec<usize>,
    check: Vec<usize>,
}

impl Plan {
    fn new(size: usize, params: &CbOParams) -> Result<Self> {
        let in_range = |element: usize| {
            if element < size {
                Ok(element)
            } else {
                Err(ConstructionError::ElementOutOfRange { element, size })
            }
        };
        let mut domain = match &params.domain {
            Some(domain) => domain.iter().map(|&e| in_range(e)).collect::<Result<Vec<_>>>()?,
            None => (0..size).collect(),
        };
        domain.sort_unstable();
        domain.dedup();

        let mut check = match &params.iter_elements_to_check {
            Some(check) => check.clone(),
            None => domain.clone(),
        };
        check.sort_unstable();
        check.dedup();
        if let Some(&outside) = check.iter().find(|e| domain.binary_search(e).is_err()) {
            return Err(ConstructionError::CheckOutsideDomain(outside));
        }
        Ok(Self { domain, check })
    }

    fn seeds(&self, size: usize, params: &CbOParams) -> Result<Vec<Candidate>> {
        let Some(seeds) = &params.initial_combinations else {
            return Ok(vec![Candidate {
                combination: Vec::new(),
                last: None,
                seeded: false,
            }]);
        };
        seeds
            .iter()
            .map(|seed| {
                if let Some(&element) = seed.iter().find(|&&e| e >= size) {
                    return Err(ConstructionError::ElementOutOfRange { element, size });
                }
                let mut combination = seed.clone();
                combination.sort_unstable();
                combination.dedup();
                Ok(Candidate {
                    combination,
                    last: None,
                    seeded: true,
                })
            })
            .collect()
    }

    fn is_checked(&self, element: usize) -> bool {
        self.check.binary_search(&element).is_ok()
    }

    /// Closes a candidate, or rejects it when a smaller checked element would have
    /// produced the same closure earlier.
    fn evaluate<C: ClosureContext>(
        &self,
        ctx: &C,
        candidate: &Candidate,
    ) -> Option<ClosedPair<C::Intent>> {
        let sideset = ctx.intention(&candidate.combination);
        let elements = ctx.extension(&sideset, Some(&self.domain));
        if let Some(last) = candidate.last {
            let non_canonical = elements.iter().any(|&x| {
                x < last && self.is_checked(x) && !candidate.combination.contains(&x)
            });
            if non_canonical {
                return None;
            }
        }
        Some(ClosedPair { elements, sideset })
    }

    /// Extensions of an accepted closure, largest element first.
    fn children<'a>(
        &'a self,
        candidate: &'a Candidate,
        closed: &'a [usize],
    ) -> impl Iterator<Item = Candidate> + 'a {
        self.check
            .iter()
            .rev()
            .copied()
            .filter(move |&x| closed.binary_search(&x).is_err())
            .filter(move |&x| candidate.seeded || candidate.last.is_none_or(|last| x > last))
            .map(move |x| {
                let mut combination = closed.to_vec();
                combination.push(x);
                Candidate {
                    combination,
                    last: Some(x),
                    seeded: false,
                }
            })
    }
}

/// Enumerates every closed set of `ctx` over its object axis.
///
/// Each closed set appears once. With `params` left at default this yields all
/// concepts; seeds and a narrowed check list resume a partial enumeration.
pub fn close_by_one<C: ClosureContext>(
    ctx: &C,
    params: &CbOParams,
    parallelism: Parallelism,
) -> Result<Vec<ClosedPair<C::Intent>>> {
    let size = ctx.n_objects();
    let plan = Plan::new(size, params)?;
    let seeds = plan.seeds(size, params)?;
    let (closed, visited) = match parallelism {
        Parallelism::Sequential => depth_first(ctx, &plan, seeds),
        Parallelism::Threads(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n.get())
                .build()?;
            pool.install(|| level_by_level(ctx, &plan, seeds))
        }
    };
    debug!(
        "close_by_one: {} closed sets from {} candidates ({} jobs)",
        closed.len(),
        visited,
        parallelism.n_jobs()
    );
    Ok(closed)
}

fn depth_first<C: ClosureContext>(
    ctx: &C,
    plan: &Plan,
    seeds: Vec<Candidate>,
) -> (Vec<ClosedPair<C::Intent>>, usize) {
    let mut stack: Vec<Candidate> = seeds.into_iter().rev().collect();
    let mut found: HashSet<Vec<usize>> = HashSet::new();
    let mut closed = Vec::new();
    let mut visited = 0;
    while let Some(candidate) = stack.pop() {
        visited += 1;
        let Some(pair) = plan.evaluate(ctx, &candidate) else {
            continue;
        };
        if !found.insert(pair.elements.clone()) {
            continue;
        }
        // descending push, so the smallest extension is explored next
        stack.extend(plan.children(&candidate, &pair.elements));
        closed.push(pair);
    }
    (closed, visited)
}

/// Closes each frontier in parallel, then merges it in frontier order so the
/// duplicate table is only written from one thread.
fn level_by_level<C: ClosureContext>(
    ctx: &C,
    plan: &Plan,
    seeds: Vec<Candidate>,
) -> (Vec<ClosedPair<C::Intent>>, usize) {
    let mut frontier = seeds;
    let mut found: HashSet<Vec<usize>> = HashSet::new();
    let mut closed = Vec::new();
    let mut visited = 0;
    while !frontier.is_empty() {
        visited += frontier.len();
        let evaluated: Vec<_> = frontier
            .par_iter()
            .map(|candidate| plan.evaluate(ctx, candidate))
            .collect();
        let mut next = Vec::new();
        for (candidate, pair) in frontier.iter().zip(evaluated) {
            let Some(pair) = pair else {
                continue;
            };
            if !found.insert(pair.elements.clone()) {
                continue;
            }
            next.extend(plan.children(candidate, &pair.elements));
            closed.push(pair);
        }
        frontier = next;
    }
    (closed, visited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formal_context::BinaryContext;
    use std::num::NonZeroUsize;

    fn chain() -> BinaryContext {
        // nested rows: g0 ⊂ g1 ⊂ g2
        BinaryContext::from_bools(&[
            vec![true, false, false],
            vec![true, true, false],
            vec![true, true, true],
        ])
        .expect("valid context")
    }

    fn extents(pairs: &[ClosedPair<formal_concept::ItemSet>]) -> Vec<Vec<usize>> {
        let mut out: Vec<_> = pairs.iter().map(|p| p.elements.clone()).collect();
        out.sort();
        out
    }

    #[test]
    fn chain_context_has_one_concept_per_level() {
        let pairs = close_by_one(&chain(), &CbOParams::default(), Parallelism::Sequential)
            .expect("valid params");
        assert_eq!(extents(&pairs), vec![vec![0, 1, 2], vec![1, 2], vec![2]]);
    }

    #[test]
    fn first_closed_set_is_the_closure_of_nothing() {
        let pairs = close_by_one(&chain(), &CbOParams::default(), Parallelism::Sequential)
            .expect("valid params");
        assert_eq!(pairs[0].elements, vec![2]);
        assert_eq!(pairs[0].sideset.indices(), &[0, 1, 2]);
    }

    #[test]
    fn threads_find_the_same_closed_sets() {
        let ctx = chain();
        let sequential =
            close_by_one(&ctx, &CbOParams::default(), Parallelism::Sequential).expect("valid");
        let threads = NonZeroUsize::new(3).map(Parallelism::Threads).expect("non-zero");
        let parallel = close_by_one(&ctx, &CbOParams::default(), threads).expect("valid");
        assert_eq!(extents(&sequential), extents(&parallel));
    }

    #[test]
    fn domain_restricts_closures() {
        let params = CbOParams {
            domain: Some(vec![1, 2]),
            ..CbOParams::default()
        };
        let pairs = close_by_one(&chain(), &params, Parallelism::Sequential).expect("valid");
        assert_eq!(extents(&pairs), vec![vec![1, 2], vec![2]]);
    }

    #[test]
    fn empty_context_yields_a_single_closed_set() {
        let ctx = BinaryContext::from_bools(&[]).expect("empty context");
        let pairs = close_by_one(&ctx, &CbOParams::default(), Parallelism::Sequential)
            .expect("valid");
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].elements.is_empty());
    }

    #[test]
    fn invalid_params_are_reported() {
        let ctx = chain();
        let outside = CbOParams {
            domain: Some(vec![0, 7]),
            ..CbOParams::default()
        };
        assert!(matches!(
            close_by_one(&ctx, &outside, Parallelism::Sequential),
            Err(ConstructionError::ElementOutOfRange { element: 7, size: 3 })
        ));
        let unchecked = CbOParams {
            domain: Some(vec![0, 1]),
            iter_elements_to_check: Some(vec![2]),
            ..CbOParams::default()
        };
        assert!(matches!(
            close_by_one(&ctx, &unchecked, Parallelism::Sequential),
            Err(ConstructionError::CheckOutsideDomain(2))
        ));
    }
}
