use std::collections::{BTreeSet, HashMap};

use log::debug;

use formal_concept::{Concept, ItemSet};
use formal_context::ClosureContext;

use crate::order::Adjacency;

/// Concepts and direct subconcepts by walking upper neighbours from the bottom.
///
/// For an extent `A`, each object `g` outside it gives the candidate
/// `B = closure(A ∪ {g})`. `B` covers `A` when no other still-minimal object
/// outside `A` lies in `B`; otherwise `g` is dropped from the minimal set.
pub fn lindig<C: ClosureContext>(ctx: &C) -> (Vec<Concept<C::Intent>>, Adjacency) {
    let close = |objects: &[usize]| {
        let intent = ctx.intention(objects);
        let extent = ctx.extension(&intent, None);
        (extent, intent)
    };

    let (bottom_extent, bottom_intent) = close(&[]);
    let mut index: HashMap<Vec<usize>, usize> = HashMap::from([(bottom_extent.clone(), 0)]);
    let mut found = vec![(bottom_extent, bottom_intent)];
    let mut subconcepts: Adjacency = vec![BTreeSet::new()];
    let mut pending = vec![0];

    while let Some(a) = pending.pop() {
        let extent = found[a].0.clone();
        let mut minimal: BTreeSet<usize> = (0..ctx.n_objects())
            .filter(|g| extent.binary_search(g).is_err())
            .collect();
        let candidates: Vec<usize> = minimal.iter().copied().collect();
        for g in candidates {
            if !minimal.contains(&g) {
                continue;
            }
            let mut grown = extent.clone();
            grown.push(g);
            let (upper, intent) = close(&grown);
            let shared = upper.iter().filter(|x| minimal.contains(x)).count();
            if shared != 1 {
                minimal.remove(&g);
                continue;
            }
            let b = match index.get(&upper) {
                Some(&b) => b,
                None => {
                    let b = found.len();
                    index.insert(upper.clone(), b);
                    found.push((upper, intent));
                    subconcepts.push(BTreeSet::new());
                    pending.push(b);
                    b
                }
            };
            subconcepts[b].insert(a);
        }
    }

    let hash = ctx.context_hash();
    let concepts: Vec<_> = found
        .into_iter()
        .map(|(extent, intent)| {
            Concept::new(ItemSet::from_indices(extent, ctx.object_names()), intent, Some(hash))
        })
        .collect();
    debug!("lindig: {} concepts", concepts.len());
    (concepts, subconcepts)
}
