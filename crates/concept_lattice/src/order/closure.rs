use std::collections::BTreeSet;

use formal_concept::{Concept, Intent};

use super::{Adjacency, canonical_order};

/// Transitive closure of `subconcepts`: every concept strictly below each concept.
pub fn all_descendants<I: Intent>(concepts: &[Concept<I>], subconcepts: &Adjacency) -> Adjacency {
    let mut closed: Adjacency = vec![BTreeSet::new(); concepts.len()];
    // specific first, so children are complete before their parents
    for c in canonical_order(concepts).into_iter().rev() {
        let mut below = subconcepts[c].clone();
        for &s in &subconcepts[c] {
            below.extend(closed[s].iter().copied());
        }
        closed[c] = below;
    }
    closed
}

/// Transitive closure of `superconcepts`: every concept strictly above each concept.
pub fn all_ancestors<I: Intent>(concepts: &[Concept<I>], superconcepts: &Adjacency) -> Adjacency {
    let mut closed: Adjacency = vec![BTreeSet::new(); concepts.len()];
    for c in canonical_order(concepts) {
        let mut above = superconcepts[c].clone();
        for &s in &superconcepts[c] {
            above.extend(closed[s].iter().copied());
        }
        closed[c] = above;
    }
    closed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::fixtures::*;
    use crate::order::{complete_comparison, transpose};
    use concept_construction::Parallelism;

    #[test]
    fn descendants_match_strict_extent_inclusion() {
        let concepts = concepts_of(&contranominal(4));
        let subs = complete_comparison(&concepts, Parallelism::Sequential).expect("no pool");
        let below = all_descendants(&concepts, &subs);
        let above = all_ancestors(&concepts, &transpose(&subs));
        for a in 0..concepts.len() {
            for b in 0..concepts.len() {
                let lt = concepts[b].extent_lt(&concepts[a]);
                assert_eq!(below[a].contains(&b), lt);
                assert_eq!(above[b].contains(&a), lt);
            }
        }
    }
}
