use std::collections::BTreeSet;

use concept_construction::Parallelism;
use formal_concept::{Concept, Intent};

use super::{Adjacency, canonical_order, map_indices, transpose};
use crate::Result;

/// One superconcept edge per concept, picked while sifting down from a root.
///
/// Concepts that fall under no existing root start a new tree, so the result
/// may be a forest when the set has no single top.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpanningTree {
    pub parents: Vec<Option<usize>>,
    pub children: Vec<Vec<usize>>,
    pub roots: Vec<usize>,
}

pub fn construct_spanning_tree<I: Intent>(concepts: &[Concept<I>]) -> SpanningTree {
    let mut tree = SpanningTree {
        parents: vec![None; concepts.len()],
        children: vec![Vec::new(); concepts.len()],
        roots: Vec::new(),
    };
    for i in canonical_order(concepts) {
        let concept = &concepts[i];
        let Some(mut current) = tree
            .roots
            .iter()
            .copied()
            .find(|&r| concept.extent_lt(&concepts[r]))
        else {
            tree.roots.push(i);
            continue;
        };
        while let Some(next) = tree.children[current]
            .iter()
            .copied()
            .find(|&ch| concept.extent_lt(&concepts[ch]))
        {
            current = next;
        }
        tree.children[current].push(i);
        tree.parents[i] = Some(current);
    }
    tree
}

/// Root-to-node paths that together cover every concept.
///
/// Paths start from the most specific unvisited concept and are listed from
/// the general end, so each chain is strictly decreasing.
pub fn chains<I: Intent>(concepts: &[Concept<I>], tree: &SpanningTree) -> Vec<Vec<usize>> {
    let mut visited = vec![false; concepts.len()];
    let mut out = Vec::new();
    for i in canonical_order(concepts).into_iter().rev() {
        if visited[i] {
            continue;
        }
        let mut chain = vec![i];
        visited[i] = true;
        let mut current = i;
        while let Some(parent) = tree.parents[current] {
            chain.push(parent);
            visited[parent] = true;
            current = parent;
        }
        chain.reverse();
        out.push(chain);
    }
    out
}

/// Direct superconcepts of every concept, searched chain by chain.
///
/// Along a chain the concepts strictly above `c` form a prefix, so one binary
/// search per chain finds the lowest of them. Those candidates are then reduced
/// to the ones with no other candidate below them. Concepts are independent of
/// each other, so the search is spread over `parallelism` workers.
pub fn superconcepts_from_chains<I: Intent>(
    concepts: &[Concept<I>],
    chains: &[Vec<usize>],
    parallelism: Parallelism,
) -> Result<Adjacency> {
    map_indices(concepts.len(), parallelism, |c| {
        let concept = &concepts[c];
        let candidates: BTreeSet<usize> = chains
            .iter()
            .filter_map(|chain| {
                let above = chain.partition_point(|&x| concept.extent_lt(&concepts[x]));
                above.checked_sub(1).map(|last| chain[last])
            })
            .collect();
        let covers: BTreeSet<usize> = candidates
            .iter()
            .copied()
            .filter(|&e| {
                !candidates
                    .iter()
                    .any(|&f| f != e && concepts[f].extent_lt(&concepts[e]))
            })
            .collect();
        covers
    })
}

/// Direct subconcepts through spanning tree and chain decomposition.
pub fn construct_by_spanning_tree<I: Intent>(
    concepts: &[Concept<I>],
    parallelism: Parallelism,
) -> Result<Adjacency> {
    let tree = construct_spanning_tree(concepts);
    let chains = chains(concepts, &tree);
    Ok(transpose(&superconcepts_from_chains(concepts, &chains, parallelism)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::complete_comparison;
    use crate::order::fixtures::*;
    use std::num::NonZeroUsize;

    #[test]
    fn tree_has_single_root_for_a_lattice() {
        let concepts = concepts_of(&contranominal(3));
        let tree = construct_spanning_tree(&concepts);
        assert_eq!(tree.roots.len(), 1);
        assert_eq!(concepts[tree.roots[0]].support(), 3);
        let edges = tree.parents.iter().filter(|p| p.is_some()).count();
        assert_eq!(edges, concepts.len() - 1);
    }

    #[test]
    fn chains_cover_every_concept_and_decrease() {
        let concepts = concepts_of(&contranominal(4));
        let tree = construct_spanning_tree(&concepts);
        let chains = chains(&concepts, &tree);
        let covered: BTreeSet<usize> = chains.iter().flatten().copied().collect();
        assert_eq!(covered.len(), concepts.len());
        for chain in &chains {
            assert!(chain.windows(2).all(|w| concepts[w[1]].extent_lt(&concepts[w[0]])));
        }
    }

    #[test]
    fn agrees_with_complete_comparison() {
        for n in 1..5 {
            let mut concepts = concepts_of(&contranominal(n));
            concepts.reverse();
            let expected = complete_comparison(&concepts, Parallelism::Sequential).expect("no pool");
            let found = construct_by_spanning_tree(&concepts, Parallelism::Sequential).expect("no pool");
            assert_eq!(found, expected, "n = {n}");
        }
    }

    #[test]
    fn threaded_chain_search_matches_sequential() {
        let concepts = concepts_of(&contranominal(5));
        let tree = construct_spanning_tree(&concepts);
        let chains = chains(&concepts, &tree);
        let sequential =
            superconcepts_from_chains(&concepts, &chains, Parallelism::Sequential).expect("no pool");
        let threads = Parallelism::Threads(NonZeroUsize::new(4).expect("non-zero"));
        let threaded = superconcepts_from_chains(&concepts, &chains, threads).expect("pool builds");
        assert_eq!(threaded, sequential);
        assert_eq!(
            construct_by_spanning_tree(&concepts, threads).expect("pool builds"),
            transpose(&sequential)
        );
    }
}
