use std::cmp::Reverse;
use std::collections::BTreeSet;

use concept_construction::Parallelism;
use formal_concept::{Concept, Intent};

use super::{Adjacency, map_indices};
use crate::Result;

/// Direct subconcepts by comparing every pair of concepts.
///
/// Quadratic. Rows are independent, so they are spread over the pool when
/// `parallelism` allows it.
pub fn complete_comparison<I: Intent>(
    concepts: &[Concept<I>],
    parallelism: Parallelism,
) -> Result<Adjacency> {
    let all_subconcepts: Adjacency = map_indices(concepts.len(), parallelism, |a| {
        (0..concepts.len())
            .filter(|&b| concepts[b].extent_lt(&concepts[a]))
            .collect()
    })?;

    map_indices(concepts.len(), parallelism, |a| {
        let mut below: Vec<usize> = all_subconcepts[a].iter().copied().collect();
        below.sort_by_key(|&b| Reverse(concepts[b].support()));
        let mut direct: BTreeSet<usize> = all_subconcepts[a].clone();
        for b in below {
            if direct.contains(&b) {
                direct.retain(|c| !all_subconcepts[b].contains(c));
            }
        }
        direct
    })
}
