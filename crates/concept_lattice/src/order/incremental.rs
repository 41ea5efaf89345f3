use std::cmp::Reverse;
use std::collections::{BTreeSet, VecDeque};

use formal_concept::{Concept, ConceptError, Intent};

use super::{Adjacency, all_descendants};
use crate::{LatticeError, Result};

/// Where a new concept goes, computed before anything is changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Insertion {
    pub(crate) superconcepts: BTreeSet<usize>,
    pub(crate) subconcepts: BTreeSet<usize>,
    pub(crate) new_top: bool,
    pub(crate) new_bottom: bool,
}

pub(crate) fn plan_insertion<I: Intent>(
    concepts: &[Concept<I>],
    subconcepts: &Adjacency,
    superconcepts: &Adjacency,
    top: usize,
    bottom: usize,
    new: &Concept<I>,
) -> Result<Insertion> {
    let top_concept = &concepts[top];
    if new.context_hash() != top_concept.context_hash() {
        return Err(ConceptError::ContextMismatch {
            left: top_concept.context_hash(),
            right: new.context_hash(),
        }
        .into());
    }
    if let Some(existing) = concepts.iter().position(|c| c == new) {
        return Err(LatticeError::ConceptAlreadyPresent(existing));
    }

    if top_concept.extent_lt(new) {
        return Ok(Insertion {
            subconcepts: BTreeSet::from([top]),
            new_top: true,
            ..Insertion::default()
        });
    }
    if !new.extent_lt(top_concept) {
        return Err(LatticeError::BreaksSingleTop);
    }
    let bottom_concept = &concepts[bottom];
    if new.extent_lt(bottom_concept) {
        return Ok(Insertion {
            superconcepts: BTreeSet::from([bottom]),
            new_bottom: true,
            ..Insertion::default()
        });
    }
    if !bottom_concept.extent_lt(new) {
        return Err(LatticeError::BreaksSingleBottom);
    }

    let found_above = frontier(top, subconcepts, |c| new.extent_lt(&concepts[c]));
    let found_below = frontier(bottom, superconcepts, |c| concepts[c].extent_lt(new));
    Ok(Insertion {
        superconcepts: found_above,
        subconcepts: found_below,
        new_top: false,
        new_bottom: false,
    })
}

/// Breadth-first walk from `start` along `edges` while `keeps` holds; returns
/// the visited concepts with no neighbour that still satisfies `keeps`.
fn frontier(start: usize, edges: &Adjacency, keeps: impl Fn(usize) -> bool) -> BTreeSet<usize> {
    let mut queue = VecDeque::from([start]);
    let mut visited = BTreeSet::new();
    let mut found = BTreeSet::new();
    while let Some(c) = queue.pop_front() {
        if !visited.insert(c) {
            continue;
        }
        let next: Vec<usize> = edges[c].iter().copied().filter(|&n| keeps(n)).collect();
        if next.is_empty() {
            found.insert(c);
        } else {
            queue.extend(next.into_iter().filter(|n| !visited.contains(n)));
        }
    }
    found
}

/// Direct subconcepts after deleting `removed`, already renumbered.
pub(crate) fn plan_removal<I: Intent>(
    concepts: &[Concept<I>],
    subconcepts: &Adjacency,
    superconcepts: &Adjacency,
    top: usize,
    bottom: usize,
    removed: usize,
) -> Result<Adjacency> {
    if removed >= concepts.len() {
        return Err(LatticeError::IndexOutOfRange {
            index: removed,
            len: concepts.len(),
        });
    }
    if concepts.len() < 3 {
        return Err(LatticeError::TooFewConcepts(concepts.len()));
    }
    if removed == top {
        return Err(LatticeError::RemoveTop);
    }
    if removed == bottom {
        return Err(LatticeError::RemoveBottom);
    }

    let descendants = all_descendants(concepts, subconcepts);
    let mut spliced = subconcepts.clone();
    for &s in &superconcepts[removed] {
        let below = &mut spliced[s];
        below.remove(&removed);
        below.extend(subconcepts[removed].iter().copied());
        let mut by_support: Vec<usize> = below.iter().copied().collect();
        by_support.sort_by_key(|&c| Reverse(concepts[c].support()));
        for c in by_support {
            if below.contains(&c) {
                below.retain(|d| !descendants[c].contains(d));
            }
        }
    }

    let shift = |i: usize| if i > removed { i - 1 } else { i };
    Ok(spliced
        .into_iter()
        .enumerate()
        .filter(|&(i, _)| i != removed)
        .map(|(_, below)| below.into_iter().filter(|&d| d != removed).map(shift).collect())
        .collect())
}
