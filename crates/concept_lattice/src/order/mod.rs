//! Covering relation of a concept set.
//!
//! Adjacency lists are indexed like the concept slice they were built from.
//! `subconcepts[a]` holds the direct subconcepts of `a`.

mod closure;
mod comparison;
mod incremental;
mod spanning_tree;

use std::cmp::Reverse;
use std::collections::BTreeSet;

use rayon::prelude::*;

use concept_construction::{ConstructionError, Parallelism};
use formal_concept::{Concept, Intent};

use crate::Result;

pub use closure::{all_ancestors, all_descendants};
pub use comparison::complete_comparison;
pub(crate) use incremental::{plan_insertion, plan_removal};
pub use spanning_tree::{
    SpanningTree, chains, construct_by_spanning_tree, construct_spanning_tree,
    superconcepts_from_chains,
};

pub type Adjacency = Vec<BTreeSet<usize>>;

/// Flips every edge: direct subconcepts become direct superconcepts.
pub fn transpose(adjacency: &Adjacency) -> Adjacency {
    let mut flipped = vec![BTreeSet::new(); adjacency.len()];
    for (from, targets) in adjacency.iter().enumerate() {
        for &to in targets {
            flipped[to].insert(from);
        }
    }
    flipped
}

/// Indices sorted general-to-specific: descending support, then lexicographic extent.
pub fn canonical_order<I: Intent>(concepts: &[Concept<I>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..concepts.len()).collect();
    order.sort_by(|&a, &b| {
        let (ca, cb) = (&concepts[a], &concepts[b]);
        (Reverse(ca.support()), ca.extent().indices())
            .cmp(&(Reverse(cb.support()), cb.extent().indices()))
    });
    order
}

/// Runs `f` for every index, on a dedicated pool when `parallelism` asks for one.
pub(crate) fn map_indices<T, F>(n: usize, parallelism: Parallelism, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> T + Send + Sync,
{
    match parallelism {
        Parallelism::Sequential => Ok((0..n).map(f).collect()),
        Parallelism::Threads(jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs.get())
                .build()
                .map_err(ConstructionError::from)?;
            Ok(pool.install(|| (0..n).into_par_iter().map(f).collect()))
        }
    }
}
