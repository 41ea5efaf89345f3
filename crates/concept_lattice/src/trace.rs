use std::collections::{BTreeSet, VecDeque};

use formal_concept::Intent;
use formal_context::ClosureContext;

use crate::ConceptLattice;

/// Where each object of a context lands in a lattice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContextTrace {
    /// Per object, every concept whose intent describes it.
    pub concepts: Vec<BTreeSet<usize>>,
    /// Per object, the most specific of those.
    pub bottoms: Vec<BTreeSet<usize>>,
}

impl<I: Intent> ConceptLattice<I> {
    /// Follows every object of `ctx` down from the top while intents still describe it.
    ///
    /// `ctx` may hold objects the lattice was never built on, as long as it
    /// shares the attribute layout.
    pub fn trace_context<C>(&self, ctx: &C) -> ContextTrace
    where
        C: ClosureContext<Intent = I>,
    {
        let mut trace = ContextTrace::default();
        for g in 0..ctx.n_objects() {
            let single = [g];
            let describes = |c: usize| {
                !ctx.extension(self.concepts()[c].intent(), Some(&single[..]))
                    .is_empty()
            };
            let mut reached = BTreeSet::new();
            let mut bottoms = BTreeSet::new();
            let mut queue = VecDeque::new();
            if describes(self.top()) {
                queue.push_back(self.top());
            }
            while let Some(c) = queue.pop_front() {
                if !reached.insert(c) {
                    continue;
                }
                let below: Vec<usize> = self.subconcepts_dict()[c]
                    .iter()
                    .copied()
                    .filter(|&s| describes(s))
                    .collect();
                if below.is_empty() {
                    bottoms.insert(c);
                }
                queue.extend(below.into_iter().filter(|s| !reached.contains(s)));
            }
            trace.concepts.push(reached);
            trace.bottoms.push(bottoms);
        }
        trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrderAlgorithm;
    use crate::order::fixtures::*;
    use concept_construction::Parallelism;

    #[test]
    fn objects_end_in_their_object_concepts() {
        let ctx = contranominal(3);
        let lattice = crate::ConceptLattice::from_concepts(
            concepts_of(&ctx),
            OrderAlgorithm::CompleteComparison,
            Parallelism::Sequential,
        )
        .expect("valid lattice");
        let trace = lattice.trace_context(&ctx);
        for g in 0..3 {
            assert_eq!(trace.bottoms[g].len(), 1);
            let bottom = *trace.bottoms[g].iter().next().expect("one bottom");
            assert_eq!(lattice.concepts()[bottom].extent().indices(), &[g]);
            // object concept plus the two coatoms containing g and the top
            assert_eq!(trace.concepts[g].len(), 4);
        }
    }
}
