use std::collections::BTreeSet;

use log::{debug, info, warn};

use concept_construction::{ConceptConstruction, Parallelism};
use formal_concept::{Concept, ConceptError, ContextHash, Intent, ItemSet};

use crate::config::{ConstructionAlgorithm, LatticeConfig, OrderAlgorithm};
use crate::lindig::lindig;
use crate::order::{
    Adjacency, all_ancestors, all_descendants, canonical_order, chains, complete_comparison,
    construct_by_spanning_tree, construct_spanning_tree, plan_insertion, plan_removal, transpose,
};
use crate::{LatticeError, Result};

/// Concepts of one context with their Hasse diagram.
///
/// Indices into `concepts` are the keys of both adjacency lists. Every mutation
/// is computed in full before it is applied, so a failed call leaves the
/// lattice as it was.
#[derive(Clone, Debug)]
pub struct ConceptLattice<I> {
    concepts: Vec<Concept<I>>,
    subconcepts: Adjacency,
    superconcepts: Adjacency,
    top: usize,
    bottom: usize,
}

impl<I> PartialEq for ConceptLattice<I> {
    fn eq(&self, other: &Self) -> bool {
        self.concepts == other.concepts && self.subconcepts == other.subconcepts
    }
}

impl<I: Intent> ConceptLattice<I> {
    pub fn from_subconcepts(concepts: Vec<Concept<I>>, subconcepts: Adjacency) -> Result<Self> {
        check_shape(&concepts, &subconcepts, "subconcepts")?;
        let superconcepts = transpose(&subconcepts);
        Self::from_parts(concepts, subconcepts, superconcepts)
    }

    pub fn from_superconcepts(concepts: Vec<Concept<I>>, superconcepts: Adjacency) -> Result<Self> {
        check_shape(&concepts, &superconcepts, "superconcepts")?;
        let subconcepts = transpose(&superconcepts);
        Self::from_parts(concepts, subconcepts, superconcepts)
    }

    /// Derives the covering relation of `concepts` with the chosen algorithm.
    pub fn from_concepts(
        concepts: Vec<Concept<I>>,
        order: OrderAlgorithm,
        parallelism: Parallelism,
    ) -> Result<Self> {
        check_context(&concepts)?;
        let subconcepts = match order {
            OrderAlgorithm::CompleteComparison => complete_comparison(&concepts, parallelism)?,
            OrderAlgorithm::SpanningTree => construct_by_spanning_tree(&concepts, parallelism)?,
        };
        Self::from_subconcepts(concepts, subconcepts)
    }

    /// Full lattice of a context, returned in canonical order.
    pub fn from_context<C>(ctx: &C, config: &LatticeConfig) -> Result<Self>
    where
        C: ConceptConstruction<Intent = I>,
    {
        let lattice = match config.algorithm {
            ConstructionAlgorithm::CbO => {
                let concepts = ctx.close_by_one(config.side, config.parallelism)?;
                Self::from_concepts(concepts, config.order, config.parallelism)?
            }
            ConstructionAlgorithm::Lindig => {
                let (concepts, subconcepts) = lindig(ctx);
                Self::from_subconcepts(concepts, subconcepts)?
            }
        };
        info!(
            "lattice: {} concepts, {} arcs ({:?}, {:?})",
            lattice.len(),
            lattice.arcs_count(),
            config.algorithm,
            config.order
        );
        Ok(lattice.sorted())
    }

    fn from_parts(
        concepts: Vec<Concept<I>>,
        subconcepts: Adjacency,
        superconcepts: Adjacency,
    ) -> Result<Self> {
        check_context(&concepts)?;
        let (top, bottom) = Self::get_top_bottom_concepts_i(&concepts).ok_or(LatticeError::Empty)?;
        for (a, below) in subconcepts.iter().enumerate() {
            if let Some(&b) = below.iter().find(|&&b| !concepts[b].extent_lt(&concepts[a])) {
                return Err(LatticeError::InvalidHierarchy(format!(
                    "concept {b} is listed below {a} but its extent is not strictly smaller"
                )));
            }
        }
        let roots: Vec<usize> = (0..concepts.len())
            .filter(|&c| superconcepts[c].is_empty())
            .collect();
        if roots != [top] {
            return Err(LatticeError::InvalidHierarchy(format!(
                "expected concept {top} as the only top, found {roots:?}"
            )));
        }
        let leaves: Vec<usize> = (0..concepts.len())
            .filter(|&c| subconcepts[c].is_empty())
            .collect();
        if leaves != [bottom] {
            return Err(LatticeError::InvalidHierarchy(format!(
                "expected concept {bottom} as the only bottom, found {leaves:?}"
            )));
        }
        Ok(Self {
            concepts,
            subconcepts,
            superconcepts,
            top,
            bottom,
        })
    }

    /// Indices of the largest and the smallest concept by support. Ties go to the first one.
    pub fn get_top_bottom_concepts_i(concepts: &[Concept<I>]) -> Option<(usize, usize)> {
        let mut iter = concepts.iter().enumerate();
        let (_, first) = iter.next()?;
        let (mut top, mut bottom) = (0, 0);
        let (mut max, mut min) = (first.support(), first.support());
        for (i, concept) in iter {
            if concept.support() > max {
                (top, max) = (i, concept.support());
            }
            if concept.support() < min {
                (bottom, min) = (i, concept.support());
            }
        }
        Some((top, bottom))
    }

    pub fn concepts(&self) -> &[Concept<I>] {
        &self.concepts
    }

    pub fn concept(&self, index: usize) -> Option<&Concept<I>> {
        self.concepts.get(index)
    }

    pub(crate) fn concepts_mut(&mut self) -> &mut [Concept<I>] {
        &mut self.concepts
    }

    /// Replaces a concept without touching the order. The caller keeps the order valid.
    pub(crate) fn replace_concept(&mut self, index: usize, concept: Concept<I>) {
        self.concepts[index] = concept;
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn top(&self) -> usize {
        self.top
    }

    pub fn bottom(&self) -> usize {
        self.bottom
    }

    pub fn top_concept(&self) -> &Concept<I> {
        &self.concepts[self.top]
    }

    pub fn bottom_concept(&self) -> &Concept<I> {
        &self.concepts[self.bottom]
    }

    pub fn subconcepts_dict(&self) -> &Adjacency {
        &self.subconcepts
    }

    pub fn superconcepts_dict(&self) -> &Adjacency {
        &self.superconcepts
    }

    pub fn children(&self, index: usize) -> Option<&BTreeSet<usize>> {
        self.subconcepts.get(index)
    }

    pub fn parents(&self, index: usize) -> Option<&BTreeSet<usize>> {
        self.superconcepts.get(index)
    }

    pub fn arcs_count(&self) -> usize {
        self.subconcepts.iter().map(BTreeSet::len).sum()
    }

    pub fn context_hash(&self) -> Option<ContextHash> {
        self.top_concept().context_hash()
    }

    fn ensure_top_bottom(&mut self) {
        let fresh = self.superconcepts.get(self.top).is_some_and(BTreeSet::is_empty)
            && self.subconcepts.get(self.bottom).is_some_and(BTreeSet::is_empty);
        if fresh {
            return;
        }
        if let Some((top, bottom)) = Self::get_top_bottom_concepts_i(&self.concepts) {
            warn!(
                "stale top/bottom ({}, {}), recomputed as ({top}, {bottom})",
                self.top, self.bottom
            );
            self.top = top;
            self.bottom = bottom;
        }
    }

    pub(crate) fn set_top_bottom(&mut self, top: usize, bottom: usize) {
        self.top = top;
        self.bottom = bottom;
        self.ensure_top_bottom();
    }

    /// Inserts a concept and rewires its covers. Returns the new index.
    pub fn add(&mut self, concept: Concept<I>) -> Result<usize> {
        self.ensure_top_bottom();
        let plan = plan_insertion(
            &self.concepts,
            &self.subconcepts,
            &self.superconcepts,
            self.top,
            self.bottom,
            &concept,
        )?;
        let index = self.concepts.len();
        for &s in &plan.superconcepts {
            let below = &mut self.subconcepts[s];
            below.retain(|d| !plan.subconcepts.contains(d));
            below.insert(index);
        }
        for &d in &plan.subconcepts {
            let above = &mut self.superconcepts[d];
            above.retain(|s| !plan.superconcepts.contains(s));
            above.insert(index);
        }
        debug!(
            "add: concept {index} (support {}) under {:?}, over {:?}",
            concept.support(),
            plan.superconcepts,
            plan.subconcepts
        );
        self.subconcepts.push(plan.subconcepts);
        self.superconcepts.push(plan.superconcepts);
        self.concepts.push(concept);
        if plan.new_top {
            self.top = index;
        }
        if plan.new_bottom {
            self.bottom = index;
        }
        Ok(index)
    }

    /// Deletes an interior concept, linking its parents to its children.
    ///
    /// Indices above `index` move down by one.
    pub fn remove(&mut self, index: usize) -> Result<Concept<I>> {
        self.ensure_top_bottom();
        let subconcepts = plan_removal(
            &self.concepts,
            &self.subconcepts,
            &self.superconcepts,
            self.top,
            self.bottom,
            index,
        )?;
        let shift = |i: usize| if i > index { i - 1 } else { i };
        let removed = self.concepts.remove(index);
        self.superconcepts = transpose(&subconcepts);
        self.subconcepts = subconcepts;
        self.top = shift(self.top);
        self.bottom = shift(self.bottom);
        debug!("remove: concept {index} (support {})", removed.support());
        Ok(removed)
    }

    pub fn with_added(&self, concept: Concept<I>) -> Result<Self> {
        let mut copy = self.clone();
        copy.add(concept)?;
        Ok(copy)
    }

    pub fn with_removed(&self, index: usize) -> Result<Self> {
        let mut copy = self.clone();
        copy.remove(index)?;
        Ok(copy)
    }

    /// Reorders concepts by descending support, then lexicographic extent.
    pub fn sort_concepts(&mut self) {
        let order = canonical_order(&self.concepts);
        let mut position = vec![0; order.len()];
        for (new, &old) in order.iter().enumerate() {
            position[old] = new;
        }
        let remap = |adjacency: &Adjacency| -> Adjacency {
            order
                .iter()
                .map(|&old| adjacency[old].iter().map(|&i| position[i]).collect())
                .collect()
        };
        self.subconcepts = remap(&self.subconcepts);
        self.superconcepts = remap(&self.superconcepts);
        let mut slots: Vec<Option<Concept<I>>> = self.concepts.drain(..).map(Some).collect();
        self.concepts = order.iter().filter_map(|&old| slots[old].take()).collect();
        self.top = position[self.top];
        self.bottom = position[self.bottom];
    }

    pub fn sorted(&self) -> Self {
        let mut copy = self.clone();
        copy.sort_concepts();
        copy
    }

    /// Every concept strictly below each concept.
    pub fn all_subconcepts(&self) -> Adjacency {
        all_descendants(&self.concepts, &self.subconcepts)
    }

    /// Every concept strictly above each concept.
    pub fn all_superconcepts(&self) -> Adjacency {
        all_ancestors(&self.concepts, &self.superconcepts)
    }

    pub fn chains(&self) -> Vec<Vec<usize>> {
        chains(&self.concepts, &construct_spanning_tree(&self.concepts))
    }

    /// Objects that first appear at this concept: not in any direct subconcept.
    pub fn concept_new_extent(&self, index: usize) -> Result<ItemSet> {
        let concept = self.checked(index)?;
        Ok(self.subconcepts[index]
            .iter()
            .fold(concept.extent().clone(), |own, &s| {
                own.difference(self.concepts[s].extent())
            }))
    }

    /// Intent entries introduced at this concept: not shared with any direct superconcept.
    pub fn concept_new_intent(&self, index: usize) -> Result<I> {
        let concept = self.checked(index)?;
        let parents: Vec<&I> = self.superconcepts[index]
            .iter()
            .map(|&s| self.concepts[s].intent())
            .collect();
        Ok(concept.intent().without_shared(&parents))
    }

    pub(crate) fn checked(&self, index: usize) -> Result<&Concept<I>> {
        self.concepts.get(index).ok_or(LatticeError::IndexOutOfRange {
            index,
            len: self.concepts.len(),
        })
    }
}

impl ConceptLattice<ItemSet> {
    /// Lattice of the transposed context: extents and intents swap, so does the order.
    pub fn transposed(&self) -> Self {
        let concepts = self
            .concepts
            .iter()
            .map(|c| {
                Concept::new(
                    c.intent().clone(),
                    c.extent().clone(),
                    c.context_hash().map(ContextHash::transposed),
                )
            })
            .collect();
        Self {
            concepts,
            subconcepts: self.superconcepts.clone(),
            superconcepts: self.subconcepts.clone(),
            top: self.bottom,
            bottom: self.top,
        }
    }
}

fn check_shape<I>(concepts: &[Concept<I>], adjacency: &Adjacency, what: &str) -> Result<()> {
    if concepts.is_empty() {
        return Err(LatticeError::Empty);
    }
    if adjacency.len() != concepts.len() {
        return Err(LatticeError::InvalidHierarchy(format!(
            "{} {what} lists for {} concepts",
            adjacency.len(),
            concepts.len()
        )));
    }
    if let Some(&index) = adjacency.iter().flatten().find(|&&i| i >= concepts.len()) {
        return Err(LatticeError::IndexOutOfRange {
            index,
            len: concepts.len(),
        });
    }
    Ok(())
}

fn check_context<I: Intent>(concepts: &[Concept<I>]) -> Result<()> {
    let Some(first) = concepts.first() else {
        return Err(LatticeError::Empty);
    };
    if let Some(other) = concepts
        .iter()
        .find(|c| c.context_hash() != first.context_hash())
    {
        return Err(ConceptError::ContextMismatch {
            left: first.context_hash(),
            right: other.context_hash(),
        }
        .into());
    }
    Ok(())
}
