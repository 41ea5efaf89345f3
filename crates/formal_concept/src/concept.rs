use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::item_set::sorted_is_subset;
use crate::record::ConceptRecord;
use crate::{ConceptError, ContextHash, Intent, ItemSet, MeasureName, Measures, Result};

/// Closed `(extent, intent)` pair of one context.
///
/// Equality and hashing look at the extent only (within one context the extent fixes
/// the intent). `measures` never take part in either.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(
    into = "ConceptRecord<I>",
    try_from = "ConceptRecord<I>",
    bound(serialize = "I: Intent", deserialize = "I: Intent")
)]
pub struct Concept<I> {
    extent: ItemSet,
    intent: I,
    support: usize,
    context_hash: Option<ContextHash>,
    measures: Measures,
}

impl<I: Intent> Concept<I> {
    pub fn new(extent: ItemSet, intent: I, context_hash: Option<ContextHash>) -> Self {
        let support = extent.len();
        Self {
            extent,
            intent,
            support,
            context_hash,
            measures: Measures::default(),
        }
    }

    pub fn extent(&self) -> &ItemSet {
        &self.extent
    }

    pub fn intent(&self) -> &I {
        &self.intent
    }

    pub fn support(&self) -> usize {
        self.support
    }

    pub fn context_hash(&self) -> Option<ContextHash> {
        self.context_hash
    }

    pub fn measures(&self) -> &Measures {
        &self.measures
    }

    pub fn measures_mut(&mut self) -> &mut Measures {
        &mut self.measures
    }

    pub fn measure(&self, name: &MeasureName) -> Option<f64> {
        self.measures.get(name)
    }

    pub fn into_parts(self) -> (ItemSet, I) {
        (self.extent, self.intent)
    }

    /// `self <= other` without checking that both come from one context.
    pub fn extent_le(&self, other: &Self) -> bool {
        sorted_is_subset(self.extent.indices(), other.extent.indices())
    }

    /// `self < other` without checking that both come from one context.
    pub fn extent_lt(&self, other: &Self) -> bool {
        self.support < other.support && self.extent_le(other)
    }

    fn check_context(&self, other: &Self) -> Result<()> {
        if self.context_hash != other.context_hash {
            return Err(ConceptError::ContextMismatch {
                left: self.context_hash,
                right: other.context_hash,
            });
        }
        Ok(())
    }

    pub fn try_le(&self, other: &Self) -> Result<bool> {
        self.check_context(other)?;
        Ok(self.extent_le(other))
    }

    pub fn try_lt(&self, other: &Self) -> Result<bool> {
        self.check_context(other)?;
        Ok(self.extent_lt(other))
    }

    pub fn try_eq(&self, other: &Self) -> Result<bool> {
        self.check_context(other)?;
        Ok(self.extent.indices() == other.extent.indices())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

impl<I> PartialEq for Concept<I> {
    fn eq(&self, other: &Self) -> bool {
        self.context_hash == other.context_hash && self.extent.indices() == other.extent.indices()
    }
}

impl<I> Eq for Concept<I> {}

impl<I> Hash for Concept<I> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.context_hash.hash(state);
        self.extent.indices().hash(state);
    }
}

impl<I: Intent> From<Concept<I>> for ConceptRecord<I> {
    fn from(concept: Concept<I>) -> Self {
        ConceptRecord {
            ext: concept.extent,
            int: concept.intent,
            supp: concept.support,
            context_hash: concept.context_hash,
            measures: concept.measures,
        }
    }
}

impl<I: Intent> TryFrom<ConceptRecord<I>> for Concept<I> {
    type Error = ConceptError;

    fn try_from(record: ConceptRecord<I>) -> Result<Self> {
        if record.supp != record.ext.len() {
            return Err(ConceptError::SupportMismatch {
                declared: record.supp,
                actual: record.ext.len(),
            });
        }
        let mut concept = Concept::new(record.ext, record.int, record.context_hash);
        concept.measures = record.measures;
        Ok(concept)
    }
}
