use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ConceptError, ContextHash, Interval, ItemSet, Measures};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemSetRecord {
    #[serde(rename = "Inds")]
    pub inds: Vec<usize>,
    #[serde(rename = "Names")]
    pub names: Vec<String>,
    #[serde(rename = "Count")]
    pub count: usize,
}

impl From<ItemSet> for ItemSetRecord {
    fn from(set: ItemSet) -> Self {
        ItemSetRecord {
            inds: set.indices().to_vec(),
            names: set.names().to_vec(),
            count: set.len(),
        }
    }
}

impl TryFrom<ItemSetRecord> for ItemSet {
    type Error = ConceptError;

    fn try_from(record: ItemSetRecord) -> Result<Self, Self::Error> {
        if record.count != record.inds.len() {
            return Err(ConceptError::CountMismatch {
                what: "item set",
                declared: record.count,
                actual: record.inds.len(),
            });
        }
        ItemSet::new(record.inds, record.names)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DescriptionRecord {
    #[serde(rename = "Inds")]
    pub inds: BTreeMap<usize, Option<Interval>>,
    #[serde(rename = "Names")]
    pub names: Vec<String>,
    #[serde(rename = "Count")]
    pub count: usize,
}

/// Serialized form of one concept. Measures are flattened next to the fixed keys.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConceptRecord<I> {
    #[serde(rename = "Ext")]
    pub ext: ItemSet,
    #[serde(rename = "Int")]
    pub int: I,
    #[serde(rename = "Supp")]
    pub supp: usize,
    #[serde(rename = "Context_Hash", default)]
    pub context_hash: Option<ContextHash>,
    #[serde(flatten)]
    pub measures: Measures,
}
