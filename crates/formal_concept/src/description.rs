use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::record::DescriptionRecord;
use crate::{ConceptError, Intent, Result};

/// Closed numeric interval `[lo, hi]`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(into = "[f64; 2]", try_from = "[f64; 2]")]
pub struct Interval {
    lo: f64,
    hi: f64,
}

impl Interval {
    pub fn new(lo: f64, hi: f64) -> Result<Self> {
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(ConceptError::InvalidInterval { lo, hi });
        }
        // -0.0 and 0.0 must compare and hash alike
        Ok(Self {
            lo: lo + 0.0,
            hi: hi + 0.0,
        })
    }

    pub fn point(value: f64) -> Result<Self> {
        Self::new(value, value)
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }

    pub fn contains_interval(&self, other: &Interval) -> bool {
        self.lo <= other.lo && other.hi <= self.hi
    }

    pub fn hull(&self, other: &Interval) -> Interval {
        Interval {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }
}

impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        self.lo.to_bits() == other.lo.to_bits() && self.hi.to_bits() == other.hi.to_bits()
    }
}

impl Eq for Interval {}

impl Hash for Interval {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lo.to_bits().hash(state);
        self.hi.to_bits().hash(state);
    }
}

impl From<Interval> for [f64; 2] {
    fn from(value: Interval) -> Self {
        [value.lo, value.hi]
    }
}

impl TryFrom<[f64; 2]> for Interval {
    type Error = ConceptError;

    fn try_from(value: [f64; 2]) -> Result<Self> {
        Interval::new(value[0], value[1])
    }
}

/// Intent of a pattern concept: one optional interval per pattern structure.
///
/// `None` is the empty description, produced when no object is described.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "DescriptionRecord", try_from = "DescriptionRecord")]
pub struct Description {
    values: BTreeMap<usize, Option<Interval>>,
    names: BTreeMap<usize, String>,
}

impl Description {
    pub fn new<It>(entries: It) -> Result<Self>
    where
        It: IntoIterator<Item = (usize, String, Option<Interval>)>,
    {
        let mut description = Self::default();
        for (index, name, value) in entries {
            if description.values.insert(index, value).is_some() {
                return Err(ConceptError::DuplicateIndex {
                    what: "description",
                    index,
                });
            }
            description.names.insert(index, name);
        }
        Ok(description)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Option<&Interval>> {
        self.values.get(&index).map(Option::as_ref)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(&index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, Option<&Interval>)> + '_ {
        self.values.iter().map(|(&index, value)| {
            let name = self.names.get(&index).map(String::as_str).unwrap_or_default();
            (index, name, value.as_ref())
        })
    }

    /// Whether the value `row` lies inside every described interval.
    ///
    /// `row[i]` is the value of pattern structure `i`. An empty description matches nothing.
    pub fn describes(&self, row: &[f64]) -> bool {
        self.values.iter().all(|(&index, value)| match value {
            Some(interval) => row.get(index).is_some_and(|&v| interval.contains(v)),
            None => false,
        })
    }

    /// `self` is at least as specific as `other` on every structure `other` describes.
    pub fn is_specialization_of(&self, other: &Description) -> bool {
        other.values.iter().all(|(index, theirs)| {
            match (self.values.get(index), theirs) {
                (Some(None), _) => true,
                (Some(Some(_)), None) => false,
                (Some(Some(mine)), Some(theirs)) => theirs.contains_interval(mine),
                (None, _) => false,
            }
        })
    }
}

impl Intent for Description {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn without_shared(&self, others: &[&Self]) -> Self {
        let keep = |index: &usize, value: &Option<Interval>| {
            !others
                .iter()
                .any(|other| other.values.get(index) == Some(value))
        };
        let values: BTreeMap<usize, Option<Interval>> = self
            .values
            .iter()
            .filter(|(index, value)| keep(*index, *value))
            .map(|(index, value)| (*index, *value))
            .collect();
        let names = self
            .names
            .iter()
            .filter(|(index, _)| values.contains_key(index))
            .map(|(index, name)| (*index, name.clone()))
            .collect();
        Self { values, names }
    }
}

impl From<Description> for DescriptionRecord {
    fn from(value: Description) -> Self {
        let count = value.values.len();
        DescriptionRecord {
            inds: value.values,
            names: value.names.into_values().collect(),
            count,
        }
    }
}

impl TryFrom<DescriptionRecord> for Description {
    type Error = ConceptError;

    fn try_from(record: DescriptionRecord) -> Result<Self> {
        if record.inds.len() != record.names.len() {
            return Err(ConceptError::LengthMismatch {
                what: "description",
                indices: record.inds.len(),
                names: record.names.len(),
            });
        }
        if record.count != record.inds.len() {
            return Err(ConceptError::CountMismatch {
                what: "description",
                declared: record.count,
                actual: record.inds.len(),
            });
        }
        let names = record.inds.keys().copied().zip(record.names).collect();
        Ok(Self {
            values: record.inds,
            names,
        })
    }
}
