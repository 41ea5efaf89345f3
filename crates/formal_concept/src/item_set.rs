use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::record::ItemSetRecord;
use crate::{ConceptError, Intent, Result};

/// Named subset of objects or attributes, kept sorted by index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "ItemSetRecord", try_from = "ItemSetRecord")]
pub struct ItemSet {
    indices: Vec<usize>,
    names: Vec<String>,
}

impl ItemSet {
    pub fn new(indices: Vec<usize>, names: Vec<String>) -> Result<Self> {
        if indices.len() != names.len() {
            return Err(ConceptError::LengthMismatch {
                what: "item set",
                indices: indices.len(),
                names: names.len(),
            });
        }
        let mut pairs: Vec<(usize, String)> = indices.into_iter().zip(names).collect();
        pairs.sort_by_key(|(index, _)| *index);
        if let Some(window) = pairs.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(ConceptError::DuplicateIndex {
                what: "item set",
                index: window[0].0,
            });
        }
        let (indices, names) = pairs.into_iter().unzip();
        Ok(Self { indices, names })
    }

    /// Picks names from `all_names` by position. Indices without a name fall back to their number.
    pub fn from_indices<It>(indices: It, all_names: &[String]) -> Self
    where
        It: IntoIterator<Item = usize>,
    {
        let indices: BTreeSet<usize> = indices.into_iter().collect();
        let names = indices
            .iter()
            .map(|&i| all_names.get(i).cloned().unwrap_or_else(|| i.to_string()))
            .collect();
        Self {
            indices: indices.into_iter().collect(),
            names,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.indices
            .iter()
            .copied()
            .zip(self.names.iter().map(String::as_str))
    }

    pub fn is_subset(&self, other: &ItemSet) -> bool {
        sorted_is_subset(&self.indices, &other.indices)
    }

    pub fn is_strict_subset(&self, other: &ItemSet) -> bool {
        self.len() < other.len() && self.is_subset(other)
    }

    pub fn index_set(&self) -> BTreeSet<usize> {
        self.indices.iter().copied().collect()
    }

    fn filtered(&self, keep: impl Fn(usize) -> bool) -> Self {
        let (indices, names) = self
            .iter()
            .filter(|(i, _)| keep(*i))
            .map(|(i, n)| (i, n.to_string()))
            .unzip();
        Self { indices, names }
    }

    pub fn intersection(&self, other: &ItemSet) -> Self {
        self.filtered(|i| other.contains(i))
    }

    pub fn difference(&self, other: &ItemSet) -> Self {
        self.filtered(|i| !other.contains(i))
    }

    pub fn union(&self, other: &ItemSet) -> Self {
        let mut pairs: Vec<(usize, String)> = self
            .iter()
            .chain(other.iter().filter(|(i, _)| !self.contains(*i)))
            .map(|(i, n)| (i, n.to_string()))
            .collect();
        pairs.sort_by_key(|(i, _)| *i);
        let (indices, names) = pairs.into_iter().unzip();
        Self { indices, names }
    }
}

impl Intent for ItemSet {
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn without_shared(&self, others: &[&Self]) -> Self {
        self.filtered(|i| !others.iter().any(|o| o.contains(i)))
    }
}

pub(crate) fn sorted_is_subset(small: &[usize], big: &[usize]) -> bool {
    if small.len() > big.len() {
        return false;
    }
    let mut rest = big.iter();
    small.iter().all(|x| rest.any(|y| y == x))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn new_sorts_indices_and_keeps_names_aligned() {
        let set = ItemSet::new(vec![3, 0, 2], names(&["d", "a", "c"])).expect("valid");
        assert_eq!(set.indices(), &[0, 2, 3]);
        assert_eq!(set.names(), &names(&["a", "c", "d"]));
    }

    #[test]
    fn new_rejects_length_mismatch() {
        let err = ItemSet::new(vec![0, 1], names(&["a"])).unwrap_err();
        assert!(matches!(err, ConceptError::LengthMismatch { indices: 2, names: 1, .. }));
    }

    #[test]
    fn new_rejects_duplicates() {
        let err = ItemSet::new(vec![1, 1], names(&["a", "b"])).unwrap_err();
        assert!(matches!(err, ConceptError::DuplicateIndex { index: 1, .. }));
    }

    #[test]
    fn subset_checks_follow_indices() {
        let all = names(&["a", "b", "c", "d"]);
        let small = ItemSet::from_indices([1, 3], &all);
        let big = ItemSet::from_indices([0, 1, 3], &all);
        assert!(small.is_subset(&big));
        assert!(small.is_strict_subset(&big));
        assert!(!big.is_subset(&small));
        assert!(big.is_subset(&big));
        assert!(!big.is_strict_subset(&big));
    }

    #[test]
    fn set_algebra_keeps_names() {
        let all = names(&["a", "b", "c", "d"]);
        let left = ItemSet::from_indices([0, 1, 2], &all);
        let right = ItemSet::from_indices([2, 3], &all);
        assert_eq!(left.intersection(&right).names(), &names(&["c"]));
        assert_eq!(left.difference(&right).names(), &names(&["a", "b"]));
        assert_eq!(left.union(&right).indices(), &[0, 1, 2, 3]);
    }

    #[test]
    fn without_shared_drops_entries_present_elsewhere() {
        let all = names(&["a", "b", "c", "d"]);
        let set = ItemSet::from_indices([0, 1, 2, 3], &all);
        let x = ItemSet::from_indices([1], &all);
        let y = ItemSet::from_indices([3], &all);
        assert_eq!(set.without_shared(&[&x, &y]).indices(), &[0, 2]);
    }

    #[test]
    fn json_uses_inds_names_count_layout() {
        let all = names(&["fly", "swim"]);
        let set = ItemSet::from_indices([0, 1], &all);
        let json = serde_json::to_value(&set).expect("serialize");
        assert_eq!(json["Inds"], serde_json::json!([0, 1]));
        assert_eq!(json["Names"], serde_json::json!(["fly", "swim"]));
        assert_eq!(json["Count"], serde_json::json!(2));
        let back: ItemSet = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, set);
    }
}
