use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use formal_concept::{ContextHash, ItemSet};

use crate::hashing::ContextHasher;
use crate::{ClosureContext, ContextError, Result};

/// Row storage strategy, chosen once when the context is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One ordered attribute set per object.
    #[default]
    Sparse,
    /// One packed bit row per object.
    Dense,
}

impl FromStr for Backend {
    type Err = ContextError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sparse" => Ok(Backend::Sparse),
            "dense" => Ok(Backend::Dense),
            other => Err(ContextError::UnknownBackend(other.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Sparse => f.write_str("sparse"),
            Backend::Dense => f.write_str("dense"),
        }
    }
}

const WORD: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Rows {
    Sparse(Vec<BTreeSet<usize>>),
    Dense(Vec<Vec<u64>>),
}

impl Rows {
    fn build(backend: Backend, n_attributes: usize, rows: Vec<BTreeSet<usize>>) -> Self {
        match backend {
            Backend::Sparse => Rows::Sparse(rows),
            Backend::Dense => Rows::Dense(
                rows.iter()
                    .map(|row| pack(row.iter().copied(), n_attributes))
                    .collect(),
            ),
        }
    }
}

fn pack(indices: impl IntoIterator<Item = usize>, n_bits: usize) -> Vec<u64> {
    let mut words = vec![0u64; n_bits.div_ceil(WORD)];
    for i in indices {
        words[i / WORD] |= 1u64 << (i % WORD);
    }
    words
}

fn unpack(words: &[u64]) -> Vec<usize> {
    let mut out = Vec::new();
    for (w, &word) in words.iter().enumerate() {
        let mut rest = word;
        while rest != 0 {
            let bit = rest.trailing_zeros() as usize;
            out.push(w * WORD + bit);
            rest &= rest - 1;
        }
    }
    out
}

/// Binary object/attribute incidence table.
#[derive(Clone, Debug)]
pub struct BinaryContext {
    object_names: Vec<String>,
    attribute_names: Vec<String>,
    rows: Rows,
    hash: ContextHash,
}

impl PartialEq for BinaryContext {
    fn eq(&self, other: &Self) -> bool {
        self.object_names == other.object_names
            && self.attribute_names == other.attribute_names
            && (0..self.n_objects()).all(|g| self.row(g) == other.row(g))
    }
}

impl BinaryContext {
    pub fn builder() -> BinaryContextBuilder {
        BinaryContextBuilder::default()
    }

    /// Context with generated names `g0..` and `m0..`.
    pub fn from_bools(rows: &[Vec<bool>]) -> Result<Self> {
        let mut builder = Self::builder();
        for row in rows {
            builder = builder.bool_row(row);
        }
        builder.build()
    }

    pub fn backend(&self) -> Backend {
        match self.rows {
            Rows::Sparse(_) => Backend::Sparse,
            Rows::Dense(_) => Backend::Dense,
        }
    }

    pub fn has(&self, object: usize, attribute: usize) -> bool {
        match &self.rows {
            Rows::Sparse(rows) => rows.get(object).is_some_and(|r| r.contains(&attribute)),
            Rows::Dense(rows) => rows.get(object).is_some_and(|r| {
                r.get(attribute / WORD)
                    .is_some_and(|w| w & (1u64 << (attribute % WORD)) != 0)
            }),
        }
    }

    /// Attributes of one object, ascending.
    pub fn row(&self, object: usize) -> Vec<usize> {
        match &self.rows {
            Rows::Sparse(rows) => rows
                .get(object)
                .map(|r| r.iter().copied().collect())
                .unwrap_or_default(),
            Rows::Dense(rows) => rows.get(object).map(|r| unpack(r)).unwrap_or_default(),
        }
    }

    /// Objects having one attribute, ascending.
    pub fn column(&self, attribute: usize) -> Vec<usize> {
        (0..self.n_objects())
            .filter(|&g| self.has(g, attribute))
            .collect()
    }

    pub fn column_support(&self, attribute: usize) -> usize {
        (0..self.n_objects())
            .filter(|&g| self.has(g, attribute))
            .count()
    }

    /// Attributes shared by all `objects`; every attribute for the empty set.
    pub fn intention_of(&self, objects: &[usize]) -> Vec<usize> {
        let n = self.n_attributes();
        match &self.rows {
            Rows::Sparse(rows) => {
                let mut common: BTreeSet<usize> = (0..n).collect();
                for &g in objects {
                    match rows.get(g) {
                        Some(row) => common.retain(|m| row.contains(m)),
                        None => common.clear(),
                    }
                }
                common.into_iter().collect()
            }
            Rows::Dense(rows) => {
                let mut common = pack(0..n, n);
                for &g in objects {
                    match rows.get(g) {
                        Some(row) => common.iter_mut().zip(row).for_each(|(c, r)| *c &= r),
                        None => common.iter_mut().for_each(|c| *c = 0),
                    }
                }
                unpack(&common)
            }
        }
    }

    /// Objects from `base_objects` (all when `None`) having every attribute in `attributes`.
    pub fn extension_of(&self, attributes: &[usize], base_objects: Option<&[usize]>) -> Vec<usize> {
        let described: Box<dyn Fn(usize) -> bool + '_> = match &self.rows {
            Rows::Sparse(rows) => Box::new(move |g| {
                rows.get(g)
                    .is_some_and(|row| attributes.iter().all(|m| row.contains(m)))
            }),
            Rows::Dense(rows) => {
                if attributes.iter().any(|&m| m >= self.n_attributes()) {
                    return Vec::new();
                }
                let mask = pack(attributes.iter().copied(), self.n_attributes());
                Box::new(move |g| {
                    rows.get(g).is_some_and(|row| {
                        row.iter().zip(&mask).all(|(r, m)| r & m == *m)
                    })
                })
            }
        };
        let mut out: Vec<usize> = match base_objects {
            Some(base) => base.iter().copied().filter(|&g| described(g)).collect(),
            None => (0..self.n_objects()).filter(|&g| described(g)).collect(),
        };
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Objects become attributes and attributes become objects.
    pub fn transposed(&self) -> BinaryContext {
        let columns = (0..self.n_attributes())
            .map(|m| self.column(m).into_iter().collect())
            .collect();
        BinaryContext {
            object_names: self.attribute_names.clone(),
            attribute_names: self.object_names.clone(),
            rows: Rows::build(self.backend(), self.n_objects(), columns),
            hash: self.hash.transposed(),
        }
    }
}

impl ClosureContext for BinaryContext {
    type Intent = ItemSet;

    fn n_objects(&self) -> usize {
        self.object_names.len()
    }

    fn n_attributes(&self) -> usize {
        self.attribute_names.len()
    }

    fn object_names(&self) -> &[String] {
        &self.object_names
    }

    fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    fn intention(&self, objects: &[usize]) -> ItemSet {
        ItemSet::from_indices(self.intention_of(objects), &self.attribute_names)
    }

    fn extension(&self, intent: &ItemSet, base_objects: Option<&[usize]>) -> Vec<usize> {
        self.extension_of(intent.indices(), base_objects)
    }

    fn context_hash(&self) -> ContextHash {
        self.hash
    }
}

#[derive(Clone, Debug, Default)]
pub struct BinaryContextBuilder {
    object_names: Option<Vec<String>>,
    attribute_names: Option<Vec<String>>,
    rows: Vec<Vec<bool>>,
    incidences: Vec<(usize, usize)>,
    backend: Backend,
}

impl BinaryContextBuilder {
    pub fn object_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.object_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn attribute_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.attribute_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn bool_row(mut self, row: &[bool]) -> Self {
        self.rows.push(row.to_vec());
        self
    }

    /// Marks `object` as having `attribute`. Requires both name lists.
    pub fn incidence(mut self, object: usize, attribute: usize) -> Self {
        self.incidences.push((object, attribute));
        self
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn build(self) -> Result<BinaryContext> {
        let n_attributes = match (&self.attribute_names, self.rows.first()) {
            (Some(names), _) => names.len(),
            (None, Some(row)) => row.len(),
            (None, None) => 0,
        };
        let n_objects = self
            .object_names
            .as_ref()
            .map_or(self.rows.len(), Vec::len)
            .max(self.rows.len());

        let mut sets: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n_objects];
        for (g, row) in self.rows.iter().enumerate() {
            if row.len() != n_attributes {
                return Err(ContextError::RaggedRow {
                    row: g,
                    expected: n_attributes,
                    found: row.len(),
                });
            }
            sets[g].extend(row.iter().enumerate().filter(|(_, b)| **b).map(|(m, _)| m));
        }
        for &(object, attribute) in &self.incidences {
            if object >= n_objects || attribute >= n_attributes {
                return Err(ContextError::IncidenceOutOfRange {
                    object,
                    attribute,
                    n_objects,
                    n_attributes,
                });
            }
            sets[object].insert(attribute);
        }

        let object_names = checked_names("objects", self.object_names, n_objects, "g")?;
        let attribute_names = checked_names("attributes", self.attribute_names, n_attributes, "m")?;

        let mut hasher = ContextHasher::new("binary");
        hasher.names(&object_names);
        hasher.names(&attribute_names);
        for row in &sets {
            hasher.indices(row.iter().copied());
        }

        Ok(BinaryContext {
            object_names,
            attribute_names,
            rows: Rows::build(self.backend, n_attributes, sets),
            hash: hasher.finish(),
        })
    }
}

pub(crate) fn checked_names(
    axis: &'static str,
    names: Option<Vec<String>>,
    expected: usize,
    prefix: &str,
) -> Result<Vec<String>> {
    let names = names.unwrap_or_else(|| (0..expected).map(|i| format!("{prefix}{i}")).collect());
    if names.len() != expected {
        return Err(ContextError::NameCountMismatch {
            axis,
            expected,
            found: names.len(),
        });
    }
    let mut seen = HashSet::new();
    if let Some(name) = names.iter().find(|n| !seen.insert(n.as_str())) {
        return Err(ContextError::DuplicateName {
            axis,
            name: name.clone(),
        });
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(backend: Backend) -> BinaryContext {
        BinaryContext::builder()
            .object_names(["a", "b", "c"])
            .attribute_names(["x", "y", "z"])
            .bool_row(&[true, true, false])
            .bool_row(&[true, false, true])
            .bool_row(&[true, true, true])
            .backend(backend)
            .build()
            .expect("valid context")
    }

    #[test]
    fn backends_answer_the_same_queries() {
        let sparse = small(Backend::Sparse);
        let dense = small(Backend::Dense);
        assert_eq!(sparse, dense);
        assert_eq!(sparse.context_hash(), dense.context_hash());
        let object_sets: [&[usize]; 5] = [&[], &[0], &[0, 1], &[1, 2], &[0, 1, 2]];
        for objects in object_sets {
            assert_eq!(sparse.intention_of(objects), dense.intention_of(objects));
        }
        let attribute_sets: [&[usize]; 5] = [&[], &[0], &[1], &[1, 2], &[0, 1, 2]];
        for attributes in attribute_sets {
            assert_eq!(
                sparse.extension_of(attributes, None),
                dense.extension_of(attributes, None)
            );
        }
    }

    #[test]
    fn empty_object_set_has_every_attribute() {
        assert_eq!(small(Backend::Dense).intention_of(&[]), vec![0, 1, 2]);
        assert_eq!(small(Backend::Sparse).intention_of(&[]), vec![0, 1, 2]);
    }

    #[test]
    fn extension_respects_base_objects() {
        let ctx = small(Backend::Sparse);
        assert_eq!(ctx.extension_of(&[1], None), vec![0, 2]);
        assert_eq!(ctx.extension_of(&[1], Some(&[2, 1][..])), vec![2]);
    }

    #[test]
    fn wide_dense_rows_span_several_words() {
        let mut row = vec![false; 130];
        row[0] = true;
        row[64] = true;
        row[129] = true;
        let ctx = BinaryContext::builder()
            .bool_row(&row)
            .bool_row(&row)
            .backend(Backend::Dense)
            .build()
            .expect("valid context");
        assert_eq!(ctx.intention_of(&[0, 1]), vec![0, 64, 129]);
        assert_eq!(ctx.extension_of(&[64, 129], None), vec![0, 1]);
    }

    #[test]
    fn transposed_swaps_axes() {
        let ctx = small(Backend::Sparse);
        let t = ctx.transposed();
        assert_eq!(t.object_names(), ctx.attribute_names());
        assert_eq!(t.row(2), vec![1, 2]);
        assert_eq!(t.transposed(), ctx);
        assert_eq!(t.transposed().context_hash(), ctx.context_hash());
    }

    #[test]
    fn hash_changes_with_data() {
        let a = small(Backend::Sparse);
        let b = BinaryContext::builder()
            .object_names(["a", "b", "c"])
            .attribute_names(["x", "y", "z"])
            .bool_row(&[true, true, false])
            .bool_row(&[true, false, true])
            .bool_row(&[true, true, false])
            .build()
            .expect("valid context");
        assert_ne!(a.context_hash(), b.context_hash());
    }

    #[test]
    fn builder_rejects_bad_input() {
        let ragged = BinaryContext::from_bools(&[vec![true, false], vec![true]]);
        assert!(matches!(ragged, Err(ContextError::RaggedRow { row: 1, .. })));

        let dup = BinaryContext::builder()
            .object_names(["a", "a"])
            .attribute_names(["x"])
            .build();
        assert!(matches!(dup, Err(ContextError::DuplicateName { .. })));

        let outside = BinaryContext::builder()
            .object_names(["a"])
            .attribute_names(["x"])
            .incidence(0, 3)
            .build();
        assert!(matches!(outside, Err(ContextError::IncidenceOutOfRange { .. })));
    }

    #[test]
    fn incidences_fill_named_context() {
        let ctx = BinaryContext::builder()
            .object_names(["a", "b"])
            .attribute_names(["x", "y"])
            .incidence(1, 0)
            .incidence(1, 1)
            .build()
            .expect("valid context");
        assert_eq!(ctx.row(0), Vec::<usize>::new());
        assert_eq!(ctx.row(1), vec![0, 1]);
        assert_eq!(ctx.column_support(0), 1);
    }

    #[test]
    fn backend_parses_from_str() {
        assert_eq!("dense".parse::<Backend>().expect("known"), Backend::Dense);
        assert!("bitset".parse::<Backend>().is_err());
    }
}
