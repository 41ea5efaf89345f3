use formal_concept::{ContextHash, ItemSet};
use formal_context::{BinaryContext, ClosureContext};

/// Borrowed view of a binary context with objects and attributes swapped.
///
/// Iterating its objects is iterating the attributes of the inner context.
#[derive(Clone, Copy, Debug)]
pub struct TransposedContext<'a> {
    inner: &'a BinaryContext,
}

impl<'a> TransposedContext<'a> {
    pub fn new(inner: &'a BinaryContext) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &'a BinaryContext {
        self.inner
    }
}

impl ClosureContext for TransposedContext<'_> {
    type Intent = ItemSet;

    fn n_objects(&self) -> usize {
        self.inner.n_attributes()
    }

    fn n_attributes(&self) -> usize {
        self.inner.n_objects()
    }

    fn object_names(&self) -> &[String] {
        self.inner.attribute_names()
    }

    fn attribute_names(&self) -> &[String] {
        self.inner.object_names()
    }

    fn intention(&self, attributes: &[usize]) -> ItemSet {
        ItemSet::from_indices(
            self.inner.extension_of(attributes, None),
            self.inner.object_names(),
        )
    }

    fn extension(&self, objects: &ItemSet, base_attributes: Option<&[usize]>) -> Vec<usize> {
        let shared = self.inner.intention_of(objects.indices());
        match base_attributes {
            Some(base) => shared
                .into_iter()
                .filter(|m| base.contains(m))
                .collect(),
            None => shared,
        }
    }

    fn context_hash(&self) -> ContextHash {
        self.inner.context_hash().transposed()
    }
}
