//! Closed object/attribute pairs of a formal (or pattern) context.

mod concept;
mod description;
mod error;
mod hash;
mod item_set;
mod measure;
mod record;

pub use concept::Concept;
pub use description::{Description, Interval};
pub use error::{ConceptError, Result};
pub use hash::ContextHash;
pub use item_set::ItemSet;
pub use measure::{MeasureName, Measures};
pub use record::{ConceptRecord, DescriptionRecord, ItemSetRecord};

use std::fmt::Debug;
use std::hash::Hash;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Capability set shared by flat attribute intents and pattern descriptions.
pub trait Intent:
    Clone + Debug + PartialEq + Eq + Hash + Send + Sync + Serialize + DeserializeOwned
{
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries of `self` that appear in none of `others`.
    fn without_shared(&self, others: &[&Self]) -> Self;
}

#[cfg(test)]
mod tests {
    use crate::{Concept, Description, ItemSet};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn public_types_are_send_and_sync() {
        assert_send_sync::<ItemSet>();
        assert_send_sync::<Description>();
        assert_send_sync::<Concept<ItemSet>>();
        assert_send_sync::<Concept<Description>>();
    }
}
