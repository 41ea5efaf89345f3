mod binary;
mod error;
mod hashing;
mod interval;

pub use binary::{Backend, BinaryContext, BinaryContextBuilder};
pub use error::{ContextError, Result};
pub use interval::IntervalContext;

use formal_concept::{ContextHash, Intent};

/// Galois connection between object subsets and intents.
///
/// `extension` and `intention` must be antitone and satisfy
/// `extension(intention(extension(a))) == extension(a)`. Engines rely on this
/// without checking it.
pub trait ClosureContext: Sync {
    type Intent: Intent;

    fn n_objects(&self) -> usize;

    fn n_attributes(&self) -> usize;

    fn object_names(&self) -> &[String];

    fn attribute_names(&self) -> &[String];

    /// Common intent of the given objects.
    fn intention(&self, objects: &[usize]) -> Self::Intent;

    /// Sorted objects described by `intent`, taken from `base_objects` (all objects when `None`).
    fn extension(&self, intent: &Self::Intent, base_objects: Option<&[usize]>) -> Vec<usize>;

    fn context_hash(&self) -> ContextHash;
}
