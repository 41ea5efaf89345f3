//! Close-by-One enumeration of closed sets.

mod cbo;
mod construct;
mod error;
mod params;
mod transposed;

pub use cbo::{ClosedPair, close_by_one};
pub use construct::ConceptConstruction;
pub use error::{ConstructionError, Result};
pub use params::{CbOParams, IterationSide, Parallelism};
pub use transposed::TransposedContext;
