use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity token of the context a concept was closed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextHash(pub u64);

impl ContextHash {
    /// Token for the transposed context; applying it twice gives back the original.
    pub fn transposed(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Display for ContextHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
