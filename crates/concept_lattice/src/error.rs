use thiserror::Error;

use concept_construction::ConstructionError;
use formal_concept::ConceptError;

use crate::ConfigError;

#[derive(Debug, Error)]
pub enum LatticeError {
    #[error("a lattice needs at least one concept")]
    Empty,

    #[error("concept index {index} is out of range for {len} concepts")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot remove the top concept")]
    RemoveTop,

    #[error("cannot remove the bottom concept")]
    RemoveBottom,

    #[error("cannot remove from a lattice of {0} concepts")]
    TooFewConcepts(usize),

    #[error("a concept with the same extent is already at index {0}")]
    ConceptAlreadyPresent(usize),

    #[error("concept is neither below nor above the top concept")]
    BreaksSingleTop,

    #[error("concept is neither above nor below the bottom concept")]
    BreaksSingleBottom,

    #[error("invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    #[error(transparent)]
    Concept(#[from] ConceptError),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LatticeError>;
