//! Concept lattices: order construction, incremental maintenance and SOFIA.

mod config;
mod error;
mod io;
mod lattice;
mod lindig;
mod measures;
pub mod order;
mod sofia;
mod trace;

pub use config::{
    ConfigError, ConstructionAlgorithm, LatticeConfig, OrderAlgorithm, ProjectionSorting,
    PruningMeasure, SofiaConfig,
};
pub use error::{LatticeError, Result};
pub use lattice::ConceptLattice;
pub use lindig::lindig;
pub use measures::{
    ConceptMeasure, Stability, StabilityLogBound, StabilityLowerBound, StabilityUpperBound,
};
pub use order::Adjacency;
pub use sofia::SofiaContext;
pub use trace::ContextTrace;
