use thiserror::Error;

use crate::ContextHash;

#[derive(Debug, Error)]
pub enum ConceptError {
    #[error("{what}: {indices} indices but {names} names")]
    LengthMismatch {
        what: &'static str,
        indices: usize,
        names: usize,
    },

    #[error("{what}: index {index} appears more than once")]
    DuplicateIndex { what: &'static str, index: usize },

    #[error("{what}: declared count {declared} does not match {actual} entries")]
    CountMismatch {
        what: &'static str,
        declared: usize,
        actual: usize,
    },

    #[error("support {declared} does not match extent size {actual}")]
    SupportMismatch { declared: usize, actual: usize },

    #[error("invalid interval [{lo}, {hi}]")]
    InvalidInterval { lo: f64, hi: f64 },

    #[error("cannot compare concepts from different contexts ({left:?} vs {right:?})")]
    ContextMismatch {
        left: Option<ContextHash>,
        right: Option<ContextHash>,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConceptError>;
