use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{axis}: {found} names given for {expected} entries")]
    NameCountMismatch {
        axis: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{axis}: name {name:?} is used twice")]
    DuplicateName { axis: &'static str, name: String },

    #[error("incidence ({object}, {attribute}) is outside a {n_objects}x{n_attributes} context")]
    IncidenceOutOfRange {
        object: usize,
        attribute: usize,
        n_objects: usize,
        n_attributes: usize,
    },

    #[error("value at ({row}, {column}) is NaN")]
    NotANumber { row: usize, column: usize },

    #[error("unknown backend {0:?} (expected \"sparse\" or \"dense\")")]
    UnknownBackend(String),
}

pub type Result<T> = std::result::Result<T, ContextError>;
