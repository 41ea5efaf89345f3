use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("element {element} is outside 0..{size}")]
    ElementOutOfRange { element: usize, size: usize },

    #[error("element {0} is checked but not part of the domain")]
    CheckOutsideDomain(usize),

    #[error("iteration over {0} is not supported for this context")]
    UnsupportedSide(&'static str),

    #[error("unknown iteration side {0:?} (expected \"objects\", \"attributes\" or \"auto\")")]
    UnknownIterationSide(String),

    #[error("n_jobs must be at least 1")]
    ZeroJobs,

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, ConstructionError>;
