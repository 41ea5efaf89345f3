use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConstructionError;

/// Restart state for Close-by-One.
///
/// * `domain` limits closures to these elements (all when `None`).
/// * `initial_combinations` replaces the empty starting combination. Seeds skip
///   the canonicity test and may be extended by any checked element.
/// * `iter_elements_to_check` are the only elements used to extend a combination
///   (the whole domain when `None`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CbOParams {
    pub domain: Option<Vec<usize>>,
    pub initial_combinations: Option<Vec<Vec<usize>>>,
    pub iter_elements_to_check: Option<Vec<usize>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IterationSide {
    Objects,
    Attributes,
    /// The smaller of the two.
    #[default]
    Auto,
}

impl IterationSide {
    /// Resolves `Auto` against the context shape.
    pub fn resolve(self, n_objects: usize, n_attributes: usize) -> IterationSide {
        match self {
            IterationSide::Auto if n_attributes < n_objects => IterationSide::Attributes,
            IterationSide::Auto => IterationSide::Objects,
            side => side,
        }
    }
}

impl FromStr for IterationSide {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "objects" => Ok(IterationSide::Objects),
            "attributes" => Ok(IterationSide::Attributes),
            "auto" => Ok(IterationSide::Auto),
            other => Err(ConstructionError::UnknownIterationSide(other.to_string())),
        }
    }
}

impl fmt::Display for IterationSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IterationSide::Objects => "objects",
            IterationSide::Attributes => "attributes",
            IterationSide::Auto => "auto",
        })
    }
}

/// Worker count, read from an `n_jobs` integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum Parallelism {
    #[default]
    Sequential,
    Threads(NonZeroUsize),
}

impl Parallelism {
    pub fn n_jobs(self) -> usize {
        match self {
            Parallelism::Sequential => 1,
            Parallelism::Threads(n) => n.get(),
        }
    }
}

impl TryFrom<usize> for Parallelism {
    type Error = ConstructionError;

    fn try_from(n_jobs: usize) -> Result<Self, Self::Error> {
        match n_jobs {
            0 => Err(ConstructionError::ZeroJobs),
            1 => Ok(Parallelism::Sequential),
            n => NonZeroUsize::new(n)
                .map(Parallelism::Threads)
                .ok_or(ConstructionError::ZeroJobs),
        }
    }
}

impl From<Parallelism> for usize {
    fn from(value: Parallelism) -> Self {
        value.n_jobs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_picks_the_smaller_side() {
        assert_eq!(IterationSide::Auto.resolve(16, 4), IterationSide::Attributes);
        assert_eq!(IterationSide::Auto.resolve(3, 4), IterationSide::Objects);
        assert_eq!(IterationSide::Objects.resolve(16, 4), IterationSide::Objects);
    }

    #[test]
    fn iteration_side_parses_known_names_only() {
        assert_eq!("attributes".parse::<IterationSide>().ok(), Some(IterationSide::Attributes));
        assert!(matches!(
            "rows".parse::<IterationSide>(),
            Err(ConstructionError::UnknownIterationSide(_))
        ));
    }

    #[test]
    fn parallelism_from_n_jobs() {
        assert_eq!(Parallelism::try_from(1_usize).ok(), Some(Parallelism::Sequential));
        assert_eq!(Parallelism::try_from(4_usize).map(Parallelism::n_jobs).ok(), Some(4));
        assert!(matches!(Parallelism::try_from(0_usize), Err(ConstructionError::ZeroJobs)));
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: CbOParams =
            serde_json::from_str(r#"{"iter_elements_to_check": [3]}"#).expect("valid json");
        assert_eq!(params.domain, None);
        assert_eq!(params.iter_elements_to_check, Some(vec![3]));
    }

    #[test]
    fn parallelism_reads_n_jobs_integer() {
        let p: Parallelism = serde_json::from_str("3").expect("valid json");
        assert_eq!(p.n_jobs(), 3);
        assert!(serde_json::from_str::<Parallelism>("0").is_err());
    }
}
