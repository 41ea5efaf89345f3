use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use concept_construction::{ConstructionError, IterationSide, Parallelism};
use formal_concept::MeasureName;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown projection sorting {0:?} (expected ascending, descending, random or random:<seed>)")]
    UnknownProjectionSorting(String),

    #[error("unknown measure {0:?} (expected LStab, UStab or LogLStab)")]
    UnknownMeasure(String),

    #[error("unknown algorithm {0:?}")]
    UnknownAlgorithm(String),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// How concepts are enumerated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionAlgorithm {
    #[default]
    #[serde(rename = "cbo")]
    CbO,
    Lindig,
}

impl FromStr for ConstructionAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cbo" | "CbO" => Ok(Self::CbO),
            "lindig" => Ok(Self::Lindig),
            other => Err(ConfigError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// How direct subconcepts are derived from a concept set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAlgorithm {
    CompleteComparison,
    #[default]
    SpanningTree,
}

impl FromStr for OrderAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complete_comparison" => Ok(Self::CompleteComparison),
            "spanning_tree" => Ok(Self::SpanningTree),
            other => Err(ConfigError::UnknownAlgorithm(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    pub algorithm: ConstructionAlgorithm,
    pub order: OrderAlgorithm,
    pub side: IterationSide,
    #[serde(rename = "n_jobs")]
    pub parallelism: Parallelism,
}

/// Score used to decide which concepts SOFIA drops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PruningMeasure {
    #[default]
    LStab,
    UStab,
    /// Support minus the largest direct subconcept support.
    LogLStab,
}

impl PruningMeasure {
    pub fn measure_name(self) -> MeasureName {
        match self {
            PruningMeasure::LStab => MeasureName::LStab,
            PruningMeasure::UStab => MeasureName::UStab,
            PruningMeasure::LogLStab => MeasureName::LogLStab,
        }
    }
}

impl FromStr for PruningMeasure {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LStab" => Ok(Self::LStab),
            "UStab" => Ok(Self::UStab),
            "LogLStab" => Ok(Self::LogLStab),
            other => Err(ConfigError::UnknownMeasure(other.to_string())),
        }
    }
}

/// Order in which SOFIA adds projections.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionSorting {
    /// Least supported projection first.
    Ascending,
    /// Most supported projection first.
    #[default]
    Descending,
    /// Shuffled with the given seed.
    Random(u64),
    /// Exactly this permutation.
    Given(Vec<usize>),
}

impl FromStr for ProjectionSorting {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ascending" => Ok(Self::Ascending),
            "descending" => Ok(Self::Descending),
            "random" => Ok(Self::Random(0)),
            other => other
                .strip_prefix("random:")
                .and_then(|seed| seed.parse().ok())
                .map(Self::Random)
                .ok_or_else(|| ConfigError::UnknownProjectionSorting(other.to_string())),
        }
    }
}

impl fmt::Display for ProjectionSorting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionSorting::Ascending => f.write_str("ascending"),
            ProjectionSorting::Descending => f.write_str("descending"),
            ProjectionSorting::Random(seed) => write!(f, "random:{seed}"),
            ProjectionSorting::Given(order) => write!(f, "given{order:?}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SofiaConfig {
    pub l_max: usize,
    /// Smallest extent worth keeping: a count from 1 up, a share of the objects below 1.
    pub min_supp: f64,
    pub measure: PruningMeasure,
    pub projection_sorting: ProjectionSorting,
    /// Projections closed exactly before pruning starts. Defaults to `floor(log2(l_max))`.
    pub proj_to_start: Option<usize>,
    #[serde(rename = "n_jobs")]
    pub parallelism: Parallelism,
}

impl Default for SofiaConfig {
    fn default() -> Self {
        Self {
            l_max: 100,
            min_supp: 0.0,
            measure: PruningMeasure::default(),
            projection_sorting: ProjectionSorting::default(),
            proj_to_start: None,
            parallelism: Parallelism::default(),
        }
    }
}

impl SofiaConfig {
    pub fn with_l_max(l_max: usize) -> Self {
        Self {
            l_max,
            ..Self::default()
        }
    }

    pub fn validate(&self, n_projections: usize) -> Result<(), ConfigError> {
        if self.l_max < 2 {
            return Err(ConfigError::InvalidValue {
                field: "l_max",
                reason: format!("{} is below 2 (top and bottom are always kept)", self.l_max),
            });
        }
        if !(self.min_supp.is_finite() && self.min_supp >= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "min_supp",
                reason: format!("{} is not a non-negative number", self.min_supp),
            });
        }
        if let ProjectionSorting::Given(order) = &self.projection_sorting {
            let mut sorted = order.clone();
            sorted.sort_unstable();
            if sorted != (0..n_projections).collect::<Vec<_>>() {
                return Err(ConfigError::InvalidValue {
                    field: "projection_sorting",
                    reason: format!("{order:?} is not a permutation of 0..{n_projections}"),
                });
            }
        }
        Ok(())
    }

    /// `min_supp` as an object count for a context of `n_objects`.
    pub fn min_support(&self, n_objects: usize) -> usize {
        let threshold = if self.min_supp < 1.0 {
            self.min_supp * n_objects as f64
        } else {
            self.min_supp
        };
        threshold.ceil() as usize
    }

    pub fn start_size(&self, n_projections: usize) -> usize {
        self.proj_to_start
            .unwrap_or_else(|| self.l_max.max(1).ilog2() as usize)
            .min(n_projections)
    }
}
