use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeasureName {
    /// Lower bound of stability.
    LStab,
    /// Upper bound of stability.
    UStab,
    /// Logarithmic lower bound of stability: support minus the largest child support.
    LogLStab,
    /// Exact stability.
    Stab,
    Custom(String),
}

impl MeasureName {
    pub fn as_str(&self) -> &str {
        match self {
            MeasureName::LStab => "LStab",
            MeasureName::UStab => "UStab",
            MeasureName::LogLStab => "LogLStab",
            MeasureName::Stab => "Stab",
            MeasureName::Custom(name) => name,
        }
    }
}

impl fmt::Display for MeasureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MeasureName {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "LStab" => MeasureName::LStab,
            "UStab" => MeasureName::UStab,
            "LogLStab" => MeasureName::LogLStab,
            "Stab" => MeasureName::Stab,
            other => MeasureName::Custom(other.to_string()),
        })
    }
}

/// Scores attached to a concept after construction. Not part of concept identity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct Measures {
    values: BTreeMap<MeasureName, f64>,
}

impl Measures {
    pub fn get(&self, name: &MeasureName) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn insert(&mut self, name: MeasureName, value: f64) -> Option<f64> {
        self.values.insert(name, value)
    }

    pub fn remove(&mut self, name: &MeasureName) -> Option<f64> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MeasureName, f64)> + '_ {
        self.values.iter().map(|(name, value)| (name, *value))
    }
}

impl From<BTreeMap<String, f64>> for Measures {
    fn from(raw: BTreeMap<String, f64>) -> Self {
        let values = raw
            .into_iter()
            .map(|(name, value)| {
                let name = match name.parse::<MeasureName>() {
                    Ok(name) => name,
                    Err(never) => match never {},
                };
                (name, value)
            })
            .collect();
        Self { values }
    }
}

impl From<Measures> for BTreeMap<String, f64> {
    fn from(measures: Measures) -> Self {
        measures
            .values
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}
