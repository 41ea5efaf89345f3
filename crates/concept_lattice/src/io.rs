use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use formal_concept::{Concept, Intent};

use crate::order::Adjacency;
use crate::{ConceptLattice, LatticeError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    #[serde(rename = "Top")]
    top: Vec<usize>,
    #[serde(rename = "Bottom")]
    bottom: Vec<usize>,
    #[serde(rename = "NodesCount")]
    nodes_count: usize,
    #[serde(rename = "ArcsCount")]
    arcs_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(serialize = "I: Intent", deserialize = "I: Intent"))]
struct Nodes<I> {
    #[serde(rename = "Nodes")]
    nodes: Vec<Concept<I>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Arc {
    #[serde(rename = "S")]
    source: usize,
    #[serde(rename = "D")]
    target: usize,
}

#[derive(Debug, Serialize, Deserialize)]
struct Arcs {
    #[serde(rename = "Arcs")]
    arcs: Vec<Arc>,
}

/// `[header, nodes, arcs]`, each arc going from a concept to one of its direct subconcepts.
type Record<I> = (Header, Nodes<I>, Arcs);

impl<I: Intent> ConceptLattice<I> {
    fn to_record(&self) -> Record<I> {
        let arcs: Vec<Arc> = self
            .subconcepts_dict()
            .iter()
            .enumerate()
            .flat_map(|(source, below)| below.iter().map(move |&target| Arc { source, target }))
            .collect();
        (
            Header {
                top: vec![self.top()],
                bottom: vec![self.bottom()],
                nodes_count: self.len(),
                arcs_count: arcs.len(),
            },
            Nodes {
                nodes: self.concepts().to_vec(),
            },
            Arcs { arcs },
        )
    }

    fn from_record((header, nodes, arcs): Record<I>) -> Result<Self> {
        let len = nodes.nodes.len();
        if header.nodes_count != len || header.arcs_count != arcs.arcs.len() {
            return Err(LatticeError::InvalidHierarchy(format!(
                "header announces {} nodes and {} arcs, found {} and {}",
                header.nodes_count,
                header.arcs_count,
                len,
                arcs.arcs.len()
            )));
        }
        let mut subconcepts: Adjacency = vec![BTreeSet::new(); len];
        for Arc { source, target } in arcs.arcs {
            let slot = subconcepts
                .get_mut(source)
                .ok_or(LatticeError::IndexOutOfRange { index: source, len })?;
            slot.insert(target);
        }
        let mut lattice = Self::from_subconcepts(nodes.nodes, subconcepts)?;
        if let (Some(&top), Some(&bottom)) = (header.top.first(), header.bottom.first()) {
            lattice.set_top_bottom(top, bottom);
        }
        Ok(lattice)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_record())?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_record(serde_json::from_str(text)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(&self.to_record())?)?;
        Ok(())
    }

    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
