use petgraph::graph::NodeIndex;
use petgraph::visit::{Dfs, Reversed};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use super::graph::{build_embedding_graph, EmbeddingGraph, TypeKey, TypeNode};
use super::package::TypeRecord;
use super::program::Program;
use crate::error::{AnalysisError, Result};

/// Fully qualified marker, `<import/path>.<TypeName>`, split at the last dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerType {
    pub import_path: String,
    pub name: String,
}

impl MarkerType {
    pub fn key(&self) -> TypeKey {
        TypeKey::new(self.import_path.as_str(), &self.name)
    }
}

impl FromStr for MarkerType {
    type Err = AnalysisError;

    fn from_str(marker: &str) -> Result<Self> {
        let invalid = || AnalysisError::InvalidMarker {
            marker: marker.to_string(),
        };
        let (import_path, name) = marker.trim().rsplit_once('.').ok_or_else(invalid)?;
        if import_path.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            import_path: import_path.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for MarkerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.import_path, self.name)
    }
}

/// Embedding graph of a processed program, built once and queried many times.
pub struct EmbeddingQuery<'p> {
    program: &'p Program,
    graph: EmbeddingGraph,
    node_map: HashMap<TypeKey, NodeIndex>,
}

impl<'p> EmbeddingQuery<'p> {
    pub fn new(program: &'p Program) -> Self {
        let (graph, node_map) = build_embedding_graph(program);
        Self {
            program,
            graph,
            node_map,
        }
    }

    pub fn graph(&self) -> &EmbeddingGraph {
        &self.graph
    }

    /// Every declared type that reaches `marker` through one or more embeds,
    /// in package discovery order then declaration order. The marker itself
    /// is never part of the result.
    pub fn find_types_embedding(&self, marker: &MarkerType) -> Vec<&'p TypeRecord> {
        let Some(&marker_idx) = self.node_map.get(&marker.key()) else {
            return Vec::new();
        };

        // Walking edges backwards from the marker visits each node once, cycles included
        let mut reaching = HashSet::new();
        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, marker_idx);
        while let Some(node) = dfs.next(reversed) {
            if node != marker_idx {
                reaching.insert(node);
            }
        }

        let mut matches: Vec<(usize, usize)> = reaching
            .into_iter()
            .filter_map(|node| match self.graph[node] {
                TypeNode::Declared { package, index } => Some((package, index)),
                TypeNode::External(_) => None,
            })
            .collect();
        matches.sort_unstable();

        matches
            .into_iter()
            .map(|(package, index)| &self.program.packages()[package].types()[index])
            .collect()
    }

    /// Whether the type `key` reaches `marker`. Unknown types never do.
    pub fn type_embeds(&self, key: &TypeKey, marker: &MarkerType) -> bool {
        let (Some(&start), Some(&target)) =
            (self.node_map.get(key), self.node_map.get(&marker.key()))
        else {
            return false;
        };
        if start == target {
            return false;
        }

        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(node) = dfs.next(&self.graph) {
            if node == target {
                return true;
            }
        }
        false
    }
}

/// One-shot form of [`EmbeddingQuery::find_types_embedding`].
pub fn find_types_embedding<'p>(program: &'p Program, marker: &str) -> Result<Vec<&'p TypeRecord>> {
    let marker: MarkerType = marker.parse()?;
    Ok(EmbeddingQuery::new(program).find_types_embedding(&marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_splits_at_last_dot() {
        let marker: MarkerType = "gopkg.in/yaml.v2.Node".parse().unwrap();
        assert_eq!(marker.import_path, "gopkg.in/yaml.v2");
        assert_eq!(marker.name, "Node");
        assert_eq!(marker.to_string(), "gopkg.in/yaml.v2.Node");
    }

    #[test]
    fn malformed_markers_are_rejected() {
        for bad in ["Controller", ".Controller", "aah.", "a.b/c"] {
            assert!(matches!(
                bad.parse::<MarkerType>(),
                Err(AnalysisError::InvalidMarker { .. })
            ));
        }
    }
}
