use log::{debug, warn};
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::{Directed, Graph};
use std::collections::HashMap;

use super::package::{EmbeddingEdge, ImportMap, PackageModel};
use super::program::Program;

/// Identity of a type: logical import path plus lowercase name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeKey {
    pub import_path: String,
    pub name: String,
}

impl TypeKey {
    pub fn new(import_path: impl Into<String>, name: &str) -> Self {
        Self {
            import_path: import_path.into(),
            name: name.to_lowercase(),
        }
    }

    /// Target of `edge` as seen from a type declared in `package` whose file
    /// imports are `imports`. `None` when the alias is not imported by that file.
    pub fn of_edge(edge: &EmbeddingEdge, package: &PackageModel, imports: &ImportMap) -> Option<Self> {
        if edge.is_local() {
            return Some(Self::new(package.logical_path.as_str(), &edge.name));
        }
        imports
            .get(&edge.alias)
            .map(|import_path| Self::new(import_path.as_str(), &edge.name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    /// A record of the program: `program.packages()[package].types()[index]`
    Declared { package: usize, index: usize },
    /// Referenced from the tree but declared outside of it
    External(TypeKey),
}

pub type EmbeddingGraph = Graph<TypeNode, EmbeddingEdge, Directed>;

pub struct GraphBuilder {
    graph: EmbeddingGraph,
    node_map: HashMap<TypeKey, NodeIndex>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
            node_map: HashMap::new(),
        }
    }

    pub fn add_node(&mut self, key: TypeKey, node: TypeNode) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&key) {
            return index;
        }
        let index = self.graph.add_node(node);
        self.node_map.insert(key, index);
        index
    }

    pub fn add_edge(
        &mut self,
        source: &TypeKey,
        target: &TypeKey,
        edge: EmbeddingEdge,
    ) -> Option<EdgeIndex> {
        let source_idx = self.node_map.get(source)?;
        let target_idx = self.node_map.get(target)?;
        Some(self.graph.add_edge(*source_idx, *target_idx, edge))
    }

    pub fn get_node_index(&self, key: &TypeKey) -> Option<NodeIndex> {
        self.node_map.get(key).copied()
    }

    pub fn build(self) -> (EmbeddingGraph, HashMap<TypeKey, NodeIndex>) {
        (self.graph, self.node_map)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves every recorded edge of `program` into graph form. Declared
/// records become nodes first, so an edge finds its target regardless of the
/// order packages were processed in; targets outside the tree become
/// [`TypeNode::External`]; edges through unknown aliases are dropped.
pub fn build_embedding_graph(program: &Program) -> (EmbeddingGraph, HashMap<TypeKey, NodeIndex>) {
    let mut builder = GraphBuilder::new();

    for (package_idx, package) in program.packages().iter().enumerate() {
        for (index, record) in package.types().iter().enumerate() {
            builder.add_node(
                TypeKey::new(package.logical_path.as_str(), &record.name),
                TypeNode::Declared {
                    package: package_idx,
                    index,
                },
            );
        }
    }

    for package in program.packages() {
        for record in package.types() {
            let source = TypeKey::new(package.logical_path.as_str(), &record.name);
            let Some(imports) = package.imports_for(record) else {
                continue;
            };

            for edge in &record.embedded {
                let Some(target) = TypeKey::of_edge(edge, package, imports) else {
                    debug!(
                        "{}.{}: alias '{}' of embedded {} is not imported",
                        package.logical_path, record.name, edge.alias, edge.name
                    );
                    continue;
                };
                if builder.get_node_index(&target).is_none() {
                    if let Some(unprocessed) = program
                        .find_package_by_path(&target.import_path)
                        .filter(|target_package| !target_package.is_processed())
                    {
                        warn!(
                            "{}.{} embeds {} from unprocessed package {}; chains through it are cut",
                            package.logical_path, record.name, edge.name, unprocessed.logical_path
                        );
                    }
                    builder.add_node(target.clone(), TypeNode::External(target.clone()));
                }
                builder.add_edge(&source, &target, edge.clone());
            }
        }
    }

    builder.build()
}
