pub mod excludes;
pub mod extractor;
pub mod graph;
pub mod imports;
pub mod package;
pub mod program;
pub mod query;
pub mod scanner;

pub use excludes::Excludes;
pub use extractor::{extract_package_types, extract_type, TypeContext};
pub use graph::{build_embedding_graph, EmbeddingGraph, GraphBuilder, TypeKey, TypeNode};
pub use imports::{GoListLookup, ImportResolver, PackageNameLookup};
pub use package::{EmbeddingEdge, ImportMap, PackageModel, SourceFile, SourceRoot, TypeRecord};
pub use program::{Program, ProgramOptions};
pub use query::{find_types_embedding, EmbeddingQuery, MarkerType};
pub use scanner::{CandidateDir, DirectoryScanner, ScanOutcome};
