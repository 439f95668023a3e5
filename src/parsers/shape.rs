//! Closed classification of Go type expressions.
//!
//! Embedding only cares about a handful of syntactic forms; everything else
//! collapses into [`TypeShape::Other`] so callers can match exhaustively.

use serde::Serialize;
use tree_sitter::Node as TSNode;

use super::common::{extract_text, field_text};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeShape {
    /// `Name`, declared in the same package
    Identifier(String),
    /// `alias.Name`
    Qualified { alias: String, name: String },
    /// `*T`
    Pointer(Box<TypeShape>),
    /// Generic instantiations, literals, funcs, maps, ...
    Other,
}

impl TypeShape {
    pub fn classify(node: &TSNode, source: &[u8]) -> Self {
        match node.kind() {
            "type_identifier" => TypeShape::Identifier(extract_text(node, source).to_string()),
            "qualified_type" => {
                match (
                    field_text(node, "package", source),
                    field_text(node, "name", source),
                ) {
                    (Some(alias), Some(name)) => TypeShape::Qualified {
                        alias: alias.to_string(),
                        name: name.to_string(),
                    },
                    _ => TypeShape::Other,
                }
            }
            "pointer_type" => match node.named_child(0) {
                Some(inner) => TypeShape::Pointer(Box::new(Self::classify(&inner, source))),
                None => TypeShape::Other,
            },
            "parenthesized_type" => match node.named_child(0) {
                Some(inner) => Self::classify(&inner, source),
                None => TypeShape::Other,
            },
            _ => TypeShape::Other,
        }
    }

    /// Strips every pointer wrapper.
    pub fn unwrap_pointers(&self) -> &TypeShape {
        let mut shape = self;
        while let TypeShape::Pointer(inner) = shape {
            shape = inner;
        }
        shape
    }

    /// `(alias, name)` of an embedding target; alias is empty for same-package
    /// types. `None` when the shape carries no usable embedding information.
    pub fn embedded_target(&self) -> Option<(&str, &str)> {
        match self.unwrap_pointers() {
            TypeShape::Identifier(name) => Some(("", name.as_str())),
            TypeShape::Qualified { alias, name } => Some((alias.as_str(), name.as_str())),
            TypeShape::Pointer(_) | TypeShape::Other => None,
        }
    }
}
