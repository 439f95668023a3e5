use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tree_sitter::{Language, Node as TSNode, Parser, Tree};

use crate::error::{AnalysisError, Result};

pub struct TreeSitterParser {
    parser: Parser,
}

impl TreeSitterParser {
    pub fn new(language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser.set_language(language).map_err(|err| {
            AnalysisError::parse("<grammar>", format!("incompatible grammar: {err}"))
        })?;
        Ok(Self { parser })
    }

    /// Reads and parses one file, returning the tree together with the source
    /// it was built from (node byte ranges index into it).
    pub fn parse_file(&mut self, file_path: &Path) -> Result<(Tree, String)> {
        let source = read_source(file_path)
            .map_err(|err| AnalysisError::parse(file_path, err.to_string()))?;
        let tree = self.parse_source(&source, file_path)?;
        Ok((tree, source))
    }

    pub fn parse_source(&mut self, source: &str, file_path: &Path) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| AnalysisError::parse(file_path, "parser produced no tree"))
    }
}

/// Buffered read sized to the file
fn read_source(file_path: &Path) -> std::io::Result<String> {
    let file = File::open(file_path)?;
    let file_size = file.metadata()?.len() as usize;

    let mut reader = BufReader::with_capacity(file_size.clamp(1, 8192), file);
    let mut content = String::with_capacity(file_size);
    reader.read_to_string(&mut content)?;
    Ok(content)
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

/// Text of the child stored under `field`, if any
pub fn field_text<'a>(node: &TSNode, field: &str, source: &'a [u8]) -> Option<&'a str> {
    node.child_by_field_name(field)
        .map(|child| extract_text(&child, source))
}

/// First ERROR or MISSING node in document order.
pub fn first_error<'a>(node: TSNode<'a>) -> Option<TSNode<'a>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<TSNode<'a>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error).or(Some(node))
}

/// Strips the quotes of an interpreted or raw Go string literal.
pub fn unquote(literal: &str) -> &str {
    let trimmed = literal.trim();
    if trimmed.len() >= 2 {
        let first = trimmed.as_bytes()[0];
        let last = trimmed.as_bytes()[trimmed.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'`' && last == b'`') {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}
