use serde::Serialize;
use std::path::{Path, PathBuf};
use tree_sitter::Node as TSNode;

use super::common::{extract_text, field_text, first_error, unquote, TreeSitterParser};
use super::shape::TypeShape;
use crate::error::{AnalysisError, Result};

/// Owned syntax extracted from one `.go` file. No tree-sitter data survives
/// the parse, so units can move freely between threads.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub file_name: String,
    pub package_name: String,
    pub imports: Vec<ImportDecl>,
    pub types: Vec<TypeDecl>,
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Explicit local name, including `_` and `.`
    pub alias: Option<String>,
    pub path: String,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Struct,
    Interface,
    Alias,
    Other,
}

impl TypeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Alias => "alias",
            TypeKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub kind: TypeKind,
    /// Struct fields in declaration order; empty for other kinds
    pub fields: Vec<FieldDecl>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Empty for embedded (anonymous) fields
    pub names: Vec<String>,
    pub shape: TypeShape,
}

impl FieldDecl {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDecl {
    /// Receiver base type name, pointers and type arguments stripped
    #[serde(skip)]
    pub receiver: String,
    pub name: String,
    pub parameters: Vec<Parameter>,
    #[serde(skip)]
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Empty when the parameter is unnamed
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

pub struct GoParser;

impl GoParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses a single file. Syntax errors fail the file, reporting the first
    /// offending line.
    pub fn parse_file(&self, file_path: &Path) -> Result<SourceUnit> {
        let mut parser = TreeSitterParser::new(tree_sitter_go::language())?;
        let (tree, source) = parser.parse_file(file_path)?;
        self.extract_unit(file_path, &tree, source.as_bytes())
    }

    /// Same as [`parse_file`](Self::parse_file) for in-memory source.
    pub fn parse_source(&self, file_path: &Path, source: &str) -> Result<SourceUnit> {
        let mut parser = TreeSitterParser::new(tree_sitter_go::language())?;
        let tree = parser.parse_source(source, file_path)?;
        self.extract_unit(file_path, &tree, source.as_bytes())
    }

    fn extract_unit(
        &self,
        file_path: &Path,
        tree: &tree_sitter::Tree,
        source: &[u8],
    ) -> Result<SourceUnit> {
        let root = tree.root_node();
        if let Some(bad) = first_error(root) {
            return Err(AnalysisError::parse(
                file_path,
                format!(
                    "syntax error at line {}, column {}",
                    bad.start_position().row + 1,
                    bad.start_position().column + 1
                ),
            ));
        }

        let package_name = self
            .extract_package(&root, source)
            .ok_or_else(|| AnalysisError::parse(file_path, "missing package clause"))?;

        let mut unit = SourceUnit {
            path: file_path.to_path_buf(),
            file_name: file_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            package_name,
            imports: Vec::new(),
            types: Vec::new(),
            methods: Vec::new(),
        };

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "import_declaration" => self.process_import(&child, source, &mut unit.imports),
                "type_declaration" => {
                    self.process_type_declaration(&child, source, &mut unit.types)
                }
                "method_declaration" => {
                    if let Some(method) = self.process_method(&child, source) {
                        unit.methods.push(method);
                    }
                }
                _ => {}
            }
        }

        Ok(unit)
    }

    fn extract_package(&self, root: &TSNode, source: &[u8]) -> Option<String> {
        let mut cursor = root.walk();
        let clause = root
            .children(&mut cursor)
            .find(|child| child.kind() == "package_clause")?;
        let mut clause_cursor = clause.walk();
        let name = clause
            .named_children(&mut clause_cursor)
            .find(|child| child.kind() == "package_identifier")
            .map(|ident| extract_text(&ident, source).to_string());
        name
    }

    fn process_import(&self, import_node: &TSNode, source: &[u8], imports: &mut Vec<ImportDecl>) {
        let mut cursor = import_node.walk();
        for child in import_node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => self.process_import_spec(&child, source, imports),
                "import_spec_list" => {
                    let mut list_cursor = child.walk();
                    for spec in child.named_children(&mut list_cursor) {
                        if spec.kind() == "import_spec" {
                            self.process_import_spec(&spec, source, imports);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn process_import_spec(&self, spec: &TSNode, source: &[u8], imports: &mut Vec<ImportDecl>) {
        let Some(path) = field_text(spec, "path", source) else {
            return;
        };
        imports.push(ImportDecl {
            alias: field_text(spec, "name", source).map(str::to_string),
            path: unquote(path).to_string(),
            line: spec.start_position().row + 1,
        });
    }

    fn process_type_declaration(&self, type_decl: &TSNode, source: &[u8], types: &mut Vec<TypeDecl>) {
        // `type X ...` and grouped `type ( ... )` both list specs as direct children
        let mut cursor = type_decl.walk();
        for spec in type_decl.named_children(&mut cursor) {
            match spec.kind() {
                "type_spec" | "type_alias" => {
                    if let Some(decl) = self.process_type_spec(&spec, source) {
                        types.push(decl);
                    }
                }
                _ => {}
            }
        }
    }

    fn process_type_spec(&self, spec: &TSNode, source: &[u8]) -> Option<TypeDecl> {
        let name = field_text(spec, "name", source)?.to_string();
        let line = spec.start_position().row + 1;
        let type_node = spec.child_by_field_name("type");

        if spec.kind() == "type_alias" {
            return Some(TypeDecl {
                name,
                kind: TypeKind::Alias,
                fields: Vec::new(),
                line,
            });
        }

        let (kind, fields) = match type_node {
            Some(node) if node.kind() == "struct_type" => {
                (TypeKind::Struct, self.process_struct_fields(&node, source))
            }
            Some(node) if node.kind() == "interface_type" => (TypeKind::Interface, Vec::new()),
            _ => (TypeKind::Other, Vec::new()),
        };

        Some(TypeDecl {
            name,
            kind,
            fields,
            line,
        })
    }

    fn process_struct_fields(&self, struct_node: &TSNode, source: &[u8]) -> Vec<FieldDecl> {
        let mut fields = Vec::new();
        let mut cursor = struct_node.walk();
        let Some(list) = struct_node
            .named_children(&mut cursor)
            .find(|child| child.kind() == "field_declaration_list")
        else {
            return fields;
        };

        let mut list_cursor = list.walk();
        for field_decl in list.named_children(&mut list_cursor) {
            if field_decl.kind() == "field_declaration" {
                if let Some(field) = self.process_field(&field_decl, source) {
                    fields.push(field);
                }
            }
        }
        fields
    }

    fn process_field(&self, field_decl: &TSNode, source: &[u8]) -> Option<FieldDecl> {
        let type_node = field_decl.child_by_field_name("type")?;

        let mut cursor = field_decl.walk();
        let names: Vec<String> = field_decl
            .children_by_field_name("name", &mut cursor)
            .map(|ident| extract_text(&ident, source).to_string())
            .collect();

        let mut shape = TypeShape::classify(&type_node, source);
        if names.is_empty() {
            // Embedded pointers are spelled `*T` directly in the field, not as a pointer_type
            let mut star_cursor = field_decl.walk();
            let starred = field_decl
                .children(&mut star_cursor)
                .any(|child| !child.is_named() && child.kind() == "*");
            if starred {
                shape = TypeShape::Pointer(Box::new(shape));
            }
        }

        Some(FieldDecl { names, shape })
    }

    fn process_method(&self, method_node: &TSNode, source: &[u8]) -> Option<MethodDecl> {
        let name = field_text(method_node, "name", source)?.to_string();
        let receiver_list = method_node.child_by_field_name("receiver")?;

        let mut cursor = receiver_list.walk();
        let receiver_decl = receiver_list
            .named_children(&mut cursor)
            .find(|child| child.kind() == "parameter_declaration")?;
        let receiver = receiver_base_name(&receiver_decl.child_by_field_name("type")?, source)?;

        let parameters = method_node
            .child_by_field_name("parameters")
            .map(|list| self.process_parameters(&list, source))
            .unwrap_or_default();

        Some(MethodDecl {
            receiver,
            name,
            parameters,
            line: method_node.start_position().row + 1,
        })
    }

    fn process_parameters(&self, list: &TSNode, source: &[u8]) -> Vec<Parameter> {
        let mut parameters = Vec::new();
        let mut cursor = list.walk();
        for decl in list.named_children(&mut cursor) {
            let Some(type_node) = decl.child_by_field_name("type") else {
                continue;
            };
            let mut type_name = extract_text(&type_node, source).to_string();
            match decl.kind() {
                "parameter_declaration" => {}
                "variadic_parameter_declaration" => type_name = format!("...{type_name}"),
                _ => continue,
            }

            let mut name_cursor = decl.walk();
            let names: Vec<String> = decl
                .children_by_field_name("name", &mut name_cursor)
                .map(|ident| extract_text(&ident, source).to_string())
                .collect();

            if names.is_empty() {
                parameters.push(Parameter {
                    name: String::new(),
                    type_name,
                });
            } else {
                // `a, b int` declares two parameters sharing one type
                parameters.extend(names.into_iter().map(|name| Parameter {
                    name,
                    type_name: type_name.clone(),
                }));
            }
        }
        parameters
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

fn receiver_base_name(type_node: &TSNode, source: &[u8]) -> Option<String> {
    match type_node.kind() {
        "type_identifier" => Some(extract_text(type_node, source).to_string()),
        "pointer_type" | "parenthesized_type" => {
            receiver_base_name(&type_node.named_child(0)?, source)
        }
        "generic_type" => receiver_base_name(&type_node.child_by_field_name("type")?, source),
        _ => None,
    }
}
