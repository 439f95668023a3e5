use log::debug;

use super::package::{EmbeddingEdge, PackageModel, TypeRecord};
use crate::parsers::{TypeDecl, TypeKind};

/// Owner of a type declaration: package identity plus the declaring file.
#[derive(Debug, Clone, Copy)]
pub struct TypeContext<'a> {
    pub package: &'a str,
    pub import_path: &'a str,
    pub file: &'a str,
    pub file_index: usize,
}

/// Builds the record of one declaration. Only structs carry edges, and only
/// through anonymous fields whose type is a (possibly pointer-wrapped) plain
/// or package-qualified identifier.
pub fn extract_type(decl: &TypeDecl, context: TypeContext<'_>) -> TypeRecord {
    let embedded = match decl.kind {
        TypeKind::Struct => decl
            .fields
            .iter()
            .filter(|field| field.is_embedded())
            .filter_map(|field| field.shape.embedded_target())
            .map(|(alias, name)| EmbeddingEdge {
                alias: alias.to_string(),
                name: name.to_string(),
            })
            .collect(),
        TypeKind::Interface | TypeKind::Alias | TypeKind::Other => Vec::new(),
    };

    TypeRecord {
        name: decl.name.clone(),
        package: context.package.to_string(),
        import_path: context.import_path.to_string(),
        file: context.file.to_string(),
        file_index: context.file_index,
        kind: decl.kind,
        embedded,
        methods: Vec::new(),
    }
}

/// Registers every declared type of `package`, then attaches methods to
/// their receiver types. Methods whose receiver is not declared in the
/// package are dropped.
pub fn extract_package_types(package: &mut PackageModel) {
    package.reset_types();

    let mut records = Vec::new();
    for (file_index, file) in package.files.iter().enumerate() {
        let context = TypeContext {
            package: &package.name,
            import_path: &package.logical_path,
            file: file.name(),
            file_index,
        };
        records.extend(file.unit.types.iter().map(|decl| extract_type(decl, context)));
    }
    for record in records {
        package.insert_type(record);
    }

    let methods: Vec<_> = package
        .files
        .iter()
        .flat_map(|file| file.unit.methods.iter().cloned())
        .collect();
    for method in methods {
        match package.type_record_mut(&method.receiver) {
            Some(record) => record.methods.push(method),
            None => debug!(
                "method {}.{} has no receiver type in {}",
                method.receiver, method.name, package.logical_path
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{FieldDecl, TypeShape};

    fn context() -> TypeContext<'static> {
        TypeContext {
            package: "controllers",
            import_path: "app/controllers",
            file: "user.go",
            file_index: 0,
        }
    }

    fn field(names: &[&str], shape: TypeShape) -> FieldDecl {
        FieldDecl {
            names: names.iter().map(|n| n.to_string()).collect(),
            shape,
        }
    }

    #[test]
    fn named_fields_are_not_edges() {
        let decl = TypeDecl {
            name: "Plain".to_string(),
            kind: TypeKind::Struct,
            fields: vec![
                field(&["Name"], TypeShape::Identifier("string".to_string())),
                field(&["Base"], TypeShape::Identifier("Base".to_string())),
            ],
            line: 1,
        };
        assert!(extract_type(&decl, context()).embedded.is_empty());
    }

    #[test]
    fn embedded_fields_become_edges_and_other_shapes_are_ignored() {
        let decl = TypeDecl {
            name: "UserController".to_string(),
            kind: TypeKind::Struct,
            fields: vec![
                field(
                    &[],
                    TypeShape::Pointer(Box::new(TypeShape::Qualified {
                        alias: "aah".to_string(),
                        name: "Controller".to_string(),
                    })),
                ),
                field(&[], TypeShape::Identifier("Base".to_string())),
                field(&[], TypeShape::Other),
            ],
            line: 3,
        };

        let record = extract_type(&decl, context());
        assert_eq!(
            record.embedded,
            vec![
                EmbeddingEdge {
                    alias: "aah".to_string(),
                    name: "Controller".to_string()
                },
                EmbeddingEdge {
                    alias: String::new(),
                    name: "Base".to_string()
                },
            ]
        );
        assert_eq!(record.import_path, "app/controllers");
    }

    #[test]
    fn non_struct_kinds_have_no_edges() {
        let decl = TypeDecl {
            name: "Handler".to_string(),
            kind: TypeKind::Interface,
            fields: Vec::new(),
            line: 1,
        };
        let record = extract_type(&decl, context());
        assert_eq!(record.kind, TypeKind::Interface);
        assert!(record.embedded.is_empty());
    }
}
