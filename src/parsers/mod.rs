pub mod common;
pub mod go;
pub mod shape;

pub use go::{
    FieldDecl, GoParser, ImportDecl, MethodDecl, Parameter, SourceUnit, TypeDecl, TypeKind,
};
pub use shape::TypeShape;
