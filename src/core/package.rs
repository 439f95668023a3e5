use log::debug;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Component, Path, PathBuf};

use super::scanner::CandidateDir;
use crate::error::{AnalysisError, Result};
use crate::parsers::{GoParser, MethodDecl, SourceUnit, TypeKind};

/// Local alias → logical import path, scoped to one file
pub type ImportMap = BTreeMap<String, String>;

/// Where logical (import) paths are measured from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot {
    pub dir: PathBuf,
    /// Prepended to every root-relative path, e.g. a `go.mod` module path
    pub import_prefix: String,
}

impl SourceRoot {
    pub fn new(dir: impl Into<PathBuf>, import_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            import_prefix: import_prefix.into().trim_matches('/').to_string(),
        }
    }

    /// Nearest `go.mod` at or above `root` (module mode), else the nearest
    /// `src` ancestor (GOPATH layout), else `root` itself.
    pub fn detect(root: &Path) -> Self {
        for dir in root.ancestors() {
            let go_mod = dir.join("go.mod");
            if go_mod.is_file() {
                if let Some(module) = fs::read_to_string(&go_mod)
                    .ok()
                    .and_then(|content| module_path(&content))
                {
                    debug!("module {} rooted at {}", module, dir.display());
                    return Self::new(dir, module);
                }
            }
        }

        if let Some(src) = root
            .ancestors()
            .find(|dir| dir.file_name().map(|name| name == "src").unwrap_or(false))
        {
            return Self::new(src, "");
        }

        Self::new(root, "")
    }

    /// Root-relative path with `/` separators and the import prefix applied.
    /// The source root itself maps to the prefix, or `.` without one.
    pub fn logical_path(&self, dir: &Path) -> String {
        let relative = dir.strip_prefix(&self.dir).unwrap_or(dir);
        let joined = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");

        match (self.import_prefix.is_empty(), joined.is_empty()) {
            (true, true) => ".".to_string(),
            (true, false) => joined,
            (false, true) => self.import_prefix.clone(),
            (false, false) => format!("{}/{}", self.import_prefix, joined),
        }
    }
}

fn module_path(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let module = rest.trim().trim_matches('"');
        (!module.is_empty()).then(|| module.to_string())
    })
}

/// A parsed file and, once its package is processed, its resolved imports.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub unit: SourceUnit,
    pub imports: ImportMap,
}

impl SourceFile {
    pub fn name(&self) -> &str {
        &self.unit.file_name
    }
}

/// Direct embed, not yet resolved: `alias` is empty for same-package types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EmbeddingEdge {
    pub alias: String,
    pub name: String,
}

impl EmbeddingEdge {
    pub fn is_local(&self) -> bool {
        self.alias.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeRecord {
    pub name: String,
    pub package: String,
    pub import_path: String,
    pub file: String,
    #[serde(skip)]
    pub file_index: usize,
    pub kind: TypeKind,
    pub embedded: Vec<EmbeddingEdge>,
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone)]
pub struct PackageModel {
    pub name: String,
    pub path: PathBuf,
    pub logical_path: String,
    pub files: Vec<SourceFile>,
    types: Vec<TypeRecord>,
    type_index: HashMap<String, usize>,
    processed: bool,
}

impl PackageModel {
    /// Parses every candidate file of one directory. `Ok(None)` when nothing
    /// was parsed; files declaring different package names fail the directory.
    pub fn from_directory(
        dir: &CandidateDir,
        source_root: &SourceRoot,
        parser: &GoParser,
    ) -> Result<Option<Self>> {
        let units: Vec<SourceUnit> = dir
            .files
            .par_iter()
            .map(|file| parser.parse_file(file))
            .collect::<Result<Vec<_>>>()?;

        Self::from_units(&dir.path, units, source_root)
    }

    pub fn from_units(
        path: &Path,
        units: Vec<SourceUnit>,
        source_root: &SourceRoot,
    ) -> Result<Option<Self>> {
        let names: BTreeSet<&str> = units.iter().map(|u| u.package_name.as_str()).collect();
        let name = match names.len() {
            0 => return Ok(None),
            1 => names.iter().next().map(|n| n.to_string()).unwrap_or_default(),
            _ => {
                return Err(AnalysisError::MultiplePackageDeclared {
                    names: names.iter().map(|n| n.to_string()).collect(),
                    path: path.to_path_buf(),
                })
            }
        };

        Ok(Some(Self {
            name,
            path: path.to_path_buf(),
            logical_path: source_root.logical_path(path),
            files: units
                .into_iter()
                .map(|unit| SourceFile {
                    unit,
                    imports: ImportMap::new(),
                })
                .collect(),
            types: Vec::new(),
            type_index: HashMap::new(),
            processed: false,
        }))
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(SourceFile::name)
    }

    pub fn is_processed(&self) -> bool {
        self.processed
    }

    /// Type records in declaration order
    pub fn types(&self) -> &[TypeRecord] {
        &self.types
    }

    /// Case-insensitive lookup
    pub fn type_record(&self, name: &str) -> Option<&TypeRecord> {
        self.type_position(name).map(|index| &self.types[index])
    }

    pub(crate) fn type_position(&self, name: &str) -> Option<usize> {
        self.type_index.get(&name.to_lowercase()).copied()
    }

    /// Imports of the file that declared `record`
    pub fn imports_for(&self, record: &TypeRecord) -> Option<&ImportMap> {
        self.files.get(record.file_index).map(|file| &file.imports)
    }

    pub(crate) fn reset_types(&mut self) {
        self.types.clear();
        self.type_index.clear();
        self.processed = false;
    }

    pub(crate) fn mark_processed(&mut self) {
        self.processed = true;
    }

    /// Later declarations of the same lowercase name replace earlier ones.
    pub(crate) fn insert_type(&mut self, record: TypeRecord) {
        let key = record.name.to_lowercase();
        match self.type_index.get(&key) {
            Some(&index) => {
                debug!(
                    "type {} in {} shadows {}",
                    record.name, self.logical_path, self.types[index].name
                );
                self.types[index] = record;
            }
            None => {
                self.type_index.insert(key, self.types.len());
                self.types.push(record);
            }
        }
    }

    pub(crate) fn type_record_mut(&mut self, name: &str) -> Option<&mut TypeRecord> {
        let index = self.type_position(name)?;
        self.types.get_mut(index)
    }
}
