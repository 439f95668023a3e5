use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::excludes::Excludes;
use super::extractor::extract_package_types;
use super::imports::ImportResolver;
use super::package::{PackageModel, SourceRoot};
use super::scanner::DirectoryScanner;
use crate::error::{AnalysisError, Result};
use crate::parsers::GoParser;

#[derive(Debug, Clone, Default)]
pub struct ProgramOptions {
    pub excludes: Excludes,
    /// Detected from the root when unset, see [`SourceRoot::detect`]
    pub source_root: Option<SourceRoot>,
}

impl ProgramOptions {
    pub fn with_excludes(mut self, excludes: Excludes) -> Self {
        self.excludes = excludes;
        self
    }

    pub fn with_source_root(mut self, source_root: SourceRoot) -> Self {
        self.source_root = Some(source_root);
        self
    }
}

/// All packages found under one root, in discovery order.
#[derive(Debug, Clone)]
pub struct Program {
    pub path: PathBuf,
    source_root: SourceRoot,
    packages: Vec<PackageModel>,
}

impl Program {
    /// Walks `root` and builds one package per directory with source files.
    ///
    /// Only an unusable root is an `Err`; every per-directory problem is
    /// collected in the returned list next to the partial program.
    pub fn load(root: &Path, options: &ProgramOptions) -> Result<(Program, Vec<AnalysisError>)> {
        let root = validate_root(root)?;
        let source_root = match &options.source_root {
            Some(given) => SourceRoot::new(
                given.dir.canonicalize().unwrap_or_else(|_| given.dir.clone()),
                given.import_prefix.clone(),
            ),
            None => SourceRoot::detect(&root),
        };
        debug!(
            "source root {} (prefix '{}')",
            source_root.dir.display(),
            source_root.import_prefix
        );

        let scan = DirectoryScanner::new(&options.excludes).scan_directory(&root);
        let mut errors = scan.errors;
        info!("Found {} directories with Go sources", scan.dirs.len());

        let parser = GoParser::new();
        let mut program = Program {
            path: root,
            source_root,
            packages: Vec::with_capacity(scan.dirs.len()),
        };
        let mut seen: HashMap<String, PathBuf> = HashMap::new();

        for dir in &scan.dirs {
            let package = match PackageModel::from_directory(dir, &program.source_root, &parser) {
                Ok(Some(package)) => package,
                Ok(None) => continue,
                Err(err) => {
                    warn!("skipping {}: {}", dir.path.display(), err);
                    errors.push(err);
                    continue;
                }
            };

            if let Some(existing) = seen.get(&package.logical_path) {
                errors.push(AnalysisError::DuplicateLogicalPath {
                    logical_path: package.logical_path.clone(),
                    path: package.path.clone(),
                    existing: existing.clone(),
                });
                continue;
            }

            debug!(
                "package {} ({}) with {} files",
                package.name,
                package.logical_path,
                package.files.len()
            );
            seen.insert(package.logical_path.clone(), package.path.clone());
            program.packages.push(package);
        }

        Ok((program, errors))
    }

    pub fn source_root(&self) -> &SourceRoot {
        &self.source_root
    }

    pub fn packages(&self) -> &[PackageModel] {
        &self.packages
    }

    /// First package declaring `name`
    pub fn find_package(&self, name: &str) -> Option<&PackageModel> {
        self.packages.iter().find(|package| package.name == name)
    }

    pub fn find_package_by_path(&self, logical_path: &str) -> Option<&PackageModel> {
        self.position_by_path(logical_path)
            .map(|index| &self.packages[index])
    }

    fn position_by_path(&self, logical_path: &str) -> Option<usize> {
        self.packages
            .iter()
            .position(|package| package.logical_path == logical_path)
    }

    /// Resolves imports and extracts types for every package whose declared
    /// name or logical path equals `selector`, then for every unprocessed
    /// package of the tree those packages import, transitively, so embedding
    /// chains through them stay intact. Returns the import lookups that
    /// failed; those only leave edges unresolved.
    pub fn process(
        &mut self,
        selector: &str,
        resolver: &ImportResolver,
    ) -> Result<Vec<AnalysisError>> {
        let mut pending: Vec<usize> = self
            .packages
            .iter()
            .enumerate()
            .filter(|(_, package)| package.name == selector || package.logical_path == selector)
            .map(|(index, _)| index)
            .collect();
        if pending.is_empty() {
            return Err(AnalysisError::PackageNotFound {
                name: selector.to_string(),
            });
        }
        pending.reverse();

        let known = self.known_packages();
        let mut queued: HashSet<usize> = pending.iter().copied().collect();
        let mut errors = Vec::new();

        while let Some(index) = pending.pop() {
            let package = &mut self.packages[index];
            errors.extend(process_package(package, resolver, &known));
            let imported: BTreeSet<String> = package
                .files
                .iter()
                .flat_map(|file| file.imports.values().cloned())
                .collect();

            for import_path in imported {
                let Some(dependency) = self.position_by_path(&import_path) else {
                    continue;
                };
                if self.packages[dependency].is_processed() || !queued.insert(dependency) {
                    continue;
                }
                debug!(
                    "processing {} imported by {}",
                    import_path, self.packages[index].logical_path
                );
                pending.push(dependency);
            }
        }

        Ok(errors)
    }

    /// [`process`](Self::process) for every package, in parallel. Package
    /// order is unchanged.
    pub fn process_all(&mut self, resolver: &ImportResolver) -> Vec<AnalysisError> {
        let known = self.known_packages();
        self.packages
            .par_iter_mut()
            .map(|package| process_package(package, resolver, &known))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    /// Logical path → declared name for every loaded package
    fn known_packages(&self) -> HashMap<String, String> {
        self.packages
            .iter()
            .map(|package| (package.logical_path.clone(), package.name.clone()))
            .collect()
    }
}

fn process_package(
    package: &mut PackageModel,
    resolver: &ImportResolver,
    known: &HashMap<String, String>,
) -> Vec<AnalysisError> {
    let mut errors = Vec::new();
    for file in package.files.iter_mut() {
        let (imports, failed) = resolver.resolve_imports(&file.unit.imports, &package.path, known);
        file.imports = imports;
        errors.extend(failed);
    }

    extract_package_types(package);
    package.mark_processed();
    debug!(
        "processed {}: {} types",
        package.logical_path,
        package.types().len()
    );
    errors
}

fn validate_root(root: &Path) -> Result<PathBuf> {
    let invalid = |reason: &str| AnalysisError::InvalidRoot {
        path: root.to_path_buf(),
        reason: reason.to_string(),
    };

    if root.as_os_str().is_empty() {
        return Err(invalid("path is required input"));
    }
    if !root.exists() {
        return Err(invalid("path does not exist"));
    }
    if !root.is_dir() {
        return Err(invalid("path is not a directory"));
    }
    root.canonicalize()
        .map_err(|err| invalid(&err.to_string()))
}
