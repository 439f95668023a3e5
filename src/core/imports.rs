//! Per-file import alias resolution.
//!
//! An import without an explicit name is known under the package's declared
//! name, which is only discoverable by asking the Go toolchain. Answers are
//! cached per [`ImportResolver`], so one run asks at most once per path.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::package::ImportMap;
use crate::error::{AnalysisError, Result};
use crate::parsers::ImportDecl;

const BLANK_IMPORT: &str = "_";

/// Source of an import path's default package name.
pub trait PackageNameLookup: Send + Sync {
    fn package_name(&self, import_path: &str, from_dir: &Path) -> Result<String>;
}

/// Asks `go list -f {{.Name}}` from the importing package's directory.
#[derive(Debug, Clone)]
pub struct GoListLookup {
    go_command: PathBuf,
}

impl GoListLookup {
    pub fn new(go_command: impl Into<PathBuf>) -> Self {
        Self {
            go_command: go_command.into(),
        }
    }
}

impl Default for GoListLookup {
    fn default() -> Self {
        Self::new("go")
    }
}

impl PackageNameLookup for GoListLookup {
    fn package_name(&self, import_path: &str, from_dir: &Path) -> Result<String> {
        let failed = |reason: String| AnalysisError::ImportResolutionFailed {
            import_path: import_path.to_string(),
            from: from_dir.to_path_buf(),
            reason,
        };

        debug!(
            "executing {} list -f {{{{.Name}}}} {}",
            self.go_command.display(),
            import_path
        );
        let output = Command::new(&self.go_command)
            .args(["list", "-f", "{{.Name}}", import_path])
            .current_dir(from_dir)
            .output()
            .map_err(|err| failed(err.to_string()))?;

        if !output.status.success() {
            return Err(failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if name.is_empty() {
            return Err(failed("toolchain reported no package name".to_string()));
        }
        Ok(name)
    }
}

/// Import resolver owning the import-path → package-name cache for one run.
pub struct ImportResolver {
    cache: DashMap<String, String>,
    lookup: Box<dyn PackageNameLookup>,
    external_lookups: AtomicUsize,
}

impl ImportResolver {
    pub fn new(lookup: impl PackageNameLookup + 'static) -> Self {
        Self {
            cache: DashMap::new(),
            lookup: Box::new(lookup),
            external_lookups: AtomicUsize::new(0),
        }
    }

    pub fn with_go_command(go_command: impl Into<PathBuf>) -> Self {
        Self::new(GoListLookup::new(go_command))
    }

    /// Builds one file's alias map. Blank imports are skipped; explicit
    /// aliases are taken verbatim; everything else goes through
    /// [`default_name`](Self::default_name). Failed lookups are returned next
    /// to the map and the import is left out of it.
    pub fn resolve_imports(
        &self,
        imports: &[ImportDecl],
        from_dir: &Path,
        known_packages: &HashMap<String, String>,
    ) -> (ImportMap, Vec<AnalysisError>) {
        let mut resolved = ImportMap::new();
        let mut errors = Vec::new();

        for import in imports {
            let alias = match import.alias.as_deref() {
                Some(BLANK_IMPORT) => continue,
                Some(alias) => alias.to_string(),
                None => match self.default_name(&import.path, from_dir, known_packages) {
                    Ok(name) => name,
                    Err(err) => {
                        warn!("Unable to find import path: {}", import.path);
                        errors.push(err);
                        continue;
                    }
                },
            };
            resolved.insert(alias, import.path.clone());
        }

        (resolved, errors)
    }

    /// Cached default package name of `import_path`. Packages of the analyzed
    /// tree (`known_packages`, logical path → name) answer before the external
    /// lookup. Failures are not cached.
    pub fn default_name(
        &self,
        import_path: &str,
        from_dir: &Path,
        known_packages: &HashMap<String, String>,
    ) -> Result<String> {
        if let Some(name) = self.cache.get(import_path) {
            return Ok(name.value().clone());
        }

        // Holding the vacant entry keeps concurrent callers from looking the same path up twice
        match self.cache.entry(import_path.to_string()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let name = match known_packages.get(import_path) {
                    Some(name) => name.clone(),
                    None => {
                        self.external_lookups.fetch_add(1, Ordering::Relaxed);
                        self.lookup.package_name(import_path, from_dir)?
                    }
                };
                entry.insert(name.clone());
                Ok(name)
            }
        }
    }

    pub fn cached(&self, import_path: &str) -> Option<String> {
        self.cache.get(import_path).map(|name| name.value().clone())
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Number of times the external lookup was consulted
    pub fn external_lookups(&self) -> usize {
        self.external_lookups.load(Ordering::Relaxed)
    }
}

impl Default for ImportResolver {
    fn default() -> Self {
        Self::new(GoListLookup::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LastSegment;

    impl PackageNameLookup for LastSegment {
        fn package_name(&self, import_path: &str, _from_dir: &Path) -> Result<String> {
            Ok(import_path.rsplit('/').next().unwrap_or(import_path).to_string())
        }
    }

    fn import(alias: Option<&str>, path: &str) -> ImportDecl {
        ImportDecl {
            alias: alias.map(str::to_string),
            path: path.to_string(),
            line: 1,
        }
    }

    #[test]
    fn explicit_alias_wins_and_blank_is_dropped() {
        let resolver = ImportResolver::new(LastSegment);
        let (map, errors) = resolver.resolve_imports(
            &[
                import(Some("_"), "embed"),
                import(Some("web"), "aahframework.org/aah"),
                import(None, "net/http"),
            ],
            Path::new("/tmp"),
            &HashMap::new(),
        );

        assert!(errors.is_empty());
        assert_eq!(map.len(), 2);
        assert_eq!(map["web"], "aahframework.org/aah");
        assert_eq!(map["http"], "net/http");
        assert_eq!(resolver.external_lookups(), 1);
    }

    #[test]
    fn analyzed_packages_skip_the_external_lookup() {
        let resolver = ImportResolver::new(LastSegment);
        let known = HashMap::from([("app/models".to_string(), "model".to_string())]);
        let name = resolver
            .default_name("app/models", Path::new("/tmp"), &known)
            .unwrap();
        assert_eq!(name, "model");
        assert_eq!(resolver.external_lookups(), 0);
        assert_eq!(resolver.cached("app/models").as_deref(), Some("model"));
    }
}
