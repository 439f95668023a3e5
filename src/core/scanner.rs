use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::excludes::Excludes;
use crate::error::AnalysisError;

const SOURCE_EXTENSION: &str = "go";

/// A directory holding at least one eligible source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDir {
    pub path: PathBuf,
    /// Eligible files, sorted by name
    pub files: Vec<PathBuf>,
}

/// Everything the walk found, errors included; the walk itself never fails.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub dirs: Vec<CandidateDir>,
    pub errors: Vec<AnalysisError>,
}

pub struct DirectoryScanner<'a> {
    excludes: &'a Excludes,
}

impl<'a> DirectoryScanner<'a> {
    pub fn new(excludes: &'a Excludes) -> Self {
        Self { excludes }
    }

    /// Depth-first walk from `root`. Excluded entries are skipped (directories
    /// with their whole subtree), directories that are empty after exclusion
    /// are pruned, and only directories with eligible files are yielded.
    /// Symlinks are followed; broken links and link loops are reported as
    /// traversal errors.
    pub fn scan_directory(&self, root_path: &Path) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        let excludes = self.excludes;

        let walker = WalkDir::new(root_path)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !excludes.matches_path(entry.path()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    outcome.errors.push(AnalysisError::from(err));
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            match self.eligible_files(entry.path()) {
                Ok(files) if files.is_empty() => {
                    debug!("no source files in {}", entry.path().display());
                }
                Ok(files) => outcome.dirs.push(CandidateDir {
                    path: entry.path().to_path_buf(),
                    files,
                }),
                Err(err) => outcome.errors.push(err),
            }
        }

        outcome
    }

    /// Non-excluded `.go` files directly inside `dir`, symlinks resolved.
    /// Dangling links are skipped here; the walk reports them.
    fn eligible_files(&self, dir: &Path) -> Result<Vec<PathBuf>, AnalysisError> {
        let read_dir = fs::read_dir(dir).map_err(|err| AnalysisError::traversal(dir, err))?;

        let mut files = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|err| AnalysisError::traversal(dir, err))?;
            let path = entry.path();
            let is_file = fs::metadata(&path)
                .map(|metadata| metadata.is_file())
                .unwrap_or(false);
            if !is_file || self.excludes.matches_path(&path) {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) == Some(SOURCE_EXTENSION) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }
}
