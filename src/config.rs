//! Project file configuration.
//!
//! ```toml
//! [build]
//! ast_excludes = ["*_test.go", "vendor"]
//!
//! [analysis]
//! marker = "aahframework.org/aah.Controller"
//! packages = ["controllers"]
//! go_command = "go"
//! import_prefix = "github.com/acme/shop"
//! ```
//!
//! Command line flags override anything set here.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const DEFAULT_EXCLUDES: &[&str] = &["*_test.go", ".*", "vendor", "testdata"];

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProjectConfig {
    pub build: BuildSection,
    pub analysis: AnalysisSection,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildSection {
    pub ast_excludes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AnalysisSection {
    pub marker: Option<String>,
    pub packages: Vec<String>,
    pub go_command: Option<String>,
    pub source_root: Option<PathBuf>,
    pub import_prefix: Option<String>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading project file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("project file error in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Configured excludes, or the defaults when the file names none.
    pub fn excludes(&self) -> Vec<String> {
        self.build.ast_excludes.clone().unwrap_or_else(|| {
            DEFAULT_EXCLUDES
                .iter()
                .map(|pattern| pattern.to_string())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_sections() {
        let config = ProjectConfig::parse(
            r#"
[build]
ast_excludes = ["*_test.go"]

[analysis]
marker = "aahframework.org/aah.Controller"
packages = ["controllers"]
"#,
        )
        .unwrap();

        assert_eq!(config.excludes(), vec!["*_test.go".to_string()]);
        assert_eq!(
            config.analysis.marker.as_deref(),
            Some("aahframework.org/aah.Controller")
        );
        assert_eq!(config.analysis.packages, vec!["controllers".to_string()]);
        assert!(config.analysis.go_command.is_none());
    }

    #[test]
    fn empty_file_uses_default_excludes() {
        let config = ProjectConfig::parse("").unwrap();
        assert_eq!(config.excludes().len(), DEFAULT_EXCLUDES.len());
    }

    #[test]
    fn explicit_empty_excludes_are_kept() {
        let config = ProjectConfig::parse("[build]\nast_excludes = []\n").unwrap();
        assert!(config.excludes().is_empty());
    }
}
