use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use super::AnalysisReport;
use crate::core::{PackageModel, TypeRecord};

/// JSON document consumed by code generation: the package map plus the
/// matches of the marker query with their methods.
pub struct JsonReportFormatter {
    /// Pretty-print instead of a single line
    pretty: bool,
    /// Include the full package → type map, not just matches
    include_packages: bool,
}

impl JsonReportFormatter {
    pub fn new() -> Self {
        Self {
            pretty: true,
            include_packages: true,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_packages(mut self, include: bool) -> Self {
        self.include_packages = include;
        self
    }

    pub fn format_to_file(&self, report: &AnalysisReport<'_>, output_path: &Path) -> Result<()> {
        let json_content = self.format_report(report)?;
        fs::write(output_path, json_content)?;
        Ok(())
    }

    pub fn format_report(&self, report: &AnalysisReport<'_>) -> Result<String> {
        let value = self.to_value(report);
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(rendered)
    }

    pub fn to_value(&self, report: &AnalysisReport<'_>) -> Value {
        let program = report.program;
        let type_count: usize = program.packages().iter().map(|p| p.types().len()).sum();

        let mut output = json!({
            "meta": {
                "root": program.path.to_string_lossy(),
                "packages": program.packages().len(),
                "types": type_count,
                "marker": report.marker.as_ref().map(|m| m.to_string()),
                "matches": report.matches.len(),
            },
            "imports": report.import_aliases(),
            "matches": report.matches.iter().map(|record| self.match_value(record)).collect::<Vec<_>>(),
        });

        if self.include_packages {
            output["packages"] = program
                .packages()
                .iter()
                .map(|package| self.package_value(package))
                .collect::<Vec<_>>()
                .into();
        }

        output
    }

    fn match_value(&self, record: &TypeRecord) -> Value {
        json!({
            "import_path": record.import_path,
            "package": record.package,
            "name": record.name,
            "methods": record.methods,
        })
    }

    fn package_value(&self, package: &PackageModel) -> Value {
        json!({
            "name": package.name,
            "import_path": package.logical_path,
            "path": package.path.to_string_lossy(),
            "files": package.file_names().collect::<Vec<_>>(),
            "types": package.types(),
        })
    }
}

impl Default for JsonReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}
