use anyhow::Result;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use super::AnalysisReport;
use crate::core::{EmbeddingEdge, TypeRecord};
use crate::parsers::MethodDecl;

/// Human-readable dump of the package → type → embedding map.
pub struct TextFormatter {
    show_methods: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self { show_methods: true }
    }

    pub fn with_methods(mut self, show: bool) -> Self {
        self.show_methods = show;
        self
    }

    pub fn format_to_file(&self, report: &AnalysisReport<'_>, output_path: &Path) -> Result<()> {
        fs::write(output_path, self.format_report(report)?)?;
        Ok(())
    }

    pub fn format_report(&self, report: &AnalysisReport<'_>) -> Result<String> {
        let mut output = String::new();
        let program = report.program;

        writeln!(output, "ROOT: {}", program.path.display())?;
        writeln!(output, "PACKAGES: {}", program.packages().len())?;

        for package in program.packages() {
            writeln!(output)?;
            writeln!(output, "package {} [{}]", package.name, package.logical_path)?;
            writeln!(
                output,
                "  files: {}",
                package.file_names().collect::<Vec<_>>().join(", ")
            )?;
            if !package.is_processed() {
                writeln!(output, "  (not processed)")?;
                continue;
            }
            for record in package.types() {
                self.format_type(&mut output, record)?;
            }
        }

        if let Some(marker) = &report.marker {
            writeln!(output)?;
            writeln!(output, "EMBEDDING {}: {}", marker, report.matches.len())?;
            for record in &report.matches {
                writeln!(output, "  {}.{}", record.import_path, record.name)?;
            }
        }

        Ok(output)
    }

    fn format_type(&self, output: &mut String, record: &TypeRecord) -> Result<()> {
        write!(output, "  type {} {}", record.name, record.kind.as_str())?;
        if !record.embedded.is_empty() {
            let embeds: Vec<String> = record.embedded.iter().map(edge_label).collect();
            write!(output, " embeds {}", embeds.join(", "))?;
        }
        writeln!(output)?;

        if self.show_methods {
            for method in &record.methods {
                writeln!(output, "    func {}", method_signature(method))?;
            }
        }
        Ok(())
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn edge_label(edge: &EmbeddingEdge) -> String {
    if edge.is_local() {
        edge.name.clone()
    } else {
        format!("{}.{}", edge.alias, edge.name)
    }
}

fn method_signature(method: &MethodDecl) -> String {
    let params: Vec<String> = method
        .parameters
        .iter()
        .map(|param| {
            if param.name.is_empty() {
                param.type_name.clone()
            } else {
                format!("{} {}", param.name, param.type_name)
            }
        })
        .collect();
    format!("{}({})", method.name, params.join(", "))
}
