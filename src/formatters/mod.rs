pub mod json_report;
pub mod text;

pub use json_report::JsonReportFormatter;
pub use text::TextFormatter;

use std::collections::{BTreeMap, HashSet};

use crate::core::{MarkerType, Program, TypeRecord};

/// What a run produced: the processed program and, when a marker was asked
/// for, the types embedding it.
pub struct AnalysisReport<'p> {
    pub program: &'p Program,
    pub marker: Option<MarkerType>,
    pub matches: Vec<&'p TypeRecord>,
}

impl<'p> AnalysisReport<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            marker: None,
            matches: Vec::new(),
        }
    }

    pub fn with_matches(mut self, marker: MarkerType, matches: Vec<&'p TypeRecord>) -> Self {
        self.marker = Some(marker);
        self.matches = matches;
        self
    }

    /// Import path → unique identifier for every package holding a match,
    /// as a generated file would import them.
    pub fn import_aliases(&self) -> BTreeMap<String, String> {
        unique_aliases(
            self.matches
                .iter()
                .map(|record| (record.import_path.as_str(), record.package.as_str())),
        )
    }
}

/// First-come aliases; a taken name gets the lowest free numeric suffix.
fn unique_aliases<'a>(
    packages: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> BTreeMap<String, String> {
    let mut aliases = BTreeMap::new();
    let mut used = HashSet::new();

    for (import_path, package) in packages {
        if aliases.contains_key(import_path) {
            continue;
        }
        let base = sanitize_identifier(package);
        let mut alias = base.clone();
        let mut suffix = 1;
        while used.contains(&alias) {
            alias = format!("{base}{suffix}");
            suffix += 1;
        }
        used.insert(alias.clone());
        aliases.insert(import_path.to_string(), alias);
    }

    aliases
}

fn sanitize_identifier(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    match cleaned.chars().next() {
        Some(first) if !first.is_ascii_digit() => cleaned,
        _ => format!("pkg_{cleaned}"),
    }
}
