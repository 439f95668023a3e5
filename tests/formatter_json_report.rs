use embedscan::core::{EmbeddingQuery, ImportResolver, Program, ProgramOptions, SourceRoot};
use embedscan::formatters::{AnalysisReport, JsonReportFormatter};
use serde_json::Value;
use std::fs;
use std::path::Path;

fn write_go(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn fixture(root: &Path) -> Program {
    write_go(
        root,
        "controllers/user.go",
        r#"package controllers

import web "github.com/acme/shop/marker"

type UserController struct {
    *web.Marker
}

func (c *UserController) Show(id int64, fields ...string) {}
"#,
    );
    write_go(
        root,
        "admin/controllers/panel.go",
        r#"package controllers

import "github.com/acme/shop/marker"

type Panel struct {
    marker.Marker
}
"#,
    );
    write_go(root, "marker/marker.go", "package marker\n\ntype Marker struct{}\n");

    let options = ProgramOptions::default()
        .with_source_root(SourceRoot::new(root, "github.com/acme/shop"));
    let (mut program, errors) = Program::load(root, &options).unwrap();
    assert!(errors.is_empty());
    // Every import is explicit or local, so no toolchain lookup happens
    let errors = program.process_all(&ImportResolver::default());
    assert!(errors.is_empty());
    program
}

#[test]
fn json_report_lists_matches_with_methods_and_unique_aliases() {
    let dir = tempfile::TempDir::new().unwrap();
    let program = fixture(dir.path());

    let marker = "github.com/acme/shop/marker.Marker".parse().unwrap();
    let matches = EmbeddingQuery::new(&program).find_types_embedding(&marker);
    let report = AnalysisReport::new(&program).with_matches(marker, matches);

    let s = JsonReportFormatter::new().format_report(&report).unwrap();
    let v: Value = serde_json::from_str(&s).unwrap();

    assert_eq!(v["meta"]["packages"], 3);
    assert_eq!(v["meta"]["matches"], 2);
    assert_eq!(v["meta"]["marker"], "github.com/acme/shop/marker.Marker");

    let matches = v["matches"].as_array().unwrap();
    assert_eq!(matches[0]["import_path"], "github.com/acme/shop/admin/controllers");
    assert_eq!(matches[0]["name"], "Panel");
    assert_eq!(matches[1]["name"], "UserController");

    let methods = matches[1]["methods"].as_array().unwrap();
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0]["name"], "Show");
    assert_eq!(methods[0]["parameters"][1]["type"], "...string");
    assert!(methods[0].get("receiver").is_none());

    assert_eq!(v["imports"]["github.com/acme/shop/admin/controllers"], "controllers");
    assert_eq!(v["imports"]["github.com/acme/shop/controllers"], "controllers1");
}

#[test]
fn json_report_can_omit_packages_and_write_compact() {
    let dir = tempfile::TempDir::new().unwrap();
    let program = fixture(dir.path());
    let report = AnalysisReport::new(&program);

    let out = dir.path().join("report.json");
    JsonReportFormatter::new()
        .with_pretty(false)
        .with_packages(false)
        .format_to_file(&report, &out)
        .unwrap();

    let s = fs::read_to_string(&out).unwrap();
    assert_eq!(s.lines().count(), 1);
    let v: Value = serde_json::from_str(&s).unwrap();
    assert!(v.get("packages").is_none());
    assert!(v["meta"]["marker"].is_null());
    assert!(v["matches"].as_array().unwrap().is_empty());
}

#[test]
fn json_report_package_map_carries_types_and_embeds() {
    let dir = tempfile::TempDir::new().unwrap();
    let program = fixture(dir.path());
    let v = JsonReportFormatter::new().to_value(&AnalysisReport::new(&program));

    let packages = v["packages"].as_array().unwrap();
    let user = packages
        .iter()
        .find(|p| p["import_path"] == "github.com/acme/shop/controllers")
        .unwrap();
    assert_eq!(user["files"][0], "user.go");
    assert_eq!(user["types"][0]["kind"], "struct");
    assert_eq!(user["types"][0]["embedded"][0]["alias"], "web");
    assert_eq!(user["types"][0]["embedded"][0]["name"], "Marker");
}
