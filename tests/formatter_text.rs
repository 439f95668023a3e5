use embedscan::core::{find_types_embedding, ImportResolver, Program, ProgramOptions, SourceRoot};
use embedscan::formatters::{AnalysisReport, TextFormatter};
use std::fs;

#[test]
fn text_report_shows_types_embeds_and_query() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("app")).unwrap();
    fs::create_dir_all(root.join("lib")).unwrap();
    fs::write(
        root.join("app/app.go"),
        "package app\n\ntype Base struct{}\n\ntype Home struct {\n\tBase\n}\n\nfunc (h Home) Index(page int) {}\n",
    )
    .unwrap();
    fs::write(root.join("lib/lib.go"), "package lib\n\ntype Util struct{}\n").unwrap();

    let options = ProgramOptions::default().with_source_root(SourceRoot::new(root, "shop"));
    let (mut program, _) = Program::load(root, &options).unwrap();
    program
        .process("app", &ImportResolver::default())
        .unwrap();

    let matches = find_types_embedding(&program, "shop/app.Base").unwrap();
    let report = AnalysisReport::new(&program)
        .with_matches("shop/app.Base".parse().unwrap(), matches);

    let s = TextFormatter::new().format_report(&report).unwrap();
    assert!(s.contains("PACKAGES: 2"));
    assert!(s.contains("package app [shop/app]"));
    assert!(s.contains("  type Base struct\n"));
    assert!(s.contains("  type Home struct embeds Base\n"));
    assert!(s.contains("    func Index(page int)"));
    assert!(s.contains("package lib [shop/lib]\n  files: lib.go\n  (not processed)"));
    assert!(s.contains("EMBEDDING shop/app.Base: 1\n  shop/app.Home"));

    let quiet = TextFormatter::new().with_methods(false).format_report(&report).unwrap();
    assert!(!quiet.contains("func Index"));
}
