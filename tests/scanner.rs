use embedscan::core::{DirectoryScanner, Excludes};
use std::fs;
use std::path::Path;

fn touch<P: AsRef<Path>>(p: P) {
    let p = p.as_ref();
    if let Some(parent) = p.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(p, "package x\n").unwrap();
}

fn relative_dirs(root: &Path, excludes: &Excludes) -> Vec<String> {
    DirectoryScanner::new(excludes)
        .scan_directory(root)
        .dirs
        .iter()
        .map(|dir| {
            dir.path
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn scanner_yields_only_directories_with_go_files() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();

    touch(root.join("app/controllers/user.go"));
    touch(root.join("app/models/user.go"));
    touch(root.join("docs/readme.md"));
    fs::create_dir_all(root.join("empty")).unwrap();

    let dirs = relative_dirs(root, &Excludes::none());
    assert_eq!(dirs, vec!["app/controllers", "app/models"]);
}

#[test]
fn scanner_includes_root_with_sources_first() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();

    touch(root.join("main.go"));
    touch(root.join("b/b.go"));
    touch(root.join("a/a.go"));

    let dirs = relative_dirs(root, &Excludes::none());
    assert_eq!(dirs, vec!["", "a", "b"]);
}

#[test]
fn excluded_directory_prunes_whole_subtree() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();

    touch(root.join("app/app.go"));
    touch(root.join("vendor/lib/lib.go"));
    touch(root.join("vendor/lib/deep/deep.go"));
    touch(root.join(".git/hooks/hook.go"));

    let excludes = Excludes::new(&["vendor", ".*"]).unwrap();
    let dirs = relative_dirs(root, &excludes);
    assert_eq!(dirs, vec!["app"]);
}

#[test]
fn excluded_files_are_not_candidates() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();

    touch(root.join("pkg/pkg.go"));
    touch(root.join("pkg/pkg_test.go"));
    touch(root.join("only_tests/x_test.go"));

    let excludes = Excludes::new(&["*_test.go"]).unwrap();
    let outcome = DirectoryScanner::new(&excludes).scan_directory(root);

    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.dirs.len(), 1);
    let names: Vec<_> = outcome.dirs[0]
        .files
        .iter()
        .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["pkg.go"]);
}

#[test]
fn root_is_never_excluded() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path().join("vendor");
    touch(root.join("lib.go"));

    let excludes = Excludes::new(&["vendor"]).unwrap();
    let outcome = DirectoryScanner::new(&excludes).scan_directory(&root);
    assert_eq!(outcome.dirs.len(), 1);
}

#[test]
fn files_are_sorted_by_name() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    touch(root.join("c.go"));
    touch(root.join("a.go"));
    touch(root.join("b.go"));
    touch(root.join("notes.txt"));

    let outcome = DirectoryScanner::new(&Excludes::none()).scan_directory(root);
    let names: Vec<_> = outcome.dirs[0]
        .files
        .iter()
        .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.go", "b.go", "c.go"]);
}

#[cfg(unix)]
#[test]
fn symlinked_packages_and_files_are_followed() {
    use std::os::unix::fs::symlink;

    let outside = tempfile::TempDir::new().unwrap();
    touch(outside.path().join("ctl/controller.go"));
    touch(outside.path().join("shared.go"));

    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    touch(root.join("app/app.go"));
    symlink(outside.path().join("ctl"), root.join("ctl")).unwrap();
    symlink(outside.path().join("shared.go"), root.join("app/shared.go")).unwrap();

    let outcome = DirectoryScanner::new(&Excludes::none()).scan_directory(root);
    assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);

    let dirs = relative_dirs(root, &Excludes::none());
    assert_eq!(dirs, vec!["app", "ctl"]);

    let app_files: Vec<_> = outcome.dirs[0]
        .files
        .iter()
        .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(app_files, vec!["app.go", "shared.go"]);
}

#[cfg(unix)]
#[test]
fn traversal_errors_are_collected_and_siblings_still_yielded() {
    use embedscan::error::AnalysisError;
    use std::os::unix::fs::symlink;

    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    touch(root.join("models/user.go"));
    symlink(root.join("nowhere"), root.join("broken")).unwrap();
    touch(root.join("views/view.go"));

    let outcome = DirectoryScanner::new(&Excludes::none()).scan_directory(root);

    assert_eq!(outcome.errors.len(), 1, "{:?}", outcome.errors);
    match &outcome.errors[0] {
        AnalysisError::Traversal { path, .. } => assert_eq!(path, &root.join("broken")),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(relative_dirs(root, &Excludes::none()), vec!["models", "views"]);
}
