//! Hygiene: source-scan budgets for the site crate.
//!
//! Production `.rs` files under `src/` (test files excluded) are scanned for
//! patterns that crash the page or swallow errors. Every budget is zero; a new
//! hit means fixing the code, not raising the number.

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

/// (pattern, budget, why it is banned)
const BUDGETS: &[(&str, usize, &str)] = &[
    (".unwrap()", 0, "panics in the browser"),
    (".expect(", 0, "panics in the browser"),
    ("panic!(", 0, "panics in the browser"),
    ("unreachable!(", 0, "panics in the browser"),
    ("todo!(", 0, "unfinished stub"),
    ("unimplemented!(", 0, "unfinished stub"),
    ("let _ =", 0, "discards a result without looking at it"),
    (".ok()", 0, "discards an error without looking at it"),
    ("#[allow(dead_code)]", 0, "hides unused code"),
];

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

#[test]
fn source_tree_is_found() {
    assert!(!source_files().is_empty(), "run from the site crate root");
}

#[test]
fn budgets_hold() {
    let files = source_files();
    let mut failures = Vec::new();
    for (pattern, budget, why) in BUDGETS {
        let found = hits(&files, pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > *budget {
            let detail: Vec<String> = found.iter().map(|(path, c)| format!("  {path}: {c}")).collect();
            failures.push(format!("{pattern} ({why}): found {count}, max {budget}\n{}", detail.join("\n")));
        }
    }
    assert!(failures.is_empty(), "hygiene budgets exceeded:\n{}", failures.join("\n"));
}
