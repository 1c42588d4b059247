//! Hygiene: scans the board engine sources for patterns that crash the page
//! or hide failures.
//!
//! Every pattern has a budget. Budgets only ever go down; to add an occurrence
//! you first remove one elsewhere. Sibling `*_test.rs` files are exempt.

use std::fs;
use std::path::{Path, PathBuf};

/// (pattern, budget, why it matters)
const BUDGETS: &[(&str, usize, &str)] = &[
    // Panics abort the wasm instance and freeze the board.
    (".unwrap()", 0, "propagate or handle the error"),
    (".expect(", 0, "propagate or handle the error"),
    ("panic!(", 0, "return an error instead"),
    ("unreachable!(", 0, "make the state unrepresentable"),
    ("todo!(", 0, "finish the implementation"),
    ("unimplemented!(", 0, "finish the implementation"),
    // Silent loss.
    ("let _ =", 0, "inspect or log the result"),
    (".ok()", 0, "log the error before discarding it"),
    // Output goes through the `log` facade.
    ("println!(", 0, "use log::info!/log::debug!"),
    ("eprintln!(", 0, "use log::warn!/log::error!"),
    // Structure.
    ("#[allow(dead_code)]", 0, "delete the unused code"),
];

fn production_sources() -> Vec<(PathBuf, String)> {
    let mut out = Vec::new();
    walk(Path::new("src"), &mut out);
    out
}

fn walk(dir: &Path, out: &mut Vec<(PathBuf, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            walk(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs")
            && !path.to_string_lossy().ends_with("_test.rs")
        {
            if let Ok(content) = fs::read_to_string(&path) {
                out.push((path, content));
            }
        }
    }
}

fn hits(sources: &[(PathBuf, String)], pattern: &str) -> Vec<(String, usize)> {
    sources
        .iter()
        .filter_map(|(path, content)| {
            let count = content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (path.display().to_string(), count))
        })
        .collect()
}

#[test]
fn sources_are_found() {
    let sources = production_sources();
    assert!(
        sources.iter().any(|(p, _)| p.ends_with("lib.rs")),
        "run from the canvas crate root"
    );
}

#[test]
fn pattern_budgets_hold() {
    let sources = production_sources();
    let mut failures = Vec::new();

    for (pattern, budget, advice) in BUDGETS {
        let found = hits(&sources, pattern);
        let total: usize = found.iter().map(|(_, c)| c).sum();
        if total > *budget {
            let detail = found
                .iter()
                .map(|(path, count)| format!("    {path}: {count}"))
                .collect::<Vec<_>>()
                .join("\n");
            failures.push(format!("`{pattern}` found {total}, budget {budget} ({advice}):\n{detail}"));
        }
    }

    assert!(failures.is_empty(), "hygiene budgets exceeded:\n{}", failures.join("\n"));
}
