//! Structural tests for layer boundary enforcement.
//!
//! These scan source files so a stray import fails the build's tests rather
//! than a code review.

use std::path::{Path, PathBuf};

/// Collect all `.rs` files under a directory recursively.
fn collect_rs_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(collect_rs_files(&path));
            } else if path.extension().and_then(|e| e.to_str()) == Some("rs") {
                files.push(path);
            }
        }
    }
    files
}

/// Track brace depth and return whether a line is inside a `#[cfg(test)]` block.
struct CfgTestTracker {
    in_test_block: bool,
    brace_depth: i32,
    test_block_start_depth: i32,
}

impl CfgTestTracker {
    fn new() -> Self {
        Self {
            in_test_block: false,
            brace_depth: 0,
            test_block_start_depth: 0,
        }
    }

    fn process_line(&mut self, line: &str) -> bool {
        if line.trim().starts_with("#[cfg(") && line.contains("test") {
            self.in_test_block = true;
            self.test_block_start_depth = self.brace_depth;
        }
        for ch in line.chars() {
            match ch {
                '{' => self.brace_depth += 1,
                '}' => {
                    self.brace_depth -= 1;
                    if self.in_test_block && self.brace_depth <= self.test_block_start_depth {
                        self.in_test_block = false;
                    }
                }
                _ => {}
            }
        }
        self.in_test_block
    }
}

/// Non-comment lines outside `#[cfg(test)]` blocks, with 1-based line numbers.
fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    let mut tracker = CfgTestTracker::new();
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let in_test = tracker.process_line(line);
            let trimmed = line.trim();
            !in_test && !trimmed.starts_with("//")
        })
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect()
}

fn src(layer: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("src").join(layer)
}

/// Every production line under `layer` containing one of `forbidden`.
fn violations(layer: &str, forbidden: &[&str], skip_files: &[&str]) -> Vec<String> {
    let mut found = Vec::new();
    for file in collect_rs_files(&src(layer)) {
        let name = file.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if skip_files.contains(&name) {
            continue;
        }
        let rel = file
            .strip_prefix(env!("CARGO_MANIFEST_DIR"))
            .unwrap_or(&file)
            .display()
            .to_string();
        for (lineno, line) in production_lines(&file) {
            for needle in forbidden {
                if line.contains(needle) {
                    found.push(format!("{rel}:{lineno}: `{needle}`: {}", line.trim()));
                }
            }
        }
    }
    found
}

#[test]
fn domain_performs_no_io() {
    let found = violations(
        "domain",
        &[
            "tokio",
            "std::fs",
            "std::process",
            "std::net",
            "crate::application",
            "crate::infra",
            "crate::output",
            "crate::commands",
        ],
        &[],
    );
    assert!(found.is_empty(), "domain/ must stay pure:\n{}", found.join("\n"));
}

#[test]
fn application_depends_only_on_domain() {
    let found = violations(
        "application",
        &["crate::infra", "crate::output", "crate::commands", "crate::app::"],
        &["test_support.rs"],
    );
    assert!(
        found.is_empty(),
        "application/ must not reach outer layers:\n{}",
        found.join("\n")
    );
}

#[test]
fn application_never_sleeps_directly() {
    let found = violations(
        "application",
        &["tokio::time::sleep", "std::thread::sleep"],
        &["test_support.rs"],
    );
    assert!(
        found.is_empty(),
        "waiting between attempts must go through the Sleeper port:\n{}",
        found.join("\n")
    );
}

#[test]
fn infra_does_not_reach_presentation() {
    let found = violations("infra", &["crate::output", "crate::commands"], &[]);
    assert!(found.is_empty(), "infra/ must not print:\n{}", found.join("\n"));
}

#[test]
fn process_runners_are_built_in_infra_or_app_only() {
    let mut found = violations("commands", &["TokioCommandRunner::new"], &[]);
    found.extend(violations("application", &["TokioCommandRunner::new"], &[]));
    assert!(
        found.is_empty(),
        "TokioCommandRunner::new outside infra/ and app.rs:\n{}",
        found.join("\n")
    );
}
