//! Discovery of template and source files.
//!
//! A walk error fails the whole scan; callers never see a partial file list.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use colored::Colorize;
use glob::{Pattern, glob};
use walkdir::WalkDir;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal directory paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// What to scan and what to leave out.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions<'a> {
    /// Directories (relative to the base) or glob patterns matching directories.
    /// Empty means the whole base directory.
    pub includes: &'a [String],
    pub ignores: &'a [String],
    /// File extensions to keep, without the dot.
    pub extensions: &'a [String],
    pub verbose: bool,
}

/// Ignore rules compiled once per scan.
struct IgnoreRules {
    prefixes: Vec<PathBuf>,
    patterns: Vec<Pattern>,
}

impl IgnoreRules {
    fn new(base_dir: &Path, ignores: &[String]) -> Result<Self> {
        let mut rules = Self {
            prefixes: Vec::new(),
            patterns: Vec::new(),
        };
        for ignore in ignores {
            if is_glob_pattern(ignore) {
                let pattern = Pattern::new(ignore)
                    .with_context(|| format!("Invalid ignore pattern '{}'", ignore))?;
                rules.patterns.push(pattern);
            } else {
                rules.prefixes.push(base_dir.join(ignore));
            }
        }
        Ok(rules)
    }

    fn matches(&self, path: &Path) -> bool {
        if self.prefixes.iter().any(|prefix| path.starts_with(prefix)) {
            return true;
        }
        let path_str = path.to_string_lossy();
        self.patterns.iter().any(|p| p.matches(&path_str))
    }
}

/// Directories to walk: the base itself, or every existing include.
fn scan_roots(base_dir: &Path, options: &ScanOptions<'_>) -> Result<Vec<PathBuf>> {
    if options.includes.is_empty() {
        return Ok(vec![base_dir.to_path_buf()]);
    }

    let mut roots = Vec::new();
    for include in options.includes {
        let path = base_dir.join(include);
        if is_glob_pattern(include) {
            let entries = glob(&path.to_string_lossy())
                .with_context(|| format!("Invalid include pattern '{}'", include))?;
            for entry in entries {
                let dir = entry.with_context(|| format!("Cannot expand include '{}'", include))?;
                if dir.is_dir() {
                    roots.push(dir);
                }
            }
        } else if path.exists() {
            roots.push(path);
        } else if options.verbose {
            eprintln!(
                "{} Include path does not exist: {}",
                "note:".bold().cyan(),
                path.display()
            );
        }
    }
    Ok(roots)
}

/// Collect matching files under `base_dir` in lexicographic order.
///
/// Ignored directories are never entered, so unreadable paths below them do
/// not fail the scan.
pub fn scan_files(base_dir: &Path, options: &ScanOptions<'_>) -> Result<BTreeSet<PathBuf>> {
    let ignores = IgnoreRules::new(base_dir, options.ignores)?;
    let mut files = BTreeSet::new();

    for root in scan_roots(base_dir, options)? {
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !ignores.matches(entry.path()));
        for entry in walker {
            let entry = entry.with_context(|| format!("Cannot scan {}", root.display()))?;
            if entry.file_type().is_file() && has_extension(entry.path(), options.extensions) {
                files.insert(entry.into_path());
            }
        }
    }

    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted == ext))
}
