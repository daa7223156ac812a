//! Recursive file discovery with case-insensitive glob filters.

use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;
use walkdir::WalkDir;

use crate::shared::constants::IMAGE_SEARCH_FILTER;

#[derive(Error, Debug)]
pub enum FindError {
    #[error("search directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("invalid search filter {pattern:?}: {source}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Compile a shell glob (`*`, `?`) into an anchored, case-insensitive regex.
pub fn glob_to_regex(pattern: &str) -> Result<Regex, FindError> {
    let mut re = String::from("(?i)^");
    for ch in pattern.chars() {
        match ch {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).map_err(|source| FindError::InvalidFilter {
        pattern: pattern.to_string(),
        source,
    })
}

/// Every regular file under `root` whose name matches any of `filters`.
///
/// Paths come back in traversal order; callers sort when they need a
/// stable order. Unreadable entries are skipped.
pub fn find<S: AsRef<str>>(root: &Path, filters: &[S]) -> Result<Vec<PathBuf>, FindError> {
    if !root.is_dir() {
        return Err(FindError::DirectoryNotFound(root.to_path_buf()));
    }
    let patterns = filters
        .iter()
        .map(|f| glob_to_regex(f.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let name = e.file_name().to_string_lossy();
            patterns.iter().any(|p| p.is_match(&name))
        })
        .map(|e| e.into_path())
        .collect();
    log::debug!("Found {} file(s) under {}", files.len(), root.display());
    Ok(files)
}

/// [`find`] with the default image filter (`*.jpg`, `*.jpeg`, `*.gif`, `*.png`).
pub fn find_images(root: &Path) -> Result<Vec<PathBuf>, FindError> {
    find(root, IMAGE_SEARCH_FILTER)
}
