//! Source file discovery.
//!
//! "Latest" is decided by a [`SelectionPolicy`]. The default,
//! [`DescendingName`], picks the greatest path by plain string comparison.
//! That is only a proxy for recency: it works as long as files are named with a
//! sortable date-like convention (`20240601.tsv`, `2023-06-01.tsv`) and silently
//! picks the wrong file otherwise.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use glob::{glob_with, MatchOptions, Pattern};
use tracing::{debug, info, warn};

use crate::error::{PublishError, Result};

/// The kinds of input file the pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Tab-separated administrative code table, looked up in a single directory.
    AdmCodeTable,
    /// Boundary GeoJSON, looked up recursively.
    BoundaryGeoJson,
}

impl SourceKind {
    pub fn extension(self) -> &'static str {
        match self {
            SourceKind::AdmCodeTable => "tsv",
            SourceKind::BoundaryGeoJson => "geojson",
        }
    }

    pub fn recursive(self) -> bool {
        matches!(self, SourceKind::BoundaryGeoJson)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::AdmCodeTable => write!(f, "administrative code table (.tsv)"),
            SourceKind::BoundaryGeoJson => write!(f, "boundary GeoJSON (.geojson)"),
        }
    }
}

/// Strategy for picking one file out of several candidates.
pub trait SelectionPolicy: Send + Sync {
    fn select(&self, candidates: Vec<PathBuf>) -> Result<Option<PathBuf>>;
}

/// Greatest full path wins, compared as a plain string. Directory names take
/// part, so `2024/boundary.geojson` beats `2023/zzz_boundary.geojson`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescendingName;

impl SelectionPolicy for DescendingName {
    fn select(&self, candidates: Vec<PathBuf>) -> Result<Option<PathBuf>> {
        Ok(candidates
            .into_iter()
            .max_by(|a, b| a.as_os_str().cmp(b.as_os_str())))
    }
}

/// Most recently modified file wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewestModified;

impl SelectionPolicy for NewestModified {
    fn select(&self, candidates: Vec<PathBuf>) -> Result<Option<PathBuf>> {
        let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
        for path in candidates {
            let modified = fs::metadata(&path)
                .and_then(|m| m.modified())
                .map_err(|source| PublishError::FileAccess {
                    path: path.clone(),
                    source,
                })?;
            let is_newer = newest
                .as_ref()
                .map_or(true, |(current, _)| modified > *current);
            if is_newer {
                newest = Some((modified, path));
            }
        }
        Ok(newest.map(|(_, path)| path))
    }
}

/// Lists regular files under `root` ending in `.{extension}`.
///
/// Hidden files and directories are skipped. A root that does not exist yields
/// no matches rather than an error, and entries that cannot be read while
/// walking are logged and skipped.
pub fn find_matching(root: &Path, extension: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let base = Pattern::escape(&root.to_string_lossy());
    let pattern = if recursive {
        format!("{base}/**/*.{extension}")
    } else {
        format!("{base}/*.{extension}")
    };
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let entries = glob_with(&pattern, options).map_err(|source| PublishError::InvalidPattern {
        pattern: pattern.clone(),
        source,
    })?;

    let mut matches = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => matches.push(path),
            Ok(_) => {}
            Err(e) => {
                warn!(path = %e.path().display(), error = %e.error(), "Skipping unreadable entry");
            }
        }
    }
    debug!(pattern = %pattern, count = matches.len(), "Enumerated candidate files");
    Ok(matches)
}

/// Finds the latest file of `kind` under `root`, or `None` if there is none.
pub fn locate_latest(
    root: &Path,
    kind: SourceKind,
    policy: &dyn SelectionPolicy,
) -> Result<Option<PathBuf>> {
    let candidates = find_matching(root, kind.extension(), kind.recursive())?;
    if candidates.is_empty() {
        info!(root = %root.display(), %kind, "No matching source files");
        return Ok(None);
    }
    let selected = policy.select(candidates)?;
    if let Some(path) = &selected {
        info!(root = %root.display(), %kind, path = %path.display(), "Selected source file");
    }
    Ok(selected)
}
