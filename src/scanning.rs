//! Recursive directory scanning for glob-style asset discovery.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use wax::{CandidatePath, Glob, Pattern};

use crate::error::{BundleError, BundleResult};

/// Collect files under `base_dir` whose name matches `pattern`, in traversal
/// order: the current directory's matches first, then each subdirectory
/// recursively, both in lexicographic order.
///
/// `pattern` is reduced to its base-name component before matching, so any
/// directory components it carries are ignored. Subdirectories that are
/// symbolic links are not descended into; matching files that are symbolic
/// links are kept. Dot-prefixed entries are skipped entirely.
pub fn scan_matching_files(base_dir: &Path, pattern: &str) -> BundleResult<Vec<PathBuf>> {
    let name_pattern = basename_pattern(pattern);
    let glob = Glob::new(name_pattern).map_err(|err| BundleError::AssetResolution {
        asset: base_dir.display().to_string(),
        source: anyhow!("invalid glob pattern `{name_pattern}`: {err}"),
    })?;

    let mut matches = Vec::new();
    walk(base_dir, &glob, &mut matches).map_err(|source| BundleError::AssetResolution {
        asset: base_dir.display().to_string(),
        source,
    })?;

    Ok(matches)
}

/// Reduce a pattern to its final path component.
fn basename_pattern(pattern: &str) -> &str {
    Path::new(pattern)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(pattern)
}

fn walk(dir: &Path, glob: &Glob<'_>, matches: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let mut entries = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("failed to read directory {}", dir.display()))?
    {
        entries.push(
            entry.with_context(|| format!("failed to read directory {}", dir.display()))?,
        );
    }
    entries.sort_by_key(|entry| entry.file_name());

    let mut subdirs = Vec::new();
    for entry in entries {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }

        let file_type = entry
            .file_type()
            .with_context(|| format!("failed to inspect {}", entry.path().display()))?;
        let path = entry.path();

        // file_type() does not follow symlinks; consult full metadata so that
        // symlinked files still count as matches while symlinked directories
        // are never descended into.
        let (is_dir, is_file) = if file_type.is_symlink() {
            match fs::metadata(&path) {
                Ok(meta) => (false, meta.is_file()),
                Err(_) => continue, // dangling link
            }
        } else {
            (file_type.is_dir(), file_type.is_file())
        };

        if is_dir {
            subdirs.push(path);
        } else if is_file && glob.matched(&CandidatePath::from(name)).is_some() {
            matches.push(path);
        }
    }

    for subdir in subdirs {
        walk(&subdir, glob, matches)?;
    }

    Ok(())
}
