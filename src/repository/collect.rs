// src/repository/collect.rs

//! Collect a package's source artifacts into its `debs/` directory
//!
//! Artifacts are copied from a local source directory by glob pattern. When
//! nothing matches, the package's URLs are fetched into that directory and
//! the copy is repeated, with one extra fetch round for packages that
//! declare patterns. A package that declares patterns but still has no
//! artifacts afterwards yields [`Error::MissingArtifacts`].

use crate::error::{Error, Result};
use crate::manifest::PackageDescriptor;
use glob::Pattern;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::download::ArtifactFetcher;

/// Copy files in `src_dir` matching any of `patterns` into `dest_dir`
///
/// Returns the number of files copied. No match is a warning, not an error.
pub fn copy_matching(src_dir: &Path, patterns: &[String], dest_dir: &Path) -> Result<usize> {
    let base = Pattern::escape(&src_dir.to_string_lossy());
    let mut copied = 0;

    for pat in patterns {
        let full = format!("{}/{}", base.trim_end_matches('/'), pat);
        let paths = match glob::glob(&full) {
            Ok(paths) => paths,
            Err(e) => {
                warn!("Invalid artifact pattern '{}': {}", pat, e);
                continue;
            }
        };

        for entry in paths {
            let matched = match entry {
                Ok(path) => path,
                Err(e) => {
                    debug!("Unreadable glob entry: {}", e);
                    continue;
                }
            };
            if !matched.is_file() {
                continue;
            }
            let Some(file_name) = matched.file_name() else {
                continue;
            };

            let target = dest_dir.join(file_name);
            fs::copy(&matched, &target).map_err(|e| {
                Error::IoError(format!(
                    "Failed to copy {} to {}: {}",
                    matched.display(),
                    target.display(),
                    e
                ))
            })?;
            info!("[COPY] {} -> {}", matched.display(), target.display());
            copied += 1;
        }
    }

    if copied == 0 {
        let pats = if patterns.is_empty() {
            "<none>".to_string()
        } else {
            patterns.join(", ")
        };
        warn!("No .deb matched in {} for patterns: {}", src_dir.display(), pats);
    }

    Ok(copied)
}

/// Gather a package's artifacts from `deb_src` into `debs_dir`
///
/// Returns the number of artifacts copied, or [`Error::MissingArtifacts`]
/// when patterns are declared and every copy and fetch round came up empty.
pub fn collect(
    fetcher: &ArtifactFetcher<'_>,
    descriptor: &PackageDescriptor,
    deb_src: &Path,
    debs_dir: &Path,
) -> Result<usize> {
    let patterns = &descriptor.debs;
    let urls = descriptor.source_urls();

    let mut copied = copy_matching(deb_src, patterns, debs_dir)?;

    if copied == 0 && !urls.is_empty() && fetcher.fetch_urls(&urls, deb_src) > 0 {
        copied = copy_matching(deb_src, patterns, debs_dir)?;
    }

    if copied == 0 && !patterns.is_empty() {
        info!("Retrying fetch for {} before giving up", descriptor.name);
        if fetcher.fetch_urls(&urls, deb_src) > 0 {
            copied = copy_matching(deb_src, patterns, debs_dir)?;
        }
    }

    if copied == 0 && !patterns.is_empty() {
        return Err(Error::MissingArtifacts {
            package: descriptor.name.clone(),
            patterns: patterns.clone(),
        });
    }

    Ok(copied)
}
