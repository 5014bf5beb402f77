// src/dependencies/soname.rs

//! Runtime dependency discovery from DT_NEEDED entries
//!
//! Extracted package trees are walked under the usual library and binary
//! directories. Each regular file's dynamic section is listed and every
//! `(NEEDED) Shared library: [soname]` record is looked up in the rules'
//! `map_run_deps` table. Files that are not ELF objects, or that the
//! inspection tool cannot read, are skipped.

use crate::error::Result;
use crate::packages::DebTools;
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Directories searched for ELF objects, relative to the extraction root
pub const SCAN_DIRS: [&str; 4] = ["usr/lib", "usr/bin", "lib", "bin"];

static SHARED_LIBRARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Shared library:\s*\[(.+?)\]").expect("valid shared library regex")
});

/// Soname of a DT_NEEDED record, if the line is one
///
/// Example record:
/// `0x0000000000000001 (NEEDED)             Shared library: [libopenblas.so.0]`
pub fn parse_needed(record: &str) -> Option<&str> {
    if !record.contains("NEEDED") {
        return None;
    }
    SHARED_LIBRARY
        .captures(record)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// Map the sonames needed by binaries under `extracted_root` to packages
///
/// The result keeps first-discovery order and holds each mapped package
/// once, even when several sonames map to it.
pub fn scan(
    extracted_root: &Path,
    map_run_deps: &IndexMap<String, String>,
    tools: &dyn DebTools,
) -> Vec<String> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();

    for dir in SCAN_DIRS {
        let base = extracted_root.join(dir);
        if !base.is_dir() {
            continue;
        }

        let files = WalkDir::new(&base)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file());

        for entry in files {
            let records = match tools.dynamic_section(entry.path()) {
                Ok(records) => records,
                Err(e) => {
                    debug!("Skipping {}: {}", entry.path().display(), e);
                    continue;
                }
            };

            for soname in records.iter().filter_map(|r| parse_needed(r)) {
                if let Some(mapped) = map_run_deps.get(soname)
                    && seen.insert(mapped.clone())
                {
                    debug!("{} needs {} -> {}", entry.path().display(), soname, mapped);
                    found.push(mapped.clone());
                }
            }
        }
    }

    found
}

/// Extract every artifact into `dest`, tolerating individual failures
///
/// Returns the artifacts that extracted cleanly.
pub fn extract_all(artifacts: &[PathBuf], dest: &Path, tools: &dyn DebTools) -> Vec<PathBuf> {
    artifacts
        .iter()
        .filter(|deb| match tools.extract(deb, dest) {
            Ok(()) => true,
            Err(e) => {
                warn!("Ignoring {} for DSO scan: {}", deb.display(), e);
                false
            }
        })
        .cloned()
        .collect()
}

/// Extract artifacts into a scratch directory and scan them
pub fn scan_artifacts(
    artifacts: &[PathBuf],
    map_run_deps: &IndexMap<String, String>,
    tools: &dyn DebTools,
) -> Result<Vec<String>> {
    let scratch = tempfile::Builder::new().prefix("debwrap-scan-").tempdir()?;
    extract_all(artifacts, scratch.path(), tools);
    Ok(scan(scratch.path(), map_run_deps, tools))
}
