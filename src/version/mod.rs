// src/version/mod.rs

//! Version resolution for generated recipes
//!
//! Debian versions (`[epoch:]upstream[-revision]`) allow characters that
//! conda version strings do not. A recipe version is resolved from, in order:
//!
//! 1. the descriptor's explicit `version`
//! 2. `extras.version`
//! 3. the collected `.deb` artifacts (control `Version` field, then file name)
//! 4. the literal `"0"`
//!
//! Explicit overrides are used as written (trimmed); versions read from
//! artifacts are normalized with [`sanitize_version`].

use crate::manifest::PackageDescriptor;
use crate::packages::DebTools;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

/// Version used when nothing else is available
pub const FALLBACK_VERSION: &str = "0";

/// `name_<version>_<arch>.deb`
static DEB_FILENAME_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_(\d[^_]*)_(?:[A-Za-z0-9]+)\.deb$").expect("valid deb filename regex")
});

/// Normalize a Debian version into the conda version grammar
///
/// Drops the epoch, maps every character outside `[A-Za-z0-9_.]` to `_`,
/// collapses runs of `_` and trims leading/trailing `_` and `.`.
///
/// # Examples
/// - `"2:1.6.9-2ubuntu1"` → `"1.6.9_2ubuntu1"`
/// - `"1.0~rc1+dfsg"` → `"1.0_rc1_dfsg"`
/// - `"::"` → `"0"`
pub fn sanitize_version(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_epoch = match trimmed.split_once(':') {
        Some((_, rest)) => rest,
        None => trimmed,
    };

    let mut out = String::with_capacity(without_epoch.len());
    for c in without_epoch.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }

    let out = out.trim_matches(|c| c == '_' || c == '.');
    if out.is_empty() {
        FALLBACK_VERSION.to_string()
    } else {
        out.to_string()
    }
}

/// Extract the raw version from a `name_<version>_<arch>.deb` file name
pub fn version_from_filename(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    DEB_FILENAME_VERSION
        .captures(name)
        .map(|caps| caps[1].to_string())
}

/// Order artifacts so those whose file name contains `preferred` come first
///
/// Ties are broken by file name. Without a hint the input order is kept.
pub fn order_candidates(artifacts: &[PathBuf], preferred: Option<&str>) -> Vec<PathBuf> {
    let mut ordered = artifacts.to_vec();
    let Some(key) = preferred.map(str::trim).filter(|k| !k.is_empty()) else {
        return ordered;
    };

    ordered.sort_by_cached_key(|p| {
        let name = file_name(p);
        (!name.contains(key), name)
    });
    ordered
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Resolve the recipe version for a package
///
/// Query failures on individual artifacts are not errors; the next
/// candidate is tried.
pub fn resolve_version(
    descriptor: &PackageDescriptor,
    artifacts: &[PathBuf],
    tools: &dyn DebTools,
) -> String {
    if let Some(explicit) = descriptor.explicit_version() {
        return explicit;
    }

    for candidate in order_candidates(artifacts, descriptor.version_from.as_deref()) {
        let from_control = match tools.query_field(&candidate, "Version") {
            Ok(v) if !v.is_empty() => Some(v),
            Ok(_) => None,
            Err(e) => {
                debug!("Version query failed for {}: {}", candidate.display(), e);
                None
            }
        };

        if let Some(raw) = from_control.or_else(|| version_from_filename(&candidate)) {
            debug!("Resolved {} version from {}: {}", descriptor.name, candidate.display(), raw);
            return sanitize_version(&raw);
        }
    }

    FALLBACK_VERSION.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::manifest::PackageKind;
    use proptest::prelude::*;
    use std::collections::HashMap;

    /// Answers `Version` queries from a fixed table keyed by file name
    struct VersionTable(HashMap<String, String>);

    impl DebTools for VersionTable {
        fn query_field(&self, archive: &Path, _field: &str) -> Result<String> {
            self.0
                .get(&file_name(archive))
                .cloned()
                .ok_or_else(|| Error::ToolError("not a deb".to_string()))
        }

        fn extract(&self, _archive: &Path, _dest: &Path) -> Result<()> {
            Ok(())
        }

        fn dynamic_section(&self, _file: &Path) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    fn table(entries: &[(&str, &str)]) -> VersionTable {
        VersionTable(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(|n| PathBuf::from("/debs").join(n)).collect()
    }

    fn is_legal(v: &str) -> bool {
        !v.is_empty()
            && v.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
            && !v.contains("__")
            && !v.starts_with(['_', '.'])
            && !v.ends_with(['_', '.'])
    }

    #[test]
    fn test_sanitize_epoch_and_revision() {
        assert_eq!(sanitize_version("2:1.6.9-2ubuntu1"), "1.6.9_2ubuntu1");
    }

    #[test]
    fn test_sanitize_special_characters() {
        assert_eq!(sanitize_version("1.0~rc1+dfsg-3"), "1.0_rc1_dfsg_3");
        assert_eq!(sanitize_version("  4.5.0+ds-1  "), "4.5.0_ds_1");
        assert_eq!(sanitize_version("1.2 beta/3"), "1.2_beta_3");
        assert_eq!(sanitize_version("1.0--~~2"), "1.0_2");
    }

    #[test]
    fn test_sanitize_trims_separators() {
        assert_eq!(sanitize_version("_.1.2._"), "1.2");
        assert_eq!(sanitize_version("~1.0~"), "1.0");
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_version(""), "0");
        assert_eq!(sanitize_version("1:"), "0");
        assert_eq!(sanitize_version("-~+"), "0");
    }

    #[test]
    fn test_sanitize_output_always_legal() {
        let samples = [
            "2:1.6.9-2ubuntu1",
            "1.0~rc1+dfsg",
            "ä.ö-ü",
            "..__--..",
            "3.12.3-1ubuntu0.1~24.04",
            "0.9.9~git20230101+ds-2build1",
            "@@@1@@@",
            "1:2:3",
        ];
        for s in samples {
            let v = sanitize_version(s);
            assert!(is_legal(&v), "{:?} -> {:?}", s, v);
        }
    }

    proptest! {
        #[test]
        fn prop_sanitize_arbitrary_input_is_legal(raw in any::<String>()) {
            let v = sanitize_version(&raw);
            prop_assert!(is_legal(&v), "{:?} -> {:?}", raw, v);
        }

        #[test]
        fn prop_sanitize_debian_like_input_is_legal(raw in "[0-9]{0,2}:?[0-9a-z.~+_-]{0,24}") {
            let v = sanitize_version(&raw);
            prop_assert!(is_legal(&v), "{:?} -> {:?}", raw, v);
            prop_assert_eq!(sanitize_version(&v), v);
        }
    }

    #[test]
    fn test_version_from_filename() {
        let p = Path::new("/x/libfoo_1.2.3-1_riscv64.deb");
        assert_eq!(version_from_filename(p).as_deref(), Some("1.2.3-1"));
        let p = Path::new("foo-data_0.9_all.deb");
        assert_eq!(version_from_filename(p).as_deref(), Some("0.9"));
        assert_eq!(version_from_filename(Path::new("foo.deb")), None);
        assert_eq!(version_from_filename(Path::new("foo_abc_all.deb")), None);
    }

    #[test]
    fn test_order_candidates_prefers_hint() {
        let artifacts = paths(&["libz_1_all.deb", "zlib-dev_2_all.deb", "app_3_all.deb", "b-dev_1_all.deb"]);
        let ordered = order_candidates(&artifacts, Some("dev"));
        let names: Vec<String> = ordered.iter().map(|p| file_name(p)).collect();
        assert_eq!(
            names,
            vec!["b-dev_1_all.deb", "zlib-dev_2_all.deb", "app_3_all.deb", "libz_1_all.deb"]
        );
    }

    #[test]
    fn test_order_candidates_without_hint_keeps_order() {
        let artifacts = paths(&["b.deb", "a.deb"]);
        assert_eq!(order_candidates(&artifacts, None), artifacts);
        assert_eq!(order_candidates(&artifacts, Some("  ")), artifacts);
    }

    #[test]
    fn test_resolve_explicit_version_not_sanitized() {
        let mut desc = PackageDescriptor::new("foo", PackageKind::Lib);
        desc.version = Some(" 1.0-beta ".to_string());
        let tools = table(&[("foo_2.0_all.deb", "2.0")]);
        assert_eq!(resolve_version(&desc, &paths(&["foo_2.0_all.deb"]), &tools), "1.0-beta");
    }

    #[test]
    fn test_resolve_from_control_field() {
        let desc = PackageDescriptor::new("foo", PackageKind::Lib);
        let tools = table(&[("foo.deb", "1:2.4-1")]);
        assert_eq!(resolve_version(&desc, &paths(&["foo.deb"]), &tools), "2.4_1");
    }

    #[test]
    fn test_resolve_falls_back_to_filename_then_next_candidate() {
        let desc = PackageDescriptor::new("foo", PackageKind::Lib);
        let tools = table(&[("b.deb", "9.9")]);
        // a.deb: query fails and name has no version; b.deb answers
        let artifacts = paths(&["a.deb", "b.deb"]);
        assert_eq!(resolve_version(&desc, &artifacts, &tools), "9.9");

        let artifacts = paths(&["foo_3.1-2_amd64.deb"]);
        assert_eq!(resolve_version(&desc, &artifacts, &tools), "3.1_2");
    }

    #[test]
    fn test_resolve_uses_preferred_artifact() {
        let mut desc = PackageDescriptor::new("opencv", PackageKind::PythonExt);
        desc.version_from = Some("python3-opencv".to_string());
        let tools = table(&[
            ("libopencv-core_4.5.4_amd64.deb", "4.5.4"),
            ("python3-opencv_4.6.0_amd64.deb", "4.6.0+dfsg-1"),
        ]);
        let artifacts = paths(&["libopencv-core_4.5.4_amd64.deb", "python3-opencv_4.6.0_amd64.deb"]);
        assert_eq!(resolve_version(&desc, &artifacts, &tools), "4.6.0_dfsg_1");
    }

    #[test]
    fn test_resolve_fallback_zero() {
        let desc = PackageDescriptor::new("foo", PackageKind::Lib);
        let tools = table(&[]);
        assert_eq!(resolve_version(&desc, &[], &tools), "0");
        assert_eq!(resolve_version(&desc, &paths(&["junk.deb"]), &tools), "0");
    }
}
