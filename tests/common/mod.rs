// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.
//!
//! Fake `.deb` files are plain text control stanzas:
//!
//! ```text
//! Package: zlib1g
//! Version: 1:1.3.dfsg-3
//! Needed: libz.so.1
//! ```
//!
//! [`FakeDebTools`] answers field queries from that text, "extracts" an
//! archive into a single `usr/lib/<stem>.so` file carrying its `Needed`
//! lines, and reports those lines as dynamic section records.

#![allow(dead_code)]

use debwrap::packages::DebTools;
use debwrap::repository::{Sleeper, Transport};
use debwrap::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Text of a fake `.deb`
pub fn fake_deb(package: &str, version: &str, needed: &[&str]) -> String {
    let mut text = format!("Package: {}\nVersion: {}\n", package, version);
    for soname in needed {
        text.push_str(&format!("Needed: {}\n", soname));
    }
    text
}

fn field<'a>(text: &'a str, name: &str) -> Vec<&'a str> {
    let prefix = format!("{}:", name);
    text.lines()
        .filter_map(|line| line.strip_prefix(&prefix))
        .map(str::trim)
        .collect()
}

/// [`DebTools`] over fake text archives
#[derive(Default)]
pub struct FakeDebTools;

impl DebTools for FakeDebTools {
    fn query_field(&self, archive: &Path, name: &str) -> Result<String> {
        let text = fs::read_to_string(archive)
            .map_err(|e| Error::ToolError(format!("cannot read {}: {}", archive.display(), e)))?;
        Ok(field(&text, name).first().map(|v| v.to_string()).unwrap_or_default())
    }

    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let text = fs::read_to_string(archive)
            .map_err(|e| Error::ToolError(format!("cannot read {}: {}", archive.display(), e)))?;
        if field(&text, "Package").is_empty() {
            return Err(Error::ToolError(format!("not an archive: {}", archive.display())));
        }

        let lib_dir = dest.join("usr/lib");
        fs::create_dir_all(&lib_dir)?;
        let stem = archive
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let needed: String = field(&text, "Needed")
            .iter()
            .map(|s| format!("Needed: {}\n", s))
            .collect();
        fs::write(lib_dir.join(format!("{}.so", stem)), needed)?;
        Ok(())
    }

    fn dynamic_section(&self, file: &Path) -> Result<Vec<String>> {
        let text = fs::read_to_string(file)?;
        Ok(field(&text, "Needed")
            .iter()
            .map(|soname| {
                format!(
                    " 0x0000000000000001 (NEEDED)             Shared library: [{}]",
                    soname
                )
            })
            .collect())
    }
}

/// Serves canned bodies by URL; unknown URLs fail
#[derive(Default)]
pub struct FakeTransport {
    bodies: HashMap<String, String>,
    failures_left: RefCell<HashMap<String, u32>>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, body: String) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    /// Fail the first `count` requests for `url`
    pub fn fail_first(self, url: &str, count: u32) -> Self {
        self.failures_left.borrow_mut().insert(url.to_string(), count);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transport for FakeTransport {
    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        self.calls.borrow_mut().push(url.to_string());

        if let Some(left) = self.failures_left.borrow_mut().get_mut(url)
            && *left > 0
        {
            *left -= 1;
            return Err(Error::DownloadError(format!("connection reset: {}", url)));
        }

        let body = self
            .bodies
            .get(url)
            .ok_or_else(|| Error::DownloadError(format!("HTTP 404 for {}", url)))?;
        fs::write(dest, body)?;
        Ok(body.len() as u64)
    }
}

/// Records requested sleeps without waiting
#[derive(Default)]
pub struct RecordingSleeper {
    pub sleeps: RefCell<Vec<Duration>>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}

/// Scratch layout for a generation run
///
/// Keep the struct alive to prevent cleanup.
pub struct TestWorkspace {
    pub dir: TempDir,
    pub manifest: PathBuf,
    pub rules: PathBuf,
    pub deb_src: PathBuf,
    pub workspace: PathBuf,
}

impl TestWorkspace {
    pub fn new(manifest: &str, rules: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("manifest.yaml");
        let rules_path = dir.path().join("rules.yaml");
        let deb_src = dir.path().join("debs");
        let workspace = dir.path().join("workspace/recipes");

        fs::write(&manifest_path, manifest).unwrap();
        fs::write(&rules_path, rules).unwrap();
        fs::create_dir_all(&deb_src).unwrap();

        Self {
            dir,
            manifest: manifest_path,
            rules: rules_path,
            deb_src,
            workspace,
        }
    }

    /// Drop a fake `.deb` into the local source directory
    pub fn add_deb(&self, file_name: &str, contents: &str) -> PathBuf {
        let path = self.deb_src.join(file_name);
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn recipe_dir(&self, name: &str) -> PathBuf {
        self.workspace.join(name).join("recipes")
    }

    pub fn read_meta(&self, name: &str) -> serde_yaml::Value {
        let text = fs::read_to_string(self.recipe_dir(name).join("meta.yaml")).unwrap();
        serde_yaml::from_str(&text).unwrap()
    }
}

/// String items of a YAML sequence
pub fn strings(value: &serde_yaml::Value) -> Vec<String> {
    value
        .as_sequence()
        .map(|seq| {
            seq.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
