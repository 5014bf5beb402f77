// src/manifest/mod.rs

//! Manifest and rules documents
//!
//! The manifest lists the target packages and the Debian artifacts they are
//! wrapped from. The rules document holds cross-ecosystem mappings shared by
//! every package in a run. Both are decoded into a [`Value`] tree first and
//! then read into typed structures.
//!
//! # Example Manifest
//!
//! ```yaml
//! packages:
//!   - name: python
//!     kind: python_core
//!     debs: ["python3.11-minimal_*.deb", "libpython3.11-stdlib_*.deb"]
//!   - name: opencv
//!     kind: python_ext
//!     debs: ["python3-opencv_*.deb"]
//!     version_from: python3-opencv
//!     extras:
//!       needs: ["numpy >=1.26"]
//!       ensure_modules: [cv2]
//! ```

mod rules;
mod value;

pub use rules::Rules;
pub use value::Value;

use crate::error::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::debug;

static PYTHON_MINOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"python3\.(\d+)").expect("valid python version regex"));

/// Decode a YAML document from disk into a [`Value`] tree
///
/// Accepts UTF-8 with or without a byte-order mark and falls back to
/// Latin-1 for anything else. An empty document yields an empty mapping.
pub fn load_document(path: &Path) -> Result<Value> {
    let bytes = std::fs::read(path)
        .map_err(|e| Error::IoError(format!("Failed to read {}: {}", path.display(), e)))?;
    let text = decode_text(&bytes);

    let doc: serde_yaml::Value = serde_yaml::from_str(&text)
        .map_err(|e| Error::ParseError(format!("Invalid YAML in {}: {}", path.display(), e)))?;

    debug!("Loaded document {}", path.display());
    match Value::from(doc) {
        Value::Null => Ok(Value::empty_map()),
        value => Ok(value),
    }
}

fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1 maps every byte to the code point of the same value
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Kind of target package, which selects dependency and test policies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageKind {
    PythonCore,
    PythonExt,
    Lib,
    Bin,
    Data,
}

impl PackageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PythonCore => "python_core",
            Self::PythonExt => "python_ext",
            Self::Lib => "lib",
            Self::Bin => "bin",
            Self::Data => "data",
        }
    }

    /// Interpreter packages and extension modules
    pub fn is_python(&self) -> bool {
        matches!(self, Self::PythonCore | Self::PythonExt)
    }

    /// Plain payload packages (shared libraries, executables, data files)
    pub fn is_plain(&self) -> bool {
        matches!(self, Self::Lib | Self::Bin | Self::Data)
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "python_core" => Ok(Self::PythonCore),
            "python_ext" => Ok(Self::PythonExt),
            "lib" => Ok(Self::Lib),
            "bin" => Ok(Self::Bin),
            "data" => Ok(Self::Data),
            other => Err(Error::ConfigError(format!(
                "Unknown package kind '{}' (expected python_core, python_ext, lib, bin or data)",
                other
            ))),
        }
    }
}

/// One manifest entry describing a target package
#[derive(Debug, Clone, PartialEq)]
pub struct PackageDescriptor {
    pub name: String,
    pub kind: PackageKind,
    /// Glob patterns naming the source `.deb` artifacts
    pub debs: Vec<String>,
    /// Explicit version override
    pub version: Option<String>,
    /// Preferred artifact name fragment for version detection
    pub version_from: Option<String>,
    pub build_number: u64,
    /// Top-level source URLs (take precedence over `extras.urls`)
    pub urls: Vec<String>,
    /// Shared libraries known to be absent, passed through to templates
    pub missing_dso: Vec<String>,
    /// Free-form bag; always a mapping
    pub extras: Value,
}

impl PackageDescriptor {
    /// Create a descriptor with no artifacts or extras
    pub fn new(name: impl Into<String>, kind: PackageKind) -> Self {
        Self {
            name: name.into(),
            kind,
            debs: Vec::new(),
            version: None,
            version_from: None,
            build_number: 0,
            urls: Vec::new(),
            missing_dso: Vec::new(),
            extras: Value::empty_map(),
        }
    }

    /// Read a descriptor from a manifest entry
    pub fn from_value(entry: &Value) -> Result<Self> {
        if entry.as_map().is_none() {
            return Err(Error::ConfigError(
                "Manifest package entry must be a mapping".to_string(),
            ));
        }

        let name = entry
            .get("name")
            .map(Value::to_plain_string)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s != "null")
            .ok_or_else(|| {
                Error::ConfigError("Manifest package entry without a name".to_string())
            })?;

        // Untyped entries are plain libraries, including provided-soname tests
        let kind = match entry.get("kind").filter(|v| !v.is_null()) {
            Some(v) => v.to_plain_string().parse().map_err(|e| match e {
                Error::ConfigError(msg) => Error::ConfigError(format!("{}: {}", name, msg)),
                other => other,
            })?,
            None => PackageKind::Lib,
        };

        let build_number = match entry.get("build_number") {
            None | Some(Value::Null) => 0,
            Some(Value::Int(n)) if *n >= 0 => *n as u64,
            Some(Value::Str(s)) => s.trim().parse().map_err(|_| {
                Error::ConfigError(format!("{}: invalid build_number '{}'", name, s))
            })?,
            Some(other) => {
                return Err(Error::ConfigError(format!(
                    "{}: invalid build_number '{}'",
                    name,
                    other.to_plain_string()
                )));
            }
        };

        let extras = match entry.get("extras") {
            Some(v) if v.as_map().is_some() => v.clone(),
            _ => Value::empty_map(),
        };

        let list = |key: &str| entry.get(key).map(Value::string_list).unwrap_or_default();

        Ok(Self {
            debs: list("debs"),
            version: entry.get("version").and_then(Value::as_str).map(str::to_string),
            version_from: entry
                .get("version_from")
                .map(Value::to_plain_string)
                .filter(|s| s != "null"),
            build_number,
            urls: list("urls"),
            missing_dso: list("missing_dso"),
            extras,
            name,
            kind,
        })
    }

    /// Look up a key in the extras bag
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extras.get(key)
    }

    /// Explicit version override, descriptor first, then extras
    pub fn explicit_version(&self) -> Option<String> {
        self.version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .or_else(|| self.extra("version").and_then(Value::as_trimmed_str))
            .map(str::to_string)
    }

    /// Source URLs from the descriptor, else from extras
    pub fn source_urls(&self) -> Vec<String> {
        if !self.urls.is_empty() {
            return self.urls.clone();
        }
        self.extra("urls").map(Value::string_list).unwrap_or_default()
    }
}

/// Interpreter version and ABI tag used by python templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonVersion {
    pub pyver: String,
    pub pyabi: String,
}

impl Default for PythonVersion {
    fn default() -> Self {
        Self {
            pyver: "3.12".to_string(),
            pyabi: "312".to_string(),
        }
    }
}

impl PythonVersion {
    /// Per-package view honouring `extras.pyver` / `extras.pyabi`
    pub fn for_package(&self, descriptor: &PackageDescriptor) -> Self {
        let pick = |key: &str, fallback: &str| {
            descriptor
                .extra(key)
                .and_then(Value::as_trimmed_str)
                .unwrap_or(fallback)
                .to_string()
        };
        Self {
            pyver: pick("pyver", &self.pyver),
            pyabi: pick("pyabi", &self.pyabi),
        }
    }
}

/// The decoded manifest
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub packages: Vec<PackageDescriptor>,
}

impl Manifest {
    /// Read and validate every package entry
    ///
    /// Any invalid entry rejects the whole manifest so no recipe work starts
    /// on a partially valid configuration.
    pub fn from_value(doc: &Value) -> Result<Self> {
        let packages = match doc.get("packages") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::List(entries)) => entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    PackageDescriptor::from_value(entry).map_err(|e| match e {
                        Error::ConfigError(msg) => {
                            Error::ConfigError(format!("packages[{}]: {}", i, msg))
                        }
                        other => other,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            Some(_) => {
                return Err(Error::ConfigError(
                    "Manifest 'packages' must be a list".to_string(),
                ));
            }
        };

        Ok(Self { packages })
    }

    /// Load and validate a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_value(&load_document(path)?)
    }

    /// Detect the interpreter version from the first `python_core` entry
    ///
    /// Artifact patterns like `python3.11-minimal` give `3.11` / `311`;
    /// string `extras.pyver` / `extras.pyabi` on that entry win over detection.
    pub fn detect_python_version(&self) -> PythonVersion {
        let mut detected = PythonVersion::default();

        let Some(core) = self
            .packages
            .iter()
            .find(|p| p.kind == PackageKind::PythonCore)
        else {
            return detected;
        };

        let joined = core.debs.join(" ");
        if let Some(caps) = PYTHON_MINOR.captures(&joined) {
            let minor = &caps[1];
            detected.pyver = format!("3.{}", minor);
            detected.pyabi = format!("3{}", minor);
        }
        if let Some(pyver) = core.extra("pyver").and_then(Value::as_str) {
            detected.pyver = pyver.to_string();
        }
        if let Some(pyabi) = core.extra("pyabi").and_then(Value::as_str) {
            detected.pyabi = pyabi.to_string();
        }

        detected
    }
}
