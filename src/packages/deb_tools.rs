// src/packages/deb_tools.rs

//! External tools for inspecting Debian archives and ELF binaries
//!
//! Recipe generation needs three narrow operations: read a control field
//! from a `.deb`, unpack a `.deb` into a directory, and list the dynamic
//! section records of a binary. They sit behind [`DebTools`] so the pipeline
//! can run against fakes. [`SystemTools`] shells out to `dpkg-deb` and
//! `readelf`, and parses ELF in-process with goblin when `readelf` is missing.

use crate::error::{Error, Result};
use goblin::Object;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// ELF magic bytes
const ELF_MAGIC: [u8; 4] = [0x7F, b'E', b'L', b'F'];

/// Operations on Debian archives and binaries used by the pipeline
pub trait DebTools {
    /// Read a control field (e.g. `Package`, `Version`) from an archive
    ///
    /// Returns the trimmed value, which may be empty.
    fn query_field(&self, archive: &Path, field: &str) -> Result<String>;

    /// Unpack the data payload of an archive into `dest`
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;

    /// Dynamic section records of a binary, one per line
    ///
    /// Files that are not ELF objects yield no records.
    fn dynamic_section(&self, file: &Path) -> Result<Vec<String>>;
}

/// [`DebTools`] backed by the host's `dpkg-deb` and `readelf`
#[derive(Debug, Clone, Default)]
pub struct SystemTools {
    readelf: Option<PathBuf>,
}

impl SystemTools {
    /// Locate the tools on `PATH`
    pub fn new() -> Self {
        let readelf = which::which("readelf").ok();
        if readelf.is_none() {
            debug!("readelf not found on PATH, using built-in ELF parser");
        }
        Self { readelf }
    }

    /// Always parse ELF in-process
    pub fn without_readelf() -> Self {
        Self { readelf: None }
    }

    fn readelf_records(readelf: &Path, file: &Path) -> Result<Vec<String>> {
        // readelf exits non-zero for non-ELF input; an empty stdout covers that
        let output = Command::new(readelf)
            .arg("-d")
            .arg(file)
            .output()
            .map_err(|e| Error::ToolError(format!("Failed to run readelf: {}", e)))?;

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }

    fn goblin_records(file: &Path) -> Result<Vec<String>> {
        let mut handle = File::open(file)?;
        let mut magic = [0u8; 4];
        if handle.read_exact(&mut magic).is_err() || magic != ELF_MAGIC {
            return Ok(Vec::new());
        }

        let content = std::fs::read(file)?;
        match Object::parse(&content) {
            Ok(Object::Elf(elf)) => Ok(elf
                .libraries
                .iter()
                .map(|lib| format!(" (NEEDED)             Shared library: [{}]", lib))
                .collect()),
            Ok(_) => Ok(Vec::new()),
            Err(e) => {
                debug!("Failed to parse ELF {}: {}", file.display(), e);
                Ok(Vec::new())
            }
        }
    }
}

impl DebTools for SystemTools {
    fn query_field(&self, archive: &Path, field: &str) -> Result<String> {
        let output = Command::new("dpkg-deb")
            .arg("-f")
            .arg(archive)
            .arg(field)
            .output()
            .map_err(|e| {
                Error::ToolError(format!("Failed to run dpkg-deb: {}. Is dpkg installed?", e))
            })?;

        if !output.status.success() {
            return Err(Error::ToolError(format!(
                "dpkg-deb -f {} {} failed: {}",
                archive.display(),
                field,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn extract(&self, archive: &Path, dest: &Path) -> Result<()> {
        let output = Command::new("dpkg-deb")
            .arg("-x")
            .arg(archive)
            .arg(dest)
            .output()
            .map_err(|e| Error::ToolError(format!("Failed to run dpkg-deb: {}", e)))?;

        if !output.status.success() {
            return Err(Error::ToolError(format!(
                "Failed to extract {}: {}",
                archive.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(())
    }

    fn dynamic_section(&self, file: &Path) -> Result<Vec<String>> {
        match &self.readelf {
            Some(readelf) => Self::readelf_records(readelf, file),
            None => Self::goblin_records(file),
        }
    }
}

/// Check if dpkg-deb is available on this system
pub fn is_dpkg_deb_available() -> bool {
    Command::new("dpkg-deb")
        .args(["--version"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
