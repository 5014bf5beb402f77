// src/dependencies/mod.rs

//! Automatic runtime dependency discovery
//!
//! Binaries shipped in a package's `.deb` artifacts record the shared
//! libraries they link against. Mapping those sonames through the rules'
//! `map_run_deps` table yields target-ecosystem run dependencies.
//!
//! # Example
//!
//! ```ignore
//! use debwrap::dependencies::parse_needed;
//!
//! let record = "0x0000000000000001 (NEEDED) Shared library: [libz.so.1]";
//! assert_eq!(parse_needed(record), Some("libz.so.1"));
//! ```

mod soname;

pub use soname::{extract_all, parse_needed, scan, scan_artifacts, SCAN_DIRS};
