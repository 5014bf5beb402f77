// src/packages/mod.rs

//! Debian package tooling
//!
//! Access to `.deb` metadata, archive extraction and binary inspection
//! goes through the [`DebTools`] trait.

pub mod deb_tools;

pub use deb_tools::{is_dpkg_deb_available, DebTools, SystemTools};
