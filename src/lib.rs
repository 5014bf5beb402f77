// src/lib.rs

//! debwrap
//!
//! Generates conda-build recipes that repackage prebuilt Debian binary
//! packages.
//!
//! # Architecture
//!
//! - Manifest-driven: one YAML manifest lists target packages, one rules
//!   document holds cross-ecosystem mappings
//! - Workspace layout: `<workspace>/<name>/{debs,recipes}` per package
//! - Artifacts: copied from a local source directory, fetched when missing
//! - Dependencies: DT_NEEDED sonames mapped to run dependencies
//! - Rendering: Tera templates for `meta.yaml` and `build.sh`

pub mod config;
pub mod dependencies;
mod error;
pub mod manifest;
pub mod packages;
pub mod pipeline;
pub mod recipe;
pub mod repository;
pub mod version;

pub use config::{FetchPolicy, GenConfig, DEFAULT_WORKSPACE};
pub use error::{Error, Result};
pub use manifest::{Manifest, PackageDescriptor, PackageKind, PythonVersion, Rules, Value};
pub use pipeline::{GenReport, PackageRecipe, PackageState, Pipeline};
