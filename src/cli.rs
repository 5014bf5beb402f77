// src/cli.rs
//! CLI definitions for debwrap
//!
//! Command implementations live in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "debwrap")]
#[command(author = "debwrap Contributors")]
#[command(version)]
#[command(about = "Generate conda recipes that wrap Debian binary packages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate recipes for every package in a manifest
    Gen {
        /// Manifest listing the packages to wrap
        #[arg(long)]
        manifest: PathBuf,

        /// Rules document with dependency mappings and test snippets
        #[arg(long)]
        rules: PathBuf,

        /// Local directory holding (or receiving) source .deb files
        #[arg(long)]
        deb_src: Option<PathBuf>,

        /// Skip mapping shared library dependencies to run dependencies
        #[arg(long)]
        no_dso_scan: bool,

        /// Recipe workspace root
        #[arg(long, default_value = "workspace/recipes")]
        workspace: PathBuf,

        /// Directory with template overrides (meta.yaml.tera, build.sh.tera, build.lib.sh.tera)
        #[arg(long)]
        templates: Option<PathBuf>,

        /// Show download progress bars
        #[arg(long)]
        progress: bool,
    },
}
