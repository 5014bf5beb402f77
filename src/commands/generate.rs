// src/commands/generate.rs

//! Gen command - generate conda recipes from a manifest

use anyhow::{Context, Result};
use debwrap::packages::{is_dpkg_deb_available, SystemTools};
use debwrap::recipe::RecipeRenderer;
use debwrap::repository::{ArtifactFetcher, HttpTransport, ThreadSleeper};
use debwrap::{GenConfig, Manifest, Pipeline, Rules};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Generate recipes for every package in `manifest_path`
///
/// # Arguments
/// * `manifest_path` - Manifest listing the packages
/// * `rules_path` - Rules document
/// * `deb_src` - Local artifact source directory (collection is skipped when absent)
/// * `no_dso_scan` - Skip shared library dependency mapping
/// * `workspace` - Recipe workspace root
/// * `templates` - Template override directory
/// * `progress` - Show download progress bars
#[allow(clippy::too_many_arguments)]
pub fn cmd_gen(
    manifest_path: &Path,
    rules_path: &Path,
    deb_src: Option<PathBuf>,
    no_dso_scan: bool,
    workspace: PathBuf,
    templates: Option<PathBuf>,
    progress: bool,
) -> Result<()> {
    let manifest = Manifest::load(manifest_path)
        .with_context(|| format!("Failed to load manifest: {}", manifest_path.display()))?;
    let rules = Rules::load(rules_path)
        .with_context(|| format!("Failed to load rules: {}", rules_path.display()))?;

    info!(
        "Loaded {} package(s) from {}",
        manifest.packages.len(),
        manifest_path.display()
    );

    let config = GenConfig::new(workspace)
        .with_deb_src(deb_src)
        .with_templates_dir(templates)
        .with_dso_scan(!no_dso_scan)
        .with_progress(progress);

    if !is_dpkg_deb_available() {
        warn!("dpkg-deb not found in PATH; versions fall back to file names and scans find nothing");
    }

    let tools = SystemTools::new();
    let transport = HttpTransport::new(config.fetch.request_timeout)?.with_progress(config.progress);
    let sleeper = ThreadSleeper;
    let fetcher = ArtifactFetcher::new(&transport, &tools, &sleeper, config.fetch);
    let renderer = RecipeRenderer::new(config.templates_dir.as_deref())?;

    let pipeline = Pipeline::new(&config, &rules, &tools, &fetcher, &renderer);
    pipeline.run_with(&manifest, |recipe| {
        println!(
            "[OK] Generated recipe for {} -> {}",
            recipe.name,
            recipe.recipes_dir.display()
        );
    })?;

    Ok(())
}
