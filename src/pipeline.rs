// src/pipeline.rs

//! Recipe generation pipeline
//!
//! Packages are processed one at a time, each through
//! `Init → DirsReady → ArtifactsCollected → Scanned → VersionResolved → Rendered → Done`
//! (the scan step is skipped when disabled or when there is nothing to
//! scan). Missing declared artifacts stop the whole run; later packages are
//! not generated. Extraction, inspection and version-query failures only
//! degrade the affected step.

use crate::config::GenConfig;
use crate::dependencies::scan_artifacts;
use crate::error::{Error, Result};
use crate::manifest::{Manifest, PackageDescriptor, PythonVersion, Rules};
use crate::packages::DebTools;
use crate::recipe::{RecipeFiles, RecipeRenderer, RenderContext};
use crate::repository::{collect, ArtifactFetcher};
use crate::version::resolve_version;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Progress of a single package through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageState {
    Init,
    DirsReady,
    ArtifactsCollected,
    Scanned,
    VersionResolved,
    Rendered,
    Done,
    Failed,
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::DirsReady => "dirs-ready",
            Self::ArtifactsCollected => "artifacts-collected",
            Self::Scanned => "scanned",
            Self::VersionResolved => "version-resolved",
            Self::Rendered => "rendered",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Result of generating one package's recipe
#[derive(Debug, Clone, PartialEq)]
pub struct PackageRecipe {
    pub name: String,
    pub version: String,
    pub run_deps: Vec<String>,
    pub test_cmds: Vec<String>,
    /// Artifacts present in `debs/` when the recipe was rendered
    pub artifacts: Vec<PathBuf>,
    pub recipes_dir: PathBuf,
    pub files: RecipeFiles,
}

/// Summary of a generation run
#[derive(Debug, Clone, Default)]
pub struct GenReport {
    pub recipes: Vec<PackageRecipe>,
}

/// Drives recipe generation for every package in a manifest
pub struct Pipeline<'a> {
    config: &'a GenConfig,
    rules: &'a Rules,
    tools: &'a dyn DebTools,
    fetcher: &'a ArtifactFetcher<'a>,
    renderer: &'a RecipeRenderer,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a GenConfig,
        rules: &'a Rules,
        tools: &'a dyn DebTools,
        fetcher: &'a ArtifactFetcher<'a>,
        renderer: &'a RecipeRenderer,
    ) -> Self {
        Self {
            config,
            rules,
            tools,
            fetcher,
            renderer,
        }
    }

    /// Generate recipes for every package, stopping at the first fatal error
    pub fn run(&self, manifest: &Manifest) -> Result<GenReport> {
        self.run_with(manifest, |_| {})
    }

    /// Like [`Pipeline::run`], calling `on_recipe` as soon as each package's
    /// recipe is written
    ///
    /// Packages finished before a fatal error have already been reported.
    pub fn run_with<F>(&self, manifest: &Manifest, mut on_recipe: F) -> Result<GenReport>
    where
        F: FnMut(&PackageRecipe),
    {
        if manifest.packages.is_empty() {
            warn!("No packages found in manifest.");
        }

        let python = manifest.detect_python_version();
        debug!("Python version {} (abi {})", python.pyver, python.pyabi);

        let mut report = GenReport::default();
        for descriptor in &manifest.packages {
            let recipe = self.process(descriptor, &python)?;
            info!("Generated recipe for {} {}", recipe.name, recipe.version);
            on_recipe(&recipe);
            report.recipes.push(recipe);
        }

        info!("Generated {} recipe(s)", report.recipes.len());
        Ok(report)
    }

    /// Generate one package's recipe
    pub fn process(
        &self,
        descriptor: &PackageDescriptor,
        python: &PythonVersion,
    ) -> Result<PackageRecipe> {
        let mut state = PackageState::Init;
        match self.advance(descriptor, python, &mut state) {
            Ok(recipe) => {
                transition(&descriptor.name, &mut state, PackageState::Done);
                Ok(recipe)
            }
            Err(e) => {
                error!("{} failed after {}: {}", descriptor.name, state, e);
                transition(&descriptor.name, &mut state, PackageState::Failed);
                Err(e)
            }
        }
    }

    fn advance(
        &self,
        descriptor: &PackageDescriptor,
        python: &PythonVersion,
        state: &mut PackageState,
    ) -> Result<PackageRecipe> {
        let name = descriptor.name.as_str();
        let debs_dir = self.config.debs_dir(name);
        let recipes_dir = self.config.recipes_dir(name);

        ensure_dir(&debs_dir)?;
        ensure_dir(&recipes_dir)?;
        transition(name, state, PackageState::DirsReady);

        self.collect_artifacts(descriptor, &debs_dir)?;
        let artifacts = list_artifacts(&debs_dir)?;
        transition(name, state, PackageState::ArtifactsCollected);

        let auto_deps = if self.config.dso_scan && !artifacts.is_empty() {
            let deps = match scan_artifacts(&artifacts, &self.rules.map_run_deps, self.tools) {
                Ok(deps) => deps,
                Err(e) => {
                    warn!("DSO scan for {} failed: {}", name, e);
                    Vec::new()
                }
            };
            transition(name, state, PackageState::Scanned);
            deps
        } else {
            Vec::new()
        };

        let version = resolve_version(descriptor, &artifacts, self.tools);
        transition(name, state, PackageState::VersionResolved);

        let context = RenderContext::build(descriptor, self.rules, &version, &auto_deps, python);
        let files = self.renderer.write(&context, &recipes_dir)?;
        transition(name, state, PackageState::Rendered);

        Ok(PackageRecipe {
            name: context.name,
            version: context.version,
            run_deps: context.run_deps,
            test_cmds: context.test_cmds,
            artifacts,
            recipes_dir,
            files,
        })
    }

    fn collect_artifacts(&self, descriptor: &PackageDescriptor, debs_dir: &Path) -> Result<()> {
        let Some(deb_src) = &self.config.deb_src else {
            return Ok(());
        };

        if !deb_src.is_dir() {
            error!("--deb-src path not a directory: {}", deb_src.display());
            return Ok(());
        }

        let copied = collect(self.fetcher, descriptor, deb_src, debs_dir)?;
        debug!("Collected {} artifact(s) for {}", copied, descriptor.name);
        Ok(())
    }
}

fn transition(name: &str, state: &mut PackageState, next: PackageState) {
    debug!("{}: {} -> {}", name, state, next);
    *state = next;
}

/// Create a directory and its parents if missing
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .map_err(|e| Error::IoError(format!("Failed to create {}: {}", path.display(), e)))
}

/// `.deb` files in a directory, sorted by file name
pub fn list_artifacts(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut debs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "deb"))
        .collect();
    debs.sort();
    Ok(debs)
}
