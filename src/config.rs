// src/config.rs

//! Configuration types for a generation run

use std::path::PathBuf;
use std::time::Duration;

/// Default recipe workspace, relative to the current directory
pub const DEFAULT_WORKSPACE: &str = "workspace/recipes";

/// Retry policy for fetching source artifacts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchPolicy {
    /// Download attempts per URL
    pub max_attempts: u32,
    /// Linear backoff unit; attempt `n` is followed by a sleep of `n * backoff_base`
    pub backoff_base: Duration,
    /// Ceiling for a single HTTP request
    pub request_timeout: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            backoff_base: Duration::from_millis(1500),
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl FetchPolicy {
    /// Worst-case time spent sleeping between attempts for one URL
    pub fn worst_case_backoff(&self) -> Duration {
        let n = self.max_attempts.max(1);
        // Sleeps follow attempts 1..n-1 only
        self.backoff_base * (n * (n - 1) / 2)
    }
}

/// Configuration for recipe generation
#[derive(Debug, Clone)]
pub struct GenConfig {
    /// Root directory holding one `<name>/{debs,recipes}` tree per package
    pub workspace: PathBuf,
    /// Directory with template overrides
    pub templates_dir: Option<PathBuf>,
    /// Local directory to collect source `.deb` files from
    pub deb_src: Option<PathBuf>,
    /// Map DT_NEEDED libraries to run dependencies
    pub dso_scan: bool,
    /// Show download progress bars
    pub progress: bool,
    pub fetch: FetchPolicy,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from(DEFAULT_WORKSPACE),
            templates_dir: None,
            deb_src: None,
            dso_scan: true,
            progress: false,
            fetch: FetchPolicy::default(),
        }
    }
}

impl GenConfig {
    /// Create a configuration writing into `workspace`
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            ..Self::default()
        }
    }

    /// Set the local artifact source directory
    pub fn with_deb_src(mut self, dir: Option<PathBuf>) -> Self {
        self.deb_src = dir;
        self
    }

    /// Set the template override directory
    pub fn with_templates_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.templates_dir = dir;
        self
    }

    /// Enable or disable DSO scanning
    pub fn with_dso_scan(mut self, enabled: bool) -> Self {
        self.dso_scan = enabled;
        self
    }

    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.progress = enabled;
        self
    }

    pub fn with_fetch_policy(mut self, policy: FetchPolicy) -> Self {
        self.fetch = policy;
        self
    }

    /// `<workspace>/<name>`
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.workspace.join(name)
    }

    /// `<workspace>/<name>/debs`
    pub fn debs_dir(&self, name: &str) -> PathBuf {
        self.package_dir(name).join("debs")
    }

    /// `<workspace>/<name>/recipes`
    pub fn recipes_dir(&self, name: &str) -> PathBuf {
        self.package_dir(name).join("recipes")
    }
}
