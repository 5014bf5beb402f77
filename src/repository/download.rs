// src/repository/download.rs

//! Source artifact download with retry and validation
//!
//! Every attempt downloads the whole file and then asks `dpkg-deb` for the
//! `Package` field. An attempt succeeds only when that query returns a
//! non-empty value; anything else removes the file and retries after a
//! linear backoff (`backoff_base * attempt`). Failure is reported as `false`,
//! never as an error.

use crate::config::FetchPolicy;
use crate::packages::DebTools;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};
use url::Url;

use super::client::Transport;

/// Waits between download attempts
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Blocks the current thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Downloads and validates `.deb` artifacts
pub struct ArtifactFetcher<'a> {
    transport: &'a dyn Transport,
    tools: &'a dyn DebTools,
    sleeper: &'a dyn Sleeper,
    policy: FetchPolicy,
}

impl<'a> ArtifactFetcher<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        tools: &'a dyn DebTools,
        sleeper: &'a dyn Sleeper,
        policy: FetchPolicy,
    ) -> Self {
        Self {
            transport,
            tools,
            sleeper,
            policy,
        }
    }

    /// Whether `path` is a readable Debian archive
    ///
    /// Best-effort: a successful, non-empty `Package` field query.
    pub fn is_valid_deb(&self, path: &Path) -> bool {
        if !path.is_file() {
            return false;
        }
        matches!(self.tools.query_field(path, "Package"), Ok(name) if !name.is_empty())
    }

    /// Download `url` to `dest` with up to `max_attempts` tries
    pub fn fetch(&self, url: &str, dest: &Path, max_attempts: u32, backoff_base: Duration) -> bool {
        let attempts = max_attempts.max(1);

        for attempt in 1..=attempts {
            if let Some(parent) = dest.parent()
                && let Err(e) = fs::create_dir_all(parent)
            {
                warn!("Failed to create {}: {}", parent.display(), e);
            }

            match self.transport.download(url, dest) {
                Ok(_) if self.is_valid_deb(dest) => {
                    info!("[FETCH] ok {} -> {}", url, dest.display());
                    return true;
                }
                Ok(_) => {
                    warn!("[FETCH] invalid deb after download, removing: {}", dest.display());
                    let _ = fs::remove_file(dest);
                }
                Err(e) => {
                    warn!("[FETCH] attempt {} failed: {} ({})", attempt, url, e);
                }
            }

            if attempt < attempts {
                self.sleeper.sleep(backoff_base * attempt);
            }
        }

        false
    }

    /// Fetch every URL into `deb_src` using the configured policy
    ///
    /// URLs whose target file already exists and is valid are skipped.
    /// Returns the number of newly fetched files.
    pub fn fetch_urls(&self, urls: &[String], deb_src: &Path) -> usize {
        let mut fetched = 0;

        for url in urls {
            let Some(dest) = destination_for(url, deb_src) else {
                warn!("[FETCH] skipping unparseable url: {}", url);
                continue;
            };

            if dest.exists() && self.is_valid_deb(&dest) {
                info!("[FETCH] skip existing valid {}", dest.display());
                continue;
            }

            if self.fetch(url, &dest, self.policy.max_attempts, self.policy.backoff_base) {
                fetched += 1;
            }
        }

        fetched
    }
}

/// Local path for a URL: its last path segment inside `dir`
///
/// URLs without a file name get `file_<unix-seconds>.deb`.
pub fn destination_for(url: &str, dir: &Path) -> Option<PathBuf> {
    let parsed = Url::parse(url).ok()?;
    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let secs = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            format!("file_{}.deb", secs)
        });
    Some(dir.join(name))
}
