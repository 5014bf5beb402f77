// src/repository/client.rs

//! HTTP transport for source artifact downloads
//!
//! A single attempt per call; retries and validation live in
//! [`super::download::ArtifactFetcher`].

use crate::error::{Error, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io::{IsTerminal, Read, Write};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// Moves the bytes behind a URL into a local file
pub trait Transport {
    /// Download `url` to `dest`, returning the number of bytes written
    ///
    /// On error `dest` is left untouched.
    fn download(&self, url: &str, dest: &Path) -> Result<u64>;
}

/// Stream HTTP response to file with optional progress tracking
///
/// Always streams data in chunks, never buffering the entire response in memory.
fn stream_response_to_file(
    mut response: reqwest::blocking::Response,
    file: &mut File,
    progress_bar: Option<&ProgressBar>,
) -> Result<u64> {
    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];

    loop {
        let bytes_read = response
            .read(&mut buffer)
            .map_err(|e| Error::DownloadError(format!("Failed to read response: {e}")))?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| Error::IoError(format!("Failed to write data: {e}")))?;

        downloaded += bytes_read as u64;

        if let Some(pb) = progress_bar {
            pb.set_position(downloaded);
        }
    }

    Ok(downloaded)
}

/// Create a styled progress bar for a download
fn create_progress_bar(size: u64, name: &str) -> ProgressBar {
    let pb = ProgressBar::new(size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    pb.set_message(name.to_string());
    pb
}

/// Blocking reqwest transport
pub struct HttpTransport {
    client: Client,
    show_progress: bool,
}

impl HttpTransport {
    /// Create a transport with a per-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::DownloadError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            show_progress: false,
        })
    }

    /// Draw progress bars when stderr is a terminal
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled && std::io::stderr().is_terminal();
        self
    }
}

impl Transport for HttpTransport {
    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::DownloadError(format!("Failed to fetch {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::DownloadError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let display_name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_string());
        let progress = self
            .show_progress
            .then(|| create_progress_bar(response.content_length().unwrap_or(0), &display_name));

        // Write to a side file first so a failed transfer never leaves a partial dest
        let temp_path = dest.with_extension("part");
        let mut file = File::create(&temp_path).map_err(|e| {
            Error::IoError(format!("Failed to create file {}: {e}", temp_path.display()))
        })?;

        let downloaded = match stream_response_to_file(response, &mut file, progress.as_ref()) {
            Ok(n) => n,
            Err(e) => {
                if let Some(pb) = &progress {
                    pb.abandon_with_message(format!("{display_name} [FAILED]"));
                }
                let _ = fs::remove_file(&temp_path);
                return Err(e);
            }
        };
        drop(file);

        fs::rename(&temp_path, dest).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            Error::IoError(format!(
                "Failed to move {} to {}: {e}",
                temp_path.display(),
                dest.display()
            ))
        })?;

        if let Some(pb) = &progress {
            pb.finish_with_message(format!("{display_name} [done]"));
        }
        debug!("Downloaded {} bytes from {}", downloaded, url);
        Ok(downloaded)
    }
}
