// src/repository/mod.rs

//! Source artifact acquisition
//!
//! This module provides functionality for:
//! - Copying declared `.deb` artifacts from a local source directory
//! - Downloading missing artifacts with linear-backoff retries
//! - Validating downloads as readable Debian archives

mod client;
mod collect;
mod download;

pub use client::{HttpTransport, Transport};
pub use collect::{collect, copy_matching};
pub use download::{destination_for, ArtifactFetcher, Sleeper, ThreadSleeper};
