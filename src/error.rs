// src/error.rs

//! Error types for recipe generation

use thiserror::Error;

/// Errors raised while generating recipes
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// I/O error with context
    #[error("I/O error: {0}")]
    IoError(String),

    /// Invalid manifest, rules or command-line configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Malformed document or tool output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Network transport failure
    #[error("Download error: {0}")]
    DownloadError(String),

    /// External tool could not be run or reported failure
    #[error("Tool error: {0}")]
    ToolError(String),

    /// Template loading or rendering failure
    #[error("Template error: {0}")]
    TemplateError(String),

    /// Declared source artifacts could not be found or fetched
    #[error("Missing .deb for package {package}; attempted fetch from urls and failed (patterns: {})", patterns.join(", "))]
    MissingArtifacts {
        package: String,
        patterns: Vec<String>,
    },
}

impl Error {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingArtifacts { .. } => 2,
            _ => 1,
        }
    }
}

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifacts_exit_code() {
        let err = Error::MissingArtifacts {
            package: "libfoo".to_string(),
            patterns: vec!["libfoo*.deb".to_string()],
        };
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("libfoo*.deb"));
    }

    #[test]
    fn test_other_errors_exit_one() {
        assert_eq!(Error::ConfigError("x".to_string()).exit_code(), 1);
        assert_eq!(Error::TemplateError("x".to_string()).exit_code(), 1);
    }
}
