//! Error types for changelog processing.
//!
//! Two variants are control signals rather than failures:
//! [`Error::NoVersionFound`] routes the caller to the bootstrap path and
//! [`Error::NoChanges`] means there is nothing to release.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for changelog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while processing a changelog.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// The document has no released `## [X.Y.Z]` heading.
    #[error("No version found in changelog")]
    #[diagnostic(
        code(bumpwright::changelog::no_version),
        help("The changelog has never been released; use the bootstrap path")
    )]
    NoVersionFound,

    /// The unreleased section has nothing that justifies a release.
    #[error("No changes found in the unreleased section")]
    #[diagnostic(
        code(bumpwright::changelog::no_changes),
        help("Add entries under a category heading such as '### Added' below '## [Unreleased]'")
    )]
    NoChanges,

    /// A bracketed version token could not be parsed.
    #[error("Invalid version: {version}")]
    #[diagnostic(
        code(bumpwright::changelog::invalid_version),
        help("Version headings must follow semantic versioning (e.g., ## [1.2.0] - 2024-01-31)")
    )]
    InvalidVersion {
        /// The invalid version string
        version: String,
    },

    /// Configuration error.
    #[error("Changelog configuration error: {message}")]
    #[diagnostic(code(bumpwright::changelog::config), help("{help}"))]
    Config {
        /// The error message
        message: String,
        /// Help text for the user
        help: String,
    },

    /// Failed to read or write a changelog file.
    #[error("Changelog I/O error: {message}")]
    #[diagnostic(
        code(bumpwright::changelog::io),
        help("Check that the changelog path exists and is writable")
    )]
    Io {
        /// The error message
        message: String,
        /// The path that caused the error
        path: Option<PathBuf>,
        /// The underlying source error
        #[source]
        source: Option<std::io::Error>,
    },
}

impl Error {
    /// Create a new invalid version error.
    #[must_use]
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Create a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: help.into(),
        }
    }

    /// Create a new I/O error without an underlying source.
    #[must_use]
    pub fn io(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Io {
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a new I/O error with source.
    #[must_use]
    pub fn io_with_source(
        message: impl Into<String>,
        path: Option<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            message: message.into(),
            path,
            source: Some(source),
        }
    }

    /// Whether this is the "no version found" bootstrap signal.
    #[must_use]
    pub const fn is_no_version_found(&self) -> bool {
        matches!(self, Self::NoVersionFound)
    }

    /// Whether this is the "nothing to release" signal.
    #[must_use]
    pub const fn is_no_changes(&self) -> bool {
        matches!(self, Self::NoChanges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_version_found_error() {
        let err = Error::NoVersionFound;
        assert!(err.to_string().contains("No version found"));
        assert!(err.is_no_version_found());
        assert!(!err.is_no_changes());
    }

    #[test]
    fn test_no_changes_error() {
        let err = Error::NoChanges;
        assert!(err.to_string().contains("No changes found"));
        assert!(err.is_no_changes());
        assert!(!err.is_no_version_found());
    }

    #[test]
    fn test_invalid_version_error() {
        let err = Error::invalid_version("1.x.0");
        assert!(err.to_string().contains("1.x.0"));
        assert!(!err.is_no_version_found());
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("bad threshold", "use a value in (0, 1]");
        assert!(err.to_string().contains("bad threshold"));
    }

    #[test]
    fn test_io_error_with_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::io_with_source(
            "failed to read",
            Some(PathBuf::from("CHANGELOG.md")),
            io_err,
        );
        assert!(err.to_string().contains("Changelog I/O error"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_io_error_no_source() {
        let err = Error::io("refusing to overwrite", None);
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_error_debug() {
        let err = Error::NoChanges;
        let debug = format!("{err:?}");
        assert!(debug.contains("NoChanges"));
    }
}
