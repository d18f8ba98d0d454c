//! Locating released versions and section boundaries in a changelog.

use crate::config::BoundaryMatching;
use crate::error::{Error, Result};
use crate::version::Version;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Token used by the open section at the top of a changelog.
pub const UNRELEASED: &str = "Unreleased";

const UNRELEASED_MARKER: &str = "[Unreleased]";

static SECTION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*## \[([^\]]+)\]").expect("section heading regex is valid")
});

/// Extract the bracketed token of a `## [<token>]` heading line.
#[must_use]
pub fn heading_token(line: &str) -> Option<&str> {
    SECTION_HEADING
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Find the highest released version recorded in the document.
///
/// Every `## [<token>]` heading other than `## [Unreleased]` must carry a
/// valid version; the maximum by semver ordering wins regardless of where it
/// appears in the document.
///
/// # Errors
///
/// Returns [`Error::InvalidVersion`] for a malformed version token and
/// [`Error::NoVersionFound`] when the document has no released heading.
pub fn find_latest_version<S: AsRef<str>>(lines: &[S]) -> Result<Version> {
    let mut latest: Option<Version> = None;

    for line in lines {
        let Some(token) = heading_token(line.as_ref()) else {
            continue;
        };
        if token == UNRELEASED {
            continue;
        }

        let version: Version = token.parse()?;
        if latest.as_ref().is_none_or(|current| version > *current) {
            latest = Some(version);
        }
    }

    let latest = latest.ok_or(Error::NoVersionFound)?;
    debug!(version = %latest, "Located latest released version");
    Ok(latest)
}

/// Whether a line opens the unreleased section.
#[must_use]
pub fn is_unreleased_marker(line: &str, matching: BoundaryMatching) -> bool {
    match matching {
        BoundaryMatching::Substring => line.contains(UNRELEASED_MARKER),
        BoundaryMatching::Anchored => heading_token(line) == Some(UNRELEASED),
    }
}

/// Whether a line is a `## [<version>]` heading of any released version.
#[must_use]
pub fn is_release_heading(line: &str) -> bool {
    heading_token(line)
        .filter(|token| *token != UNRELEASED)
        .is_some_and(|token| token.parse::<Version>().is_ok())
}

/// Whether a line closes the unreleased section.
///
/// The first released heading always closes it, whichever version it
/// carries. With substring matching, a bracketed mention of the latest
/// version anywhere on the line (`[1.2.0]` or `[v1.2.0]`) closes it too.
#[must_use]
pub fn closes_unreleased(line: &str, latest: &Version, matching: BoundaryMatching) -> bool {
    if is_release_heading(line) {
        return true;
    }
    match matching {
        BoundaryMatching::Substring => {
            line.contains(&format!("[{latest}]")) || line.contains(&format!("[v{latest}]"))
        }
        BoundaryMatching::Anchored => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_token() {
        assert_eq!(heading_token("## [1.2.3] - 2024-01-01"), Some("1.2.3"));
        assert_eq!(heading_token("   ## [Unreleased]"), Some("Unreleased"));
        assert_eq!(heading_token("### [1.2.3]"), None);
        assert_eq!(heading_token("- see ## [1.2.3]"), None);
        assert_eq!(heading_token("## 1.2.3"), None);
    }

    #[test]
    fn test_find_latest_version_top() {
        let lines = [
            "# Changelog",
            "## [Unreleased]",
            "## [1.0.1] - 2024-02-01",
            "## [1.0.0] - 2024-01-01",
        ];
        assert_eq!(find_latest_version(&lines).unwrap(), Version::new(1, 0, 1));
    }

    #[test]
    fn test_find_latest_version_not_first_in_document() {
        let lines = [
            "## [Unreleased]",
            "## [1.9.0] - 2024-01-01",
            "## [1.10.0] - 2024-03-01",
            "## [0.9.0] - 2023-01-01",
        ];
        assert_eq!(find_latest_version(&lines).unwrap(), Version::new(1, 10, 0));
    }

    #[test]
    fn test_find_latest_version_none() {
        let lines = ["# Changelog", "## [Unreleased]", "### Added", "- thing"];
        let err = find_latest_version(&lines).unwrap_err();
        assert!(err.is_no_version_found());

        let empty: [&str; 0] = [];
        assert!(find_latest_version(&empty).unwrap_err().is_no_version_found());
    }

    #[test]
    fn test_find_latest_version_malformed() {
        let lines = ["## [Unreleased]", "## [1.0] - 2024-01-01"];
        let err = find_latest_version(&lines).unwrap_err();
        assert!(matches!(err, Error::InvalidVersion { .. }));
    }

    #[test]
    fn test_find_latest_version_owned_lines() {
        let lines = vec!["  ## [v2.1.0] - 2024-05-05".to_string()];
        assert_eq!(find_latest_version(&lines).unwrap(), Version::new(2, 1, 0));
    }

    #[test]
    fn test_unreleased_marker_substring() {
        assert!(is_unreleased_marker("## [Unreleased]", BoundaryMatching::Substring));
        assert!(is_unreleased_marker(
            "- mention [Unreleased] in text",
            BoundaryMatching::Substring
        ));
        assert!(!is_unreleased_marker("## [unreleased]", BoundaryMatching::Substring));
    }

    #[test]
    fn test_unreleased_marker_anchored() {
        assert!(is_unreleased_marker("## [Unreleased]", BoundaryMatching::Anchored));
        assert!(!is_unreleased_marker(
            "- mention [Unreleased] in text",
            BoundaryMatching::Anchored
        ));
    }

    #[test]
    fn test_is_release_heading() {
        assert!(is_release_heading("## [1.0.0] - 2024-01-01"));
        assert!(is_release_heading("## [v0.9.0]"));
        assert!(!is_release_heading("## [Unreleased]"));
        assert!(!is_release_heading("### Added"));
        assert!(!is_release_heading("- compare [1.0.0] behavior"));
    }

    #[test]
    fn test_closes_unreleased_substring() {
        let latest = Version::new(1, 0, 0);
        let substring = BoundaryMatching::Substring;
        assert!(closes_unreleased("## [1.0.0] - 2024-01-01", &latest, substring));
        assert!(closes_unreleased("## [v1.0.0] - 2024-01-01", &latest, substring));
        assert!(closes_unreleased("## [0.9.0] - 2023-01-01", &latest, substring));
        assert!(closes_unreleased("- compare [1.0.0] behavior", &latest, substring));
        assert!(closes_unreleased("- compare [v1.0.0] behavior", &latest, substring));
        assert!(!closes_unreleased("- compare [0.9.0] behavior", &latest, substring));
        assert!(!closes_unreleased("### Fixed", &latest, substring));
    }

    #[test]
    fn test_closes_unreleased_anchored() {
        let latest = Version::new(1, 0, 0);
        let anchored = BoundaryMatching::Anchored;
        assert!(closes_unreleased("## [v1.0.0] - 2024-01-01", &latest, anchored));
        assert!(closes_unreleased("## [0.9.0] - 2023-01-01", &latest, anchored));
        assert!(!closes_unreleased("- compare [1.0.0] behavior", &latest, anchored));
    }
}
