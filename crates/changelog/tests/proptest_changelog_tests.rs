//! Property-based tests for changelog processing invariants.
//!
//! These tests verify the behavioral contracts of the engine:
//! - Deduplication is idempotent
//! - The latest version is the semver maximum, wherever it appears
//! - Bump precedence is major > minor > patch

use bumpwright_changelog::{
    BumpType, Category, ChangelogProcessor, Version, deduplicate_entries, find_latest_version,
};
use chrono::NaiveDate;
use proptest::prelude::*;

// =============================================================================
// Strategies for generating test data
// =============================================================================

const VOCABULARY: &[&str] = &[
    "added", "parser", "config", "loader", "crash", "fixed", "updated", "module", "dependencies",
    "the", "to", "and", "cache", "startup", "windows", "login", "page", "x",
];

/// Generate a changelog entry from a small vocabulary so that overlaps are
/// common, optionally mentioning a version and padded with whitespace.
fn entry_strategy() -> impl Strategy<Value = String> {
    (
        proptest::collection::vec(proptest::sample::select(VOCABULARY), 1..6),
        proptest::option::of((0u64..3, 0u64..20, 0u64..20)),
        any::<bool>(),
    )
        .prop_map(|(words, version, padded)| {
            let mut entry = format!("- {}", words.join(" "));
            if let Some((major, minor, patch)) = version {
                entry.push_str(&format!(" `{major}.{minor}.{patch}`"));
            }
            if padded {
                entry = format!("  {entry} ");
            }
            entry
        })
}

fn version_strategy() -> impl Strategy<Value = Version> {
    (0u64..5, 0u64..12, 0u64..12).prop_map(|(major, minor, patch)| Version::new(major, minor, patch))
}

fn processor() -> ChangelogProcessor {
    ChangelogProcessor::default_config()
        .with_release_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn dedup_is_idempotent(entries in proptest::collection::vec(entry_strategy(), 0..12)) {
        let once = deduplicate_entries(&entries);
        let twice = deduplicate_entries(&once);
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.len() <= entries.len());
    }

    #[test]
    fn dedup_keeps_at_least_one_entry(entries in proptest::collection::vec(entry_strategy(), 1..12)) {
        prop_assert!(!deduplicate_entries(&entries).is_empty());
    }

    #[test]
    fn latest_version_is_maximum(versions in proptest::collection::vec(version_strategy(), 1..8)) {
        let mut doc = vec!["# Changelog".to_string(), "## [Unreleased]".to_string()];
        for version in &versions {
            doc.push(format!("## [{version}] - 2024-01-01"));
            doc.push("- entry".to_string());
        }

        let expected = versions.iter().max().cloned().unwrap();
        prop_assert_eq!(find_latest_version(&doc).unwrap(), expected);
    }

    #[test]
    fn bump_follows_precedence(
        entries in proptest::collection::vec((0usize..6, any::<bool>()), 0..10)
    ) {
        let mut doc = vec!["## [Unreleased]".to_string()];
        for category in Category::ALL {
            doc.push(format!("### {category}"));
            for (i, (index, breaking)) in entries.iter().enumerate() {
                if Category::ALL[*index] != category {
                    continue;
                }
                if *breaking {
                    doc.push(format!(
                        "- **BREAKING CHANGE:** item{i} part{i} piece{i} bit{i}"
                    ));
                } else {
                    doc.push(format!("- change{i}"));
                }
            }
        }
        doc.push("## [1.2.3] - 2024-01-01".to_string());

        let expected = if entries.iter().any(|(_, breaking)| *breaking) {
            BumpType::Major
        } else if entries.iter().any(|(index, _)| Category::ALL[*index] == Category::Added) {
            BumpType::Minor
        } else if entries.is_empty() {
            BumpType::None
        } else {
            BumpType::Patch
        };

        match processor().process_changelog(&doc) {
            Ok(update) => {
                prop_assert_eq!(update.bump, Some(expected));
                prop_assert_eq!(update.version, Version::new(1, 2, 3).bump(expected).unwrap());
            }
            Err(err) => {
                prop_assert!(err.is_no_changes());
                prop_assert_eq!(expected, BumpType::None);
            }
        }
    }
}
