//! Removal of exact and near-duplicate changelog entries.
//!
//! Deduplication runs per category in two phases:
//!
//! 1. **Exact**: entries are trimmed and later copies of an identical line are
//!    dropped, keeping first-seen order.
//! 2. **Semantic**: every pair of remaining entries is compared by the overlap
//!    of their significant words. Code spans and version numbers are ignored
//!    for the comparison, so "bumped `serde` to 1.0.200" and "bumped `serde`
//!    to 1.0.210" count as the same change.
//!
//! When two entries overlap, the survivor is the one naming the higher
//! version, then the longer one, then the earlier one. Every surviving pair
//! has been compared and found distinct, so running the deduplicator on its
//! own output is a no-op.

use crate::config::DedupConfig;
use crate::version::Version;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

static BULLET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[-*+]\s+").expect("bullet prefix regex is valid"));

static CODE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`]*`").expect("code span regex is valid"));

static VERSION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bv?(\d+)\.(\d+)(?:\.(\d+))?\b").expect("version token regex is valid")
});

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from", "has", "have",
        "in", "into", "is", "it", "its", "of", "on", "or", "so", "than", "that", "the", "their",
        "them", "then", "there", "these", "this", "those", "to", "was", "were", "when", "which",
        "will", "with",
    ]
    .into_iter()
    .collect()
});

/// Deduplicate entries with the default settings.
#[must_use]
pub fn deduplicate_entries<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    deduplicate_entries_with(entries, &DedupConfig::default())
}

/// Deduplicate entries, preserving the order of the survivors.
///
/// Inputs with at most one entry are returned unchanged.
#[must_use]
pub fn deduplicate_entries_with<S: AsRef<str>>(entries: &[S], config: &DedupConfig) -> Vec<String> {
    if entries.len() <= 1 {
        return entries.iter().map(|e| e.as_ref().to_string()).collect();
    }

    let unique = remove_exact_duplicates(entries);
    if !config.enabled || unique.len() <= 1 {
        return unique;
    }

    remove_overlapping(unique, config.overlap_threshold)
}

fn remove_exact_duplicates<S: AsRef<str>>(entries: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .map(|entry| entry.as_ref().trim())
        .filter(|entry| seen.insert(*entry))
        .map(str::to_string)
        .collect()
}

/// Per-entry attributes used only while comparing.
struct Candidate {
    raw: String,
    tokens: HashSet<String>,
    version: Option<Version>,
}

impl Candidate {
    fn new(raw: String) -> Self {
        let tokens = entry_tokens(&raw);
        let version = max_embedded_version(&raw);
        Self {
            raw,
            tokens,
            version,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Survivor {
    First,
    Second,
}

/// Pick which of two overlapping entries to keep.
fn survivor(first: &Candidate, second: &Candidate) -> Survivor {
    match (&first.version, &second.version) {
        (Some(a), Some(b)) if a > b => return Survivor::First,
        (Some(a), Some(b)) if a < b => return Survivor::Second,
        (Some(_), None) => return Survivor::First,
        (None, Some(_)) => return Survivor::Second,
        _ => {}
    }

    if second.raw.chars().count() > first.raw.chars().count() {
        Survivor::Second
    } else {
        Survivor::First
    }
}

fn remove_overlapping(entries: Vec<String>, threshold: f64) -> Vec<String> {
    let candidates: Vec<Candidate> = entries.into_iter().map(Candidate::new).collect();
    let mut removed = vec![false; candidates.len()];

    for i in 0..candidates.len() {
        if removed[i] {
            continue;
        }
        for j in (i + 1)..candidates.len() {
            if removed[j] {
                continue;
            }

            let ratio = token_overlap(&candidates[i].tokens, &candidates[j].tokens);
            if ratio < threshold {
                continue;
            }

            let (kept, dropped) = match survivor(&candidates[i], &candidates[j]) {
                Survivor::First => (i, j),
                Survivor::Second => (j, i),
            };
            debug!(
                kept = %candidates[kept].raw,
                dropped = %candidates[dropped].raw,
                ratio,
                "Dropped overlapping changelog entry"
            );
            removed[dropped] = true;
            if dropped == i {
                break;
            }
        }
    }

    candidates
        .into_iter()
        .zip(removed)
        .filter(|(_, removed)| !removed)
        .map(|(candidate, _)| candidate.raw)
        .collect()
}

/// Normalized comparison form of an entry.
///
/// Strips the bullet prefix, code spans and version numbers, lowercases, and
/// collapses whitespace.
#[must_use]
pub fn normalize_entry(entry: &str) -> String {
    let text = BULLET_PREFIX.replace(entry, "");
    let text = CODE_SPAN.replace_all(&text, " ");
    let text = VERSION_TOKEN.replace_all(&text, " ");
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Significant words of an entry: no stop words, no single characters.
#[must_use]
pub fn entry_tokens(entry: &str) -> HashSet<String> {
    normalize_entry(entry)
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| word.chars().count() > 1 && !STOP_WORDS.contains(*word))
        .map(str::to_string)
        .collect()
}

/// Highest version number mentioned anywhere in the raw entry, code spans
/// included.
#[must_use]
pub fn max_embedded_version(entry: &str) -> Option<Version> {
    VERSION_TOKEN
        .captures_iter(entry)
        .filter_map(|caps| {
            let major = caps.get(1)?.as_str().parse().ok()?;
            let minor = caps.get(2)?.as_str().parse().ok()?;
            let patch = match caps.get(3) {
                Some(m) => m.as_str().parse().ok()?,
                None => 0,
            };
            Some(Version::new(major, minor, patch))
        })
        .max()
}

/// Overlap ratio between two entries.
///
/// `|A ∩ B| / min(|A|, |B|)` over their significant words; zero when either
/// side has none.
#[must_use]
pub fn overlap_ratio(a: &str, b: &str) -> f64 {
    token_overlap(&entry_tokens(a), &entry_tokens(b))
}

fn token_overlap(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / smaller as f64
}
