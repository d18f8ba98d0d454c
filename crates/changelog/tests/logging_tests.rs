//! Tests for the structured events emitted while processing changelogs.

use bumpwright_changelog::{ChangelogProcessor, deduplicate_entries};
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// A captured event with its level and recorded fields.
#[derive(Debug, Clone)]
struct CapturedEvent {
    level: Level,
    fields: Vec<(String, String)>,
}

impl CapturedEvent {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn message(&self) -> &str {
        self.field("message").unwrap_or_default()
    }
}

struct FieldVisitor {
    fields: Vec<(String, String)>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields
            .push((field.name().to_string(), value.to_string()));
    }
}

/// Layer that keeps every event for later assertions.
struct EventCollector {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S: Subscriber> Layer<S> for EventCollector {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor { fields: Vec::new() };
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.fields,
        });
    }
}

/// Run `f` with a collecting subscriber installed on this thread.
fn capture<F: FnOnce()>(f: F) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(EventCollector {
        events: Arc::clone(&events),
    });
    tracing::subscriber::with_default(subscriber, f);
    events.lock().unwrap().clone()
}

#[test]
fn test_dropped_duplicate_is_logged_with_survivor() {
    let entries = [
        "- Fixed crash when opening large files",
        "- Fixed crash when opening large files on Windows",
    ];
    let events = capture(|| {
        assert_eq!(deduplicate_entries(&entries), [entries[1]]);
    });

    let dropped = events
        .iter()
        .find(|e| e.message() == "Dropped overlapping changelog entry")
        .expect("dedup event");
    assert_eq!(dropped.level, Level::DEBUG);
    assert_eq!(dropped.field("kept"), Some(entries[1]));
    assert_eq!(dropped.field("dropped"), Some(entries[0]));
}

#[test]
fn test_release_events() {
    let processor = ChangelogProcessor::default_config()
        .with_release_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());

    let doc = ["## [Unreleased]", "### Added", "- Feature", "## [1.0.0] - 2024-01-01"];
    let events = capture(|| {
        processor.process_changelog(&doc).unwrap();
    });
    let prepared = events
        .iter()
        .find(|e| e.message() == "Prepared changelog release")
        .expect("release event");
    assert_eq!(prepared.level, Level::INFO);
    assert_eq!(prepared.field("previous"), Some("1.0.0"));
    assert_eq!(prepared.field("version"), Some("1.1.0"));
    assert_eq!(prepared.field("bump"), Some("minor"));

    let raw = ["## [Unreleased]", "Initial public release."];
    let events = capture(|| {
        processor.process_new_changelog(&raw).unwrap();
    });
    assert!(events.iter().any(|e| e.level == Level::WARN
        && e.message() == "No categorized entries in unreleased section, releasing raw content"));
}
