use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Layer, Registry};

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: SystemTime,
    pub level: tracing::Level,
    pub target: String,
    pub message: String,
    pub fields: Vec<String>,
}

impl LogEntry {
    pub fn timestamp_millis(&self) -> u128 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_millis())
            .unwrap_or(0)
    }

    pub fn format_line(&self) -> String {
        let millis = self.timestamp_millis();
        let mut line = format!(
            "[{:>6}.{:03}] {:<5} {:<10} {}",
            (millis / 1000) % 1_000_000,
            millis % 1000,
            self.level.as_str(),
            self.target,
            self.message
        );
        if !self.fields.is_empty() {
            line.push_str(" {");
            line.push_str(&self.fields.join(", "));
            line.push('}');
        }
        line
    }
}

struct LogRing {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    evicted: u64,
}

/// Shared ring of recent events for the diagnostics console. Once full, each
/// new event evicts the oldest one and bumps the eviction count.
#[derive(Clone)]
pub struct LogStore {
    ring: Arc<Mutex<LogRing>>,
}

impl LogStore {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            ring: Arc::new(Mutex::new(LogRing {
                entries: VecDeque::with_capacity(capacity),
                capacity,
                evicted: 0,
            })),
        }
    }

    pub fn record(&self, entry: LogEntry) {
        let Ok(mut ring) = self.ring.lock() else {
            return;
        };
        if ring.entries.len() == ring.capacity {
            ring.entries.pop_front();
            ring.evicted += 1;
        }
        ring.entries.push_back(entry);
    }

    pub fn recent(&self) -> Vec<LogEntry> {
        self.ring
            .lock()
            .map(|ring| ring.entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Events pushed out of the ring since startup.
    pub fn evicted(&self) -> u64 {
        self.ring.lock().map(|ring| ring.evicted).unwrap_or(0)
    }
}

impl fmt::Debug for LogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogStore")
            .field("evicted", &self.evicted())
            .finish_non_exhaustive()
    }
}

/// Console verbosity picked from the diagnostics tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn level(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.level().as_str())
    }
}

pub type ReloadHandle = reload::Handle<EnvFilter, Registry>;

/// Installs the global subscriber. `RUST_LOG` wins over `level` when set.
pub fn init_logging(store: LogStore, level: LogLevel) -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(level));
    let (reload_layer, handle) = reload::Layer::new(env_filter);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(false);

    let subscriber = Registry::default()
        .with(reload_layer)
        .with(LogCaptureLayer::new(store))
        .with(fmt_layer);

    let _ = tracing::subscriber::set_global_default(subscriber);

    handle
}

pub fn apply_log_level(handle: &ReloadHandle, level: LogLevel) {
    let new_filter = level_filter(level);
    let _ = handle.modify(|filter| {
        *filter = new_filter;
    });
}

fn level_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::default().add_directive(LevelFilter::from_level(level.level()).into())
}

struct LogCaptureLayer {
    store: LogStore,
}

impl LogCaptureLayer {
    fn new(store: LogStore) -> Self {
        Self { store }
    }
}

impl<S> Layer<S> for LogCaptureLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        self.store.record(LogEntry {
            timestamp: SystemTime::now(),
            level: *metadata.level(),
            target: metadata.target().to_string(),
            message: visitor.message.unwrap_or_default(),
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        let value = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(value.trim_matches('"').to_string());
        } else {
            self.fields
                .push(format!("{}={}", field.name(), value.trim_matches('"')));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(message: &str) -> LogEntry {
        LogEntry {
            timestamp: UNIX_EPOCH,
            level: tracing::Level::INFO,
            target: "flow".to_string(),
            message: message.to_string(),
            fields: Vec::new(),
        }
    }

    #[test]
    fn full_store_evicts_oldest_entries() {
        let store = LogStore::with_capacity(2);
        store.record(entry("one"));
        store.record(entry("two"));
        assert_eq!(store.evicted(), 0);
        store.record(entry("three"));

        let messages: Vec<String> = store
            .recent()
            .into_iter()
            .map(|entry| entry.message)
            .collect();
        assert_eq!(messages, vec!["two", "three"]);
        assert_eq!(store.evicted(), 1);
    }

    #[test]
    fn zero_capacity_keeps_latest_entry() {
        let store = LogStore::with_capacity(0);
        store.record(entry("one"));
        store.record(entry("two"));

        let recent = store.recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].message, "two");
    }

    #[test]
    fn level_picker_labels_match_tracing() {
        let labels: Vec<String> = LogLevel::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["ERROR", "WARN", "INFO", "DEBUG", "TRACE"]);
        assert_eq!(LogLevel::default().level(), tracing::Level::INFO);
    }

    #[test]
    fn line_includes_fields() {
        let mut entry = entry("Preset selected");
        entry.fields = vec!["bottles=1".to_string()];
        let line = entry.format_line();
        assert!(line.contains("INFO"));
        assert!(line.contains("flow"));
        assert!(line.ends_with("Preset selected {bottles=1}"));
    }

    #[test]
    fn captured_events_reach_store() {
        let store = LogStore::with_capacity(8);
        let subscriber = Registry::default().with(LogCaptureLayer::new(store.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "sync", stage = 2, "Machine sync stage");
        });

        let entries = store.recent();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target, "sync");
        assert_eq!(entries[0].message, "Machine sync stage");
        assert_eq!(entries[0].fields, vec!["stage=2".to_string()]);
    }
}
