use std::fmt;
use std::sync::Mutex;

/// Step of the chapter pipeline an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Open,
    Metadata,
    Switch,
    Rows,
    Align,
    Restore,
    Close,
    Persist,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Open => "open",
            Phase::Metadata => "metadata",
            Phase::Switch => "switch",
            Phase::Rows => "rows",
            Phase::Align => "align",
            Phase::Restore => "restore",
            Phase::Close => "close",
            Phase::Persist => "persist",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

/// A structured record of something that happened while processing a chapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeEvent {
    pub chapter: String,
    pub phase: Phase,
    pub level: EventLevel,
    pub reason: Option<&'static str>,
    pub message: String,
}

impl ScrapeEvent {
    pub fn info(chapter: &str, phase: Phase, message: impl Into<String>) -> Self {
        Self {
            chapter: chapter.to_string(),
            phase,
            level: EventLevel::Info,
            reason: None,
            message: message.into(),
        }
    }

    pub fn warn(chapter: &str, phase: Phase, reason: &'static str, message: impl Into<String>) -> Self {
        Self {
            chapter: chapter.to_string(),
            phase,
            level: EventLevel::Warn,
            reason: Some(reason),
            message: message.into(),
        }
    }

    pub fn error(chapter: &str, phase: Phase, reason: &'static str, message: impl Into<String>) -> Self {
        Self {
            chapter: chapter.to_string(),
            phase,
            level: EventLevel::Error,
            reason: Some(reason),
            message: message.into(),
        }
    }
}

/// Receives pipeline events; injected so the core never logs through globals
pub trait EventSink: Send + Sync {
    fn record(&self, event: &ScrapeEvent);
}

/// Forwards events to `tracing` with the chapter, phase and reason as fields
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &ScrapeEvent) {
        let reason = event.reason.unwrap_or("-");
        match event.level {
            EventLevel::Info => tracing::info!(
                chapter = %event.chapter,
                phase = %event.phase,
                "{}",
                event.message
            ),
            EventLevel::Warn => tracing::warn!(
                chapter = %event.chapter,
                phase = %event.phase,
                reason,
                "{}",
                event.message
            ),
            EventLevel::Error => tracing::error!(
                chapter = %event.chapter,
                phase = %event.phase,
                reason,
                "{}",
                event.message
            ),
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ScrapeEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ScrapeEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Events at `level`, in the order they were recorded
    pub fn at_level(&self, level: EventLevel) -> Vec<ScrapeEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &ScrapeEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order() {
        let sink = MemorySink::new();
        sink.record(&ScrapeEvent::info("u", Phase::Open, "loaded"));
        sink.record(&ScrapeEvent::warn("u", Phase::Align, "row_defect", "skipped"));
        sink.record(&ScrapeEvent::error("u", Phase::Rows, "page_error", "boom"));

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].phase, Phase::Open);
        assert_eq!(events[2].reason, Some("page_error"));
        assert_eq!(sink.at_level(EventLevel::Warn).len(), 1);
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::Restore.to_string(), "restore");
        assert_eq!(Phase::Persist.as_str(), "persist");
    }
}
