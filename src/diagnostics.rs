//! Soft-failure reporting.
//!
//! Plumbing that can partly fail (OCR calls, PDF text reading) reports through
//! an injected [`FailureSink`] and carries on. The pure extraction core never
//! needs one.

use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::warn;

use crate::schema::now_iso8601;

/// Receiver for non-fatal problems.
pub trait FailureSink: Send + Sync {
    fn report(&self, context: &str, message: &str);
}

/// Sink that drops every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl FailureSink for Discard {
    fn report(&self, _context: &str, _message: &str) {}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureEntry {
    pub context: String,
    pub message: String,
    pub at: String,
}

/// Bounded in-memory log of reported failures, also emitted as warnings.
#[derive(Debug, Clone)]
pub struct FailureLog {
    entries: Arc<RwLock<Vec<FailureEntry>>>,
    capacity: usize,
}

impl Default for FailureLog {
    fn default() -> Self {
        Self::with_capacity(200)
    }
}

impl FailureLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            capacity: capacity.max(1),
        }
    }

    /// Logged entries, oldest first.
    pub fn entries(&self) -> Vec<FailureEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl FailureSink for FailureLog {
    fn report(&self, context: &str, message: &str) {
        warn!("{}: {}", context, message);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.len() >= self.capacity {
            let overflow = entries.len() + 1 - self.capacity;
            entries.drain(..overflow);
        }
        entries.push(FailureEntry {
            context: context.to_string(),
            message: message.to_string(),
            at: now_iso8601(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_records_in_order() {
        let log = FailureLog::new();
        log.report("OCR Timeout", "took too long");
        log.report("PDF Text", "no text layer");
        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].context, "OCR Timeout");
        assert_eq!(entries[1].message, "no text layer");
    }

    #[test]
    fn test_log_drops_oldest_past_capacity() {
        let log = FailureLog::with_capacity(2);
        for i in 0..5 {
            log.report("ctx", &i.to_string());
        }
        let messages: Vec<String> = log.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["3", "4"]);
    }

    #[test]
    fn test_clones_share_entries() {
        let log = FailureLog::new();
        let sink: &dyn FailureSink = &log.clone();
        sink.report("ctx", "msg");
        assert_eq!(log.entries().len(), 1);
        Discard.report("ctx", "ignored");
    }
}
