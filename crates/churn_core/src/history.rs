//! Session history of submitted forms, newest first

use crate::form::FormSnapshot;
use crate::prediction::Prediction;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;

/// One successful submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub input: FormSnapshot,
    pub output: Prediction,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(input: FormSnapshot, output: Prediction) -> Self {
        Self {
            input,
            output,
            recorded_at: Utc::now(),
        }
    }
}

/// In-memory log of predictions. Unbounded unless the integrator asks for a
/// cap, in which case the oldest entry is dropped on overflow.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
    #[serde(skip)]
    limit: Option<usize>,
}

impl HistoryLog {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Keep at most `limit` entries (a limit of zero is treated as one)
    pub fn bounded(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: Some(limit.max(1)),
        }
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        match limit {
            Some(limit) => Self::bounded(limit),
            None => Self::unbounded(),
        }
    }

    /// Prepend an entry
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        if let Some(limit) = self.limit {
            self.entries.truncate(limit);
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tag: &str, output: Prediction) -> HistoryEntry {
        HistoryEntry::new(FormSnapshot::from(vec![tag.to_string()]), output)
    }

    #[test]
    fn test_record_is_newest_first() {
        let mut log = HistoryLog::unbounded();
        log.record(entry("first", Prediction::Stay));
        log.record(entry("second", Prediction::Churn));

        assert_eq!(log.len(), 2);
        assert_eq!(log.latest().unwrap().input[0], "second");
        assert_eq!(log.get(1).unwrap().output, Prediction::Stay);
    }

    #[test]
    fn test_bounded_drops_oldest() {
        let mut log = HistoryLog::bounded(2);
        for tag in ["a", "b", "c"] {
            log.record(entry(tag, Prediction::Stay));
        }

        let tags: Vec<&str> = log.iter().map(|e| e.input[0].as_str()).collect();
        assert_eq!(tags, vec!["c", "b"]);
        assert_eq!(log.limit(), Some(2));
    }

    #[test]
    fn test_serializes_as_list() {
        let mut log = HistoryLog::unbounded();
        log.record(entry("x", Prediction::Churn));

        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json[0]["input"][0], "x");
        assert_eq!(json[0]["output"], 1);
    }
}
