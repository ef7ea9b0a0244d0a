//! Client-local log of the most recent create/verify actions.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Create,
    Verify,
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryAction::Create => f.write_str("create"),
            HistoryAction::Verify => f.write_str("verify"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub action: HistoryAction,
    pub record_id: String,
    pub record_name: String,
    pub at: DateTime<Local>,
    pub address: String,
}

/// Newest-first, bounded. Never persisted.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.limit);
    }

    pub fn record(
        &mut self,
        action: HistoryAction,
        record_id: impl Into<String>,
        record_name: impl Into<String>,
        address: impl Into<String>,
    ) {
        self.push(HistoryEntry {
            action,
            record_id: record_id.into(),
            record_name: record_name.into(),
            at: Local::now(),
            address: address.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }
}
