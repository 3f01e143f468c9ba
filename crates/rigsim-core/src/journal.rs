//! Notification journal - every event emitted by every hosted component

use hecs::Entity;
use rigsim_logic::{ComponentEvent, FailureReason};
use std::collections::VecDeque;

/// Oldest entries are dropped past this many.
pub const DEFAULT_JOURNAL_LIMIT: usize = 10_000;

/// One notification, stamped with when and where it happened
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub tick: u64,
    pub entity: Entity,
    pub component_name: String,
    pub event: ComponentEvent,
}

#[derive(Debug, Clone)]
pub struct NotificationJournal {
    entries: VecDeque<JournalEntry>,
    limit: usize,
}

impl NotificationJournal {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_JOURNAL_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Append a batch of events from one component
    pub fn record_all(
        &mut self,
        tick: u64,
        entity: Entity,
        component_name: &str,
        events: impl IntoIterator<Item = ComponentEvent>,
    ) {
        for event in events {
            if self.entries.len() == self.limit {
                self.entries.pop_front();
            }
            self.entries.push_back(JournalEntry {
                tick,
                entity,
                component_name: component_name.to_string(),
                event,
            });
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Failures recorded for one component, oldest first
    pub fn failures_for(&self, entity: Entity) -> impl Iterator<Item = &FailureReason> {
        self.entries
            .iter()
            .filter(move |e| e.entity == entity)
            .filter_map(|e| e.event.failure())
    }

    pub fn drain(&mut self) -> Vec<JournalEntry> {
        self.entries.drain(..).collect()
    }
}

impl Default for NotificationJournal {
    fn default() -> Self {
        Self::new()
    }
}
