//! Reminder store seam
//!
//! The engine does not own persistence; it reads and mutates reminder
//! records through [`ReminderStore`]. The store is the durable source of
//! truth for the `active` flag — once the engine flips a record inactive it
//! never flips it back, so a restarted process cannot re-fetch an already
//! delivered reminder.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.3.0
//!
//! ## Changelog
//! - 1.2.0: Added insert/list_pending for the scheduling surface
//! - 1.1.0: Added MemoryStore reference implementation
//! - 1.0.0: Initial trait definition with fetch_due and mark_inactive

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// A reminder as stored by the external durable store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderRecord {
    /// Opaque unique identifier
    pub id: String,
    /// Subject user; every query is scoped to one owner
    pub owner_id: String,
    /// Free-form delivery payload
    pub text: String,
    /// Absolute due timestamp
    pub due_at: DateTime<Utc>,
    /// True until the reminder fires or is cancelled
    pub active: bool,
}

/// External durable store for reminder records
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Fetch records owned by `owner_id` with `active = true` and
    /// `due_at` within `[from, to]` inclusive.
    async fn fetch_due(
        &self,
        owner_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ReminderRecord>>;

    /// Persist a newly scheduled reminder
    async fn insert(&self, record: ReminderRecord) -> Result<()>;

    /// All active records for an owner, soonest first
    async fn list_pending(&self, owner_id: &str) -> Result<Vec<ReminderRecord>>;

    /// Flip a record's `active` flag to false. One-way: the engine never
    /// reactivates a record.
    async fn mark_inactive(&self, id: &str) -> Result<()>;
}

/// In-memory store keyed by record id.
///
/// Useful for tests and for hosts that keep reminders session-scoped;
/// production deployments implement [`ReminderStore`] over their own
/// database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, ReminderRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held (active or not)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ReminderStore for MemoryStore {
    async fn fetch_due(
        &self,
        owner_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ReminderRecord>> {
        let mut due: Vec<ReminderRecord> = self
            .records
            .iter()
            .filter(|entry| {
                let r = entry.value();
                r.owner_id == owner_id && r.active && r.due_at >= from && r.due_at <= to
            })
            .map(|entry| entry.value().clone())
            .collect();

        due.sort_by_key(|r| r.due_at);
        Ok(due)
    }

    async fn insert(&self, record: ReminderRecord) -> Result<()> {
        if self.records.contains_key(&record.id) {
            bail!("duplicate reminder id: {}", record.id);
        }
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn list_pending(&self, owner_id: &str) -> Result<Vec<ReminderRecord>> {
        let mut pending: Vec<ReminderRecord> = self
            .records
            .iter()
            .filter(|entry| entry.value().owner_id == owner_id && entry.value().active)
            .map(|entry| entry.value().clone())
            .collect();

        pending.sort_by_key(|r| r.due_at);
        Ok(pending)
    }

    async fn mark_inactive(&self, id: &str) -> Result<()> {
        match self.records.get_mut(id) {
            Some(mut entry) => {
                entry.value_mut().active = false;
                Ok(())
            }
            None => bail!("unknown reminder id: {id}"),
        }
    }
}
