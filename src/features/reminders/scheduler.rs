//! Due-reminder polling and exactly-once delivery
//!
//! The scheduler arms a repeating timer that queries the store for records
//! whose due time falls inside a bounded lookback window. Ticks fire on
//! wall-clock cadence and do not wait for the previous tick to finish, so
//! two ticks can observe the same record while a `mark_inactive` call is
//! still in flight. The process-local dedup set, inserted into *before* any
//! message is composed, is the safeguard that keeps delivery at-most-once
//! within a process lifetime. Across restarts the store's `active` flag is
//! the source of truth: a delivered record is never re-fetched.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashSet;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::clock::Clock;
use crate::core::Config;
use crate::features::reminders::composer;
use crate::store::{ReminderRecord, ReminderStore};
use crate::transcript::{Sender, Transcript};

/// Polls the store for due reminders and delivers each at most once
pub struct ReminderScheduler {
    store: Arc<dyn ReminderStore>,
    transcript: Arc<dyn Transcript>,
    clock: Arc<dyn Clock>,
    poll_interval: std::time::Duration,
    lookback: Duration,
    /// Ids already fired this process lifetime; never persisted
    delivered: Arc<DashSet<String>>,
    task: Option<JoinHandle<()>>,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        transcript: Arc<dyn Transcript>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        ReminderScheduler {
            store,
            transcript,
            clock,
            poll_interval: config.poll_interval(),
            lookback: config.due_lookback(),
            delivered: Arc::new(DashSet::new()),
            task: None,
        }
    }

    /// Arm the polling timer for the given owner. The first tick runs
    /// immediately. With no resolved owner the scheduler stays inert and
    /// no timer is armed.
    pub fn start(&mut self, owner_id: Option<&str>) {
        let Some(owner_id) = owner_id else {
            debug!("No resolved owner, reminder poller stays inert");
            return;
        };

        if self.task.is_some() {
            warn!("Reminder poller already running, ignoring start");
            return;
        }

        let owner = owner_id.to_string();
        let store = Arc::clone(&self.store);
        let transcript = Arc::clone(&self.transcript);
        let clock = Arc::clone(&self.clock);
        let delivered = Arc::clone(&self.delivered);
        let lookback = self.lookback;
        let poll_interval = self.poll_interval;

        info!(
            "Reminder poller armed for {owner} (every {}s, lookback {}s)",
            poll_interval.as_secs(),
            lookback.num_seconds()
        );

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            loop {
                ticker.tick().await;

                let store = Arc::clone(&store);
                let transcript = Arc::clone(&transcript);
                let clock = Arc::clone(&clock);
                let delivered = Arc::clone(&delivered);
                let owner = owner.clone();

                // Each tick body runs detached so a slow store call never
                // delays the wall-clock cadence of later ticks.
                tokio::spawn(async move {
                    let now = clock.now();
                    match poll_tick(
                        store.as_ref(),
                        transcript.as_ref(),
                        &delivered,
                        &owner,
                        now,
                        lookback,
                    )
                    .await
                    {
                        Ok(0) => {}
                        Ok(n) => info!("Delivered {n} due reminder(s) for {owner}"),
                        Err(e) => warn!("Due-reminder fetch failed for {owner}: {e}"),
                    }
                });
            }
        });

        self.task = Some(handle);
    }

    /// Tear down the polling timer. Tick bodies already in flight are not
    /// cancelled; their results are simply no longer observed.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Reminder poller stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Run one poll tick by hand. Returns how many reminders were delivered.
    pub async fn poll_once(&self, owner_id: &str) -> Result<usize> {
        poll_tick(
            self.store.as_ref(),
            self.transcript.as_ref(),
            &self.delivered,
            owner_id,
            self.clock.now(),
            self.lookback,
        )
        .await
    }

    /// Schedule a new reminder at an absolute time and confirm it in chat.
    /// Returns the new record's id.
    pub async fn schedule(
        &self,
        owner_id: &str,
        text: &str,
        due_at: DateTime<Utc>,
    ) -> Result<String> {
        let record = ReminderRecord {
            id: Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            text: text.to_string(),
            due_at,
            active: true,
        };
        let id = record.id.clone();

        self.store.insert(record).await?;
        info!("Created reminder {id} for {owner_id} due at {due_at}");

        let when = composer::format_relative(self.clock.now(), due_at);
        let confirmation = composer::confirmation_message(text, &when);
        self.transcript.append(&confirmation, Sender::Assistant).await;

        Ok(id)
    }

    /// Schedule a new reminder by offset, e.g. "30m" or "1h30m"
    pub async fn schedule_in(&self, owner_id: &str, text: &str, offset: &str) -> Result<String> {
        let duration = composer::parse_duration(offset)
            .ok_or_else(|| anyhow::anyhow!("invalid duration: {offset:?}"))?;
        self.schedule(owner_id, text, self.clock.now() + duration).await
    }

    /// All active reminders for an owner, soonest first
    pub async fn list_pending(&self, owner_id: &str) -> Result<Vec<ReminderRecord>> {
        self.store.list_pending(owner_id).await
    }

    /// Cancel an active reminder. Returns false when the id does not exist
    /// or belongs to a different owner.
    pub async fn cancel(&self, owner_id: &str, id: &str) -> Result<bool> {
        let pending = self.store.list_pending(owner_id).await?;
        if !pending.iter().any(|r| r.id == id) {
            return Ok(false);
        }

        self.store.mark_inactive(id).await?;
        info!("Cancelled reminder {id} for {owner_id}");
        Ok(true)
    }
}

/// One poll tick: fetch the due window, deliver anything not yet fired,
/// then best-effort mark each delivered record inactive.
async fn poll_tick(
    store: &dyn ReminderStore,
    transcript: &dyn Transcript,
    delivered: &DashSet<String>,
    owner_id: &str,
    now: DateTime<Utc>,
    lookback: Duration,
) -> Result<usize> {
    // Fetch failure aborts this tick only; the timer keeps its schedule
    let due = store.fetch_due(owner_id, now - lookback, now).await?;
    let mut count = 0;

    for record in due {
        // Eager insert: claim the id before composing anything, so an
        // overlapping tick that fetched the same record backs off here.
        // DashSet::insert returns false when the id was already claimed.
        if !delivered.insert(record.id.clone()) {
            continue;
        }

        let message = composer::firing_message(&record.text);
        transcript.append(&message, Sender::Assistant).await;
        debug!("Fired reminder {} for {owner_id}", record.id);

        // Deliver-then-best-effort-persist: a failed mutation is logged,
        // not retried; the local dedup entry keeps delivery at-most-once.
        if let Err(e) = store.mark_inactive(&record.id).await {
            warn!("Failed to mark reminder {} inactive: {e}", record.id);
        }

        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::transcript::{ChatMessage, MpscTranscript};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Clock pinned to a settable instant
    struct ManualClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        fn at(now: DateTime<Utc>) -> Self {
            ManualClock {
                now: Mutex::new(now),
            }
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().unwrap()
        }
    }

    /// Store whose mutations always fail, to model an in-flight or broken
    /// store update while fetches keep succeeding
    struct FailingMutationStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl ReminderStore for FailingMutationStore {
        async fn fetch_due(
            &self,
            owner_id: &str,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<Vec<ReminderRecord>> {
            self.inner.fetch_due(owner_id, from, to).await
        }

        async fn insert(&self, record: ReminderRecord) -> Result<()> {
            self.inner.insert(record).await
        }

        async fn list_pending(&self, owner_id: &str) -> Result<Vec<ReminderRecord>> {
            self.inner.list_pending(owner_id).await
        }

        async fn mark_inactive(&self, _id: &str) -> Result<()> {
            anyhow::bail!("store unavailable")
        }
    }

    fn test_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()
    }

    fn record(id: &str, owner: &str, text: &str, due_at: DateTime<Utc>) -> ReminderRecord {
        ReminderRecord {
            id: id.to_string(),
            owner_id: owner.to_string(),
            text: text.to_string(),
            due_at,
            active: true,
        }
    }

    fn scheduler_with(
        store: Arc<dyn ReminderStore>,
        now: DateTime<Utc>,
    ) -> (ReminderScheduler, mpsc::UnboundedReceiver<ChatMessage>) {
        let _ = env_logger::builder().is_test(true).try_init();
        let (transcript, receiver) = MpscTranscript::new();
        let scheduler = ReminderScheduler::new(
            store,
            Arc::new(transcript),
            Arc::new(ManualClock::at(now)),
            &Config::default(),
        );
        (scheduler, receiver)
    }

    #[tokio::test]
    async fn test_due_record_delivered_exactly_once() {
        let now = test_now();
        let store = Arc::new(MemoryStore::new());
        store
            .insert(record("r1", "u1", "drink water", now - Duration::minutes(2)))
            .await
            .unwrap();

        let (scheduler, mut receiver) = scheduler_with(store.clone(), now);

        assert_eq!(scheduler.poll_once("u1").await.unwrap(), 1);
        let message = receiver.recv().await.unwrap();
        assert!(message.content.contains("drink water"));
        assert_eq!(message.sender, Sender::Assistant);

        // Store saw the mutation, so the record left the due window
        assert!(store.list_pending("u1").await.unwrap().is_empty());

        // An immediate second tick delivers nothing further
        assert_eq!(scheduler.poll_once("u1").await.unwrap(), 0);
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_bounded_staleness() {
        let now = test_now();
        let lookback = Config::default().due_lookback();
        let store = Arc::new(MemoryStore::new());

        // Just outside the window: treated as missed, never delivered
        store
            .insert(record("stale", "u1", "old news", now - lookback - Duration::seconds(1)))
            .await
            .unwrap();
        // Just inside the window: delivered on the next tick
        store
            .insert(record("fresh", "u1", "still good", now - Duration::seconds(1)))
            .await
            .unwrap();

        let (scheduler, mut receiver) = scheduler_with(store, now);

        assert_eq!(scheduler.poll_once("u1").await.unwrap(), 1);
        let message = receiver.recv().await.unwrap();
        assert!(message.content.contains("still good"));
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_at_most_once_when_mutation_never_lands() {
        let now = test_now();
        let inner = MemoryStore::new();
        inner
            .insert(record("r1", "u1", "stretch", now - Duration::minutes(1)))
            .await
            .unwrap();
        let store = Arc::new(FailingMutationStore { inner });

        let (scheduler, mut receiver) = scheduler_with(store, now);

        // First tick delivers despite the failed mutation
        assert_eq!(scheduler.poll_once("u1").await.unwrap(), 1);
        assert!(receiver.recv().await.is_some());

        // The record is still active store-side and re-fetched, but the
        // dedup set keeps the second tick silent
        assert_eq!(scheduler.poll_once("u1").await.unwrap(), 0);
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_fetch_error_aborts_tick_only() {
        struct BrokenStore;

        #[async_trait]
        impl ReminderStore for BrokenStore {
            async fn fetch_due(
                &self,
                _owner_id: &str,
                _from: DateTime<Utc>,
                _to: DateTime<Utc>,
            ) -> Result<Vec<ReminderRecord>> {
                anyhow::bail!("connection refused")
            }
            async fn insert(&self, _record: ReminderRecord) -> Result<()> {
                Ok(())
            }
            async fn list_pending(&self, _owner_id: &str) -> Result<Vec<ReminderRecord>> {
                Ok(vec![])
            }
            async fn mark_inactive(&self, _id: &str) -> Result<()> {
                Ok(())
            }
        }

        let (scheduler, mut receiver) = scheduler_with(Arc::new(BrokenStore), test_now());

        assert!(scheduler.poll_once("u1").await.is_err());
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_schedule_confirms_in_chat() {
        let now = test_now();
        let store = Arc::new(MemoryStore::new());
        let (scheduler, mut receiver) = scheduler_with(store.clone(), now);

        let id = scheduler
            .schedule("u1", "call the dentist", now + Duration::minutes(20))
            .await
            .unwrap();

        let confirmation = receiver.recv().await.unwrap();
        assert!(confirmation.content.contains("call the dentist"));
        assert!(confirmation.content.contains("in 20 minutes"));

        let pending = scheduler.list_pending("u1").await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, id);
    }

    #[tokio::test]
    async fn test_schedule_in_rejects_bad_duration() {
        let (scheduler, _receiver) = scheduler_with(Arc::new(MemoryStore::new()), test_now());
        assert!(scheduler.schedule_in("u1", "stretch", "soonish").await.is_err());
    }

    #[tokio::test]
    async fn test_cancel_checks_ownership() {
        let now = test_now();
        let store = Arc::new(MemoryStore::new());
        store
            .insert(record("r1", "u1", "water plants", now + Duration::hours(1)))
            .await
            .unwrap();

        let (scheduler, _receiver) = scheduler_with(store, now);

        assert!(!scheduler.cancel("u2", "r1").await.unwrap());
        assert!(scheduler.cancel("u1", "r1").await.unwrap());
        // Already cancelled
        assert!(!scheduler.cancel("u1", "r1").await.unwrap());
    }

    #[tokio::test]
    async fn test_start_requires_resolved_owner() {
        let (mut scheduler, _receiver) = scheduler_with(Arc::new(MemoryStore::new()), test_now());

        scheduler.start(None);
        assert!(!scheduler.is_running());

        scheduler.start(Some("u1"));
        assert!(scheduler.is_running());

        scheduler.stop();
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_loop_delivers_once_across_many_ticks() {
        let now = test_now();
        let store = Arc::new(MemoryStore::new());
        store
            .insert(record("r1", "u1", "take a break", now - Duration::minutes(1)))
            .await
            .unwrap();

        let (transcript, mut receiver) = MpscTranscript::new();
        let mut scheduler = ReminderScheduler::new(
            store,
            Arc::new(transcript),
            Arc::new(ManualClock::at(now)),
            &Config {
                poll_interval_secs: 1,
                ..Config::default()
            },
        );

        scheduler.start(Some("u1"));
        // Paused-time sleep lets several ticks elapse instantly
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        scheduler.stop();

        let message = receiver.recv().await.unwrap();
        assert!(message.content.contains("take a break"));
        assert!(receiver.try_recv().is_err());
    }
}
