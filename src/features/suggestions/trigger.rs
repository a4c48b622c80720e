//! Proactive suggestion trigger loop
//!
//! Second repeating timer next to the reminder poller: on each tick it
//! fetches the environmental context, applies the urgency pre-filter, and
//! runs generation and selection. Selection state lives behind an async
//! mutex so a host-initiated check and the timer never interleave a
//! half-applied selection.

use chrono::Duration;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::context::ContextProvider;
use crate::core::Config;
use crate::features::suggestions::generator::{generate_suggestions, SuggestionCandidate};
use crate::features::suggestions::selector::{should_proactively_suggest, SuggestionState};
use crate::transcript::{Sender, Transcript};

/// Drives proactive suggestion checks on a fixed cadence
pub struct SuggestionTrigger {
    provider: Arc<dyn ContextProvider>,
    transcript: Arc<dyn Transcript>,
    clock: Arc<dyn Clock>,
    check_interval: std::time::Duration,
    cooldown: Duration,
    state: Arc<tokio::sync::Mutex<SuggestionState>>,
    task: Option<JoinHandle<()>>,
}

impl SuggestionTrigger {
    pub fn new(
        provider: Arc<dyn ContextProvider>,
        transcript: Arc<dyn Transcript>,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        SuggestionTrigger {
            provider,
            transcript,
            clock,
            check_interval: config.suggestion_interval(),
            cooldown: config.suggestion_cooldown(),
            state: Arc::new(tokio::sync::Mutex::new(SuggestionState::new())),
            task: None,
        }
    }

    /// Arm the check timer. The first check runs immediately.
    pub fn start(&mut self) {
        if self.task.is_some() {
            warn!("Suggestion trigger already running, ignoring start");
            return;
        }

        let provider = Arc::clone(&self.provider);
        let transcript = Arc::clone(&self.transcript);
        let clock = Arc::clone(&self.clock);
        let state = Arc::clone(&self.state);
        let cooldown = self.cooldown;
        let check_interval = self.check_interval;

        info!(
            "Suggestion trigger armed (every {}s, cooldown {}s)",
            check_interval.as_secs(),
            cooldown.num_seconds()
        );

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(check_interval);
            loop {
                ticker.tick().await;
                check_tick(
                    provider.as_ref(),
                    transcript.as_ref(),
                    clock.as_ref(),
                    &state,
                    cooldown,
                    true,
                )
                .await;
            }
        });

        self.task = Some(handle);
    }

    /// Tear down the check timer; selection state is kept for the session.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Suggestion trigger stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Run one proactive check by hand, urgency pre-filter included
    pub async fn check_once(&self) -> Option<SuggestionCandidate> {
        check_tick(
            self.provider.as_ref(),
            self.transcript.as_ref(),
            self.clock.as_ref(),
            &self.state,
            self.cooldown,
            true,
        )
        .await
    }

    /// Host-initiated check that skips the urgency pre-filter. Cooldown and
    /// history still apply; the pre-filter only decides when the engine
    /// bothers checking on its own.
    pub async fn suggest_now(&self) -> Option<SuggestionCandidate> {
        check_tick(
            self.provider.as_ref(),
            self.transcript.as_ref(),
            self.clock.as_ref(),
            &self.state,
            self.cooldown,
            false,
        )
        .await
    }
}

async fn check_tick(
    provider: &dyn ContextProvider,
    transcript: &dyn Transcript,
    clock: &dyn Clock,
    state: &tokio::sync::Mutex<SuggestionState>,
    cooldown: Duration,
    prefilter: bool,
) -> Option<SuggestionCandidate> {
    let ctx = provider.current().await;

    if prefilter && !should_proactively_suggest(&ctx) {
        debug!("Conditions not urgent, skipping suggestion check");
        return None;
    }

    let candidates = generate_suggestions(&ctx);
    if candidates.is_empty() {
        return None;
    }

    let picked = {
        let mut state = state.lock().await;
        state.select_next(clock.now(), cooldown, &candidates)?
    };

    info!("Surfacing suggestion {}", picked.id);
    transcript.append(&picked.message, Sender::Assistant).await;
    Some(picked)
}
