//! Cooldown gate and history rotation
//!
//! Session-scoped selection state: which suggestion kinds were already
//! shown, and when the last one fired. Nothing here is persisted; a fresh
//! session starts with an empty history and no cooldown.

use chrono::{DateTime, Duration, Utc};
use log::debug;

use crate::context::EnvironmentalContext;
use crate::features::suggestions::generator::{SuggestionCandidate, SuggestionPriority};

/// Temperature above which conditions count as urgent on their own
pub const URGENT_HEAT_C: f64 = 38.0;

/// Session-scoped suggestion selection state
#[derive(Debug, Default)]
pub struct SuggestionState {
    /// Ids already surfaced this session, append-only until rotation
    history: Vec<String>,
    /// When the last suggestion was surfaced; None models "never"
    last_fired_at: Option<DateTime<Utc>>,
}

impl SuggestionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids shown so far, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn last_fired_at(&self) -> Option<DateTime<Utc>> {
        self.last_fired_at
    }

    /// Pick the next suggestion to surface, or None.
    ///
    /// Order of checks: cooldown, history filter, rotation when every
    /// candidate was already shown, then priority (high, medium, first
    /// remaining) with insertion order breaking ties at every level.
    /// A successful pick records the id in history and stamps the cooldown.
    pub fn select_next(
        &mut self,
        now: DateTime<Utc>,
        cooldown: Duration,
        candidates: &[SuggestionCandidate],
    ) -> Option<SuggestionCandidate> {
        if let Some(last) = self.last_fired_at {
            if now - last < cooldown {
                debug!("Suggestion cooldown active, skipping selection");
                return None;
            }
        }

        if candidates.is_empty() {
            return None;
        }

        let fresh: Vec<&SuggestionCandidate> = candidates
            .iter()
            .filter(|c| !self.history.contains(&c.id))
            .collect();

        let picked = if fresh.is_empty() {
            // Every known candidate was already shown: rotate so a single
            // persistent condition is not suppressed forever
            debug!("Suggestion history exhausted, rotating");
            self.history.clear();
            &candidates[0]
        } else {
            fresh
                .iter()
                .find(|c| c.priority == SuggestionPriority::High)
                .or_else(|| {
                    fresh
                        .iter()
                        .find(|c| c.priority == SuggestionPriority::Medium)
                })
                .copied()
                .unwrap_or(fresh[0])
        };

        self.history.push(picked.id.clone());
        self.last_fired_at = Some(now);
        Some(picked.clone())
    }
}

/// Whether conditions are urgent enough to initiate a proactive suggestion
/// check at all. Independent of cooldown and history: a cheap pre-filter,
/// not a gate on delivery.
pub fn should_proactively_suggest(ctx: &EnvironmentalContext) -> bool {
    if !ctx.available {
        return false;
    }

    ctx.precipitation || ctx.temperature.is_some_and(|t| t > URGENT_HEAT_C)
}
