//! Rule-based suggestion generator
//!
//! Pure mapping from an environmental snapshot to candidate suggestions.
//! Every rule is evaluated independently, so several candidates can fire at
//! once; emission order is fixed and acts as the tie-break downstream.
//! Candidate ids are fixed per rule, never per invocation: the same
//! condition always yields the same id, which is what makes history-based
//! suppression work.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::context::{EnvironmentalContext, TimeOfDay};

/// Above this temperature the extreme-heat hydration rule fires
pub const EXTREME_HEAT_C: f64 = 35.0;
/// Above this temperature the warm hydration rule fires, and the
/// "hot" flag used by the humidity and outdoor rules is set
pub const HOT_C: f64 = 30.0;
/// Below this temperature the "cold" flag is set
pub const COLD_C: f64 = 12.0;
/// Above this relative humidity the humid-heat rule may fire
pub const HUMID_PCT: f64 = 70.0;
/// Comfortable range for the outdoor rule
pub const MILD_RANGE_C: std::ops::RangeInclusive<f64> = 18.0..=28.0;

const INDOOR_MESSAGES: &[&str] = &[
    "🌧️ Rainy outside. A good moment for a book or a movie indoors.",
    "🌧️ It's raining. How about something cozy indoors?",
    "🌧️ Wet weather out there. Stay dry and take it easy inside.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestionCategory {
    Hydration,
    Indoor,
    Outdoor,
    Comfort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SuggestionPriority {
    Low,
    Medium,
    High,
}

/// A candidate suggestion for the current conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionCandidate {
    /// Stable identifier for the suggestion kind, fixed per rule
    pub id: String,
    pub category: SuggestionCategory,
    pub priority: SuggestionPriority,
    /// Rendered text, assistant-voiced
    pub message: String,
}

impl SuggestionCandidate {
    fn new(
        id: &str,
        category: SuggestionCategory,
        priority: SuggestionPriority,
        message: &str,
    ) -> Self {
        SuggestionCandidate {
            id: id.to_string(),
            category,
            priority,
            message: message.to_string(),
        }
    }
}

/// Map the current context to candidate suggestions.
///
/// An unavailable context yields no candidates; a missing reading simply
/// keeps the rules that need it from firing.
pub fn generate_suggestions(ctx: &EnvironmentalContext) -> Vec<SuggestionCandidate> {
    if !ctx.available {
        return vec![];
    }

    let hot = ctx.temperature.is_some_and(|t| t > HOT_C);
    let cold = ctx.temperature.is_some_and(|t| t < COLD_C);
    let mut candidates = Vec::new();

    if let Some(temp) = ctx.temperature {
        if temp > EXTREME_HEAT_C {
            candidates.push(SuggestionCandidate::new(
                "hydration-extreme",
                SuggestionCategory::Hydration,
                SuggestionPriority::High,
                "🥵 Extreme heat right now. Keep a water bottle close and sip often.",
            ));
        } else if temp > HOT_C {
            candidates.push(SuggestionCandidate::new(
                "hydration-warm",
                SuggestionCategory::Hydration,
                SuggestionPriority::Medium,
                "☀️ It's quite warm today. Remember to stay hydrated.",
            ));
        }
    }

    if ctx.precipitation {
        let message = INDOOR_MESSAGES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(INDOOR_MESSAGES[0]);
        candidates.push(SuggestionCandidate::new(
            "indoor-rain",
            SuggestionCategory::Indoor,
            SuggestionPriority::Low,
            message,
        ));
    }

    if cold {
        candidates.push(SuggestionCandidate::new(
            "comfort-cold",
            SuggestionCategory::Comfort,
            SuggestionPriority::Low,
            "🧣 It's cold out there. Dress warm and keep comfortable.",
        ));
    }

    if hot && ctx.humidity.is_some_and(|h| h > HUMID_PCT) {
        candidates.push(SuggestionCandidate::new(
            "hydration-humid",
            SuggestionCategory::Hydration,
            SuggestionPriority::Medium,
            "💧 Hot and humid right now. You lose fluids faster, so drink a little extra.",
        ));
    }

    let mild = ctx.temperature.is_some_and(|t| MILD_RANGE_C.contains(&t));
    let good_time = matches!(
        ctx.time_of_day,
        Some(TimeOfDay::Afternoon) | Some(TimeOfDay::Evening)
    );
    if !ctx.precipitation && !hot && !cold && mild && good_time {
        candidates.push(SuggestionCandidate::new(
            "outdoor-pleasant",
            SuggestionCategory::Outdoor,
            SuggestionPriority::Low,
            "🌤️ The weather is lovely right now. A short walk outside could do you good.",
        ));
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(temperature: Option<f64>) -> EnvironmentalContext {
        EnvironmentalContext {
            temperature,
            humidity: None,
            precipitation: false,
            time_of_day: Some(TimeOfDay::Morning),
            available: true,
        }
    }

    fn ids(candidates: &[SuggestionCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_unavailable_context_yields_nothing() {
        let ctx = EnvironmentalContext::unavailable();
        assert!(generate_suggestions(&ctx).is_empty());
    }

    #[test]
    fn test_extreme_heat_is_high_priority() {
        let candidates = generate_suggestions(&context(Some(38.0)));
        assert_eq!(ids(&candidates), vec!["hydration-extreme"]);
        assert_eq!(candidates[0].priority, SuggestionPriority::High);
        assert_eq!(candidates[0].category, SuggestionCategory::Hydration);
    }

    #[test]
    fn test_warm_band_is_medium_priority() {
        let candidates = generate_suggestions(&context(Some(32.0)));
        assert_eq!(ids(&candidates), vec!["hydration-warm"]);
        assert_eq!(candidates[0].priority, SuggestionPriority::Medium);

        // Boundary: exactly 35 stays in the warm band, exactly 30 fires nothing
        assert_eq!(ids(&generate_suggestions(&context(Some(35.0)))), vec!["hydration-warm"]);
        assert!(generate_suggestions(&context(Some(30.0))).is_empty());
    }

    #[test]
    fn test_rain_fires_indoor_from_pool() {
        let mut ctx = context(Some(20.0));
        ctx.precipitation = true;

        let candidates = generate_suggestions(&ctx);
        assert_eq!(ids(&candidates), vec!["indoor-rain"]);
        assert!(INDOOR_MESSAGES.contains(&candidates[0].message.as_str()));
    }

    #[test]
    fn test_cold_fires_comfort() {
        let candidates = generate_suggestions(&context(Some(5.0)));
        assert_eq!(ids(&candidates), vec!["comfort-cold"]);
        assert_eq!(candidates[0].category, SuggestionCategory::Comfort);
    }

    #[test]
    fn test_humid_heat_is_additive_to_hydration() {
        let mut ctx = context(Some(36.0));
        ctx.humidity = Some(80.0);

        let candidates = generate_suggestions(&ctx);
        assert_eq!(ids(&candidates), vec!["hydration-extreme", "hydration-humid"]);
    }

    #[test]
    fn test_pleasant_afternoon_fires_outdoor() {
        let mut ctx = context(Some(22.0));
        ctx.time_of_day = Some(TimeOfDay::Afternoon);
        assert_eq!(ids(&generate_suggestions(&ctx)), vec!["outdoor-pleasant"]);

        // Same conditions in the morning: no outdoor suggestion
        ctx.time_of_day = Some(TimeOfDay::Morning);
        assert!(generate_suggestions(&ctx).is_empty());

        // Rain suppresses the outdoor rule even in the mild band
        ctx.time_of_day = Some(TimeOfDay::Evening);
        ctx.precipitation = true;
        assert_eq!(ids(&generate_suggestions(&ctx)), vec!["indoor-rain"]);
    }

    #[test]
    fn test_missing_readings_skip_their_rules() {
        let mut ctx = context(None);
        ctx.humidity = Some(90.0);
        ctx.time_of_day = Some(TimeOfDay::Afternoon);

        // No temperature: no hydration, no cold, no outdoor, no humid-heat
        assert!(generate_suggestions(&ctx).is_empty());
    }

    #[test]
    fn test_ids_are_stable_across_invocations() {
        let ctx = context(Some(40.0));
        let first = generate_suggestions(&ctx);
        let second = generate_suggestions(&ctx);
        assert_eq!(ids(&first), ids(&second));
    }
}
