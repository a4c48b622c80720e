//! # Feature: Contextual Suggestions
//!
//! Proactive weather-driven suggestions: a pure generator maps the current
//! environmental context to ranked candidates, and a cooldown/history
//! selector decides which one (if any) to surface.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.9.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.2.0: Trigger loop with urgency pre-filter
//! - 1.1.0: History rotation so persistent conditions resurface
//! - 1.0.0: Initial release with rule-based generator and cooldown gate

pub mod generator;
pub mod selector;
pub mod trigger;

pub use generator::{
    generate_suggestions, SuggestionCandidate, SuggestionCategory, SuggestionPriority,
};
pub use selector::{should_proactively_suggest, SuggestionState};
pub use trigger::SuggestionTrigger;
