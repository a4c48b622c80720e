//! # Features Layer
//!
//! Each feature lives in its own module with a doc header recording its
//! version and whether it can be toggled off by the host.

pub mod reminders;
pub mod suggestions;

// Reminders
pub use reminders::{format_relative, parse_duration, ReminderScheduler};

// Suggestions
pub use suggestions::{
    generate_suggestions, should_proactively_suggest, SuggestionCandidate, SuggestionCategory,
    SuggestionPriority, SuggestionState, SuggestionTrigger,
};
