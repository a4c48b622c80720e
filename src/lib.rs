// Core layer - shared types and configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// Infrastructure layer - seams to external collaborators
pub mod clock;
pub mod context;
pub mod store;
pub mod transcript;

// Re-export core config for convenience
pub use core::Config;

// Re-export feature items for convenience
pub use features::{
    // Reminders
    format_relative, parse_duration, ReminderScheduler,
    // Suggestions
    generate_suggestions, should_proactively_suggest, SuggestionCandidate, SuggestionCategory,
    SuggestionPriority, SuggestionState, SuggestionTrigger,
};

// Re-export collaborator seams
pub use clock::{Clock, SystemClock};
pub use context::{ContextProvider, EnvironmentalContext, TimeOfDay};
pub use store::{MemoryStore, ReminderRecord, ReminderStore};
pub use transcript::{ChatMessage, MpscTranscript, Sender, Transcript};
