//! # Feature: Reminders
//!
//! Scheduled reminder delivery: a fixed-period poller fetches due records
//! from the store and delivers each exactly once to the chat transcript.
//!
//! - **Version**: 1.3.0
//! - **Since**: 0.3.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.3.0: Scheduling surface (schedule/list/cancel) with confirmation messages
//! - 1.2.0: Eager dedup insert to make overlapping poll ticks safe
//! - 1.1.0: Randomized phrasing pools for delivery and confirmation
//! - 1.0.0: Initial release with due-window polling

pub mod composer;
pub mod scheduler;

pub use composer::{format_relative, parse_duration};
pub use scheduler::ReminderScheduler;
