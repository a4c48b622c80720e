//! Delivery message composer
//!
//! Turns reminder records into assistant-voiced chat messages. Phrasing is
//! picked uniformly at random from small fixed pools so repeated deliveries
//! do not read identically.

use chrono::{DateTime, Duration, Utc};
use rand::seq::IndexedRandom;

/// Phrasing pool for a reminder firing
const FIRING_TEMPLATES: &[&str] = &[
    "⏰ Reminder: {reminder}",
    "⏰ Hey! You asked me to remind you: {reminder}",
    "🔔 Don't forget: {reminder}",
    "🔔 It's time! {reminder}",
];

/// Phrasing pool for confirming a newly scheduled reminder
const CONFIRMATION_TEMPLATES: &[&str] = &[
    "⏰ Got it! I'll remind you {when} about:\n> {title}",
    "✅ Noted! \"{title}\" is set for {when}.",
    "📌 Reminder saved: {title} ({when})",
];

/// Compose the chat message for a due reminder
pub fn firing_message(text: &str) -> String {
    let template = FIRING_TEMPLATES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(FIRING_TEMPLATES[0]);

    template.replace("{reminder}", text)
}

/// Compose the confirmation message for a newly scheduled reminder
pub fn confirmation_message(title: &str, when: &str) -> String {
    let template = CONFIRMATION_TEMPLATES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(CONFIRMATION_TEMPLATES[0]);

    template.replace("{title}", title).replace("{when}", when)
}

/// Human-readable description of how far away `target` is from `now`.
///
/// Strict cascade, first match wins:
/// under a minute, rounded minutes, calendar-tomorrow, rounded hours,
/// then full weekday/date form. The tomorrow check outranks the hour
/// bucket so a reminder for tomorrow evening reads "tomorrow at 18:00"
/// rather than "in 21 hours".
pub fn format_relative(now: DateTime<Utc>, target: DateTime<Utc>) -> String {
    let secs = (target - now).num_seconds();

    if secs < 60 {
        return "right now".to_string();
    }

    let minutes = (secs as f64 / 60.0).round() as i64;
    if minutes == 1 {
        return "in 1 minute".to_string();
    }
    if minutes < 60 {
        return format!("in {minutes} minutes");
    }

    if target.date_naive() == (now + Duration::days(1)).date_naive() {
        return format!("tomorrow at {}", target.format("%H:%M"));
    }

    let hours = (secs as f64 / 3600.0).round() as i64;
    if hours == 1 {
        return "in 1 hour".to_string();
    }
    if secs < 86_400 {
        return format!("in {hours} hours");
    }

    format!("on {}", target.format("%A, %B %-d at %H:%M"))
}

/// Parse a compact duration string like "30m", "2h", "1d", "1h30m"
pub fn parse_duration(time_str: &str) -> Option<Duration> {
    let time_str = time_str.trim().to_lowercase();
    let mut total_seconds: i64 = 0;
    let mut current_number = String::new();

    for c in time_str.chars() {
        if c.is_ascii_digit() {
            current_number.push(c);
        } else if !current_number.is_empty() {
            let value: i64 = current_number.parse().ok()?;
            current_number.clear();

            let seconds = match c {
                's' => value,
                'm' => value * 60,
                'h' => value * 60 * 60,
                'd' => value * 60 * 60 * 24,
                'w' => value * 60 * 60 * 24 * 7,
                _ => return None,
            };
            total_seconds += seconds;
        }
    }

    if total_seconds > 0 {
        Some(Duration::seconds(total_seconds))
    } else {
        None
    }
}
