//! Wall-clock seam
//!
//! Every timestamp the engine reads goes through [`Clock`], so tests can
//! substitute a manual clock and pin "now" wherever they need it.

use chrono::{DateTime, Utc};

/// Substitutable wall-clock source
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
