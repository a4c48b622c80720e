//! Environmental context seam
//!
//! Wraps whatever weather/context source the host application uses behind a
//! single async call. Readings are optional: the suggestion engine treats a
//! missing reading as "rule does not apply", never as an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Coarse time-of-day bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

/// Snapshot of environmental readings used by the suggestion engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentalContext {
    /// Temperature in degrees Celsius
    pub temperature: Option<f64>,
    /// Relative humidity in percent
    pub humidity: Option<f64>,
    /// Whether precipitation is currently active
    pub precipitation: bool,
    pub time_of_day: Option<TimeOfDay>,
    /// False when the upstream provider has no usable data; the suggestion
    /// engine short-circuits to an empty result in that case
    pub available: bool,
}

impl EnvironmentalContext {
    /// A context with no data, as reported when the provider is down
    pub fn unavailable() -> Self {
        EnvironmentalContext {
            temperature: None,
            humidity: None,
            precipitation: false,
            time_of_day: None,
            available: false,
        }
    }
}

/// External context provider (weather API wrapper or similar)
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Return the current snapshot. Implementations report failures by
    /// returning an unavailable context rather than erroring.
    async fn current(&self) -> EnvironmentalContext;
}
