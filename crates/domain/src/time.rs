//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for event times and energy metering.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Elapsed time between two instants in fractional hours.
///
/// Negative spans (clock moved backwards) count as zero.
#[must_use]
pub fn hours_between(from: Timestamp, to: Timestamp) -> f64 {
    let millis = (to - from).num_milliseconds().max(0);
    #[allow(clippy::cast_precision_loss)]
    let hours = millis as f64 / 3_600_000.0;
    hours
}
