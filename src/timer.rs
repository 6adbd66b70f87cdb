// src/timer.rs

//! Countdown arithmetic for the practice timer.
//!
//! There is no background task: the remaining time is recomputed from the
//! wall clock on every render, and reaching zero only changes the number
//! shown. It never blocks answer submission.

use chrono::{DateTime, Utc};

/// Seconds left on a countdown of `duration_secs` armed at `start`,
/// clamped to zero once the deadline has passed.
pub fn remaining_secs(start: DateTime<Utc>, duration_secs: u64, now: DateTime<Utc>) -> u64 {
    let elapsed = now.signed_duration_since(start).num_seconds();
    if elapsed < 0 {
        // A start time in the future means clock skew; show the full window.
        return duration_secs;
    }
    duration_secs.saturating_sub(elapsed as u64)
}
