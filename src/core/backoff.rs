// Web2Text Console - core/backoff.rs
//
// Bounded exponential backoff for stream reconnection.
//
// The deterministic schedule (doubling from the base, capped) is kept
// separate from the jitter so it can be asserted in tests. Jitter adds up
// to a quarter of the scheduled delay, sourced from the clock's subsecond
// nanos; reconnect pacing does not need a cryptographic RNG.

use crate::util::constants::{STREAM_BACKOFF_BASE_MS, STREAM_BACKOFF_MAX_MS};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Reconnection delay schedule. One instance per connection cycle;
/// `reset()` after a successful connect.
#[derive(Debug, Default)]
pub struct Backoff {
    attempt: u32,
}

impl Backoff {
    pub fn new() -> Self {
        Self { attempt: 0 }
    }

    /// Completed attempts in the current cycle.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Forget the cycle after a successful connection.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Advance to the next attempt and return its jittered delay.
    pub fn next_delay(&mut self) -> Duration {
        let base = delay_for_attempt(self.attempt);
        self.attempt += 1;
        Duration::from_millis(base + jitter(base))
    }
}

/// Deterministic delay for the given zero-based attempt:
/// `base * 2^attempt`, capped at `STREAM_BACKOFF_MAX_MS`.
pub fn delay_for_attempt(attempt: u32) -> u64 {
    STREAM_BACKOFF_BASE_MS
        .saturating_mul(1u64 << attempt.min(63))
        .min(STREAM_BACKOFF_MAX_MS)
}

/// Up to a quarter of the scheduled delay, from the clock's subsecond nanos.
fn jitter(base_ms: u64) -> u64 {
    let span = base_ms / 4;
    if span == 0 {
        return 0;
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    u64::from(nanos) % (span + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_doubles_from_base() {
        assert_eq!(delay_for_attempt(0), STREAM_BACKOFF_BASE_MS);
        assert_eq!(delay_for_attempt(1), STREAM_BACKOFF_BASE_MS * 2);
        assert_eq!(delay_for_attempt(2), STREAM_BACKOFF_BASE_MS * 4);
    }

    #[test]
    fn schedule_is_monotone_and_capped() {
        let mut previous = 0;
        for attempt in 0..40 {
            let delay = delay_for_attempt(attempt);
            assert!(delay >= previous, "delay shrank at attempt {attempt}");
            assert!(delay <= STREAM_BACKOFF_MAX_MS);
            previous = delay;
        }
        assert_eq!(delay_for_attempt(39), STREAM_BACKOFF_MAX_MS);
    }

    #[test]
    fn jittered_delay_stays_within_a_quarter_above_schedule() {
        let mut backoff = Backoff::new();
        for attempt in 0..10 {
            let scheduled = delay_for_attempt(attempt);
            let delay = backoff.next_delay().as_millis() as u64;
            assert!(delay >= scheduled);
            assert!(delay <= scheduled + scheduled / 4);
        }
        assert_eq!(backoff.attempt(), 10);
    }

    #[test]
    fn reset_restarts_the_cycle() {
        let mut backoff = Backoff::new();
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
        assert_eq!(
            backoff.next_delay().as_millis() as u64 / STREAM_BACKOFF_BASE_MS,
            1
        );
    }
}
