//! Monotonic timestamps in nanoseconds.

use nix::time::{ClockId, clock_gettime};

/// Nanoseconds per second.
pub const NS_PER_SEC: i64 = 1_000_000_000;

/// Current `CLOCK_MONOTONIC` time in nanoseconds.
///
/// Returns 0 if the clock cannot be read, which only happens on a broken
/// platform; callers treat 0 as "long ago".
pub fn monotonic_ns() -> i64 {
    match clock_gettime(ClockId::CLOCK_MONOTONIC) {
        Ok(ts) => ts.tv_sec() as i64 * NS_PER_SEC + ts.tv_nsec() as i64,
        Err(_) => 0,
    }
}
