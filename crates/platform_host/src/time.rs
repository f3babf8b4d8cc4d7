//! Clock helpers shared by host adapters and the desk runtime.

use std::cell::Cell;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

thread_local! {
    static LAST_ISSUED_TIMESTAMP_MS: Cell<u64> = const { Cell::new(0) };
}

/// Current unix timestamp in milliseconds.
pub fn unix_time_ms_now() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now().max(0.0) as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Unix millisecond timestamp guaranteed to increase on every call.
///
/// Two activations inside one event-loop tick must still read as distinct
/// (the activation stamp is what tells a reused window "this is a fresh
/// launch"), so the wall clock is floored at one past the last issued
/// value.
pub fn next_monotonic_timestamp_ms() -> u64 {
    let now = unix_time_ms_now();
    LAST_ISSUED_TIMESTAMP_MS.with(|last| {
        let next = now.max(last.get().saturating_add(1));
        last.set(next);
        next
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_stamps_never_repeat() {
        let a = next_monotonic_timestamp_ms();
        let b = next_monotonic_timestamp_ms();
        let c = next_monotonic_timestamp_ms();
        assert!(a < b && b < c);
    }

    #[test]
    fn monotonic_stamp_tracks_the_wall_clock() {
        let stamp = next_monotonic_timestamp_ms();
        assert!(stamp >= unix_time_ms_now().saturating_sub(1));
    }
}
