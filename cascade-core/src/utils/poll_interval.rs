use time::{Duration, OffsetDateTime};

/// Returns how long the poller should sleep before the next tick.
///
/// While a cascade with a known expiry is far away from ending, the poller
/// hibernates until `wake_buffer` before the expiry. Otherwise it polls at
/// `base`. The result is never shorter than `base`.
pub fn next_poll_delay(
    expiry: Option<OffsetDateTime>,
    now: OffsetDateTime,
    base: Duration,
    wake_buffer: Duration,
) -> Duration {
    match expiry.map(|e| e - now) {
        Some(remaining) if remaining > base + wake_buffer => remaining - wake_buffer,
        _ => base,
    }
}
