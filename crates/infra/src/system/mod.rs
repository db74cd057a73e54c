use chrono::Utc;

/// Clock every trigger computation and timer delay is read against. Tests
/// swap in a frozen or manually stepped implementation so the timer math
/// stays deterministic.
pub trait ISys: Send + Sync {
    /// Current instant as epoch millis, the unit reminders store their
    /// `next_trigger` in
    fn get_timestamp_millis(&self) -> i64;
}

/// Wall clock, used everywhere outside of tests
pub struct SystemClock;

impl ISys for SystemClock {
    fn get_timestamp_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
