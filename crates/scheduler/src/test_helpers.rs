use remindd_infra::{setup_context_inmemory, Context, ISys};
use std::sync::{Arc, Mutex};

/// Clock frozen at a fixed instant
pub struct StaticSys(pub i64);

impl ISys for StaticSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.0
    }
}

/// Clock that tests move forward manually
pub struct SteppingSys(Mutex<i64>);

impl SteppingSys {
    pub fn new(millis: i64) -> Arc<Self> {
        Arc::new(Self(Mutex::new(millis)))
    }

    pub fn set(&self, millis: i64) {
        *self.0.lock().unwrap() = millis;
    }
}

impl ISys for SteppingSys {
    fn get_timestamp_millis(&self) -> i64 {
        *self.0.lock().unwrap()
    }
}

/// Inmemory context pinned to UTC with the clock frozen at `millis`
pub fn setup_context_at(millis: i64) -> Context {
    let mut ctx = setup_context_inmemory();
    ctx.config.timezone = chrono_tz::Tz::UTC;
    ctx.sys = Arc::new(StaticSys(millis));
    ctx
}
