use chrono_tz::Tz;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Process-wide timezone in which every reminder trigger is computed.
    /// Reminders never carry their own timezone.
    pub timezone: Tz,
    /// Endpoint the delivery sink posts fired reminders to. Required when
    /// running the daemon, optional for tests.
    pub delivery_webhook_url: Option<String>,
    /// Upper bound in seconds for a single delivery attempt
    pub delivery_timeout_secs: u64,
    /// How often the scheduler sweeps for due reminders that lost their
    /// timer (crash / drift recovery)
    pub reconcile_interval_secs: u64,
}

impl Config {
    pub fn new() -> Self {
        let default_timezone = Tz::UTC;
        let timezone = match std::env::var("TIMEZONE") {
            Ok(name) => match name.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        "The given TIMEZONE: {} is not a valid IANA timezone, falling back to {}.",
                        name, default_timezone
                    );
                    default_timezone
                }
            },
            Err(_) => {
                info!(
                    "Did not find TIMEZONE environment variable. Using {}.",
                    default_timezone
                );
                default_timezone
            }
        };

        let delivery_webhook_url = std::env::var("DELIVERY_WEBHOOK_URL").ok();

        Self {
            timezone,
            delivery_webhook_url,
            delivery_timeout_secs: parse_env_or("DELIVERY_TIMEOUT_SECS", 5),
            reconcile_interval_secs: parse_env_or("RECONCILE_INTERVAL_SECS", 300),
        }
    }
}

fn parse_env_or(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(value) => match value.parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    name, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
