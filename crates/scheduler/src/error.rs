use remindd_domain::InvalidRecurrenceError;
use thiserror::Error;

/// Engine-wide error taxonomy. `InvalidRecurrence` is the only kind that is
/// meant to reach an end user, everything else is operational and only
/// logged.
#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("Invalid reminder specification: {0}")]
    InvalidRecurrence(#[from] InvalidRecurrenceError),
    #[error("Reminder not found: {0}")]
    NotFound(String),
    #[error("Delivery failed: {0}")]
    Delivery(String),
    #[error("Storage error")]
    Storage,
    #[error("Internal scheduler error: {0}")]
    Internal(String),
}
