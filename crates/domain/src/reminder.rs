use crate::recurrence::{Frequency, Recurrence, TimeOfDay};
use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};

/// A `Reminder` is the persisted unit of recurrence: a message that is
/// delivered to `destination` every time `next_trigger` is reached, until
/// the reminder is no longer `active`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ID,
    /// Guild / workspace the reminder belongs to. Opaque, only used for
    /// authorization and display, never for scheduling.
    pub tenant: String,
    /// User that created the reminder
    pub author: String,
    pub message: String,
    /// Opaque channel identifier handed to the delivery sink
    pub destination: String,
    pub time_of_day: TimeOfDay,
    pub recurrence: Recurrence,
    /// Next fire instant in epoch milliseconds. Always stamped at creation
    /// and recomputed after every fire for recurring reminders.
    pub next_trigger: i64,
    /// False once a one-off reminder has fired or the reminder was canceled
    pub active: bool,
}

impl Reminder {
    pub fn is_once(&self) -> bool {
        self.recurrence.frequency == Frequency::Once
    }
}

impl Entity for Reminder {
    fn id(&self) -> &ID {
        &self.id
    }
}
