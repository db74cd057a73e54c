mod date;
mod recurrence;
mod reminder;
mod shared;

pub use date::{is_leap_year, month_length};
pub use recurrence::{Frequency, InvalidRecurrenceError, Recurrence, TimeOfDay};
pub use reminder::Reminder;
pub use shared::entity::{Entity, InvalidIDError, ID};
