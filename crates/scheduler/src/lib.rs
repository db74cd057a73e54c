mod error;
mod reminder;
mod scheduler;
mod shared;
#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::ReminderError;
pub use reminder::{
    AdvanceReminderUseCase, CancelReminderUseCase, CreateReminderUseCase, GetRemindersUseCase,
};
pub use scheduler::Scheduler;
pub use shared::usecase::{execute, UseCase};
