pub mod advance_reminder;
pub mod cancel_reminder;
pub mod create_reminder;
pub mod get_reminders;

pub use advance_reminder::AdvanceReminderUseCase;
pub use cancel_reminder::CancelReminderUseCase;
pub use create_reminder::CreateReminderUseCase;
pub use get_reminders::GetRemindersUseCase;
