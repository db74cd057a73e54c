use crate::error::ReminderError;
use crate::shared::usecase::UseCase;
use remindd_domain::{Reminder, ID};
use remindd_infra::Context;

/// Moves a reminder past a fire: a one-off reminder is deactivated, a
/// recurring one gets a fresh `next_trigger` computed from the current
/// clock. `NotFound` is an expected outcome when the row was canceled
/// concurrently and must not be treated as fatal by the caller.
#[derive(Debug)]
pub struct AdvanceReminderUseCase {
    pub reminder_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

impl From<UseCaseError> for ReminderError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => Self::NotFound(id.to_string()),
            UseCaseError::StorageError => Self::Storage,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for AdvanceReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "AdvanceReminder";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        let reminder = ctx.repos.reminders.find(&self.reminder_id).await;
        match reminder {
            Some(mut reminder) if reminder.active => {
                if reminder.is_once() {
                    reminder.active = false;
                } else {
                    reminder.next_trigger = reminder.recurrence.next_trigger_millis(
                        &reminder.time_of_day,
                        ctx.sys.get_timestamp_millis(),
                        &ctx.config.timezone,
                        None,
                    );
                }

                ctx.repos
                    .reminders
                    .save(&reminder)
                    .await
                    .map_err(|_| UseCaseError::StorageError)?;

                Ok(reminder)
            }
            _ => Err(UseCaseError::NotFound(self.reminder_id.clone())),
        }
    }
}
