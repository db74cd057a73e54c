use crate::error::ReminderError;
use crate::shared::usecase::UseCase;
use chrono::NaiveDate;
use remindd_domain::{InvalidRecurrenceError, Recurrence, Reminder, TimeOfDay};
use remindd_infra::Context;

/// Creates a reminder with its initial `next_trigger` stamped and returns
/// the persisted row. The command layer is expected to follow up with
/// `Scheduler::add_reminder` so the new row gets a timer without a reload.
#[derive(Debug)]
pub struct CreateReminderUseCase {
    pub tenant: String,
    pub author: String,
    pub destination: String,
    pub message: String,
    pub time_of_day: TimeOfDay,
    pub recurrence: Recurrence,
    /// Pins a one-off reminder to an explicit calendar date instead of
    /// "today or tomorrow"
    pub anchor_date: Option<NaiveDate>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidRecurrence(InvalidRecurrenceError),
    StorageError,
}

impl From<UseCaseError> for ReminderError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidRecurrence(e) => Self::InvalidRecurrence(e),
            UseCaseError::StorageError => Self::Storage,
        }
    }
}

#[async_trait::async_trait]
impl UseCase for CreateReminderUseCase {
    type Response = Reminder;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateReminder";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        self.recurrence
            .validate()
            .map_err(UseCaseError::InvalidRecurrence)?;

        let next_trigger = self.recurrence.next_trigger_millis(
            &self.time_of_day,
            ctx.sys.get_timestamp_millis(),
            &ctx.config.timezone,
            self.anchor_date,
        );

        let reminder = Reminder {
            id: Default::default(),
            tenant: self.tenant.clone(),
            author: self.author.clone(),
            destination: self.destination.clone(),
            message: self.message.clone(),
            time_of_day: self.time_of_day,
            recurrence: self.recurrence,
            next_trigger,
            active: true,
        };

        ctx.repos
            .reminders
            .insert(&reminder)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(reminder)
    }
}
