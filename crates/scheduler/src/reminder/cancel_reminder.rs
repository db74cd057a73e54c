use crate::error::ReminderError;
use crate::shared::usecase::UseCase;
use remindd_domain::ID;
use remindd_infra::Context;

/// User-initiated cancellation. Only deactivates rows owned by `tenant`.
/// Callers should also drop the armed timer via
/// `Scheduler::remove_reminder`; an in-flight fire is allowed to complete.
#[derive(Debug)]
pub struct CancelReminderUseCase {
    pub reminder_id: ID,
    pub tenant: String,
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
impl UseCase for CancelReminderUseCase {
    type Response = ();

    type Error = UseCaseError;

    const NAME: &'static str = "CancelReminder";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        let deactivated = ctx
            .repos
            .reminders
            .deactivate(&self.reminder_id, &self.tenant)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        if deactivated {
            Ok(())
        } else {
            Err(UseCaseError::NotFound(self.reminder_id.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::create_reminder::CreateReminderUseCase;
    use crate::test_helpers::setup_context_at;
    use remindd_domain::{Recurrence, TimeOfDay};

    #[tokio::test]
    async fn it_only_cancels_rows_of_the_owning_tenant() {
        let ctx = setup_context_at(0);
        let mut create = CreateReminderUseCase {
            tenant: "guild-1".into(),
            author: "user-1".into(),
            destination: "channel-1".into(),
            message: "water the plants".into(),
            time_of_day: TimeOfDay::new(18, 0).unwrap(),
            recurrence: Recurrence::daily(),
            anchor_date: None,
        };
        let reminder = create.execute(&ctx).await.unwrap();

        let mut wrong_tenant = CancelReminderUseCase {
            reminder_id: reminder.id.clone(),
            tenant: "guild-2".into(),
        };
        assert_eq!(
            wrong_tenant.execute(&ctx).await.unwrap_err(),
            UseCaseError::NotFound(reminder.id.clone())
        );

        let mut owner = CancelReminderUseCase {
            reminder_id: reminder.id.clone(),
            tenant: "guild-1".into(),
        };
        assert!(owner.execute(&ctx).await.is_ok());
        assert!(ctx.repos.reminders.find_active().await.is_empty());

        // Canceling twice is NotFound, not an error to propagate blindly
        assert_eq!(
            owner.execute(&ctx).await.unwrap_err(),
            UseCaseError::NotFound(reminder.id)
        );
    }
}
