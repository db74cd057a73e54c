use crate::shared::usecase::UseCase;
use remindd_domain::Reminder;
use remindd_infra::Context;

/// Read-only listing of a tenant's active reminders, the inbound query the
/// command layer uses to render "your reminders".
#[derive(Debug)]
pub struct GetRemindersUseCase {
    pub tenant: String,
}

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait]
impl UseCase for GetRemindersUseCase {
    type Response = Vec<Reminder>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetReminders";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        Ok(ctx.repos.reminders.find_by_tenant(&self.tenant).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::create_reminder::CreateReminderUseCase;
    use crate::test_helpers::setup_context_at;
    use remindd_domain::{Recurrence, TimeOfDay};

    #[tokio::test]
    async fn it_lists_only_the_requested_tenant() {
        let ctx = setup_context_at(0);
        for tenant in ["guild-1", "guild-1", "guild-2"] {
            let mut create = CreateReminderUseCase {
                tenant: tenant.into(),
                author: "user-1".into(),
                destination: "channel-1".into(),
                message: "pay rent".into(),
                time_of_day: TimeOfDay::new(12, 0).unwrap(),
                recurrence: Recurrence::monthly(1),
                anchor_date: None,
            };
            create.execute(&ctx).await.unwrap();
        }

        let mut use_case = GetRemindersUseCase {
            tenant: "guild-1".into(),
        };
        let reminders = use_case.execute(&ctx).await.unwrap();
        assert_eq!(reminders.len(), 2);
        assert!(reminders.iter().all(|r| r.tenant == "guild-1"));
    }
}
