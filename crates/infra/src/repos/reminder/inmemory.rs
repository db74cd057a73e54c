use super::IReminderRepo;
use crate::repos::shared::inmemory_repo::*;
use remindd_domain::{Reminder, ID};
use std::sync::Mutex;

pub struct InMemoryReminderRepo {
    reminders: Mutex<Vec<Reminder>>,
}

impl InMemoryReminderRepo {
    pub fn new() -> Self {
        Self {
            reminders: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for InMemoryReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        insert(reminder, &self.reminders);
        Ok(())
    }

    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()> {
        save(reminder, &self.reminders);
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        find(reminder_id, &self.reminders)
    }

    async fn find_active(&self) -> Vec<Reminder> {
        find_by(&self.reminders, |reminder: &Reminder| reminder.active)
    }

    async fn find_due(&self, before: i64) -> Vec<Reminder> {
        find_by(&self.reminders, |reminder: &Reminder| {
            reminder.active && reminder.next_trigger <= before
        })
    }

    async fn find_by_tenant(&self, tenant: &str) -> Vec<Reminder> {
        find_by(&self.reminders, |reminder: &Reminder| {
            reminder.active && reminder.tenant == tenant
        })
    }

    async fn deactivate(&self, reminder_id: &ID, tenant: &str) -> anyhow::Result<bool> {
        let updated = update_by(
            &self.reminders,
            |reminder: &Reminder| {
                reminder.id == *reminder_id && reminder.tenant == tenant && reminder.active
            },
            |reminder| reminder.active = false,
        );
        Ok(updated > 0)
    }
}
