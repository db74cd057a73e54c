mod inmemory;
mod postgres;

pub use inmemory::InMemoryReminderRepo;
pub use postgres::PostgresReminderRepo;
use remindd_domain::{Reminder, ID};

/// Persistence boundary for reminders. All writes are durable before the
/// call returns, the scheduler relies on that when rearming timers.
#[async_trait::async_trait]
pub trait IReminderRepo: Send + Sync {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()>;
    /// Full row update by id
    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()>;
    async fn find(&self, reminder_id: &ID) -> Option<Reminder>;
    /// All active reminders, loaded once at startup to rebuild the timer set
    async fn find_active(&self) -> Vec<Reminder>;
    /// Active reminders with `next_trigger <= before`, the reconciliation
    /// path that catches missed timer registrations
    async fn find_due(&self, before: i64) -> Vec<Reminder>;
    async fn find_by_tenant(&self, tenant: &str) -> Vec<Reminder>;
    /// Tenant-scoped cancellation. Returns whether a row was affected.
    async fn deactivate(&self, reminder_id: &ID, tenant: &str) -> anyhow::Result<bool>;
}
