use super::IReminderRepo;
use remindd_domain::{Frequency, Recurrence, Reminder, TimeOfDay, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;

pub struct PostgresReminderRepo {
    pool: PgPool,
}

impl PostgresReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderRaw {
    reminder_uid: Uuid,
    tenant: String,
    author: String,
    message: String,
    destination: String,
    hour: i16,
    minute: i16,
    frequency: String,
    day_of_week: Option<i16>,
    day_of_month: Option<i16>,
    month: Option<i16>,
    next_trigger: i64,
    active: bool,
}

impl From<ReminderRaw> for Reminder {
    fn from(raw: ReminderRaw) -> Self {
        Self {
            id: raw.reminder_uid.into(),
            tenant: raw.tenant,
            author: raw.author,
            message: raw.message,
            destination: raw.destination,
            time_of_day: TimeOfDay {
                hour: raw.hour as u32,
                minute: raw.minute as u32,
            },
            recurrence: Recurrence {
                // Unreachable for rows written through Frequency::to_string
                // and guarded by a CHECK constraint, but never silent
                frequency: raw.frequency.parse().unwrap_or_else(|e| {
                    error!(
                        "Reminder row {} has an unreadable frequency: {:?}",
                        raw.reminder_uid, e
                    );
                    Frequency::Once
                }),
                day_of_week: raw.day_of_week.map(|v| v as u32),
                day_of_month: raw.day_of_month.map(|v| v as u32),
                month: raw.month.map(|v| v as u32),
            },
            next_trigger: raw.next_trigger,
            active: raw.active,
        }
    }
}

#[async_trait::async_trait]
impl IReminderRepo for PostgresReminderRepo {
    async fn insert(&self, reminder: &Reminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminders
            (reminder_uid, tenant, author, message, destination, hour, minute,
             frequency, day_of_week, day_of_month, month, next_trigger, active)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(&reminder.tenant)
        .bind(&reminder.author)
        .bind(&reminder.message)
        .bind(&reminder.destination)
        .bind(reminder.time_of_day.hour as i16)
        .bind(reminder.time_of_day.minute as i16)
        .bind(reminder.recurrence.frequency.to_string())
        .bind(reminder.recurrence.day_of_week.map(|v| v as i16))
        .bind(reminder.recurrence.day_of_month.map(|v| v as i16))
        .bind(reminder.recurrence.month.map(|v| v as i16))
        .bind(reminder.next_trigger)
        .bind(reminder.active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, reminder: &Reminder) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reminders
            SET message = $2, destination = $3, hour = $4, minute = $5,
                frequency = $6, day_of_week = $7, day_of_month = $8, month = $9,
                next_trigger = $10, active = $11
            WHERE reminder_uid = $1
            "#,
        )
        .bind(reminder.id.inner_ref())
        .bind(&reminder.message)
        .bind(&reminder.destination)
        .bind(reminder.time_of_day.hour as i16)
        .bind(reminder.time_of_day.minute as i16)
        .bind(reminder.recurrence.frequency.to_string())
        .bind(reminder.recurrence.day_of_week.map(|v| v as i16))
        .bind(reminder.recurrence.day_of_month.map(|v| v as i16))
        .bind(reminder.recurrence.month.map(|v| v as i16))
        .bind(reminder.next_trigger)
        .bind(reminder.active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, reminder_id: &ID) -> Option<Reminder> {
        sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders
            WHERE reminder_uid = $1
            "#,
        )
        .bind(reminder_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Find reminder {} failed: {:?}", reminder_id, e);
            None
        })
        .map(|reminder| reminder.into())
    }

    async fn find_active(&self) -> Vec<Reminder> {
        sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders
            WHERE active
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|reminder| reminder.into())
        .collect()
    }

    async fn find_due(&self, before: i64) -> Vec<Reminder> {
        sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders
            WHERE active AND next_trigger <= $1
            "#,
        )
        .bind(before)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|reminder| reminder.into())
        .collect()
    }

    async fn find_by_tenant(&self, tenant: &str) -> Vec<Reminder> {
        sqlx::query_as::<_, ReminderRaw>(
            r#"
            SELECT * FROM reminders
            WHERE active AND tenant = $1
            ORDER BY next_trigger
            "#,
        )
        .bind(tenant)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|reminder| reminder.into())
        .collect()
    }

    async fn deactivate(&self, reminder_id: &ID, tenant: &str) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"
            UPDATE reminders
            SET active = FALSE
            WHERE reminder_uid = $1 AND tenant = $2 AND active
            "#,
        )
        .bind(reminder_id.inner_ref())
        .bind(tenant)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_row(frequency: &str) -> ReminderRaw {
        ReminderRaw {
            reminder_uid: Uuid::from_u128(7),
            tenant: "guild-1".into(),
            author: "user-1".into(),
            message: "standup".into(),
            destination: "channel-1".into(),
            hour: 9,
            minute: 0,
            frequency: frequency.into(),
            day_of_week: None,
            day_of_month: None,
            month: None,
            next_trigger: 1,
            active: true,
        }
    }

    #[test]
    fn row_frequency_maps_onto_the_domain_enum() {
        let reminder: Reminder = raw_row("weekly").into();
        assert_eq!(reminder.recurrence.frequency, Frequency::Weekly);
    }

    #[test]
    fn unreadable_row_frequency_falls_back_to_a_one_off() {
        let reminder: Reminder = raw_row("fortnightly").into();
        assert_eq!(reminder.recurrence.frequency, Frequency::Once);
    }
}
