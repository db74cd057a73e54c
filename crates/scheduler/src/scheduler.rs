use crate::reminder::advance_reminder::{AdvanceReminderUseCase, UseCaseError as AdvanceError};
use crate::shared::usecase::execute;
use remindd_domain::{Reminder, ID};
use remindd_infra::{Context, IDeliverySink};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
enum LifecycleState {
    Stopped,
    Initializing,
    Running,
}

/// Timer registry over the set of active reminders. Every armed reminder
/// owns one cancelable delayed task; a task fires, delivers, advances the
/// row and rearms itself, so a given id never has two concurrent fires.
///
/// Single instance per store: running two schedulers against the same
/// database causes duplicate deliveries.
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    ctx: Context,
    sink: Arc<dyn IDeliverySink>,
    timers: Mutex<HashMap<ID, JoinHandle<()>>>,
    state: Mutex<LifecycleState>,
    reconciler: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new(ctx: Context, sink: Arc<dyn IDeliverySink>) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                ctx,
                sink,
                timers: Mutex::new(HashMap::new()),
                state: Mutex::new(LifecycleState::Stopped),
                reconciler: Mutex::new(None),
            }),
        }
    }

    /// Loads every active reminder and arms one timer per row. Rows whose
    /// `next_trigger` already passed while the process was down fire on the
    /// next tick instead of being skipped, which is the crash recovery
    /// path. Idempotent.
    pub async fn start(&self) {
        {
            let mut state = self.inner.state.lock().unwrap();
            if *state != LifecycleState::Stopped {
                return;
            }
            *state = LifecycleState::Initializing;
        }

        let reminders = self.inner.ctx.repos.reminders.find_active().await;
        info!("Scheduler starting with {} active reminders", reminders.len());
        for reminder in reminders {
            self.inner.arm(reminder);
        }

        *self.inner.state.lock().unwrap() = LifecycleState::Running;

        let inner = self.inner.clone();
        let handle = tokio::spawn(async move { reconcile_loop(inner).await });
        *self.inner.reconciler.lock().unwrap() = Some(handle);
    }

    /// Arms a timer for a single freshly created reminder without touching
    /// the rest of the registry. No-op when the row is gone or inactive.
    pub async fn add_reminder(&self, reminder_id: &ID) {
        match self.inner.ctx.repos.reminders.find(reminder_id).await {
            Some(reminder) if reminder.active => self.inner.arm(reminder),
            _ => warn!(
                "Not arming timer for reminder {}: not found or not active",
                reminder_id
            ),
        }
    }

    /// Drops the armed timer for a canceled reminder. Best-effort: a fire
    /// that already started completes its deliver-advance cycle.
    pub fn remove_reminder(&self, reminder_id: &ID) {
        if let Some(handle) = self.inner.timers.lock().unwrap().remove(reminder_id) {
            handle.abort();
        }
    }

    /// Cancels every pending timer. Reminders whose time arrives after
    /// shutdown are picked up by the next `start()`. Idempotent.
    pub fn stop(&self) {
        *self.inner.state.lock().unwrap() = LifecycleState::Stopped;
        if let Some(handle) = self.inner.reconciler.lock().unwrap().take() {
            handle.abort();
        }
        let mut timers = self.inner.timers.lock().unwrap();
        for (_, handle) in timers.drain() {
            handle.abort();
        }
    }
}

impl SchedulerInner {
    fn arm(self: &Arc<Self>, reminder: Reminder) {
        let wait = reminder.next_trigger - self.ctx.sys.get_timestamp_millis();
        let delay = Duration::from_millis(wait.max(0) as u64);

        let inner = self.clone();
        let reminder_id = reminder.id.clone();

        // State check and insert happen under the registry lock, so a rearm
        // racing stop() cannot slip a live timer in after the registry was
        // drained
        let mut timers = self.timers.lock().unwrap();
        if *self.state.lock().unwrap() == LifecycleState::Stopped {
            return;
        }
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.fire(reminder_id).await;
        });
        if let Some(old) = timers.insert(reminder.id, handle) {
            old.abort();
        }
    }

    fn is_armed(&self, reminder_id: &ID) -> bool {
        // A finished handle is a fire that died without cleaning up its
        // entry; the reconciler must see it as unarmed
        match self.timers.lock().unwrap().get(reminder_id) {
            Some(handle) => !handle.is_finished(),
            None => false,
        }
    }

    fn drop_timer(&self, reminder_id: &ID) {
        self.timers.lock().unwrap().remove(reminder_id);
    }

    /// Deliver, advance, rearm. Every failure is contained here so one
    /// misbehaving reminder never takes down the scheduler or other timers.
    ///
    /// The registry entry for the id stays in place for the whole cycle:
    /// while the advance is still writing the fresh `next_trigger` the row
    /// looks due, and the reconciler must keep seeing the id as armed or it
    /// would fire the same instant a second time.
    async fn fire(self: Arc<Self>, reminder_id: ID) {
        // The row may have been canceled while the timer was pending
        let reminder = match self.ctx.repos.reminders.find(&reminder_id).await {
            Some(reminder) if reminder.active => reminder,
            _ => {
                self.drop_timer(&reminder_id);
                return;
            }
        };

        let timeout = Duration::from_secs(self.ctx.config.delivery_timeout_secs);
        let delivery = tokio::time::timeout(
            timeout,
            self.sink.deliver(&reminder.destination, &reminder.message),
        )
        .await;
        // Delivery failures never block advancing the schedule
        match delivery {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("Delivery of reminder {} failed: {:?}", reminder_id, e),
            Err(_) => error!("Delivery of reminder {} timed out", reminder_id),
        }

        let mut advanced = execute(
            AdvanceReminderUseCase {
                reminder_id: reminder_id.clone(),
            },
            &self.ctx,
        )
        .await;
        if matches!(advanced, Err(AdvanceError::StorageError)) {
            advanced = execute(
                AdvanceReminderUseCase {
                    reminder_id: reminder_id.clone(),
                },
                &self.ctx,
            )
            .await;
        }

        match advanced {
            // Rearming swaps this task's own registry entry for the fresh
            // timer. Aborting the replaced handle is a no-op here: this task
            // is past its final await once arm runs.
            Ok(reminder) if reminder.active => self.arm(reminder),
            Ok(_) | Err(AdvanceError::NotFound(_)) => {
                // Retired (one-off) or canceled concurrently, nothing to rearm
                self.drop_timer(&reminder_id);
            }
            Err(AdvanceError::StorageError) => {
                // The stale next_trigger makes the reminder due again on the
                // next restart or reconcile sweep
                error!(
                    "Advancing reminder {} failed twice, dropping its timer",
                    reminder_id
                );
                self.drop_timer(&reminder_id);
            }
        }
    }
}

/// Periodic safety net: any active row that is due but lost its timer (a
/// missed registration or an advance failure) gets rearmed and fires on the
/// next tick.
async fn reconcile_loop(inner: Arc<SchedulerInner>) {
    let period = Duration::from_secs(inner.ctx.config.reconcile_interval_secs.max(1));
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately
    interval.tick().await;
    loop {
        interval.tick().await;
        let now = inner.ctx.sys.get_timestamp_millis();
        for reminder in inner.ctx.repos.reminders.find_due(now).await {
            if !inner.is_armed(&reminder.id) {
                warn!(
                    "Reminder {} was due without an armed timer, rearming",
                    reminder.id
                );
                inner.arm(reminder);
            }
        }
    }
}
