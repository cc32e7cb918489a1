//! The polling alarm engine
//!
//! On a fixed interval, the scheduler compares the local day and minute against every
//! stored task, and fires each due reminder exactly once per scheduled minute. Firing
//! means stamping the task (under the same lock every store mutation takes), emitting
//! a [`PlannerEvent::ReminderDue`], and dispatching to the [`NotificationSink`] on a
//! detached tokio task so a slow delivery channel can never stall the next check.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Datelike, Local};
use tokio::sync::{mpsc, watch};

use crate::config;
use crate::event::PlannerEvent;
use crate::schedule::{ClockTime, Weekday};
use crate::storage::Storage;
use crate::store::TaskStore;
use crate::task::{minute_bucket, TaskId};
use crate::traits::NotificationSink;

/// Default pause between two due-task checks.
///
/// Anything coarser than one minute could skip over a scheduled minute entirely.
/// Anything finer revisits the same minute several times, which is what the per-task
/// dedup stamp guards against. The stamp is mandatory at any interval.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(30);

/// Periodically checks the shared store for due tasks.
///
/// Reads and stamp-writes go through the same store mutex the command side uses,
/// so a delete racing a reminder can never resurrect the deleted task.
pub struct AlarmScheduler {
    store: Arc<Mutex<TaskStore>>,
    sink: Arc<dyn NotificationSink>,
    events: Option<mpsc::UnboundedSender<PlannerEvent>>,
    /// Where to persist the dedup stamps after a tick that fired
    storage: Option<Storage>,
    tick_interval: Duration,
}

/// Controls a started scheduler loop
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    joiner: tokio::task::JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop ticking.
    ///
    /// No further due-task checks happen after this returns. Notification dispatches
    /// already in flight are abandoned to their own devices, not awaited.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.joiner.await;
    }
}

impl AlarmScheduler {
    pub fn new(store: Arc<Mutex<TaskStore>>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            store,
            sink,
            events: None,
            storage: None,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }

    /// Also write the store back through this storage whenever a tick fired.
    /// Without it, the dedup stamps live in memory only, and a restart within the
    /// scheduled minute would deliver the same reminder twice
    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Also emit a [`PlannerEvent::ReminderDue`] for every fired reminder
    pub fn with_events(mut self, events: mpsc::UnboundedSender<PlannerEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Override the pause between checks. Clamped to at most one minute (a coarser
    /// interval could skip a scheduled minute) and to a non-zero floor (a zero
    /// period has no meaning for a ticker)
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.clamp(Duration::from_millis(1), Duration::from_secs(60));
        self
    }

    /// Start the periodic check loop on the tokio runtime
    pub fn start(self) -> SchedulerHandle {
        let (shutdown, mut stopped) = watch::channel(false);
        let joiner = tokio::spawn(async move {
            log::info!("alarm scheduler started, checking every {:?}", self.tick_interval);
            let mut ticker = tokio::time::interval(self.tick_interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_tick(Local::now());
                    },
                    _ = stopped.changed() => {
                        log::info!("alarm scheduler stopped");
                        break;
                    },
                }
            }
        });
        SchedulerHandle { shutdown, joiner }
    }

    /// Execute one due-task check against the given instant, and return what fired.
    ///
    /// A task fires when its day is `now`'s weekday, its time is `now`'s `HH:MM`, and
    /// it has not been stamped for this very minute yet. A minute that passed while the
    /// process was suspended is simply gone: the comparison is an exact match, so that
    /// reminder is dropped rather than delivered late.
    pub fn run_tick(&self, now: DateTime<Local>) -> Vec<(TaskId, String)> {
        let day = Weekday::from(now.weekday());
        let fired = self.collect_due(now);

        for (id, description) in &fired {
            log::debug!("reminder due for task {} ({})", id, description);
            if let Some(events) = &self.events {
                // The display layer may be gone; reminders still go to the sink
                let _ = events.send(PlannerEvent::ReminderDue {
                    id: *id,
                    description: description.clone(),
                    day,
                });
            }
            self.dispatch(*id, description.clone(), day, ClockTime::from(now));
        }

        // The stamps must reach the disk too: a restart within this very minute must
        // not deliver these reminders again. Failures are non-fatal, like any other
        // best-effort save
        if !fired.is_empty() {
            if let Some(storage) = &self.storage {
                let store = self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                if let Err(err) = storage.save(&store) {
                    log::warn!("unable to persist reminder stamps: {}", err);
                }
            }
        }
        fired
    }

    /// Collect the due tasks and stamp them, in one critical section
    fn collect_due(&self, now: DateTime<Local>) -> Vec<(TaskId, String)> {
        let day = Weekday::from(now.weekday());
        let time = ClockTime::from(now);
        let minute = minute_bucket(now);

        let mut store = self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let due: Vec<(TaskId, String)> = store.due_at(day, time, &minute).into_iter()
            .map(|task| (task.id(), task.description().to_string()))
            .collect();
        for (id, _) in &due {
            // Cannot fail: the lock is still held, nobody removed the task in between
            if let Err(err) = store.stamp_notified(*id, minute) {
                log::warn!("could not stamp task {}: {}", id, err);
            }
        }
        due
    }

    /// Fire-and-forget delivery: a blocked or failing sink only costs a log line
    fn dispatch(&self, id: TaskId, description: String, day: Weekday, time: ClockTime) {
        let sink = Arc::clone(&self.sink);
        let title = config::app_name();
        let message = format!("{} ({} {})", description, day, time);
        tokio::spawn(async move {
            if let Err(err) = sink.notify(&title, &message).await {
                log::warn!("unable to deliver the reminder for task {}: {}", id, err);
            }
        });
    }
}
