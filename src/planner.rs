//! The command surface the display layer talks to
//!
//! A [`Planner`] owns the shared store and its storage, applies commands
//! (add, delete, toggle, clear, search, export, import), write-through saves after
//! every mutation, and reports changes as [`PlannerEvent`]s. It never renders
//! anything and never waits on user input; that is the display layer's job.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use crate::error::Error;
use crate::event::PlannerEvent;
use crate::schedule::Weekday;
use crate::scheduler::AlarmScheduler;
use crate::storage::Storage;
use crate::store::TaskStore;
use crate::task::{Priority, Task, TaskId};
use crate::traits::NotificationSink;

/// The planner core, wiring the store, its persistence and the event channel.
///
/// On every mutating command, saving happens synchronously after the in-memory
/// change. When the save fails, the error is surfaced to the caller *and* logged,
/// but the mutation stands: the user's change is not thrown away just because the
/// disk is having a bad day.
pub struct Planner {
    store: Arc<Mutex<TaskStore>>,
    storage: Storage,
    events: Option<mpsc::UnboundedSender<PlannerEvent>>,
}

impl Planner {
    /// Open a planner backed by the given snapshot file.
    ///
    /// An absent file starts an empty planner (first run). A malformed file is
    /// loudly warned about and also degrades to an empty planner, rather than
    /// refusing to start.
    pub fn open(path: &Path) -> Self {
        let storage = Storage::new(path);
        let store = match storage.load() {
            Ok(store) => store,
            Err(err) => {
                log::warn!("Invalid snapshot file: {}. Starting from an empty store", err);
                TaskStore::new()
            },
        };
        Self {
            store: Arc::new(Mutex::new(store)),
            storage,
            events: None,
        }
    }

    /// Subscribe the display layer to change events.
    /// Only one subscriber at a time; a later call replaces the previous channel
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<PlannerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    /// The shared store handle, for wiring up an [`AlarmScheduler`]
    pub fn store_handle(&self) -> Arc<Mutex<TaskStore>> {
        Arc::clone(&self.store)
    }

    /// Build the alarm scheduler for this planner's store.
    /// The scheduler reports its reminders on the subscribed event channel, and
    /// writes its dedup stamps through this planner's snapshot file
    pub fn alarm_scheduler(&self, sink: Arc<dyn NotificationSink>) -> AlarmScheduler {
        let scheduler = AlarmScheduler::new(self.store_handle(), sink)
            .with_storage(self.storage.clone());
        match &self.events {
            Some(events) => scheduler.with_events(events.clone()),
            None => scheduler,
        }
    }

    /// Add a task. `day` and `time` arrive as the user typed them and are validated
    /// here; nothing is mutated when validation fails
    pub fn add_task(&self, day: &str, time: &str, description: &str, priority: Priority) -> Result<TaskId, Error> {
        let day: Weekday = day.parse()?;
        let time = time.parse()?;

        let id = self.lock().add(day, time, description.to_string(), priority)?;
        let saved = self.save_current();
        self.emit(PlannerEvent::TaskAdded(id));
        saved?;
        Ok(id)
    }

    pub fn delete_task(&self, id: TaskId) -> Result<(), Error> {
        self.lock().delete(id)?;
        let saved = self.save_current();
        self.emit(PlannerEvent::TaskRemoved(id));
        saved
    }

    pub fn set_completed(&self, id: TaskId, completed: bool) -> Result<(), Error> {
        self.lock().set_completed(id, completed)?;
        let saved = self.save_current();
        self.emit(PlannerEvent::TaskUpdated(id));
        saved
    }

    /// Flip a task's completion state and return the new one
    pub fn toggle_complete(&self, id: TaskId) -> Result<bool, Error> {
        let completed = {
            let mut store = self.lock();
            let completed = !store.get(id).ok_or(Error::TaskNotFound(id))?.completed();
            store.set_completed(id, completed)?;
            completed
        };
        let saved = self.save_current();
        self.emit(PlannerEvent::TaskUpdated(id));
        saved?;
        Ok(completed)
    }

    /// Remove every task for every day. Idempotent
    pub fn clear_all(&self) -> Result<(), Error> {
        let removed: Vec<TaskId> = {
            let mut store = self.lock();
            let removed = store.all().iter().map(|task| task.id()).collect();
            store.clear_all();
            removed
        };
        let saved = self.save_current();
        for id in removed {
            self.emit(PlannerEvent::TaskRemoved(id));
        }
        saved
    }

    /// The tasks of one day, by ascending time (ties keep insertion order)
    pub fn list_by_day(&self, day: Weekday) -> Vec<Task> {
        self.lock().list_by_day(day).into_iter().cloned().collect()
    }

    /// Every task of every day
    pub fn all_tasks(&self) -> Vec<Task> {
        self.lock().all().to_vec()
    }

    /// Case-insensitive substring search over descriptions.
    /// An empty query is rejected, it does not mean "everything"
    pub fn search(&self, query: &str) -> Result<Vec<Task>, Error> {
        Ok(self.lock().search(query)?.into_iter().cloned().collect())
    }

    /// Write a snapshot of the current tasks to an arbitrary path
    pub fn export(&self, path: &Path) -> Result<(), Error> {
        Storage::new(path).save(&self.lock())
    }

    /// Replace the current tasks with the snapshot at `path`, then write-through save.
    ///
    /// This is a bulk replace: no per-task events are emitted, the display layer
    /// should re-read what it renders afterwards.
    pub fn import(&self, path: &Path) -> Result<(), Error> {
        let imported = Storage::new(path).load()?;
        *self.lock() = imported;
        self.save_current()
    }

    fn lock(&self) -> MutexGuard<'_, TaskStore> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The write-through save. Failures are loud: surfaced to the caller and logged
    fn save_current(&self) -> Result<(), Error> {
        let result = self.storage.save(&self.lock());
        if let Err(err) = &result {
            log::error!("Unable to save tasks to {:?}: {}. The change is kept in memory only!",
                        self.storage.path(), err);
        }
        result
    }

    fn emit(&self, event: PlannerEvent) {
        if let Some(events) = &self.events {
            // A gone subscriber is fine, events are advisory
            let _ = events.send(event);
        }
    }
}
