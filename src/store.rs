//! The in-memory task store, single source of truth for every task

use chrono::{DateTime, Local};

use crate::error::Error;
use crate::schedule::{ClockTime, Weekday};
use crate::task::{Priority, Task, TaskId};

/// Owns every [`Task`], across all day buckets.
///
/// Tasks are kept as one flat, insertion-ordered collection; "the tasks of Monday"
/// is a derived query, not a second structure that could drift out of sync.
/// The display layer never owns task data, it only renders what this store reports.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add a new task, and return its fresh id.
    ///
    /// The store is left untouched when validation fails.
    pub fn add(&mut self, day: Weekday, time: ClockTime, description: String, priority: Priority) -> Result<TaskId, Error> {
        let task = Task::new(day, time, description, priority)?;
        let id = task.id();
        self.tasks.push(task);
        Ok(id)
    }

    /// Insert an already-built task (used when rehydrating a snapshot).
    /// The caller must have checked that the id is not in the store yet
    pub(crate) fn insert(&mut self, task: Task) {
        debug_assert!(self.get(task.id()).is_none(), "duplicate task id {}", task.id());
        self.tasks.push(task);
    }

    /// Remove a task. Removing an unknown id reports [`Error::TaskNotFound`],
    /// it is never silently ignored
    pub fn delete(&mut self, id: TaskId) -> Result<Task, Error> {
        match self.tasks.iter().position(|task| task.id() == id) {
            Some(index) => Ok(self.tasks.remove(index)),
            None => Err(Error::TaskNotFound(id)),
        }
    }

    pub fn set_completed(&mut self, id: TaskId, completed: bool) -> Result<&Task, Error> {
        match self.tasks.iter_mut().find(|task| task.id() == id) {
            Some(task) => {
                task.set_completed(completed);
                Ok(task)
            },
            None => Err(Error::TaskNotFound(id)),
        }
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == id)
    }

    /// The tasks of one day bucket, by ascending time.
    /// Tasks scheduled at the same time keep their insertion order
    pub fn list_by_day(&self, day: Weekday) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter()
            .filter(|task| task.day() == day)
            .collect();
        // sort_by is stable, so insertion order breaks ties
        tasks.sort_by(|a, b| a.time().cmp(&b.time()));
        tasks
    }

    /// Every task of every day, in insertion order. Used for snapshotting
    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    /// Remove every task for every day. Idempotent
    pub fn clear_all(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Case-insensitive substring search over descriptions.
    ///
    /// An empty (or all-whitespace) query is a usage error: it is rejected rather
    /// than being interpreted as "return everything".
    pub fn search(&self, query: &str) -> Result<Vec<&Task>, Error> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }
        Ok(self.tasks.iter()
            .filter(|task| task.description().to_lowercase().contains(&query))
            .collect())
    }

    /// The tasks due at this day and minute that have not fired for `minute` yet
    pub(crate) fn due_at(&self, day: Weekday, time: ClockTime, minute: &DateTime<Local>) -> Vec<&Task> {
        self.tasks.iter()
            .filter(|task| task.is_due(day, time, minute))
            .collect()
    }

    /// Record that a task fired its reminder for the given minute
    pub(crate) fn stamp_notified(&mut self, id: TaskId, minute: DateTime<Local>) -> Result<(), Error> {
        match self.tasks.iter_mut().find(|task| task.id() == id) {
            Some(task) => {
                task.stamp_notified(minute);
                Ok(())
            },
            None => Err(Error::TaskNotFound(id)),
        }
    }

    /// Compares two stores field-for-field, with per-day display order.
    ///
    /// This is the equality the persistence round-trip guarantees: internal insertion
    /// order across different days may differ, what matters is what each day shows.
    pub fn has_same_content_as(&self, other: &Self) -> bool {
        if self.tasks.len() != other.tasks.len() {
            return false;
        }
        Weekday::ALL.iter().all(|&day| self.list_by_day(day) == other.list_by_day(day))
    }
}
