//! Schedulable to-do items

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Local, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::Error;
use crate::schedule::{ClockTime, Weekday};

/// A stable, opaque task identifier.
///
/// Tasks used to be identified by their rendered display string, which made deletes
/// ambiguous as soon as two tasks rendered identically. Every lookup now goes through
/// a random id assigned at creation, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId {
    content: Uuid,
}

impl TaskId {
    /// Generate a new random TaskId
    pub fn random() -> Self {
        Self { content: Uuid::new_v4() }
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content.to_hyphenated())
    }
}

impl FromStr for TaskId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let content = Uuid::parse_str(s)?;
        Ok(Self { content })
    }
}

/// Used to support serde
impl Serialize for TaskId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
/// Used to support serde
impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D>(deserializer: D) -> Result<TaskId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How important a task is. Only affects how the display layer renders it
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Priority::Low => write!(f, "Low"),
            Priority::Medium => write!(f, "Medium"),
            Priority::High => write!(f, "High"),
        }
    }
}

/// A single to-do item, bound to a weekday and a clock time.
///
/// A task belongs to exactly one day bucket; moving it to another day is done by
/// delete + recreate.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    /// Unique across the whole store, assigned at creation
    id: TaskId,
    day: Weekday,
    time: ClockTime,
    description: String,
    priority: Priority,
    completed: bool,
    /// The last minute this task fired a reminder, truncated to minute granularity.
    /// Guards against the same minute firing twice across scheduler ticks.
    last_notified: Option<DateTime<Local>>,
}

impl Task {
    /// Create a brand new task with a fresh random id.
    ///
    /// The description must contain at least one non-whitespace character.
    pub fn new(day: Weekday, time: ClockTime, description: String, priority: Priority) -> Result<Self, Error> {
        if description.trim().is_empty() {
            return Err(Error::EmptyDescription);
        }
        Ok(Self {
            id: TaskId::random(),
            day,
            time,
            description,
            priority,
            completed: false,
            last_notified: None,
        })
    }

    /// Re-create a task from persisted fields, keeping its original id
    pub(crate) fn from_parts(id: TaskId, day: Weekday, time: ClockTime, description: String,
                             priority: Priority, completed: bool, last_notified: Option<DateTime<Local>>,
                            ) -> Result<Self, Error>
    {
        if description.trim().is_empty() {
            return Err(Error::EmptyDescription);
        }
        Ok(Self { id, day, time, description, priority, completed, last_notified })
    }

    pub fn id(&self) -> TaskId          { self.id           }
    pub fn day(&self) -> Weekday        { self.day          }
    pub fn time(&self) -> ClockTime     { self.time         }
    pub fn description(&self) -> &str   { &self.description }
    pub fn priority(&self) -> Priority  { self.priority     }
    pub fn completed(&self) -> bool     { self.completed    }
    pub fn last_notified(&self) -> Option<&DateTime<Local>> { self.last_notified.as_ref() }

    pub(crate) fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    /// Whether a reminder is due at this very moment: same day bucket, same minute,
    /// and not already notified for that minute
    pub fn is_due(&self, day: Weekday, time: ClockTime, minute: &DateTime<Local>) -> bool {
        self.day == day
            && self.time == time
            && self.last_notified.as_ref() != Some(minute)
    }

    pub(crate) fn stamp_notified(&mut self, minute: DateTime<Local>) {
        self.last_notified = Some(minute);
    }
}

/// Truncates a timestamp to its minute, the granularity reminders are deduplicated at
pub fn minute_bucket(now: DateTime<Local>) -> DateTime<Local> {
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some_task() -> Task {
        Task::new(Weekday::Monday, "07:00".parse().unwrap(), "Standup".to_string(), Priority::High).unwrap()
    }

    #[test]
    fn new_task_defaults() {
        let task = some_task();
        assert_eq!(task.completed(), false);
        assert!(task.last_notified().is_none());
        assert_eq!(task.priority(), Priority::High);
    }

    #[test]
    fn empty_descriptions_are_rejected() {
        assert!(matches!(
            Task::new(Weekday::Monday, "07:00".parse().unwrap(), "".to_string(), Priority::default()),
            Err(Error::EmptyDescription)
        ));
        assert!(Task::new(Weekday::Monday, "07:00".parse().unwrap(), "  \t ".to_string(), Priority::default()).is_err());
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(some_task().id(), some_task().id());
    }

    #[test]
    fn task_id_string_round_trip() {
        let id = TaskId::random();
        let parsed: TaskId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn due_matches_day_and_minute_once() {
        let mut task = some_task();
        let minute = minute_bucket(Local::now());
        let time: ClockTime = "07:00".parse().unwrap();

        assert!(task.is_due(Weekday::Monday, time, &minute));
        assert!(!task.is_due(Weekday::Tuesday, time, &minute));
        assert!(!task.is_due(Weekday::Monday, "07:01".parse().unwrap(), &minute));

        task.stamp_notified(minute);
        assert!(!task.is_due(Weekday::Monday, time, &minute));

        // The stamp only holds for its own minute
        let next_minute = minute + chrono::Duration::minutes(1);
        assert!(task.is_due(Weekday::Monday, time, &next_minute));
    }

    #[test]
    fn minute_bucket_drops_seconds() {
        let bucket = minute_bucket(Local::now());
        assert_eq!(bucket.second(), 0);
        assert_eq!(bucket.nanosecond(), 0);
    }
}
