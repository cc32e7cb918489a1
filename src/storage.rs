//! This module persists the task store to a flat JSON file
//!
//! The snapshot groups tasks by day name:
//! ```json
//! {
//!   "Monday": [ { "id": "...", "time": "07:00", "description": "Standup", "priority": "High", "completed": false } ],
//!   "Tuesday": [],
//!   ...
//! }
//! ```
//! Earlier versions of this program persisted each task as a single
//! `"HH:MM - description [Priority]"` string, which turned out to be fragile to
//! parse back; the snapshot uses structured fields instead.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::Error;
use crate::schedule::{ClockTime, Weekday};
use crate::store::TaskStore;
use crate::task::{Priority, Task, TaskId};

/// Reads and writes [`TaskStore`] snapshots at a given path
#[derive(Clone, Debug, PartialEq)]
pub struct Storage {
    backing_file: PathBuf,
}

/// One task as it appears in the snapshot file. Its day is the key it is grouped under
#[derive(Debug, Serialize, Deserialize)]
struct StoredTask {
    id: TaskId,
    time: ClockTime,
    description: String,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_notified: Option<DateTime<Local>>,
}

impl Storage {
    pub fn new(path: &Path) -> Self {
        Self { backing_file: PathBuf::from(path) }
    }

    /// Get the default path to the snapshot file
    pub fn default_file() -> PathBuf {
        PathBuf::from(format!("~/.config/{}/tasks.json", config::config_dir_name()))
    }

    pub fn path(&self) -> &Path {
        &self.backing_file
    }

    /// Write a complete snapshot of the store to the backing file.
    ///
    /// The write goes to a temporary sibling file first and is then renamed over the
    /// target, so a crash mid-write never corrupts an existing snapshot.
    pub fn save(&self, store: &TaskStore) -> Result<(), Error> {
        let mut days: BTreeMap<Weekday, Vec<StoredTask>> = BTreeMap::new();
        for &day in &Weekday::ALL {
            let tasks = store.list_by_day(day).into_iter()
                .map(|task| StoredTask {
                    id: task.id(),
                    time: task.time(),
                    description: task.description().to_string(),
                    priority: task.priority(),
                    completed: task.completed(),
                    last_notified: task.last_notified().cloned(),
                })
                .collect();
            days.insert(day, tasks);
        }

        let io_error = |source| Error::Storage { path: self.backing_file.clone(), source };

        let tmp_path = self.tmp_path();
        let file = std::fs::File::create(&tmp_path).map_err(io_error)?;
        let written = serde_json::to_writer_pretty(file, &days)
            .map_err(|err| io_error(std::io::Error::new(std::io::ErrorKind::Other, err)))
            .and_then(|_| std::fs::rename(&tmp_path, &self.backing_file).map_err(io_error));
        if written.is_err() {
            // Do not litter the target directory with half-written snapshots
            let _ = std::fs::remove_file(&tmp_path);
        }
        written
    }

    /// Read the snapshot back into a store.
    ///
    /// An absent file is a first run and yields an empty store. An unreadable or
    /// malformed file is reported to the caller, who decides whether to fall back
    /// to an empty store.
    pub fn load(&self) -> Result<TaskStore, Error> {
        let file = match std::fs::File::open(&self.backing_file) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(TaskStore::new()),
            Err(err) => return Err(Error::Storage { path: self.backing_file.clone(), source: err }),
        };

        let days: BTreeMap<Weekday, Vec<StoredTask>> = serde_json::from_reader(file)
            .map_err(|err| self.malformed(err.to_string()))?;

        let mut store = TaskStore::new();
        for (day, tasks) in days {
            for stored in tasks {
                if store.get(stored.id).is_some() {
                    return Err(self.malformed(format!("duplicate task id {}", stored.id)));
                }
                let task = Task::from_parts(stored.id, day, stored.time, stored.description,
                                            stored.priority, stored.completed, stored.last_notified)
                    .map_err(|err| self.malformed(err.to_string()))?;
                store.insert(task);
            }
        }
        Ok(store)
    }

    fn malformed(&self, reason: String) -> Error {
        Error::MalformedSnapshot { path: self.backing_file.clone(), reason }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut file_name = self.backing_file.file_name().unwrap_or_default().to_os_string();
        file_name.push(".tmp");
        self.backing_file.with_file_name(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populated_store() -> TaskStore {
        let mut store = TaskStore::new();
        store.add(Weekday::Monday, "07:00".parse().unwrap(), "Standup".to_string(), Priority::High).unwrap();
        store.add(Weekday::Monday, "18:30".parse().unwrap(), "Gym".to_string(), Priority::Low).unwrap();
        store.add(Weekday::Wednesday, "09:00".parse().unwrap(), "Report".to_string(), Priority::default()).unwrap();
        store.add(Weekday::Sunday, "20:00".parse().unwrap(), "Plan the week".to_string(), Priority::default()).unwrap();
        store
    }

    #[test]
    fn serde_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(&dir.path().join("tasks.json"));

        let mut store = populated_store();
        let id = store.list_by_day(Weekday::Monday)[0].id();
        store.set_completed(id, true).unwrap();
        store.stamp_notified(id, crate::task::minute_bucket(Local::now())).unwrap();

        storage.save(&store).unwrap();
        let retrieved = storage.load().unwrap();
        assert!(store.has_same_content_as(&retrieved));

        let monday = retrieved.list_by_day(Weekday::Monday);
        assert_eq!(monday[0].id(), id);
        assert!(monday[0].completed());
        assert!(monday[0].last_notified().is_some());
    }

    #[test]
    fn absent_file_is_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(&dir.path().join("does-not-exist.json"));
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn malformed_file_is_reported_not_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, b"{ this is not json").unwrap();

        match Storage::new(&path).load() {
            Err(Error::MalformedSnapshot { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected MalformedSnapshot, got {:?}", other),
        }
    }

    #[test]
    fn invalid_time_in_snapshot_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let id = TaskId::random();
        std::fs::write(&path, format!(
            r#"{{ "Monday": [ {{ "id": "{}", "time": "25:99", "description": "Standup" }} ] }}"#, id
        )).unwrap();

        assert!(matches!(Storage::new(&path).load(), Err(Error::MalformedSnapshot { .. })));
    }

    #[test]
    fn duplicate_ids_in_snapshot_are_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let id = TaskId::random();
        let entry = format!(r#"{{ "id": "{}", "time": "07:00", "description": "Standup" }}"#, id);
        std::fs::write(&path, format!(r#"{{ "Monday": [ {0} ], "Tuesday": [ {0} ] }}"#, entry)).unwrap();

        assert!(matches!(Storage::new(&path).load(), Err(Error::MalformedSnapshot { .. })));
    }

    #[test]
    fn optional_fields_get_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, format!(
            r#"{{ "Friday": [ {{ "id": "{}", "time": "10:00", "description": "Review" }} ] }}"#,
            TaskId::random()
        )).unwrap();

        let store = Storage::new(&path).load().unwrap();
        let friday = store.list_by_day(Weekday::Friday);
        assert_eq!(friday.len(), 1);
        assert_eq!(friday[0].priority(), Priority::Medium);
        assert_eq!(friday[0].completed(), false);
        assert!(friday[0].last_notified().is_none());
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let storage = Storage::new(&path);
        storage.save(&populated_store()).unwrap();

        assert!(path.exists());
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("tasks.json")]);
    }

    #[test]
    fn a_failed_save_cleans_up_its_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        // A directory squatting on the target path: the final rename cannot succeed
        std::fs::create_dir(&path).unwrap();

        assert!(Storage::new(&path).save(&populated_store()).is_err());
        assert!(!dir.path().join("tasks.json.tmp").exists());
    }

    #[test]
    fn snapshot_contains_every_day_key_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        Storage::new(&path).save(&TaskStore::new()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        for &day in &Weekday::ALL {
            assert!(json.get(day.name()).map(|tasks| tasks.is_array()).unwrap_or(false), "missing {}", day);
        }

        // Monday comes first in the file, like it does on screen
        assert!(text.find("Monday").unwrap() < text.find("Sunday").unwrap());
    }

    #[test]
    fn unknown_day_key_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, br#"{ "Caturday": [] }"#).unwrap();

        assert!(matches!(Storage::new(&path).load(), Err(Error::MalformedSnapshot { .. })));
    }
}
