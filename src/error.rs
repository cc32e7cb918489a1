//! Error kinds surfaced at the command boundary

use std::path::PathBuf;

use thiserror::Error;

use crate::task::TaskId;

/// Every error the planner core can report.
///
/// Validation and not-found errors are returned synchronously to the command caller,
/// before any mutation happens. Storage errors on save are surfaced but the in-memory
/// change is kept. Notification errors never escape the scheduler tick.
#[derive(Debug, Error)]
pub enum Error {
    /// The given day name is not one of the seven canonical weekday names
    #[error("invalid day name: {0:?}")]
    InvalidDay(String),

    /// The given time does not parse as 24-hour `HH:MM`
    #[error("invalid time (expected HH:MM between 00:00 and 23:59): {0:?}")]
    InvalidTime(String),

    #[error("a task description cannot be empty")]
    EmptyDescription,

    /// `search` requires a non-empty query
    #[error("a search query cannot be empty")]
    EmptyQuery,

    #[error("no task with id {0}")]
    TaskNotFound(TaskId),

    /// Reading or writing the snapshot file failed
    #[error("unable to access {path:?}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot file exists but does not contain a valid snapshot
    #[error("malformed snapshot file {path:?}: {reason}")]
    MalformedSnapshot {
        path: PathBuf,
        reason: String,
    },

    /// A notification could not be delivered. Always non-fatal
    #[error("unable to deliver notification: {0}")]
    Notification(String),
}

impl Error {
    /// Whether this error was caused by rejected user input
    pub fn is_validation(&self) -> bool {
        matches!(self,
            Error::InvalidDay(_) | Error::InvalidTime(_) | Error::EmptyDescription | Error::EmptyQuery)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::TaskNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_predicate() {
        assert!(Error::EmptyDescription.is_validation());
        assert!(Error::InvalidTime("25:00".to_string()).is_validation());
        assert!(!Error::EmptyQuery.is_not_found());
        assert!(Error::TaskNotFound(TaskId::random()).is_not_found());
    }
}
