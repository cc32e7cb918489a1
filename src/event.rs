//! Events the core reports to the display layer

use crate::schedule::Weekday;
use crate::task::TaskId;

/// What happened in the planner, so the display layer can refresh what it renders.
///
/// Mutations emit their event after both the in-memory change and the write-through
/// save were attempted. `ReminderDue` is emitted by the alarm scheduler.
#[derive(Clone, Debug, PartialEq)]
pub enum PlannerEvent {
    TaskAdded(TaskId),
    TaskRemoved(TaskId),
    /// A task changed in place (e.g. its completion was toggled)
    TaskUpdated(TaskId),
    /// A reminder fired for this task's scheduled minute
    ReminderDue {
        id: TaskId,
        description: String,
        day: Weekday,
    },
}
