//! This crate provides the core of a weekly, time-of-day task planner.
//!
//! Tasks are short to-do items bound to a weekday and a clock time. They live in a single
//! [`TaskStore`], are persisted to a flat JSON file in the [`storage`] module, and an
//! [`AlarmScheduler`](scheduler::AlarmScheduler) polls the local clock to fire each reminder
//! exactly once per scheduled minute. \
//! The [`Planner`] ties these together into the command surface a display layer talks to. \
//! Nothing in here draws widgets or plays sounds: rendering is up to the embedding
//! application, and reminder delivery goes through the narrow
//! [`NotificationSink`](traits::NotificationSink) interface.

pub mod traits;

pub mod schedule;
pub use schedule::{ClockTime, Weekday};
mod task;
pub use task::{Priority, Task, TaskId};
pub mod store;
pub use store::TaskStore;
pub mod storage;
pub use storage::Storage;
pub mod scheduler;
pub use scheduler::{AlarmScheduler, SchedulerHandle};
pub mod planner;
pub use planner::Planner;

mod event;
pub use event::PlannerEvent;
mod error;
pub use error::Error;

pub mod config;
