//! A tiny headless walk-through of the planner core.
//!
//! Adds a few tasks (one scheduled for the current minute), starts the alarm
//! scheduler, and prints the first reminder that fires.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Local};

use weekly_planner::traits::LogNotifier;
use weekly_planner::{Planner, PlannerEvent, Priority, Weekday};

#[tokio::main]
async fn main() {
    env_logger::init();

    let path = std::env::temp_dir().join("weekly-planner-demo.json");
    let mut planner = Planner::open(&path);
    let mut events = planner.subscribe();

    planner.clear_all().unwrap();
    planner.add_task("Monday", "07:00", "Standup", Priority::High).unwrap();
    planner.add_task("Friday", "18:30", "Water the plants", Priority::Low).unwrap();

    // One task scheduled for right now, so the first tick has something to fire
    let now = Local::now();
    let today = Weekday::from(now.weekday());
    planner.add_task(&today.to_string(), &now.format("%H:%M").to_string(), "Look at this demo", Priority::Medium).unwrap();

    println!("---- tasks for {} ----", today);
    for task in planner.list_by_day(today) {
        let done = if task.completed() { "x" } else { " " };
        println!("[{}] {}  {}  ({})", done, task.time(), task.description(), task.priority());
    }

    let scheduler = planner
        .alarm_scheduler(Arc::new(LogNotifier))
        .with_tick_interval(Duration::from_secs(2));
    let handle = scheduler.start();

    println!("---- waiting for the reminder ----");
    while let Some(event) = events.recv().await {
        if let PlannerEvent::ReminderDue { description, day, .. } = event {
            println!("Reminder! {} (scheduled for {})", description, day);
            break;
        }
    }

    handle.stop().await;
    println!("Tasks were saved to {:?}", path);
}
