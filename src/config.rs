//! Support for library configuration options

use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;

/// The application name, used as the default title of reminder notifications.
/// Feel free to override it when initing this library.
pub static APP_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("WeeklyPlanner".to_string())));

/// The directory component (under `~/.config/`) the default snapshot file lives in.
/// Feel free to override it when initing this library.
pub static CONFIG_DIR_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("weekly-planner".to_string())));

/// The current APP_NAME (falls back to the default if the lock is poisoned)
pub(crate) fn app_name() -> String {
    APP_NAME.lock().map(|name| name.clone()).unwrap_or_else(|_| "WeeklyPlanner".to_string())
}

/// The current CONFIG_DIR_NAME (falls back to the default if the lock is poisoned)
pub(crate) fn config_dir_name() -> String {
    CONFIG_DIR_NAME.lock().map(|name| name.clone()).unwrap_or_else(|_| "weekly-planner".to_string())
}
