use async_trait::async_trait;

use crate::error::Error;

/// Where reminders get delivered (a toast, a sound, a calendar API...).
///
/// Concrete delivery lives outside this crate; the scheduler only needs this narrow
/// interface, and treats any returned error as non-fatal.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one reminder to the user
    async fn notify(&self, title: &str, message: &str) -> Result<(), Error>;
}

/// A sink that only logs the reminder.
///
/// Useful as a default, and in headless setups where no real delivery channel exists.
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn notify(&self, title: &str, message: &str) -> Result<(), Error> {
        log::info!("[{}] {}", title, message);
        Ok(())
    }
}
