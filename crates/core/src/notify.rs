//! Fire-and-forget user notices emitted by store operations.

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// Receives a short message after each store operation. Implementations must
/// not fail; a notice that cannot be shown is dropped.
pub trait Notifier {
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Default notifier: forwards notices to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Success | NoticeLevel::Info => info!(notice = message),
            NoticeLevel::Error => warn!(notice = message),
        }
    }
}
