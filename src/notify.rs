//! Global success / error notifications.

use crate::transport::TransportError;

/// Shows the outcome of a submission to the user. Fire-and-forget.
pub trait Notifier {
    fn show_success(&mut self);
    fn show_error(&mut self, error: &TransportError);
}

/// Notifier that only writes to the log, for headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_success(&mut self) {
        log::info!("Post published");
    }

    fn show_error(&mut self, error: &TransportError) {
        log::error!("Post failed: {}", error);
    }
}
