use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    models::ChangeNotification,
    notification::{Notifier, NotifyError},
};

/// A `Notifier` that records every notification it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<ChangeNotification>>,
    fail: bool,
}

impl RecordingNotifier {
    /// Creates a notifier that accepts every notification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier that records every notification, then fails.
    pub fn failing() -> Self {
        Self { sent: Mutex::new(Vec::new()), fail: true }
    }

    /// Returns the notifications received so far.
    pub fn sent(&self) -> Vec<ChangeNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &ChangeNotification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.fail {
            let reason = "recording failure".to_string();
            return Err(NotifyError::NotifyFailed { attempts: 1, reason });
        }
        Ok(())
    }
}
