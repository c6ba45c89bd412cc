// --- File: crates/airline_common/src/testing.rs ---
//! Test doubles shared by the service crates' integration tests.

use std::sync::Mutex;

use crate::error::{external_service_error, AirlineError};
use crate::services::{BoxFuture, NotificationEvent, Notifier};

/// Keeps every event it is given. Can be told to fail to exercise the quiet path.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotificationEvent>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier that records the event and then reports delivery failure.
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, event: NotificationEvent) -> BoxFuture<'_, (), AirlineError> {
        Box::pin(async move {
            if let Ok(mut events) = self.events.lock() {
                events.push(event);
            }
            if self.fail {
                return Err(external_service_error("Notification service", "unavailable"));
            }
            Ok(())
        })
    }
}
