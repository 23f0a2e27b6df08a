//! Test helpers for the transport module.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use super::TriggerHandler;

/// Records every payload it receives.
#[derive(Debug, Default)]
pub(crate) struct RecordingHandler {
    payloads: Mutex<Vec<Vec<u8>>>,
}

impl RecordingHandler {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn payloads(&self) -> Vec<Vec<u8>> {
        self.payloads.lock().expect("payloads mutex").clone()
    }

    pub(crate) fn wait_for(&self, expected: usize) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if self.payloads.lock().expect("payloads mutex").len() >= expected {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }
}

impl TriggerHandler for RecordingHandler {
    fn handle(&self, payload: &[u8]) {
        self.payloads
            .lock()
            .expect("payloads mutex")
            .push(payload.to_vec());
    }
}
