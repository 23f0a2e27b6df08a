//! Shutdown signal that tests fire by hand.

use std::sync::{Condvar, Mutex};

use crate::process::ShutdownSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Pending,
    Signalled(i32),
    Released,
}

#[derive(Debug)]
pub(crate) struct ManualShutdownSignal {
    outcome: Mutex<Outcome>,
    changed: Condvar,
}

impl Default for ManualShutdownSignal {
    fn default() -> Self {
        Self {
            outcome: Mutex::new(Outcome::Pending),
            changed: Condvar::new(),
        }
    }
}

impl ManualShutdownSignal {
    /// Simulates delivery of `signal`.
    pub(crate) fn trigger(&self, signal: i32) {
        self.settle(Outcome::Signalled(signal));
    }

    fn settle(&self, next: Outcome) {
        let mut outcome = self.outcome.lock().expect("signal mutex");
        if *outcome == Outcome::Pending {
            *outcome = next;
        }
        self.changed.notify_all();
    }
}

impl ShutdownSignal for ManualShutdownSignal {
    fn wait(&self) -> Option<i32> {
        let guard = self.outcome.lock().expect("signal mutex");
        let outcome = self
            .changed
            .wait_while(guard, |outcome| *outcome == Outcome::Pending)
            .expect("signal mutex");
        match *outcome {
            Outcome::Signalled(signal) => Some(signal),
            Outcome::Pending | Outcome::Released => None,
        }
    }

    fn release(&self) {
        self.settle(Outcome::Released);
    }
}
