use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Cancellable periodic driver for client-side tick and autosave loops.
/// Replaces unconditional frame-callback recursion with an explicit
/// start/stop lifecycle; dropping a scheduler stops it.
///
/// The scheduler only owns wall-clock cadence. Anything that needs
/// deterministic testing (`Session::advance`, store reconciliation) takes its
/// instant as a parameter and is driven directly in tests.
#[derive(Debug)]
pub struct Scheduler {
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Run `task` every `period` until `stop` or drop. The first run happens
    /// one period after start, not immediately.
    pub fn start<F>(period: Duration, mut task: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; skip it.
            interval.tick().await;
            loop {
                interval.tick().await;
                task();
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
