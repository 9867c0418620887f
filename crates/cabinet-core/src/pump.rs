//! Cooperative waiting
//!
//! The splash windows live on the orchestrator's thread, so no wait may block
//! that thread for longer than one pump slice without draining the host
//! message queue.

use cabinet_host_api::DisplayHost;
use std::future::Future;
use std::pin::pin;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Waits that keep the host message queue responsive
#[derive(Debug, Clone, Copy)]
pub struct Pump {
    slice: Duration,
}

impl Pump {
    pub fn new(slice: Duration) -> Self {
        Self {
            slice: slice.max(Duration::from_millis(1)),
        }
    }

    pub fn slice(&self) -> Duration {
        self.slice
    }

    /// Wait `duration`, pumping messages at least once per slice
    pub async fn wait<D: DisplayHost + ?Sized>(&self, display: &D, duration: Duration) {
        let deadline = Instant::now() + duration;
        loop {
            display.pump_messages();
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            sleep(self.slice.min(deadline - now)).await;
        }
    }

    /// Drive `fut` to completion, pumping messages once per slice meanwhile
    pub async fn drive<D, F>(&self, display: &D, fut: F) -> F::Output
    where
        D: DisplayHost + ?Sized,
        F: Future,
    {
        let mut fut = pin!(fut);
        loop {
            display.pump_messages();
            tokio::select! {
                output = &mut fut => return output,
                _ = sleep(self.slice) => {}
            }
        }
    }
}
