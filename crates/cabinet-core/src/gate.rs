//! Network reachability gate

use cabinet_host_api::{DisplayHost, ProbeTarget, ReachabilityProbe};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::Pump;

/// Blocks the launch until the service host accepts a TCP connection
#[derive(Debug, Clone)]
pub struct ReachabilityGate {
    target: ProbeTarget,
    retry_delay: Duration,
}

impl ReachabilityGate {
    pub fn new(target: ProbeTarget, retry_delay: Duration) -> Self {
        Self {
            target,
            retry_delay,
        }
    }

    pub fn target(&self) -> &ProbeTarget {
        &self.target
    }

    /// One probe, with the message queue pumped while it is in flight
    pub async fn probe_once<D, R>(&self, display: &D, probe: &R, pump: &Pump) -> bool
    where
        D: DisplayHost + ?Sized,
        R: ReachabilityProbe + ?Sized,
    {
        let reachable = pump.drive(display, probe.probe(&self.target)).await;
        debug!(host = %self.target.host, port = self.target.port, reachable, "Reachability probe");
        reachable
    }

    /// The pause between a failed probe and the next one
    pub async fn retry_pause<D: DisplayHost + ?Sized>(&self, display: &D, pump: &Pump) {
        pump.wait(display, self.retry_delay).await;
    }

    /// Probe until reachable, calling `on_failure` once per failed probe
    /// before pausing. There is no attempt cap. Returns the number of failed
    /// probes.
    pub async fn wait_until_reachable<D, R, F>(
        &self,
        display: &D,
        probe: &R,
        pump: &Pump,
        mut on_failure: F,
    ) -> u32
    where
        D: DisplayHost + ?Sized,
        R: ReachabilityProbe + ?Sized,
        F: FnMut(u32),
    {
        let mut failures = 0;
        loop {
            if self.probe_once(display, probe, pump).await {
                self.report_reachable(failures);
                return failures;
            }
            failures += 1;
            self.report_failure(failures);
            on_failure(failures);
            self.retry_pause(display, pump).await;
        }
    }

    pub fn report_failure(&self, attempt: u32) {
        warn!(
            host = %self.target.host,
            port = self.target.port,
            attempt,
            "Network unreachable, retrying"
        );
    }

    pub fn report_reachable(&self, failures: u32) {
        info!(failures, "Network reachable");
    }
}
