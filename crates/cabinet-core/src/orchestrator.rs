//! The launch state machine

use cabinet_config::{Imagery, LauncherConfig};
use cabinet_host_api::{
    DisplayHost, LaunchTarget, ProbeTarget, ProcessHost, ReachabilityProbe, ZOrder,
};
use cabinet_util::Result;
use tracing::{info, warn};

use crate::{
    CoreEvent, DisplaySurface, LaunchPhase, Liveness, OrientationController, ProcessSupervisor,
    Pump, ReachabilityGate, SupervisedProcess, SurfaceManager, WindowWait,
};

/// Sequences the launch phases and owns the steady-state supervision loop.
///
/// All state (the surfaces, the supervised process, the current phase) is
/// owned here and driven from a single thread.
pub struct Orchestrator<D, P, R> {
    config: LauncherConfig,
    display: D,
    process: P,
    probe: R,
    pump: Pump,
    surfaces: SurfaceManager,
    orientation: OrientationController,
    gate: ReachabilityGate,
    supervisor: ProcessSupervisor,
    phase: LaunchPhase,
    supervised: Option<SupervisedProcess>,
    failed_probes: u32,
}

impl<D, P, R> Orchestrator<D, P, R>
where
    D: DisplayHost,
    P: ProcessHost,
    R: ReachabilityProbe,
{
    /// Create the splash surfaces and enter `Booting`.
    ///
    /// Fails only when no monitor could be enumerated.
    pub fn new(config: LauncherConfig, display: D, process: P, probe: R) -> Result<Self> {
        let surfaces = SurfaceManager::create(&display)?;

        let timing = &config.timing;
        let pump = Pump::new(timing.pump_slice);
        let orientation =
            OrientationController::new(timing.orientation_settle, timing.orientation_final_settle);
        let gate = ReachabilityGate::new(
            ProbeTarget {
                host: config.network.host.clone(),
                port: config.network.port,
                timeout: config.network.timeout,
            },
            config.network.retry_delay,
        );
        let supervisor = ProcessSupervisor::new(
            config.launch.executable.clone(),
            config.launch.poll_interval,
            config.launch.window_settle,
        );

        info!(surfaces = surfaces.len(), "Orchestrator ready");

        Ok(Self {
            config,
            display,
            process,
            probe,
            pump,
            surfaces,
            orientation,
            gate,
            supervisor,
            phase: LaunchPhase::Booting,
            supervised: None,
            failed_probes: 0,
        })
    }

    pub fn phase(&self) -> LaunchPhase {
        self.phase
    }

    pub fn surfaces(&self) -> &[DisplaySurface] {
        self.surfaces.surfaces()
    }

    pub fn supervised(&self) -> Option<&SupervisedProcess> {
        self.supervised.as_ref()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Step forever. Terminal phases idle; nothing here returns.
    pub async fn run(&mut self) {
        loop {
            self.step().await;
        }
    }

    /// Perform one transition from the current phase
    pub async fn step(&mut self) -> Vec<CoreEvent> {
        let mut events = Vec::new();

        match self.phase {
            LaunchPhase::Booting => self.boot(&mut events).await,
            LaunchPhase::AwaitingNetwork => self.await_network(&mut events).await,
            LaunchPhase::AwaitingNetworkRetry => {
                self.gate.retry_pause(&self.display, &self.pump).await;
                self.enter(LaunchPhase::AwaitingNetwork, &mut events);
            }
            LaunchPhase::Launching => self.launch(&mut events).await,
            LaunchPhase::AwaitingProcess => self.await_process(&mut events).await,
            LaunchPhase::LaunchFailed | LaunchPhase::ProcessTimedOut => {
                self.pump
                    .wait(&self.display, self.config.timing.idle_slice)
                    .await;
            }
            LaunchPhase::Supervising(_) => self.supervise(&mut events).await,
        }

        events
    }

    /// Release every surface. Called once, at shutdown.
    pub fn shutdown(&mut self) {
        info!(phase = %self.phase, "Shutting down");
        self.surfaces.release(&self.display);
    }

    async fn boot(&mut self, events: &mut Vec<CoreEvent>) {
        let all_ok = self
            .orientation
            .rotate_all(&self.display, &self.pump, self.surfaces.surfaces())
            .await;
        if !all_ok {
            warn!("Not every display could be rotated, continuing");
        }
        events.push(CoreEvent::DisplaysRotated { all_ok });

        self.pump
            .wait(&self.display, self.config.timing.boot_settle)
            .await;
        self.enter(LaunchPhase::AwaitingNetwork, events);
    }

    async fn await_network(&mut self, events: &mut Vec<CoreEvent>) {
        if !self
            .gate
            .probe_once(&self.display, &self.probe, &self.pump)
            .await
        {
            self.failed_probes += 1;
            self.gate.report_failure(self.failed_probes);
            events.push(CoreEvent::ProbeFailed {
                attempt: self.failed_probes,
            });
            self.show(Imagery::NetworkError, events);
            self.enter(LaunchPhase::AwaitingNetworkRetry, events);
            return;
        }

        self.gate.report_reachable(self.failed_probes);

        if !self.show(Imagery::Splash, events) {
            warn!("Splash imagery could not be shown, not launching");
            self.enter(LaunchPhase::LaunchFailed, events);
            return;
        }
        self.pump
            .wait(&self.display, self.config.timing.splash_hold)
            .await;

        self.show(Imagery::SplashSecondary, events);
        self.pump
            .wait(&self.display, self.config.timing.splash_secondary_hold)
            .await;

        self.enter(LaunchPhase::Launching, events);
    }

    async fn launch(&mut self, events: &mut Vec<CoreEvent>) {
        let target = LaunchTarget {
            verb: self.config.launch.verb.clone(),
            script: self.config.launch.script.clone(),
        };

        match self.process.launch(&target) {
            Ok(()) => {
                info!(script = %target.script, "Launcher invoked");
                events.push(CoreEvent::LaunchInvoked { ok: true });
                self.enter(LaunchPhase::AwaitingProcess, events);
            }
            Err(e) => {
                warn!(script = %target.script, error = %e, "Launcher invocation failed");
                events.push(CoreEvent::LaunchInvoked { ok: false });
                self.show(Imagery::LaunchError, events);
                self.enter(LaunchPhase::LaunchFailed, events);
            }
        }
    }

    async fn await_process(&mut self, events: &mut Vec<CoreEvent>) {
        let Some(pid) = self
            .supervisor
            .find_by_executable_name(
                &self.process,
                &self.display,
                &self.pump,
                self.config.launch.process_timeout,
            )
            .await
        else {
            self.show(Imagery::LaunchError, events);
            self.enter(LaunchPhase::ProcessTimedOut, events);
            return;
        };
        events.push(CoreEvent::ProcessFound { pid });

        let window = self
            .supervisor
            .wait_for_visible_window(
                &self.process,
                &self.display,
                &self.pump,
                pid,
                self.config.launch.window_timeout,
            )
            .await;
        events.push(CoreEvent::WindowConfirmed {
            pid,
            confirmed: window == WindowWait::Confirmed,
        });

        self.supervised = Some(SupervisedProcess::new(pid));

        let timing = self.config.timing.clone();
        self.pump.wait(&self.display, timing.attach_settle).await;
        self.supervisor.bring_to_front(&self.process, pid);
        self.pump
            .wait(&self.display, timing.attach_focus_settle)
            .await;
        self.surfaces.set_z_order(&self.display, ZOrder::Back);
        self.pump
            .wait(&self.display, timing.attach_backdrop_settle)
            .await;
        self.show(Imagery::Backdrop, events);

        self.enter(LaunchPhase::Supervising(Liveness::Alive), events);
    }

    async fn supervise(&mut self, events: &mut Vec<CoreEvent>) {
        let Some(mut supervised) = self.supervised else {
            // Supervising is only ever entered with a discovered process
            self.pump
                .wait(&self.display, self.config.timing.supervise_poll)
                .await;
            return;
        };

        let alive = self.supervisor.is_alive(&self.process, supervised.pid);
        let change = supervised.observe(alive);
        self.supervised = Some(supervised);
        let pid = supervised.pid;
        let timing = self.config.timing.clone();

        match change {
            Some(Liveness::Dead) => {
                info!(pid = %pid, "Game process exited");
                events.push(CoreEvent::ProcessExited { pid });
                self.pump.wait(&self.display, timing.exit_settle).await;
                self.surfaces.set_z_order(&self.display, ZOrder::Front);
                self.show(Imagery::Backdrop, events);
                self.enter(LaunchPhase::Supervising(Liveness::Dead), events);
            }
            Some(Liveness::Alive) => {
                info!(pid = %pid, "Game process is back");
                events.push(CoreEvent::ProcessReturned { pid });
                self.pump.wait(&self.display, timing.recover_settle).await;
                self.supervisor.bring_to_front(&self.process, pid);
                self.pump
                    .wait(&self.display, timing.recover_focus_settle)
                    .await;
                self.surfaces.set_z_order(&self.display, ZOrder::Back);
                self.show(Imagery::Backdrop, events);
                self.enter(LaunchPhase::Supervising(Liveness::Alive), events);
            }
            None => {}
        }

        self.pump
            .wait(&self.display, timing.supervise_poll)
            .await;
    }

    /// Paint `imagery` on every surface
    fn show(&mut self, imagery: Imagery, events: &mut Vec<CoreEvent>) -> bool {
        let path = self.config.imagery.path(imagery).to_path_buf();
        let complete = self.surfaces.paint_all(&self.display, &path);
        if complete {
            info!(imagery = imagery.name(), "Imagery shown");
        } else {
            warn!(imagery = imagery.name(), path = %path.display(), "Imagery incomplete");
        }
        events.push(CoreEvent::ImageryShown { imagery, complete });
        complete
    }

    fn enter(&mut self, to: LaunchPhase, events: &mut Vec<CoreEvent>) {
        let from = self.phase;
        self.phase = to;
        info!(from = %from, to = %to, "Phase changed");
        events.push(CoreEvent::PhaseChanged { from, to });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cabinet_host_api::{HostCall, MockHost, MockProbe, MockProcess};
    use cabinet_util::{CabinetError, ProcessId};
    use std::time::Duration;
    use tokio::time::Instant;

    fn game() -> MockProcess {
        MockProcess {
            executable: "sinmai.exe".into(),
            pid: ProcessId::new(900),
            appears_after: Duration::from_secs(4),
            window_after: Some(Duration::from_secs(6)),
        }
    }

    fn orchestrator(
        host: &MockHost,
        probe: &MockProbe,
    ) -> Orchestrator<MockHost, MockHost, MockProbe> {
        Orchestrator::new(
            LauncherConfig::default(),
            host.clone(),
            host.clone(),
            probe.clone(),
        )
        .unwrap()
    }

    #[test]
    fn no_monitors_fails_setup() {
        let host = MockHost::new(vec![]);
        let result = Orchestrator::new(
            LauncherConfig::default(),
            host.clone(),
            host,
            MockProbe::reachable(),
        );
        assert!(matches!(result, Err(CabinetError::NoDisplays)));
    }

    #[tokio::test(start_paused = true)]
    async fn boot_rotates_then_awaits_network() {
        let host = MockHost::with_monitors(2);
        let mut orch = orchestrator(&host, &MockProbe::reachable());
        assert_eq!(orch.phase(), LaunchPhase::Booting);

        let start = Instant::now();
        let events = orch.step().await;

        assert_eq!(orch.phase(), LaunchPhase::AwaitingNetwork);
        assert!(events.contains(&CoreEvent::DisplaysRotated { all_ok: true }));
        // 1s per display, 2s final, 1s boot settle
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        // Nothing painted while booting
        assert!(!host.calls().iter().any(|c| matches!(c, HostCall::Paint { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn reachable_network_shows_splash_sequence() {
        let host = MockHost::with_monitors(1);
        let mut orch = orchestrator(&host, &MockProbe::reachable());
        orch.step().await;
        host.clear_calls();

        let start = Instant::now();
        let events = orch.step().await;

        assert_eq!(orch.phase(), LaunchPhase::Launching);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
        let shown: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                CoreEvent::ImageryShown { imagery, .. } => Some(*imagery),
                _ => None,
            })
            .collect();
        assert_eq!(shown, vec![Imagery::Splash, Imagery::SplashSecondary]);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_splash_is_terminal() {
        let host = MockHost::with_monitors(2);
        let config = LauncherConfig::default();
        host.set_missing_image(config.imagery.splash.clone());
        let mut orch = orchestrator(&host, &MockProbe::reachable());

        orch.step().await;
        orch.step().await;

        assert_eq!(orch.phase(), LaunchPhase::LaunchFailed);
        assert_eq!(host.launch_count(), 0);
        assert_eq!(host.paint_count(&config.imagery.splash_secondary), 0);
        assert_eq!(host.paint_count(&config.imagery.launch_error), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn launch_failure_is_terminal() {
        let host = MockHost::with_monitors(2);
        host.fail_launch();
        let mut orch = orchestrator(&host, &MockProbe::reachable());

        orch.step().await;
        orch.step().await;
        let events = orch.step().await;

        assert_eq!(orch.phase(), LaunchPhase::LaunchFailed);
        assert!(events.contains(&CoreEvent::LaunchInvoked { ok: false }));
        assert!(events.contains(&CoreEvent::ImageryShown {
            imagery: Imagery::LaunchError,
            complete: true,
        }));

        // Idles without further host activity
        host.clear_calls();
        for _ in 0..10 {
            assert!(orch.step().await.is_empty());
        }
        assert!(host.calls().is_empty());
        assert_eq!(orch.phase(), LaunchPhase::LaunchFailed);
    }

    #[tokio::test(start_paused = true)]
    async fn attach_sequence_orders_focus_restack_and_backdrop() {
        let host = MockHost::with_monitors(2);
        host.set_process(game());
        let config = LauncherConfig::default();
        let mut orch = orchestrator(&host, &MockProbe::reachable());

        orch.step().await; // Booting
        orch.step().await; // AwaitingNetwork
        orch.step().await; // Launching
        host.clear_calls();

        let start = Instant::now();
        let events = orch.step().await;

        assert_eq!(orch.phase(), LaunchPhase::Supervising(Liveness::Alive));
        assert_eq!(
            orch.supervised(),
            Some(&SupervisedProcess::new(ProcessId::new(900)))
        );
        assert!(events.contains(&CoreEvent::WindowConfirmed {
            pid: ProcessId::new(900),
            confirmed: true,
        }));
        // Window at 6s, 2s settle, then 3s + 2s + 1s
        assert_eq!(start.elapsed(), Duration::from_secs(14));

        assert_eq!(
            host.calls(),
            vec![
                HostCall::BringToFront {
                    pid: ProcessId::new(900)
                },
                HostCall::ZOrder {
                    surface: cabinet_util::SurfaceId::new(1),
                    order: ZOrder::Back
                },
                HostCall::ZOrder {
                    surface: cabinet_util::SurfaceId::new(2),
                    order: ZOrder::Back
                },
                HostCall::Paint {
                    surface: cabinet_util::SurfaceId::new(1),
                    image: config.imagery.backdrop.clone()
                },
                HostCall::Paint {
                    surface: cabinet_util::SurfaceId::new(2),
                    image: config.imagery.backdrop.clone()
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn supervising_polls_every_half_second() {
        let host = MockHost::with_monitors(1);
        host.set_process(game());
        let mut orch = orchestrator(&host, &MockProbe::reachable());
        for _ in 0..4 {
            orch.step().await;
        }

        let checks = host.liveness_checks();
        let start = Instant::now();
        for _ in 0..10 {
            assert!(orch.step().await.is_empty());
        }

        assert_eq!(start.elapsed(), Duration::from_secs(5));
        assert_eq!(host.liveness_checks() - checks, 10);
    }

    async fn supervising(host: &MockHost) -> Orchestrator<MockHost, MockHost, MockProbe> {
        let mut orch = orchestrator(host, &MockProbe::reachable());
        for _ in 0..4 {
            orch.step().await;
        }
        assert_eq!(orch.phase(), LaunchPhase::Supervising(Liveness::Alive));
        orch
    }

    #[tokio::test(start_paused = true)]
    async fn exit_settles_then_raises_and_repaints() {
        let config = LauncherConfig::default();
        let host = MockHost::with_monitors(1);
        host.set_process(game());
        let mut orch = supervising(&host).await;
        host.set_alive(false);
        host.clear_calls();

        let start = Instant::now();
        let events = orch.step().await;

        assert_eq!(orch.phase(), LaunchPhase::Supervising(Liveness::Dead));
        assert!(events.contains(&CoreEvent::ProcessExited {
            pid: ProcessId::new(900)
        }));
        // 1s exit settle, then one 500ms poll
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
        assert_eq!(
            host.calls(),
            vec![
                HostCall::ZOrder {
                    surface: cabinet_util::SurfaceId::new(1),
                    order: ZOrder::Front
                },
                HostCall::Paint {
                    surface: cabinet_util::SurfaceId::new(1),
                    image: config.imagery.backdrop.clone()
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn recovery_settles_raises_game_then_restacks() {
        let config = LauncherConfig::default();
        let host = MockHost::with_monitors(1);
        host.set_process(game());
        let mut orch = supervising(&host).await;
        host.set_alive(false);
        orch.step().await;
        host.set_alive(true);
        host.clear_calls();

        let start = Instant::now();
        let events = orch.step().await;

        assert_eq!(orch.phase(), LaunchPhase::Supervising(Liveness::Alive));
        assert!(events.contains(&CoreEvent::ProcessReturned {
            pid: ProcessId::new(900)
        }));
        // 2s recover settle, 1s focus settle, then one 500ms poll
        assert_eq!(start.elapsed(), Duration::from_millis(3500));
        assert_eq!(
            host.calls(),
            vec![
                HostCall::BringToFront {
                    pid: ProcessId::new(900)
                },
                HostCall::ZOrder {
                    surface: cabinet_util::SurfaceId::new(1),
                    order: ZOrder::Back
                },
                HostCall::Paint {
                    surface: cabinet_util::SurfaceId::new(1),
                    image: config.imagery.backdrop.clone()
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn supervising_without_process_still_pumps() {
        let host = MockHost::with_monitors(1);
        let mut orch = orchestrator(&host, &MockProbe::reachable());
        orch.phase = LaunchPhase::Supervising(Liveness::Alive);
        let pumps = host.pump_count();

        let start = Instant::now();
        let events = orch.step().await;

        assert!(events.is_empty());
        assert_eq!(start.elapsed(), Duration::from_millis(500));
        assert!(host.pump_count() > pumps);
        assert_eq!(host.liveness_checks(), 0);
    }
}
