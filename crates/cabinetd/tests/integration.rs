//! Integration tests for cabinetd
//!
//! These drive the full launch sequence against the mock host, in paused
//! virtual time.

use cabinet_config::{Imagery, LauncherConfig, builtin_config};
use cabinet_core::{CoreEvent, LaunchPhase, Liveness, Orchestrator};
use cabinet_host_api::{HostCall, MockHost, MockProbe, MockProcess, ZOrder};
use cabinet_util::{CabinetError, DeviceId, ProcessId, SurfaceId};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;

const GAME_PID: ProcessId = ProcessId::new(5150);

type MockOrchestrator = Orchestrator<MockHost, MockHost, MockProbe>;

fn game() -> MockProcess {
    MockProcess {
        executable: "sinmai.exe".into(),
        pid: GAME_PID,
        appears_after: Duration::from_secs(8),
        window_after: Some(Duration::from_secs(12)),
    }
}

fn make_orchestrator(host: &MockHost, probe: &MockProbe) -> MockOrchestrator {
    let config = builtin_config().unwrap();
    Orchestrator::new(config, host.clone(), host.clone(), probe.clone()).unwrap()
}

/// Step until `phase` is reached, collecting every event on the way
async fn step_until(orch: &mut MockOrchestrator, phase: LaunchPhase) -> Vec<CoreEvent> {
    let mut events = Vec::new();
    for _ in 0..100 {
        if orch.phase() == phase {
            return events;
        }
        events.extend(orch.step().await);
    }
    panic!("never reached {phase}, stuck in {}", orch.phase());
}

/// Image paths painted, one entry per paint call
fn painted(host: &MockHost) -> Vec<PathBuf> {
    host.calls()
        .into_iter()
        .filter_map(|c| match c {
            HostCall::Paint { image, .. } => Some(image),
            _ => None,
        })
        .collect()
}

fn imagery(config: &LauncherConfig, kind: Imagery) -> PathBuf {
    config.imagery.path(kind).to_path_buf()
}

#[tokio::test(start_paused = true)]
async fn test_network_retries_then_launch() {
    let config = builtin_config().unwrap();
    let host = MockHost::with_monitors(3);
    let probe = MockProbe::new([false, false], true);
    let mut orch = make_orchestrator(&host, &probe);

    let events = step_until(&mut orch, LaunchPhase::AwaitingProcess).await;

    let failures: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            CoreEvent::ProbeFailed { attempt } => Some(*attempt),
            _ => None,
        })
        .collect();
    assert_eq!(failures, vec![1, 2]);
    assert_eq!(probe.probe_count(), 3);

    // Two network-error rounds on three surfaces, then both splashes
    let network_error = imagery(&config, Imagery::NetworkError);
    let splash = imagery(&config, Imagery::Splash);
    let secondary = imagery(&config, Imagery::SplashSecondary);
    let mut expected = vec![network_error; 6];
    expected.extend(vec![splash; 3]);
    expected.extend(vec![secondary; 3]);
    assert_eq!(painted(&host), expected);

    // The launcher runs only after the splash sequence
    let calls = host.calls();
    let launch_at = calls
        .iter()
        .position(|c| matches!(c, HostCall::Launch { .. }))
        .unwrap();
    let last_paint = calls
        .iter()
        .rposition(|c| matches!(c, HostCall::Paint { .. }))
        .unwrap();
    assert!(launch_at > last_paint);
    assert_eq!(host.launch_count(), 1);
    assert_eq!(
        calls[launch_at],
        HostCall::Launch {
            script: "start.bat".into()
        }
    );
}

#[tokio::test(start_paused = true)]
async fn test_rotation_happens_once_per_display_before_any_paint() {
    let host = MockHost::with_monitors(3);
    host.fail_rotation(DeviceId::new(r"\\.\DISPLAY2"));
    let mut orch = make_orchestrator(&host, &MockProbe::reachable());

    let start = Instant::now();
    let events = orch.step().await;

    assert!(events.contains(&CoreEvent::DisplaysRotated { all_ok: false }));
    assert_eq!(orch.phase(), LaunchPhase::AwaitingNetwork);
    // Three 1s settles, a 2s final settle, then the 1s boot settle
    assert_eq!(start.elapsed(), Duration::from_secs(6));

    let rotated: Vec<_> = host
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            HostCall::Rotate { device } => Some(device),
            _ => None,
        })
        .collect();
    assert_eq!(rotated.len(), 3);
    assert!(painted(&host).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_process_never_appears() {
    let config = builtin_config().unwrap();
    let host = MockHost::with_monitors(2);
    let mut orch = make_orchestrator(&host, &MockProbe::reachable());

    step_until(&mut orch, LaunchPhase::AwaitingProcess).await;
    let start = Instant::now();
    let events = orch.step().await;

    assert_eq!(orch.phase(), LaunchPhase::ProcessTimedOut);
    assert_eq!(start.elapsed(), Duration::from_secs(60));
    assert!(events.contains(&CoreEvent::ImageryShown {
        imagery: Imagery::LaunchError,
        complete: true,
    }));
    for surface in orch.surfaces() {
        assert_eq!(
            host.current_image(surface.info.id),
            Some(imagery(&config, Imagery::LaunchError))
        );
    }

    // Terminal: idles without looking for the process again
    let lookups = host.process_lookups();
    let pumps = host.pump_count();
    for _ in 0..50 {
        assert!(orch.step().await.is_empty());
    }
    assert_eq!(orch.phase(), LaunchPhase::ProcessTimedOut);
    assert_eq!(host.process_lookups(), lookups);
    assert!(host.pump_count() > pumps);
}

#[tokio::test(start_paused = true)]
async fn test_launch_failure_is_terminal() {
    let config = builtin_config().unwrap();
    let host = MockHost::with_monitors(1);
    host.fail_launch();
    let mut orch = make_orchestrator(&host, &MockProbe::reachable());

    let events = step_until(&mut orch, LaunchPhase::LaunchFailed).await;

    assert!(events.contains(&CoreEvent::LaunchInvoked { ok: false }));
    assert_eq!(
        host.current_image(SurfaceId::new(1)),
        Some(imagery(&config, Imagery::LaunchError))
    );
    assert_eq!(host.process_lookups(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_missing_window_still_supervises() {
    let host = MockHost::with_monitors(1);
    host.set_process(MockProcess {
        window_after: None,
        ..game()
    });
    let mut orch = make_orchestrator(&host, &MockProbe::reachable());

    let events = step_until(&mut orch, LaunchPhase::Supervising(Liveness::Alive)).await;

    assert!(events.contains(&CoreEvent::WindowConfirmed {
        pid: GAME_PID,
        confirmed: false,
    }));
    assert_eq!(orch.supervised().map(|s| s.pid), Some(GAME_PID));
    // The raise is still attempted, and the surfaces still go behind
    assert!(host
        .calls()
        .contains(&HostCall::BringToFront { pid: GAME_PID }));
    assert_eq!(host.z_order(SurfaceId::new(1)), Some(ZOrder::Back));
}

#[tokio::test(start_paused = true)]
async fn test_crash_and_recovery_transitions_fire_once() {
    let config = builtin_config().unwrap();
    let backdrop = imagery(&config, Imagery::Backdrop);
    let host = MockHost::with_monitors(3);
    host.set_process(game());
    let mut orch = make_orchestrator(&host, &MockProbe::reachable());

    step_until(&mut orch, LaunchPhase::Supervising(Liveness::Alive)).await;
    for surface in orch.surfaces() {
        assert_eq!(surface.z_order, ZOrder::Back);
        assert_eq!(host.current_image(surface.info.id), Some(backdrop.clone()));
    }

    // Alive twice, then gone for good
    host.push_liveness([true, true]);
    host.set_alive(false);
    host.clear_calls();

    let mut exits = 0;
    for _ in 0..20 {
        for event in orch.step().await {
            if let CoreEvent::ProcessExited { pid } = event {
                assert_eq!(pid, GAME_PID);
                exits += 1;
            }
        }
    }
    assert_eq!(exits, 1);
    assert_eq!(orch.phase(), LaunchPhase::Supervising(Liveness::Dead));

    // Surfaces raised, then the backdrop redrawn over everything
    let calls = host.calls();
    let raised: Vec<_> = calls
        .iter()
        .filter(|c| matches!(c, HostCall::ZOrder { order: ZOrder::Front, .. }))
        .collect();
    assert_eq!(raised.len(), 3);
    let last_raise = calls
        .iter()
        .rposition(|c| matches!(c, HostCall::ZOrder { .. }))
        .unwrap();
    let first_paint = calls
        .iter()
        .position(|c| matches!(c, HostCall::Paint { .. }))
        .unwrap();
    assert!(first_paint > last_raise);
    assert_eq!(painted(&host), vec![backdrop.clone(); 3]);

    // Same identifier comes back
    host.set_alive(true);
    host.clear_calls();

    let mut returns = 0;
    for _ in 0..20 {
        returns += orch
            .step()
            .await
            .iter()
            .filter(|e| matches!(e, CoreEvent::ProcessReturned { .. }))
            .count();
    }
    assert_eq!(returns, 1);
    assert_eq!(orch.phase(), LaunchPhase::Supervising(Liveness::Alive));

    let calls = host.calls();
    assert_eq!(calls[0], HostCall::BringToFront { pid: GAME_PID });
    for surface in orch.surfaces() {
        assert_eq!(host.z_order(surface.info.id), Some(ZOrder::Back));
    }
    assert_eq!(painted(&host), vec![backdrop; 3]);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_releases_surfaces_once() {
    let host = MockHost::with_monitors(2);
    let mut orch = make_orchestrator(&host, &MockProbe::reachable());
    orch.step().await;

    orch.shutdown();
    orch.shutdown();

    let destroys = host
        .calls()
        .iter()
        .filter(|c| matches!(c, HostCall::DestroySurfaces))
        .count();
    assert_eq!(destroys, 1);
    assert!(orch.surfaces().is_empty());
    assert!(host.surfaces().is_empty());
}

#[test]
fn test_no_monitors_is_setup_failure() {
    let host = MockHost::new(vec![]);
    let result = Orchestrator::new(
        builtin_config().unwrap(),
        host.clone(),
        host,
        MockProbe::reachable(),
    );
    assert!(matches!(result, Err(CabinetError::NoDisplays)));
}
