//! Mock host and probe for testing

use async_trait::async_trait;
use cabinet_util::{DeviceId, ProcessId, SurfaceId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use crate::{
    DisplayHost, HostError, HostResult, LaunchTarget, MonitorRect, ProbeTarget, ProcessHost,
    ReachabilityProbe, SurfaceInfo, ZOrder,
};

/// A host operation recorded by [`MockHost`], in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    CreateSurfaces,
    Rotate { device: DeviceId },
    Paint { surface: SurfaceId, image: PathBuf },
    ZOrder { surface: SurfaceId, order: ZOrder },
    Launch { script: String },
    BringToFront { pid: ProcessId },
    DestroySurfaces,
}

/// Scripted game process
#[derive(Debug, Clone)]
pub struct MockProcess {
    pub executable: String,
    pub pid: ProcessId,

    /// Delay after launch before the process shows up in the process table
    pub appears_after: Duration,

    /// Delay after launch before it owns a visible window (None: never)
    pub window_after: Option<Duration>,
}

#[derive(Debug, Default)]
struct MockState {
    monitors: Vec<MonitorRect>,
    fail_enumeration: bool,
    missing_images: HashSet<PathBuf>,
    broken_surfaces: HashSet<SurfaceId>,
    failing_devices: HashSet<DeviceId>,
    fail_launch: bool,
    process: Option<MockProcess>,
    launched_at: Option<Instant>,
    liveness: VecDeque<bool>,
    alive_default: bool,
    surfaces: Vec<SurfaceInfo>,
    images: HashMap<SurfaceId, PathBuf>,
    z_order: HashMap<SurfaceId, ZOrder>,
    calls: Vec<HostCall>,
    liveness_checks: usize,
    process_lookups: usize,
    pumps: u64,
}

/// Mock display and process host for unit/integration testing.
///
/// Clones share state, so a test can keep one handle while the orchestrator
/// owns another.
#[derive(Debug, Clone)]
pub struct MockHost {
    state: Arc<Mutex<MockState>>,
}

impl MockHost {
    /// A host with the given monitors and nothing else scripted
    pub fn new(monitors: Vec<MonitorRect>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                monitors,
                alive_default: true,
                ..Default::default()
            })),
        }
    }

    /// `count` portrait monitors laid out left to right, edge to edge
    pub fn with_monitors(count: usize) -> Self {
        let monitors = (0..count as i32)
            .map(|i| MonitorRect::new(i * 1080, 0, 1080, 1920))
            .collect();
        Self::new(monitors)
    }

    /// Make display enumeration fail at the OS level
    pub fn fail_enumeration(&self) {
        self.state.lock().unwrap().fail_enumeration = true;
    }

    /// Make every load of `image` fail
    pub fn set_missing_image(&self, image: impl Into<PathBuf>) {
        self.state.lock().unwrap().missing_images.insert(image.into());
    }

    /// Make every paint on `surface` fail
    pub fn break_surface(&self, surface: SurfaceId) {
        self.state.lock().unwrap().broken_surfaces.insert(surface);
    }

    /// Make the portrait rotation of `device` be rejected
    pub fn fail_rotation(&self, device: DeviceId) {
        self.state.lock().unwrap().failing_devices.insert(device);
    }

    /// Make the launcher invocation fail
    pub fn fail_launch(&self) {
        self.state.lock().unwrap().fail_launch = true;
    }

    /// Script the game process started by the launcher
    pub fn set_process(&self, process: MockProcess) {
        self.state.lock().unwrap().process = Some(process);
    }

    /// Queue liveness answers; once drained, `is_alive` returns the default
    pub fn push_liveness(&self, answers: impl IntoIterator<Item = bool>) {
        self.state.lock().unwrap().liveness.extend(answers);
    }

    /// Liveness answer once the queue is drained
    pub fn set_alive(&self, alive: bool) {
        self.state.lock().unwrap().alive_default = alive;
    }

    /// Every host call so far, in order
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Successful paints of `image` on each surface, counted per call
    pub fn paint_count(&self, image: &Path) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| matches!(c, HostCall::Paint { image: i, .. } if i == image))
            .count()
    }

    /// Image currently held by a surface
    pub fn current_image(&self, surface: SurfaceId) -> Option<PathBuf> {
        self.state.lock().unwrap().images.get(&surface).cloned()
    }

    pub fn z_order(&self, surface: SurfaceId) -> Option<ZOrder> {
        self.state.lock().unwrap().z_order.get(&surface).copied()
    }

    pub fn surfaces(&self) -> Vec<SurfaceInfo> {
        self.state.lock().unwrap().surfaces.clone()
    }

    pub fn launch_count(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| matches!(c, HostCall::Launch { .. }))
            .count()
    }

    pub fn liveness_checks(&self) -> usize {
        self.state.lock().unwrap().liveness_checks
    }

    /// Process table scans so far
    pub fn process_lookups(&self) -> usize {
        self.state.lock().unwrap().process_lookups
    }

    pub fn pump_count(&self) -> u64 {
        self.state.lock().unwrap().pumps
    }

    fn elapsed_since_launch(state: &MockState) -> Option<Duration> {
        state.launched_at.map(|at| Instant::now().duration_since(at))
    }
}

impl DisplayHost for MockHost {
    fn create_surfaces(&self) -> HostResult<Vec<SurfaceInfo>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostCall::CreateSurfaces);

        if state.fail_enumeration {
            return Err(HostError::EnumerationFailed("Mock enumeration failure".into()));
        }

        let surfaces: Vec<SurfaceInfo> = state
            .monitors
            .iter()
            .enumerate()
            .map(|(i, rect)| SurfaceInfo {
                id: SurfaceId::new(i as u32 + 1),
                device: DeviceId::new(format!(r"\\.\DISPLAY{}", i + 1)),
                rect: *rect,
            })
            .collect();

        state.surfaces = surfaces.clone();
        Ok(surfaces)
    }

    fn paint(&self, surface: SurfaceId, image: &Path) -> HostResult<()> {
        let mut state = self.state.lock().unwrap();

        if !state.surfaces.iter().any(|s| s.id == surface) {
            return Err(HostError::SurfaceNotFound(surface));
        }
        if state.missing_images.contains(image) {
            return Err(HostError::ImageLoad(image.to_path_buf()));
        }
        if state.broken_surfaces.contains(&surface) {
            return Err(HostError::PaintFailed(format!("Mock paint failure on {surface}")));
        }

        state.images.insert(surface, image.to_path_buf());
        state.calls.push(HostCall::Paint {
            surface,
            image: image.to_path_buf(),
        });
        Ok(())
    }

    fn set_z_order(&self, surface: SurfaceId, order: ZOrder) -> HostResult<()> {
        let mut state = self.state.lock().unwrap();

        if !state.surfaces.iter().any(|s| s.id == surface) {
            return Err(HostError::SurfaceNotFound(surface));
        }

        state.z_order.insert(surface, order);
        state.calls.push(HostCall::ZOrder { surface, order });
        Ok(())
    }

    fn rotate_to_portrait(&self, device: &DeviceId) -> HostResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostCall::Rotate {
            device: device.clone(),
        });

        if state.failing_devices.contains(device) {
            return Err(HostError::DisplayMode {
                device: device.clone(),
                message: "Mock rotation failure".into(),
            });
        }
        Ok(())
    }

    fn pump_messages(&self) {
        self.state.lock().unwrap().pumps += 1;
    }

    fn destroy_surfaces(&self) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostCall::DestroySurfaces);
        state.surfaces.clear();
        state.images.clear();
        state.z_order.clear();
    }
}

impl ProcessHost for MockHost {
    fn find_process(&self, executable: &str) -> Option<ProcessId> {
        let mut state = self.state.lock().unwrap();
        state.process_lookups += 1;
        let elapsed = Self::elapsed_since_launch(&state)?;
        let process = state.process.as_ref()?;

        (process.executable.eq_ignore_ascii_case(executable) && elapsed >= process.appears_after)
            .then_some(process.pid)
    }

    fn has_visible_window(&self, pid: ProcessId) -> bool {
        let state = self.state.lock().unwrap();
        let (Some(elapsed), Some(process)) =
            (Self::elapsed_since_launch(&state), state.process.as_ref())
        else {
            return false;
        };

        process.pid == pid && process.window_after.is_some_and(|after| elapsed >= after)
    }

    fn is_alive(&self, pid: ProcessId) -> bool {
        let mut state = self.state.lock().unwrap();
        state.liveness_checks += 1;

        if state.process.as_ref().is_none_or(|p| p.pid != pid) {
            return false;
        }
        match state.liveness.pop_front() {
            Some(alive) => alive,
            None => state.alive_default,
        }
    }

    fn bring_to_front(&self, pid: ProcessId) -> HostResult<()> {
        let has_window = self.has_visible_window(pid);
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostCall::BringToFront { pid });

        if has_window {
            Ok(())
        } else {
            Err(HostError::NoVisibleWindow(pid))
        }
    }

    fn launch(&self, target: &LaunchTarget) -> HostResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(HostCall::Launch {
            script: target.script.clone(),
        });

        if state.fail_launch {
            return Err(HostError::LaunchFailed("Mock launch failure".into()));
        }
        state.launched_at = Some(Instant::now());
        Ok(())
    }
}

/// Mock reachability probe replaying scripted outcomes
#[derive(Debug, Clone)]
pub struct MockProbe {
    outcomes: Arc<Mutex<VecDeque<bool>>>,
    then: bool,
    probes: Arc<Mutex<usize>>,
}

impl MockProbe {
    /// Replay `outcomes` in order, then answer `then` forever
    pub fn new(outcomes: impl IntoIterator<Item = bool>, then: bool) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into_iter().collect())),
            then,
            probes: Arc::new(Mutex::new(0)),
        }
    }

    /// Always reachable
    pub fn reachable() -> Self {
        Self::new([], true)
    }

    pub fn probe_count(&self) -> usize {
        *self.probes.lock().unwrap()
    }
}

#[async_trait]
impl ReachabilityProbe for MockProbe {
    async fn probe(&self, _target: &ProbeTarget) -> bool {
        *self.probes.lock().unwrap() += 1;
        self.outcomes.lock().unwrap().pop_front().unwrap_or(self.then)
    }
}
