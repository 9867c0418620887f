//! Validated configuration structures

use crate::schema::{RawConfig, RawImagery, RawLaunch, RawNetwork, RawTiming};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The imagery shown across every surface, one asset per state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Imagery {
    /// Primary splash, shown once the network gate opens
    Splash,
    /// Secondary splash, shown just before the launcher runs
    SplashSecondary,
    /// Shown after each failed reachability probe
    NetworkError,
    /// Launch invocation failed or the game never appeared
    LaunchError,
    /// Backdrop behind the running game, and the crash overlay.
    /// Both uses share one asset.
    Backdrop,
}

impl Imagery {
    pub fn name(&self) -> &'static str {
        match self {
            Imagery::Splash => "splash",
            Imagery::SplashSecondary => "splash_secondary",
            Imagery::NetworkError => "network_error",
            Imagery::LaunchError => "launch_error",
            Imagery::Backdrop => "backdrop",
        }
    }
}

/// Validated launcher configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LauncherConfig {
    pub log_level: String,
    pub imagery: ImageryPaths,
    pub launch: LaunchConfig,
    pub network: NetworkConfig,
    pub timing: TimingConfig,
}

impl LauncherConfig {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            log_level: raw.log_level.unwrap_or_else(|| "info".into()),
            imagery: ImageryPaths::from_raw(raw.imagery),
            launch: LaunchConfig::from_raw(raw.launch),
            network: NetworkConfig::from_raw(raw.network),
            timing: TimingConfig::from_raw(raw.timing),
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self::from_raw(RawConfig {
            config_version: crate::CURRENT_CONFIG_VERSION,
            log_level: None,
            imagery: Default::default(),
            launch: Default::default(),
            network: Default::default(),
            timing: Default::default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageryPaths {
    pub splash: PathBuf,
    pub splash_secondary: PathBuf,
    pub network_error: PathBuf,
    pub launch_error: PathBuf,
    pub backdrop: PathBuf,
}

impl ImageryPaths {
    fn from_raw(raw: RawImagery) -> Self {
        Self {
            splash: raw
                .splash
                .unwrap_or_else(|| PathBuf::from(r"C:\SplashScreen.bmp")),
            splash_secondary: raw
                .splash_secondary
                .unwrap_or_else(|| PathBuf::from(r"C:\SplashScreen2.bmp")),
            network_error: raw
                .network_error
                .unwrap_or_else(|| PathBuf::from(r"C:\SplashScreenError.bmp")),
            launch_error: raw
                .launch_error
                .unwrap_or_else(|| PathBuf::from(r"C:\SplashScreenError1.bmp")),
            backdrop: raw
                .backdrop
                .unwrap_or_else(|| PathBuf::from(r"C:\SplashScreenError2.bmp")),
        }
    }

    /// Asset path for the given imagery
    pub fn path(&self, imagery: Imagery) -> &Path {
        match imagery {
            Imagery::Splash => &self.splash,
            Imagery::SplashSecondary => &self.splash_secondary,
            Imagery::NetworkError => &self.network_error,
            Imagery::LaunchError => &self.launch_error,
            Imagery::Backdrop => &self.backdrop,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LaunchConfig {
    pub script: String,
    pub verb: String,
    pub executable: String,
    pub process_timeout: Duration,
    pub window_timeout: Duration,
    pub poll_interval: Duration,
    pub window_settle: Duration,
}

impl LaunchConfig {
    fn from_raw(raw: RawLaunch) -> Self {
        Self {
            script: raw.script.unwrap_or_else(|| "start.bat".into()),
            verb: raw.verb.unwrap_or_else(|| "open".into()),
            executable: raw.executable.unwrap_or_else(|| "sinmai.exe".into()),
            process_timeout: Duration::from_secs(raw.process_timeout_seconds.unwrap_or(60)),
            window_timeout: Duration::from_secs(raw.window_timeout_seconds.unwrap_or(10)),
            poll_interval: millis(raw.poll_interval_ms, 100),
            window_settle: millis(raw.window_settle_ms, 2000),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
    pub retry_delay: Duration,
}

impl NetworkConfig {
    fn from_raw(raw: RawNetwork) -> Self {
        Self {
            host: raw.host.unwrap_or_else(|| "at.sys-allnet.cn".into()),
            port: raw.port.unwrap_or(80),
            timeout: Duration::from_secs(raw.timeout_seconds.unwrap_or(5)),
            retry_delay: millis(raw.retry_delay_ms, 5000),
        }
    }
}

/// Settle delays and poll cadences
#[derive(Debug, Clone, PartialEq)]
pub struct TimingConfig {
    /// Longest stretch any wait goes without pumping the message queue
    pub pump_slice: Duration,
    /// One idle iteration in a terminal error state
    pub idle_slice: Duration,
    /// Liveness poll cadence while supervising
    pub supervise_poll: Duration,
    /// After each display is rotated
    pub orientation_settle: Duration,
    /// After all displays are rotated
    pub orientation_final_settle: Duration,
    pub boot_settle: Duration,
    pub splash_hold: Duration,
    pub splash_secondary_hold: Duration,
    /// Before the game window is first raised
    pub attach_settle: Duration,
    /// Between raising the game window and lowering the surfaces
    pub attach_focus_settle: Duration,
    /// Between lowering the surfaces and painting the backdrop
    pub attach_backdrop_settle: Duration,
    /// Before the surfaces are raised over a dead game
    pub exit_settle: Duration,
    /// Before a returned game window is raised again
    pub recover_settle: Duration,
    pub recover_focus_settle: Duration,
}

impl TimingConfig {
    fn from_raw(raw: RawTiming) -> Self {
        Self {
            pump_slice: millis(raw.pump_slice_ms, 10),
            idle_slice: millis(raw.idle_slice_ms, 100),
            supervise_poll: millis(raw.supervise_poll_ms, 500),
            orientation_settle: millis(raw.orientation_settle_ms, 1000),
            orientation_final_settle: millis(raw.orientation_final_settle_ms, 2000),
            boot_settle: millis(raw.boot_settle_ms, 1000),
            splash_hold: millis(raw.splash_hold_ms, 3000),
            splash_secondary_hold: millis(raw.splash_secondary_hold_ms, 2000),
            attach_settle: millis(raw.attach_settle_ms, 3000),
            attach_focus_settle: millis(raw.attach_focus_settle_ms, 2000),
            attach_backdrop_settle: millis(raw.attach_backdrop_settle_ms, 1000),
            exit_settle: millis(raw.exit_settle_ms, 1000),
            recover_settle: millis(raw.recover_settle_ms, 2000),
            recover_focus_settle: millis(raw.recover_focus_settle_ms, 1000),
        }
    }
}

fn millis(value: Option<u64>, default_ms: u64) -> Duration {
    Duration::from_millis(value.unwrap_or(default_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backdrop_and_crash_overlay_share_an_asset() {
        let config = LauncherConfig::default();
        assert_eq!(
            config.imagery.path(Imagery::Backdrop),
            Path::new(r"C:\SplashScreenError2.bmp")
        );
        assert_ne!(
            config.imagery.path(Imagery::NetworkError),
            config.imagery.path(Imagery::LaunchError)
        );
    }

    #[test]
    fn default_timings() {
        let timing = LauncherConfig::default().timing;
        assert_eq!(timing.attach_settle, Duration::from_secs(3));
        assert_eq!(timing.attach_focus_settle, Duration::from_secs(2));
        assert_eq!(timing.attach_backdrop_settle, Duration::from_secs(1));
        assert_eq!(timing.exit_settle, Duration::from_secs(1));
        assert_eq!(timing.recover_settle, Duration::from_secs(2));
        assert_eq!(timing.recover_focus_settle, Duration::from_secs(1));
    }
}
