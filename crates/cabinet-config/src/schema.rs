//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Tracing filter directive for the launcher's own log output
    pub log_level: Option<String>,

    #[serde(default)]
    pub imagery: RawImagery,

    #[serde(default)]
    pub launch: RawLaunch,

    #[serde(default)]
    pub network: RawNetwork,

    #[serde(default)]
    pub timing: RawTiming,
}

/// Bitmap assets, one per displayed state
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawImagery {
    pub splash: Option<PathBuf>,
    pub splash_secondary: Option<PathBuf>,
    pub network_error: Option<PathBuf>,
    pub launch_error: Option<PathBuf>,
    pub backdrop: Option<PathBuf>,
}

/// Launcher script and target process settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawLaunch {
    /// Script handed to the shell (run hidden)
    pub script: Option<String>,

    /// Shell verb used for the script
    pub verb: Option<String>,

    /// Executable base name of the game process, matched case-insensitively
    pub executable: Option<String>,

    pub process_timeout_seconds: Option<u64>,
    pub window_timeout_seconds: Option<u64>,
    pub poll_interval_ms: Option<u64>,

    /// Hold after a visible window is first seen
    pub window_settle_ms: Option<u64>,
}

/// Reachability gate target
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawNetwork {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timeout_seconds: Option<u64>,
    pub retry_delay_ms: Option<u64>,
}

/// Settle delays and poll cadences, in milliseconds
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTiming {
    pub pump_slice_ms: Option<u64>,
    pub idle_slice_ms: Option<u64>,
    pub supervise_poll_ms: Option<u64>,
    pub orientation_settle_ms: Option<u64>,
    pub orientation_final_settle_ms: Option<u64>,
    pub boot_settle_ms: Option<u64>,
    pub splash_hold_ms: Option<u64>,
    pub splash_secondary_hold_ms: Option<u64>,
    pub attach_settle_ms: Option<u64>,
    pub attach_focus_settle_ms: Option<u64>,
    pub attach_backdrop_settle_ms: Option<u64>,
    pub exit_settle_ms: Option<u64>,
    pub recover_settle_ms: Option<u64>,
    pub recover_focus_settle_ms: Option<u64>,
}
