//! Configuration for the cabinet launcher
//!
//! Every operational constant (imagery paths, the launcher script, the
//! reachability target, settle delays, poll intervals and timeouts) lives in
//! `launcher.toml`, which is embedded in the binary at build time:
//! - Versioned schema
//! - Validation with clear error messages
//! - Defaults for any field the document omits

mod policy;
mod schema;
mod validation;

pub use policy::*;
pub use schema::*;
pub use validation::*;

use thiserror::Error;
use tracing::debug;

/// The compiled-in configuration document
pub const BUILTIN_CONFIG: &str = include_str!("../launcher.toml");

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Parse and validate the configuration compiled into the binary
pub fn builtin_config() -> ConfigResult<LauncherConfig> {
    parse_config(BUILTIN_CONFIG)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<LauncherConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    let config = LauncherConfig::from_raw(raw);
    debug!(
        executable = %config.launch.executable,
        host = %config.network.host,
        port = config.network.port,
        "Configuration parsed"
    );
    Ok(config)
}
