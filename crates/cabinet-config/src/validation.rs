//! Configuration validation

use crate::schema::RawConfig;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{interval} ({interval_ms}ms) must be shorter than {window} ({window_ms}ms)")]
    IntervalExceedsWindow {
        interval: &'static str,
        interval_ms: u64,
        window: &'static str,
        window_ms: u64,
    },

    #[error("Invalid log level '{0}'")]
    InvalidLogLevel(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let imagery = &config.imagery;
    for (field, path) in [
        ("imagery.splash", &imagery.splash),
        ("imagery.splash_secondary", &imagery.splash_secondary),
        ("imagery.network_error", &imagery.network_error),
        ("imagery.launch_error", &imagery.launch_error),
        ("imagery.backdrop", &imagery.backdrop),
    ] {
        if path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            errors.push(ValidationError::Empty { field });
        }
    }

    let launch = &config.launch;
    for (field, value) in [
        ("launch.script", &launch.script),
        ("launch.verb", &launch.verb),
        ("launch.executable", &launch.executable),
        ("network.host", &config.network.host),
    ] {
        if value.as_ref().is_some_and(|v| v.trim().is_empty()) {
            errors.push(ValidationError::Empty { field });
        }
    }

    if config.network.port == Some(0) {
        errors.push(ValidationError::Zero {
            field: "network.port",
        });
    }

    let timing = &config.timing;
    for (field, value) in [
        ("launch.poll_interval_ms", launch.poll_interval_ms),
        ("launch.process_timeout_seconds", launch.process_timeout_seconds),
        ("launch.window_timeout_seconds", launch.window_timeout_seconds),
        ("network.timeout_seconds", config.network.timeout_seconds),
        ("timing.pump_slice_ms", timing.pump_slice_ms),
        ("timing.idle_slice_ms", timing.idle_slice_ms),
        ("timing.supervise_poll_ms", timing.supervise_poll_ms),
    ] {
        if value == Some(0) {
            errors.push(ValidationError::Zero { field });
        }
    }

    let poll_ms = launch.poll_interval_ms.unwrap_or(100);
    for (window, seconds) in [
        (
            "launch.process_timeout_seconds",
            launch.process_timeout_seconds.unwrap_or(60),
        ),
        (
            "launch.window_timeout_seconds",
            launch.window_timeout_seconds.unwrap_or(10),
        ),
    ] {
        let window_ms = seconds.saturating_mul(1000);
        if window_ms > 0 && poll_ms >= window_ms {
            errors.push(ValidationError::IntervalExceedsWindow {
                interval: "launch.poll_interval_ms",
                interval_ms: poll_ms,
                window,
                window_ms,
            });
        }
    }

    let pump_ms = timing.pump_slice_ms.unwrap_or(10);
    let supervise_ms = timing.supervise_poll_ms.unwrap_or(500);
    if pump_ms > 0 && supervise_ms > 0 && pump_ms > supervise_ms {
        errors.push(ValidationError::IntervalExceedsWindow {
            interval: "timing.pump_slice_ms",
            interval_ms: pump_ms,
            window: "timing.supervise_poll_ms",
            window_ms: supervise_ms,
        });
    }

    if let Some(level) = &config.log_level
        && !is_valid_log_level(level)
    {
        errors.push(ValidationError::InvalidLogLevel(level.clone()));
    }

    errors
}

fn is_valid_log_level(level: &str) -> bool {
    matches!(
        level.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}
