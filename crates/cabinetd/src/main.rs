//! cabinetd - arcade cabinet boot orchestrator
//!
//! Wires together:
//! - The built-in configuration
//! - Logging
//! - The Win32 display and process hosts
//! - The TCP reachability probe
//! - The launch orchestrator, raced against Ctrl-C for a clean surface release

#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use anyhow::{Context, Result};
use cabinet_config::{LauncherConfig, builtin_config};
use cabinet_core::Orchestrator;
use cabinet_host_api::{DisplayHost, ProcessHost, ReachabilityProbe};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = builtin_config().context("Built-in configuration is invalid")?;

    // Only the compiled-in level applies; the environment is never consulted
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .with_target(true)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        executable = %config.launch.executable,
        "cabinetd starting"
    );

    run(config).await
}

#[cfg(windows)]
async fn run(config: LauncherConfig) -> Result<()> {
    use cabinet_host_api::TcpProbe;
    use cabinet_host_windows::{WindowsDisplay, WindowsProcessHost};
    use cabinet_util::CabinetError;
    use tracing::error;

    let orchestrator = match Orchestrator::new(
        config,
        WindowsDisplay::new(),
        WindowsProcessHost::new(),
        TcpProbe::new(),
    ) {
        Ok(orchestrator) => orchestrator,
        Err(CabinetError::NoDisplays) => {
            error!("No splash surfaces could be created, exiting");
            std::process::exit(1);
        }
    };

    run_until_shutdown(orchestrator).await
}

#[cfg(not(windows))]
async fn run(_config: LauncherConfig) -> Result<()> {
    anyhow::bail!("cabinetd drives Win32 displays and only runs on Windows")
}

/// Step the orchestrator until Ctrl-C or console close, then release every
/// surface
#[cfg_attr(not(windows), allow(dead_code))]
async fn run_until_shutdown<D, P, R>(mut orchestrator: Orchestrator<D, P, R>) -> Result<()>
where
    D: DisplayHost,
    P: ProcessHost,
    R: ReachabilityProbe,
{
    let signal = tokio::select! {
        _ = orchestrator.run() => Ok(()),
        result = tokio::signal::ctrl_c() => result,
    };

    info!(phase = %orchestrator.phase(), "Shutdown requested");
    orchestrator.shutdown();

    signal.context("Failed to listen for shutdown signal")
}
