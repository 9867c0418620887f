//! Network reachability probing

use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

/// Where the reachability gate connects to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,

    /// Upper bound on resolution plus connect
    pub timeout: Duration,
}

/// One-shot reachability check.
///
/// Every failure (resolution, socket, connect, timeout) folds into `false`.
#[async_trait]
pub trait ReachabilityProbe {
    async fn probe(&self, target: &ProbeTarget) -> bool;
}

/// Plain TCP connect probe
#[derive(Debug, Clone, Default)]
pub struct TcpProbe;

impl TcpProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReachabilityProbe for TcpProbe {
    async fn probe(&self, target: &ProbeTarget) -> bool {
        debug!(host = %target.host, port = target.port, "Probing reachability");

        match tokio::time::timeout(target.timeout, connect_ipv4(&target.host, target.port)).await
        {
            Ok(Ok(())) => {
                debug!(host = %target.host, port = target.port, "Reachability probe succeeded");
                true
            }
            Ok(Err(e)) => {
                debug!(host = %target.host, port = target.port, error = %e, "Reachability probe failed");
                false
            }
            Err(_) => {
                debug!(
                    host = %target.host,
                    port = target.port,
                    timeout_ms = target.timeout.as_millis() as u64,
                    "Reachability probe timed out"
                );
                false
            }
        }
    }
}

/// Resolve `host` and connect to its first IPv4 address
async fn connect_ipv4(host: &str, port: u16) -> io::Result<()> {
    let addr = tokio::net::lookup_host((host, port))
        .await?
        .find(|addr| addr.is_ipv4())
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no IPv4 address"))?;

    let stream = TcpStream::connect(addr).await?;
    drop(stream);
    Ok(())
}
