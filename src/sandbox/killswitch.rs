//! Kill-switch: terminate every active sandboxed execution immediately.
//!
//! An administrative action independent of the per-command verdict pipeline.
//! It drains the sandbox registry, signals each execution's cancel handle
//! (which makes the owning gateway invocation fail promptly), and
//! force-kills each container out-of-band.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::registry::SandboxRegistry;

/// Machine-readable code surfaced over the admin RPC on failure.
pub const KILL_SWITCH_FAILED: &str = "KILL_SWITCH_FAILED";

#[derive(Debug, Error)]
#[error("kill-switch could not confirm termination: {message}")]
pub struct AdminError {
    pub message: String,
}

impl AdminError {
    pub fn code(&self) -> &'static str {
        KILL_SWITCH_FAILED
    }
}

/// Result of a completed kill-switch activation.
#[derive(Debug, Clone)]
pub struct KillReport {
    pub terminated: usize,
    pub message: String,
}

/// Capability for force-stopping one isolated container by name.
pub trait ContainerKiller: Send + Sync {
    fn force_kill(&self, name: &str) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Kills containers through the docker CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct DockerKiller;

impl ContainerKiller for DockerKiller {
    fn force_kill(&self, name: &str) -> impl Future<Output = anyhow::Result<()>> + Send {
        let name = name.to_string();
        async move {
            let output = tokio::process::Command::new("docker")
                .args(["kill", &name])
                .output()
                .await?;
            // A container that already exited (`--rm`) is fine; only report
            // the failure for diagnostics
            if !output.status.success() {
                warn!(
                    container = %name,
                    stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                    "docker kill reported failure (container may already be gone)"
                );
            }
            Ok(())
        }
    }
}

/// The kill-switch itself. Idempotent: activating it with nothing running
/// is a no-op success.
pub struct KillSwitch<K = DockerKiller> {
    registry: Arc<SandboxRegistry>,
    killer: K,
}

impl KillSwitch<DockerKiller> {
    pub fn new(registry: Arc<SandboxRegistry>) -> Self {
        Self::with_killer(registry, DockerKiller)
    }
}

impl<K: ContainerKiller> KillSwitch<K> {
    pub fn with_killer(registry: Arc<SandboxRegistry>, killer: K) -> Self {
        Self { registry, killer }
    }

    /// Terminate every active sandbox. Each handle is cancelled in-process
    /// first, so owning requests fail promptly even if the out-of-band kill
    /// cannot run.
    pub async fn terminate_all(&self) -> Result<KillReport, AdminError> {
        let handles = self.registry.drain();
        if handles.is_empty() {
            return Ok(KillReport {
                terminated: 0,
                message: "Kill-Switch activated. No active sandboxes.".to_string(),
            });
        }

        let count = handles.len();
        let mut failures = Vec::new();

        for handle in handles {
            // notify_one stores a permit, so an execution that has not yet
            // reached its select point still observes the termination
            handle.cancel.notify_one();
            if let Err(e) = self.killer.force_kill(&handle.name).await {
                failures.push(format!("{}: {e}", handle.name));
            }
        }

        if failures.is_empty() {
            info!(terminated = count, "kill-switch completed");
            Ok(KillReport {
                terminated: count,
                message: format!("Kill-Switch activated. {count} sandbox(es) terminated."),
            })
        } else {
            Err(AdminError {
                message: failures.join("; "),
            })
        }
    }
}
