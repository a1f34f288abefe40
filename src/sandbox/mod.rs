//! Execution boundary: approved commands run inside an ephemeral, isolated
//! environment, never on the host.
//!
//! The production boundary is a per-call Docker container with no network
//! and only the workspace directory mounted. Each invocation creates a
//! fresh container and tears it down afterwards; nothing persists across
//! calls. The [`SandboxRunner`] trait exists so the gateway can be tested
//! with an in-process double and an invocation counter.

mod killswitch;
mod registry;

pub use killswitch::{AdminError, ContainerKiller, DockerKiller, KillReport, KillSwitch};
pub use registry::{SandboxHandle, SandboxRegistry};

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use registry::RegistryGuard;

const DEFAULT_EXEC_TIMEOUT: Duration = Duration::from_secs(300);

/// Source of unique container-name suffixes within this process.
static NAME_SEQ: AtomicU64 = AtomicU64::new(0);

/// Output captured from one sandboxed execution, verbatim and uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Failures of the execution boundary itself. A separate error class from
/// an audit rejection; the gateway keeps them distinguishable.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("failed to launch sandbox: {0}")]
    Launch(String),
    #[error("command exited with status {exit_code}: {stderr}")]
    CommandFailed {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    #[error("sandboxed command timed out after {0} ms")]
    Timeout(u64),
    #[error("sandbox terminated by kill-switch")]
    Terminated,
}

/// The isolated-execution capability consumed by the gateway.
pub trait SandboxRunner: Send + Sync {
    fn run(&self, command: &str)
    -> impl Future<Output = Result<SandboxOutput, SandboxError>> + Send;
}

/// Docker-backed execution boundary.
///
/// Each call runs `docker run --rm` with a unique container name, no
/// network, and the workspace directory as the only mount. The container
/// name is registered for the lifetime of the call so the kill-switch can
/// reach it; the client process carries `kill_on_drop`, so cancelling the
/// future never leaves it running unattended.
pub struct DockerSandbox {
    image: String,
    workspace: PathBuf,
    exec_timeout: Duration,
    registry: Arc<SandboxRegistry>,
}

impl DockerSandbox {
    pub fn new(
        image: impl Into<String>,
        workspace: impl Into<PathBuf>,
        registry: Arc<SandboxRegistry>,
    ) -> Self {
        Self {
            image: image.into(),
            workspace: workspace.into(),
            exec_timeout: DEFAULT_EXEC_TIMEOUT,
            registry,
        }
    }

    pub fn with_exec_timeout(mut self, timeout: Duration) -> Self {
        self.exec_timeout = timeout;
        self
    }

    pub fn registry(&self) -> Arc<SandboxRegistry> {
        Arc::clone(&self.registry)
    }
}

impl SandboxRunner for DockerSandbox {
    fn run(
        &self,
        command: &str,
    ) -> impl Future<Output = Result<SandboxOutput, SandboxError>> + Send {
        let command = command.to_string();
        async move {
            // Container names are unique per process; the pid disambiguates
            // across concurrent gateway processes sharing one daemon
            let seq = NAME_SEQ.fetch_add(1, Ordering::SeqCst);
            let container = format!("clawgate-sbx-{}-{seq}", std::process::id());
            let (id, cancel) = self.registry.register(container.clone());
            let _guard = RegistryGuard::new(self.registry(), id);

            debug!(container = %container, command = %command, "starting sandbox");

            let output_fut = tokio::process::Command::new("docker")
                .arg("run")
                .arg("--rm")
                .args(["--name", &container])
                .args(["--network", "none"])
                .args(["-v", &format!("{}:/workspace", self.workspace.display())])
                .args(["-w", "/workspace"])
                .arg(&self.image)
                .args(["sh", "-lc", &command])
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .output();

            let result = tokio::select! {
                outcome = tokio::time::timeout(self.exec_timeout, output_fut) => match outcome {
                    Ok(Ok(output)) => collect_output(&output),
                    Ok(Err(e)) => Err(SandboxError::Launch(e.to_string())),
                    Err(_elapsed) => Err(SandboxError::Timeout(self.exec_timeout.as_millis() as u64)),
                },
                _ = cancel.notified() => Err(SandboxError::Terminated),
            };

            if matches!(result, Err(SandboxError::Timeout(_) | SandboxError::Terminated)) {
                warn!(container = %container, "sandbox did not complete; client process killed");
            }

            result
        }
    }
}

fn collect_output(output: &std::process::Output) -> Result<SandboxOutput, SandboxError> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let exit_code = output.status.code().unwrap_or(-1);

    if exit_code == 0 {
        Ok(SandboxOutput {
            stdout,
            stderr,
            exit_code,
        })
    } else {
        Err(SandboxError::CommandFailed {
            exit_code,
            stdout,
            stderr,
        })
    }
}
