//! ClawGate - an execution gateway for AI-proposed shell commands
//!
//! Every command an autonomous agent proposes must clear a verdict pipeline
//! before it runs, and approved commands run inside an ephemeral sandbox
//! rather than on the host:
//!
//! - Static guardrail check against configured forbidden patterns
//! - Deterministic root-path destruction override
//! - Semantic audit by a language-model classifier (fail-closed)
//! - Human confirmation for challenged commands
//! - Per-call Docker isolation, with a kill-switch that terminates every
//!   active sandbox out-of-band
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use clawgate::config::SafetyConfig;
//! use clawgate::gateway::SafeExecutor;
//! use clawgate::overseer::{Auditor, OllamaClassifier};
//! use clawgate::sandbox::{DockerSandbox, SandboxRegistry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SafetyConfig::load(Path::new("scripts"));
//!     let registry = Arc::new(SandboxRegistry::new());
//!
//!     let auditor = Auditor::new(OllamaClassifier::local_default(), config.guardrails);
//!     let sandbox = DockerSandbox::new("clawgate-runtime", "./workspace", registry);
//!     let gate = SafeExecutor::new(auditor, sandbox);
//!
//!     let output = gate.execute("ls /workspace", "list files").await?;
//!     println!("{}", output.stdout);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod gateway;
pub mod overseer;
pub mod sandbox;
pub mod security;
pub mod tool;
pub mod utils;

// Re-export commonly used types
pub use config::{SafetyConfig, WhitelistSet};
pub use gateway::{ConfirmationHandler, GateError, SafeExecutor};
pub use overseer::{Auditor, Classifier, FailureMode, OllamaClassifier};
pub use sandbox::{
    DockerSandbox, KillSwitch, SandboxError, SandboxOutput, SandboxRegistry, SandboxRunner,
};
pub use security::{AuditRequest, AuditResult, GuardrailSet, Verdict};
