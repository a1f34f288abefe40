//! Security primitives for command auditing.
//!
//! This module defines the three-way audit verdict, the audit request/result
//! shapes shared across the pipeline, the static guardrail check, and the
//! deterministic root-path override that is enforced regardless of what the
//! semantic classifier says.

mod guardrails;
mod overrides;

pub use guardrails::GuardrailSet;
pub use overrides::root_path_destruction;

use serde::{Deserialize, Serialize};

/// Verdict for a proposed command.
///
/// Ordered by severity: `Allow < Challenge < Block`. When several checks
/// contribute to one decision, the composed verdict is the maximum, so a
/// single `Block` always wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Allow,
    Challenge,
    Block,
}

/// A single audit request: the proposed command and the caller's stated intent.
#[derive(Debug, Clone)]
pub struct AuditRequest {
    pub command: String,
    pub intent: String,
}

impl AuditRequest {
    pub fn new(command: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            intent: intent.into(),
        }
    }
}

/// The outcome of one audit call. Produced fresh per request, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditResult {
    pub verdict: Verdict,
    pub reason: String,
    /// RFC-3339 generation timestamp.
    pub timestamp: String,
}

impl AuditResult {
    /// Build a result stamped with the current time.
    pub fn now(verdict: Verdict, reason: impl Into<String>) -> Self {
        Self {
            verdict,
            reason: reason.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
