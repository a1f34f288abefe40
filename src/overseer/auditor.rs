//! The auditor: composes the static guardrail check, the deterministic
//! root-path override, and the semantic classifier into one audit result.

use std::time::Duration;

use tracing::{info, warn};

use crate::security::{AuditRequest, AuditResult, GuardrailSet, Verdict, root_path_destruction};

use super::client::Classifier;
use super::parser;

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// How classifier failures (transport errors, timeouts, malformed output)
/// resolve. Never to `Allow`, in either mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Failures resolve to `Block`.
    #[default]
    Strict,
    /// Failures resolve to `Challenge`, deferring to a human. Intended for
    /// setups where the classifier endpoint is flaky but an operator is
    /// present to review.
    Degraded,
}

impl FailureMode {
    fn verdict(self) -> Verdict {
        match self {
            FailureMode::Strict => Verdict::Block,
            FailureMode::Degraded => Verdict::Challenge,
        }
    }
}

/// Audits `(command, intent)` pairs. Stateless across calls; every call
/// produces exactly one fresh [`AuditResult`].
///
/// Check order is fixed: static guardrails, then the root-path override,
/// then the bounded classifier call. The two deterministic checks run
/// before any network traffic, so known-destructive commands are rejected
/// even with the classifier unreachable.
pub struct Auditor<C> {
    classifier: C,
    guardrails: GuardrailSet,
    failure_mode: FailureMode,
    call_timeout: Duration,
}

impl<C: Classifier> Auditor<C> {
    pub fn new(classifier: C, guardrails: GuardrailSet) -> Self {
        Self {
            classifier,
            guardrails,
            failure_mode: FailureMode::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Audit one request. Never fails: every failure path inside is
    /// converted into a non-`Allow` verdict. No retries; retry policy, if
    /// any, belongs to the caller.
    pub async fn verify(&self, request: &AuditRequest) -> AuditResult {
        if let Some(rule) = self.guardrails.check(&request.command) {
            info!(rule = %rule, "static guardrail violation");
            return AuditResult::now(
                Verdict::Block,
                format!("Static Guardrail violation: {rule}"),
            );
        }

        // Enforced in code as well as in the prompt; classifiers are not
        // trusted to honor embedded instructions.
        if let Some(reason) = root_path_destruction(&request.command) {
            info!("root path protection triggered");
            return AuditResult::now(Verdict::Block, format!("Root path protection: {reason}"));
        }

        let classifier_call = self.classifier.classify(&request.command, &request.intent);
        let (verdict, reason) = match tokio::time::timeout(self.call_timeout, classifier_call).await
        {
            Err(_elapsed) => {
                warn!(timeout_ms = self.call_timeout.as_millis() as u64, "classifier call timed out");
                (
                    self.failure_mode.verdict(),
                    "classifier unavailable: call timed out".to_string(),
                )
            }
            Ok(Err(e)) => {
                warn!(error = %e, "classifier call failed");
                (
                    self.failure_mode.verdict(),
                    format!("classifier unavailable: {e}"),
                )
            }
            Ok(Ok(raw)) => match parser::parse_verdict(&raw) {
                Some(parsed) => parsed,
                None => {
                    warn!(raw = %raw, "classifier output could not be parsed");
                    (
                        self.failure_mode.verdict(),
                        "malformed classifier output".to_string(),
                    )
                }
            },
        };

        AuditResult::now(verdict, reason)
    }
}
