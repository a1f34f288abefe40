//! The verdict resolver and execution gate.
//!
//! [`SafeExecutor`] is the sole path into the execution boundary: every
//! command is audited first, `Block` rejects immediately, `Challenge`
//! suspends on an injected human-confirmation handler, and only `Allow` (or
//! an explicit affirmative confirmation) dispatches to the sandbox, exactly
//! once per request.

pub mod rpc;

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::info;

use crate::overseer::{Auditor, Classifier};
use crate::sandbox::{SandboxError, SandboxOutput, SandboxRunner};
use crate::security::{AuditRequest, Verdict};

const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(300);

/// Injected human-in-the-loop confirmation: takes a challenge message,
/// resolves to `true` only on explicit approval. Supplied by the calling
/// surface; absence is treated as "not confirmed", never as approval.
pub type ConfirmationHandler = Arc<dyn Fn(String) -> BoxFuture<'static, bool> + Send + Sync>;

/// Why a command did not execute, kept machine-distinguishable for callers.
#[derive(Debug, Error)]
pub enum GateError {
    /// Static or semantic verdict was `Block`; the boundary was never invoked.
    #[error("Security Block: {reason}")]
    AuditBlocked { reason: String },
    /// Verdict was `Challenge` and confirmation was negative, absent, or
    /// timed out; the boundary was never invoked.
    #[error("User Aborted: {reason}")]
    ConfirmationDenied { reason: String },
    /// The execution boundary itself failed. A separate error class from an
    /// audit rejection.
    #[error(transparent)]
    Execution(#[from] SandboxError),
}

/// Gates execution of proposed commands behind the audit pipeline.
///
/// Generic over the classifier and sandbox capabilities so every branch of
/// the state machine can be exercised with deterministic doubles.
pub struct SafeExecutor<C, S> {
    auditor: Auditor<C>,
    sandbox: S,
    confirm: Option<ConfirmationHandler>,
    confirm_timeout: Duration,
}

impl<C: Classifier, S: SandboxRunner> SafeExecutor<C, S> {
    pub fn new(auditor: Auditor<C>, sandbox: S) -> Self {
        Self {
            auditor,
            sandbox,
            confirm: None,
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
        }
    }

    pub fn with_confirmation(mut self, handler: ConfirmationHandler) -> Self {
        self.confirm = Some(handler);
        self
    }

    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// Run one command through the full pipeline:
    /// audit, optional confirmation, then a single sandbox dispatch.
    pub async fn execute(
        &self,
        command: &str,
        intent: &str,
    ) -> Result<SandboxOutput, GateError> {
        let request = AuditRequest::new(command, intent);
        let audit = self.auditor.verify(&request).await;
        info!(verdict = ?audit.verdict, reason = %audit.reason, "audit complete");

        match audit.verdict {
            Verdict::Block => {
                return Err(GateError::AuditBlocked {
                    reason: audit.reason,
                });
            }
            Verdict::Challenge => self.await_confirmation(command, &audit.reason).await?,
            Verdict::Allow => {}
        }

        // Approved. The single dispatch into the execution boundary.
        self.sandbox
            .run(command)
            .await
            .map_err(GateError::Execution)
    }

    async fn await_confirmation(&self, command: &str, reason: &str) -> Result<(), GateError> {
        let Some(handler) = &self.confirm else {
            return Err(GateError::ConfirmationDenied {
                reason: "no confirmation channel registered".to_string(),
            });
        };

        let message = format!("Action Challenged: {reason}\nCommand: {command}");
        match tokio::time::timeout(self.confirm_timeout, handler(message)).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(GateError::ConfirmationDenied {
                reason: "user declined the challenged action".to_string(),
            }),
            Err(_elapsed) => Err(GateError::ConfirmationDenied {
                reason: "confirmation timed out".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overseer::FailureMode;
    use crate::security::GuardrailSet;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubClassifier {
        response: Result<String, String>,
    }

    impl StubClassifier {
        fn verdict(token: &str, reason: &str) -> Self {
            Self {
                response: Ok(format!(
                    r#"{{"verdict": "{token}", "reason": "{reason}"}}"#
                )),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err("connection refused".to_string()),
            }
        }
    }

    impl Classifier for StubClassifier {
        fn classify(
            &self,
            _command: &str,
            _intent: &str,
        ) -> impl Future<Output = anyhow::Result<String>> + Send {
            let response = self.response.clone();
            async move { response.map_err(|m| anyhow!(m)) }
        }
    }

    /// Sandbox double that records invocations and returns canned output.
    struct StubSandbox {
        calls: AtomicUsize,
        result: fn() -> Result<SandboxOutput, SandboxError>,
    }

    impl StubSandbox {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: || {
                    Ok(SandboxOutput {
                        stdout: "file-a\nfile-b\n".to_string(),
                        stderr: String::new(),
                        exit_code: 0,
                    })
                },
            }
        }

        fn launch_failure() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: || Err(SandboxError::Launch("docker not found".to_string())),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SandboxRunner for StubSandbox {
        fn run(
            &self,
            _command: &str,
        ) -> impl Future<Output = Result<SandboxOutput, SandboxError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = (self.result)();
            async move { result }
        }
    }

    fn confirm_with(answer: bool) -> ConfirmationHandler {
        Arc::new(move |_message| Box::pin(async move { answer }) as BoxFuture<'static, bool>)
    }

    fn gate(
        classifier: StubClassifier,
        guardrails: GuardrailSet,
        sandbox: StubSandbox,
    ) -> SafeExecutor<StubClassifier, StubSandbox> {
        SafeExecutor::new(Auditor::new(classifier, guardrails), sandbox)
    }

    fn guardrails(patterns: &[&str]) -> GuardrailSet {
        GuardrailSet::new(patterns.iter().map(|p| p.to_string()).collect())
    }

    #[tokio::test]
    async fn test_allow_dispatches_to_sandbox() {
        let gate = gate(
            StubClassifier::verdict("ALLOW", "read-only"),
            GuardrailSet::empty(),
            StubSandbox::ok(),
        );

        let output = gate.execute("ls /workspace", "list files").await.unwrap();
        assert_eq!(output.stdout, "file-a\nfile-b\n");
        assert_eq!(output.exit_code, 0);
        assert_eq!(gate.sandbox.call_count(), 1);
    }

    #[tokio::test]
    async fn test_guardrail_block_never_reaches_sandbox() {
        let gate = gate(
            StubClassifier::verdict("ALLOW", "fine"),
            guardrails(&["git push --force*"]),
            StubSandbox::ok(),
        );

        let err = gate
            .execute("git push --force origin main", "ship it")
            .await
            .unwrap_err();

        match err {
            GateError::AuditBlocked { reason } => {
                assert_eq!(reason, "Static Guardrail violation: git push --force");
            }
            other => panic!("expected AuditBlocked, got {other:?}"),
        }
        assert_eq!(gate.sandbox.call_count(), 0);
    }

    #[tokio::test]
    async fn test_root_destruction_blocked_regardless_of_classifier() {
        let gate = gate(
            StubClassifier::verdict("ALLOW", "totally safe"),
            GuardrailSet::empty(),
            StubSandbox::ok(),
        );

        let err = gate.execute("rm -rf /", "free disk space").await.unwrap_err();
        match err {
            GateError::AuditBlocked { reason } => {
                assert!(reason.contains("Root path protection"));
            }
            other => panic!("expected AuditBlocked, got {other:?}"),
        }
        assert_eq!(gate.sandbox.call_count(), 0);
    }

    #[tokio::test]
    async fn test_challenge_confirmed_executes_once() {
        let gate = gate(
            StubClassifier::verdict("CHALLENGE", "modifies files"),
            GuardrailSet::empty(),
            StubSandbox::ok(),
        )
        .with_confirmation(confirm_with(true));

        let output = gate.execute("rm build.log", "clean up").await.unwrap();
        assert_eq!(output.exit_code, 0);
        assert_eq!(gate.sandbox.call_count(), 1);
    }

    #[tokio::test]
    async fn test_challenge_declined_is_denied() {
        let gate = gate(
            StubClassifier::verdict("CHALLENGE", "modifies files"),
            GuardrailSet::empty(),
            StubSandbox::ok(),
        )
        .with_confirmation(confirm_with(false));

        let err = gate.execute("rm build.log", "clean up").await.unwrap_err();
        assert!(matches!(err, GateError::ConfirmationDenied { .. }));
        assert_eq!(gate.sandbox.call_count(), 0);
    }

    #[tokio::test]
    async fn test_challenge_without_handler_is_denied() {
        let gate = gate(
            StubClassifier::verdict("CHALLENGE", "modifies files"),
            GuardrailSet::empty(),
            StubSandbox::ok(),
        );

        let err = gate.execute("rm build.log", "clean up").await.unwrap_err();
        match err {
            GateError::ConfirmationDenied { reason } => {
                assert!(reason.contains("no confirmation channel"));
            }
            other => panic!("expected ConfirmationDenied, got {other:?}"),
        }
        assert_eq!(gate.sandbox.call_count(), 0);
    }

    #[tokio::test]
    async fn test_challenge_confirmation_timeout_is_denied() {
        let never: ConfirmationHandler = Arc::new(|_message| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                true
            }) as BoxFuture<'static, bool>
        });

        let gate = gate(
            StubClassifier::verdict("CHALLENGE", "modifies files"),
            GuardrailSet::empty(),
            StubSandbox::ok(),
        )
        .with_confirmation(never)
        .with_confirm_timeout(Duration::from_millis(20));

        let err = gate.execute("rm build.log", "clean up").await.unwrap_err();
        match err {
            GateError::ConfirmationDenied { reason } => {
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected ConfirmationDenied, got {other:?}"),
        }
        assert_eq!(gate.sandbox.call_count(), 0);
    }

    #[tokio::test]
    async fn test_classifier_outage_never_executes() {
        let gate = gate(
            StubClassifier::failing(),
            GuardrailSet::empty(),
            StubSandbox::ok(),
        );

        let err = gate.execute("ls", "list").await.unwrap_err();
        assert!(matches!(err, GateError::AuditBlocked { .. }));
        assert_eq!(gate.sandbox.call_count(), 0);
    }

    #[tokio::test]
    async fn test_classifier_outage_in_degraded_mode_challenges() {
        let auditor = Auditor::new(StubClassifier::failing(), GuardrailSet::empty())
            .with_failure_mode(FailureMode::Degraded);
        let gate = SafeExecutor::new(auditor, StubSandbox::ok())
            .with_confirmation(confirm_with(true));

        // Degraded mode hands the decision to the human, who approves
        let output = gate.execute("ls", "list").await.unwrap();
        assert_eq!(output.exit_code, 0);
        assert_eq!(gate.sandbox.call_count(), 1);
    }

    #[tokio::test]
    async fn test_execution_failure_is_distinct_from_audit_rejection() {
        let gate = gate(
            StubClassifier::verdict("ALLOW", "fine"),
            GuardrailSet::empty(),
            StubSandbox::launch_failure(),
        );

        let err = gate.execute("ls", "list").await.unwrap_err();
        match err {
            GateError::Execution(SandboxError::Launch(message)) => {
                assert!(message.contains("docker not found"));
            }
            other => panic!("expected Execution, got {other:?}"),
        }
    }
}
