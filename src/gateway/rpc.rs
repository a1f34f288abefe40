//! Administrative RPC dispatch.
//!
//! A single named action, `"killswitch"`, reachable only by an already
//! authenticated caller (authentication is the transport's concern). It
//! bypasses the verdict pipeline entirely.

use serde_json::{Value, json};
use tracing::error;

use crate::sandbox::{ContainerKiller, KillSwitch};

/// The kill-switch action name, as registered on the gateway transport.
pub const ACTION_KILLSWITCH: &str = "killswitch";

/// Machine-readable code for an unrecognized action.
pub const UNKNOWN_ACTION: &str = "UNKNOWN_ACTION";

/// Dispatch one administrative request.
///
/// Returns `{ "ok": true, "message": .. }` on success and
/// `{ "code": .., "message": .. }` on failure, mirroring the transport's
/// respond contract.
pub async fn handle_request<K: ContainerKiller>(
    switch: &KillSwitch<K>,
    action: &str,
) -> Value {
    match action {
        ACTION_KILLSWITCH => match switch.terminate_all().await {
            Ok(report) => json!({ "ok": true, "message": report.message }),
            Err(e) => {
                error!(error = %e, "kill-switch activation failed");
                json!({ "code": e.code(), "message": e.message })
            }
        },
        other => json!({
            "code": UNKNOWN_ACTION,
            "message": format!("unknown administrative action '{other}'"),
        }),
    }
}
