//! Safety configuration loading.
//!
//! Two JSON documents are read once at startup:
//! - `guardrails.json` — `{ "protected": ["pattern", ...] }`
//! - `whitelist.json` — `{ "allowed_domains": [...], "allowed_ips": [...] }`
//!
//! A missing or unparseable file must not crash the process: it logs a
//! warning and degrades to an empty set. This fail-open policy applies to
//! the static layer only; classifier failures are handled fail-closed in
//! the overseer module.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::security::GuardrailSet;

#[derive(Debug, Deserialize, Default)]
struct GuardrailsFile {
    #[serde(default)]
    protected: Vec<String>,
}

/// Allowed network destinations, loaded alongside the guardrails.
///
/// Loaded and queryable, but not consulted by the audit decision path.
/// Whether it should gate network-touching commands is an open policy
/// question; see DESIGN.md.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WhitelistSet {
    #[serde(default)]
    pub allowed_domains: Vec<String>,
    #[serde(default)]
    pub allowed_ips: Vec<String>,
}

impl WhitelistSet {
    pub fn is_empty(&self) -> bool {
        self.allowed_domains.is_empty() && self.allowed_ips.is_empty()
    }

    /// Whether a host (domain name or IP literal) is on the whitelist.
    pub fn permits_host(&self, host: &str) -> bool {
        self.allowed_domains.iter().any(|d| d == host)
            || self.allowed_ips.iter().any(|ip| ip == host)
    }
}

/// Immutable safety configuration for the life of the process.
///
/// Constructed once and passed into the auditor/gateway explicitly, so tests
/// can inject arbitrary configurations.
#[derive(Debug, Clone, Default)]
pub struct SafetyConfig {
    pub guardrails: GuardrailSet,
    pub whitelist: WhitelistSet,
}

impl SafetyConfig {
    /// Load both documents from `dir`. Never fails: each file independently
    /// degrades to an empty set with a warning.
    pub fn load(dir: &Path) -> Self {
        let guardrails = match read_json::<GuardrailsFile>(&dir.join("guardrails.json")) {
            Ok(file) => GuardrailSet::new(file.protected),
            Err(e) => {
                warn!("guardrails.json unavailable ({e}); static guardrail set is empty");
                GuardrailSet::empty()
            }
        };

        let whitelist = match read_json::<WhitelistSet>(&dir.join("whitelist.json")) {
            Ok(set) => set,
            Err(e) => {
                warn!("whitelist.json unavailable ({e}); whitelist is empty");
                WhitelistSet::default()
            }
        };

        Self {
            guardrails,
            whitelist,
        }
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> anyhow::Result<T> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
