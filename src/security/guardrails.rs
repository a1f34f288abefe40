//! Static guardrail check: deterministic pattern match against a configured
//! list of forbidden command substrings.
//!
//! This check runs before any network call, so known-destructive patterns
//! are rejected even when the semantic classifier is unreachable.

/// An ordered set of forbidden command patterns.
///
/// Patterns may carry `*` wildcard markers (e.g. `"git push --force*"`);
/// the markers are stripped and the remainder is tested for substring
/// containment. Evaluation is first-match-wins.
///
/// Immutable after construction. A failed config load degrades to
/// [`GuardrailSet::empty`], which matches nothing.
#[derive(Debug, Clone, Default)]
pub struct GuardrailSet {
    patterns: Vec<String>,
}

impl GuardrailSet {
    pub fn new(patterns: Vec<String>) -> Self {
        Self { patterns }
    }

    /// A set that matches nothing (fail-open degradation for the static layer).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check a command against the set.
    ///
    /// Returns the first violated rule (with wildcard markers stripped),
    /// short-circuiting further evaluation. No side effects.
    pub fn check(&self, command: &str) -> Option<String> {
        for pattern in &self.patterns {
            let needle = pattern.replace('*', "");
            if needle.is_empty() {
                continue;
            }
            if command.contains(&needle) {
                return Some(needle);
            }
        }
        None
    }
}
