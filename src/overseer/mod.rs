//! Semantic audit of proposed commands via a language-model classifier.
//!
//! The classifier is an untrusted, best-effort oracle: its transport can
//! fail, its output can be garbage, and it may ignore instructions. The
//! [`Auditor`] wraps it with the static guardrail check, a deterministic
//! root-path override, bounded call time, and a fail-closed policy — a
//! classifier failure can never resolve to `Allow`.

pub mod client;
pub mod parser;
pub mod prompt;

mod auditor;

pub use auditor::{Auditor, FailureMode};
pub use client::{Classifier, OllamaClassifier};
