// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The policy-relaxation engine: folds violation reports (and the proxy's
//! scraped form-action paths) into directive adjustments.

use parking_lot::Mutex;
use regex::Regex;
use tracing::{debug, warn};

use crate::csp::{Policy, ViolationReport};

/// Holds the mutable directive map assembled by [`Policy::make_strict`],
/// plus the compiled `selfPattern`.
///
/// Guarded by a `parking_lot::Mutex` rather than the single-threaded
/// request handler the original observer relied on: axum dispatches each
/// request on its own task, so the mutex is what makes "one critical
/// section per report" hold here. There is no backpressure or batching —
/// each report is applied synchronously before the lock is released.
pub struct PolicyEngine {
    policy: Mutex<Policy>,
    self_pattern: Regex,
}

impl PolicyEngine {
    pub fn new(policy: Policy, self_pattern: Regex) -> Self {
        Self {
            policy: Mutex::new(policy),
            self_pattern,
        }
    }

    /// `evaluateViolation(report)`.
    pub fn evaluate_violation(&self, report: &ViolationReport) {
        let mut policy = self.policy.lock();
        if !policy.contains(&report.effective_directive) {
            debug!(
                "violation for directive not in policy: {}",
                report.effective_directive
            );
            return;
        }

        let Some(ref blocked_uri) = report.blocked_uri else {
            warn!(
                "violation with null blocked-uri for {}: removing directive",
                report.effective_directive
            );
            policy.remove(&report.effective_directive);
            return;
        };

        self.apply_adjustment(&mut policy, &report.effective_directive, blocked_uri);
    }

    /// Apply a direct adjustment outside the violation-report path, used by
    /// the proxy's form-action scraping (spec.md §4.C).
    pub fn adjust_directive(&self, name: &str, uri: &str) {
        let mut policy = self.policy.lock();
        if !policy.contains(name) {
            debug!("adjustment for directive not in policy: {}", name);
            return;
        }
        self.apply_adjustment(&mut policy, name, uri);
    }

    fn apply_adjustment(&self, policy: &mut Policy, name: &str, uri: &str) {
        let directive = policy.get(name).expect("presence checked by caller");
        match directive.adjust_to_uri(uri, &self.self_pattern) {
            Some(adjusted) => policy.insert(adjusted),
            None => policy.remove(name),
        }
    }

    /// Snapshot of the current policy state.
    pub fn current_policy(&self) -> Policy {
        self.policy.lock().clone()
    }

    /// Serialize the current policy, as injected into response headers.
    pub fn serialize(&self) -> String {
        self.policy.lock().serialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> PolicyEngine {
        let policy = Policy::make_strict(None, Some("http://localhost:9/uri"));
        let self_pattern = Regex::new(r"^(https?://localhost:9000).*").unwrap();
        PolicyEngine::new(policy, self_pattern)
    }

    #[test]
    fn script_violation_relaxes_script_src() {
        let engine = engine();
        engine.evaluate_violation(&ViolationReport {
            effective_directive: "script-src".to_string(),
            blocked_uri: Some("https://cdn.example/lib.js".to_string()),
        });
        assert!(engine.serialize().contains("script-src https://cdn.example"));
        assert!(!engine.serialize().contains("script-src 'none'"));
    }

    #[test]
    fn inline_violation() {
        let engine = engine();
        engine.evaluate_violation(&ViolationReport {
            effective_directive: "style-src".to_string(),
            blocked_uri: Some("inline".to_string()),
        });
        assert!(engine.serialize().contains("style-src 'unsafe-inline'"));
    }

    #[test]
    fn self_violation() {
        let engine = engine();
        engine.evaluate_violation(&ViolationReport {
            effective_directive: "img-src".to_string(),
            blocked_uri: Some("http://localhost:9000/a.png".to_string()),
        });
        assert!(engine.serialize().contains("img-src 'self'"));
    }

    #[test]
    fn violation_for_unknown_directive_is_ignored() {
        let engine = engine();
        engine.evaluate_violation(&ViolationReport {
            effective_directive: "trusted-types".to_string(),
            blocked_uri: Some("https://cdn.example".to_string()),
        });
        assert!(!engine.serialize().contains("trusted-types"));
    }

    #[test]
    fn null_blocked_uri_removes_directive() {
        let engine = engine();
        engine.evaluate_violation(&ViolationReport {
            effective_directive: "img-src".to_string(),
            blocked_uri: None,
        });
        assert!(!engine.serialize().contains("img-src"));
    }

    #[test]
    fn relaxation_monotonicity_never_reintroduces_none_alongside_others() {
        let engine = engine();
        engine.evaluate_violation(&ViolationReport {
            effective_directive: "script-src".to_string(),
            blocked_uri: Some("https://cdn.example/a.js".to_string()),
        });
        engine.evaluate_violation(&ViolationReport {
            effective_directive: "script-src".to_string(),
            blocked_uri: Some("inline".to_string()),
        });
        let serialized = engine.serialize();
        let script_src_clause = serialized
            .split("; ")
            .find(|c| c.starts_with("script-src "))
            .unwrap();
        assert!(!script_src_clause.contains("'none'"));
        assert!(script_src_clause.contains("https://cdn.example"));
        assert!(script_src_clause.contains("'unsafe-inline'"));
    }

    #[test]
    fn form_action_adjustment_via_proxy_scraping_path() {
        let engine = engine();
        engine.adjust_directive("form-action", "http://localhost:9000/login");
        assert!(engine.serialize().contains("form-action 'self'"));
    }
}
