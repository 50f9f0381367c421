// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The decoded payload of a browser CSP violation report.

/// Key fields of a decoded CSP violation, independent of which wire format
/// (legacy `csp-report` or Reporting-API `reports+json`) it arrived in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationReport {
    /// The directive whose enforcement the browser blocked against.
    pub effective_directive: String,
    /// The target of the denied load: an absolute URL, a bare scheme, or
    /// one of the literal tokens `"inline"`/`"eval"`. `None` when the
    /// browser omitted `blocked-uri`.
    pub blocked_uri: Option<String>,
}
