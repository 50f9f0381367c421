// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! JSON wire formats the browser posts violation/reporting-API reports in.

use serde::{Deserialize, Serialize};

use crate::csp::ViolationReport;

/// The Reporting-API group definition emitted in the `Report-To` header
/// when a reporting endpoint is configured.
#[derive(Debug, Serialize)]
pub struct ReportingApiGroup {
    pub group: &'static str,
    pub max_age: u64,
    pub endpoints: Vec<ReportingApiEndpoint>,
}

#[derive(Debug, Serialize)]
pub struct ReportingApiEndpoint {
    pub url: String,
}

impl ReportingApiGroup {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            group: "csp-endpoint",
            max_age: 10_886_400,
            endpoints: vec![ReportingApiEndpoint { url: endpoint.into() }],
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("ReportingApiGroup always serializes")
    }
}

/// `POST /uri` body: `{ "csp-report": { ... } }`.
#[derive(Debug, Deserialize)]
pub struct LegacyReportEnvelope {
    #[serde(rename = "csp-report")]
    pub csp_report: Option<LegacyReportBody>,
}

#[derive(Debug, Deserialize)]
pub struct LegacyReportBody {
    #[serde(rename = "blocked-uri")]
    pub blocked_uri: Option<String>,
    pub disposition: Option<String>,
    #[serde(rename = "document-uri")]
    pub document_uri: Option<String>,
    #[serde(rename = "effective-directive")]
    pub effective_directive: Option<String>,
    #[serde(rename = "original-policy")]
    pub original_policy: Option<String>,
    pub referrer: Option<String>,
    #[serde(rename = "script-sample")]
    pub script_sample: Option<String>,
    #[serde(rename = "status-code")]
    pub status_code: Option<String>,
    #[serde(rename = "violated-directive")]
    pub violated_directive: Option<String>,
}

impl LegacyReportBody {
    /// Convert to the canonical [`ViolationReport`]. `None` if
    /// `effective-directive` is absent — there is nothing to key a
    /// relaxation off of without it.
    pub fn into_violation(self) -> Option<ViolationReport> {
        Some(ViolationReport {
            effective_directive: self.effective_directive?,
            blocked_uri: self.blocked_uri,
        })
    }
}

/// `POST /api` body, Reporting-API `application/reports+json` shape.
#[derive(Debug, Deserialize)]
pub struct ReportingApiReport {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub age: Option<i64>,
    pub url: Option<String>,
    pub user_agent: Option<String>,
    pub body: Option<ReportingApiBody>,
}

#[derive(Debug, Deserialize)]
pub struct ReportingApiBody {
    pub blocked: Option<String>,
    pub directive: Option<String>,
    pub policy: Option<String>,
    pub status: Option<String>,
    pub referrer: Option<String>,
}
