// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The violation-report endpoint (spec.md §4.D): a second local HTTP server
//! that decodes browser CSP reports and hands them to the policy engine.

pub mod wire;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use crate::engine::PolicyEngine;
use crate::error::Error;
use wire::{LegacyReportEnvelope, ReportingApiReport};

/// Build the report endpoint's router: `POST /uri` (legacy
/// `application/csp-report`) and `POST /api` (Reporting-API
/// `application/reports+json`), with CORS open to any origin for the
/// methods/headers spec.md §4.D names.
pub fn router(engine: Arc<PolicyEngine>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_LENGTH,
            axum::http::HeaderName::from_static("x-requested-with"),
        ]);

    Router::new()
        .route("/uri", post(legacy_report))
        .route("/api", post(reporting_api_report))
        .layer(cors)
        .with_state(engine)
}

/// `POST /uri`: respond `200` before processing, then, if the wrapped
/// report is non-null, forward it to [`PolicyEngine::evaluate_violation`].
///
/// The body is read as raw bytes and decoded with `serde_json` directly
/// rather than through axum's `Json` extractor: that extractor 415-rejects
/// any request whose `Content-Type` isn't exactly `application/json` or
/// doesn't end in `+json`, but spec.md §4.D mandates this route be sent as
/// `application/csp-report`, which matches neither rule. The route path
/// already disambiguates the wire format, so content-type sniffing adds
/// nothing here.
async fn legacy_report(State(engine): State<Arc<PolicyEngine>>, body: Bytes) -> StatusCode {
    let envelope: LegacyReportEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(err) => {
            let err = Error::from(err);
            debug!("failed to decode csp-report body: {}", err);
            return StatusCode::OK;
        }
    };

    if let Some(body) = envelope.csp_report {
        match body.into_violation() {
            Some(violation) => engine.evaluate_violation(&violation),
            None => debug!("csp-report missing effective-directive; ignoring"),
        }
    }
    StatusCode::OK
}

/// `POST /api`: Reporting-API reports are logged but not wired to
/// relaxation (spec.md §4.D, §9 open questions).
async fn reporting_api_report(Json(report): Json<ReportingApiReport>) -> StatusCode {
    if report.kind.as_deref() == Some("csp-violation") {
        if let Some(body) = &report.body {
            info!(?body, "received reporting-api csp-violation");
        }
    }
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::Policy;
    use axum::body::Body;
    use axum::http::Request;
    use regex::Regex;
    use tower::ServiceExt;

    fn test_engine() -> Arc<PolicyEngine> {
        let policy = Policy::make_strict(None, Some("http://localhost:9/uri"));
        let self_pattern = Regex::new(r"^(https?://localhost:9000).*").unwrap();
        Arc::new(PolicyEngine::new(policy, self_pattern))
    }

    #[tokio::test]
    async fn legacy_report_relaxes_policy() {
        let engine = test_engine();
        let app = router(engine.clone());

        let body = r#"{"csp-report":{"blocked-uri":"https://cdn.example/lib.js","effective-directive":"script-src"}}"#;
        let request = Request::builder()
            .method("POST")
            .uri("/uri")
            .header("content-type", "application/csp-report")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(engine.serialize().contains("script-src https://cdn.example"));
    }

    /// spec.md's CORS configuration must answer a preflight from any
    /// origin with the methods/headers allow-list the router is built
    /// with (§4.D; ambient coverage per SPEC_FULL.md §8).
    #[tokio::test]
    async fn options_preflight_from_arbitrary_origin_receives_configured_allow_list() {
        let engine = test_engine();
        let app = router(engine);

        let request = Request::builder()
            .method("OPTIONS")
            .uri("/uri")
            .header("origin", "https://arbitrary.example")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");

        let allow_methods = headers
            .get("access-control-allow-methods")
            .unwrap()
            .to_str()
            .unwrap()
            .to_ascii_uppercase();
        for method in ["GET", "PUT", "POST", "DELETE", "OPTIONS"] {
            assert!(allow_methods.contains(method), "missing {method} in {allow_methods}");
        }

        let allow_headers = headers
            .get("access-control-allow-headers")
            .unwrap()
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        for header in ["content-type", "authorization", "content-length", "x-requested-with"] {
            assert!(allow_headers.contains(header), "missing {header} in {allow_headers}");
        }
    }

    #[tokio::test]
    async fn reporting_api_report_does_not_relax() {
        let engine = test_engine();
        let app = router(engine.clone());

        let body = r#"{"type":"csp-violation","body":{"directive":"script-src","blocked":"https://cdn.example/lib.js"}}"#;
        let request = Request::builder()
            .method("POST")
            .uri("/api")
            .header("content-type", "application/reports+json")
            .body(Body::from(body))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(engine.serialize().contains("script-src 'none'"));
    }
}
