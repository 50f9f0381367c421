// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The rewriting reverse proxy (spec.md §4.C): forwards every inbound
//! request to the target origin, rewrites the HTML body and `Location`
//! header, injects the current policy in report-only mode, and scrapes
//! navigable URLs and form actions back into the rest of the system.

mod charset;
pub mod headers;
mod rewrite;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use regex::Regex;
use reqwest::redirect::Policy as RedirectPolicy;
use tracing::{debug, warn};
use url::Url;

use crate::coordinator::frontier::FrontierHandle;
use crate::engine::PolicyEngine;
use crate::error::Error;
use crate::report::wire::ReportingApiGroup;

/// Static configuration for one proxied target domain.
pub struct ProxyConfig {
    pub target_domain: String,
    pub proxy_port: u16,
    pub reporting_api_group: Option<String>,
}

/// Everything a request handler needs: config, the shared policy engine,
/// the upstream HTTP client, the precompiled rewrite patterns, and
/// (optionally, when running under the full crawl pipeline) the frontier to
/// hand scraped URLs to.
pub struct ProxyState {
    pub config: ProxyConfig,
    pub engine: Arc<PolicyEngine>,
    pub frontier: Option<FrontierHandle>,
    client: reqwest::Client,
    domain_pattern: Regex,
    href_pattern: Regex,
    form_action_pattern: fancy_regex::Regex,
}

impl ProxyState {
    pub fn new(config: ProxyConfig, engine: Arc<PolicyEngine>, frontier: Option<FrontierHandle>) -> Self {
        let domain_pattern = rewrite::domain_pattern(&config.target_domain);
        let href_pattern = rewrite::href_pattern(&config.target_domain);
        let form_action_pattern = rewrite::form_action_pattern();
        // Exactly one hop: the proxy does not itself follow redirects,
        // leaving that to the browser acting on the rewritten `Location`.
        let client = reqwest::Client::builder()
            .redirect(RedirectPolicy::none())
            .build()
            .expect("reqwest client always builds");

        Self {
            config,
            engine,
            frontier,
            client,
            domain_pattern,
            href_pattern,
            form_action_pattern,
        }
    }
}

/// Build the proxy's router: a single catch-all route, since every method
/// and path is forwarded.
pub fn router(state: Arc<ProxyState>) -> Router {
    Router::new().fallback(any(handle)).with_state(state)
}

async fn handle(
    State(state): State<Arc<ProxyState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let upstream_url = resolve_upstream_url(&state.config.target_domain, path_and_query);

    let mut upstream_req = state.client.request(method.clone(), upstream_url.as_str());
    for (name, value) in headers.iter() {
        if headers::is_forwardable_request_header(name.as_str()) {
            upstream_req = upstream_req.header(name.clone(), value.clone());
        }
    }
    upstream_req = upstream_req.body(body.to_vec()).timeout(Duration::from_secs(30));

    let upstream = match upstream_req.send().await {
        Ok(resp) => resp,
        Err(err) => {
            let err = Error::from(err);
            warn!("upstream fetch failed for {}: {}", upstream_url, err);
            return error_response(&state, StatusCode::BAD_GATEWAY);
        }
    };

    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let upstream_headers = upstream.headers().clone();
    let content_type = upstream_headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body_bytes = match upstream.bytes().await {
        Ok(b) => b,
        Err(err) => {
            let err = Error::from(err);
            warn!("failed reading upstream body for {}: {}", upstream_url, err);
            return error_response(&state, StatusCode::BAD_GATEWAY);
        }
    };

    let mut response_headers = HeaderMap::new();

    if let Some(location) = upstream_headers.get("location").and_then(|v| v.to_str().ok()) {
        let rewritten = rewrite::rewrite_domain(location, &state.domain_pattern);
        if let Ok(value) = HeaderValue::from_str(&rewritten) {
            response_headers.insert(HeaderName::from_static("location"), value);
        }
    }

    if let Some(group) = &state.config.reporting_api_group {
        let json = ReportingApiGroup::new(group.clone()).to_json();
        if let Ok(value) = HeaderValue::from_str(&json) {
            response_headers.insert(HeaderName::from_static("report-to"), value);
        }
    }

    let policy = state.engine.serialize();
    if let Ok(value) = HeaderValue::from_str(&policy) {
        response_headers.insert(
            HeaderName::from_static("content-security-policy-report-only"),
            value,
        );
    }

    for (name, value) in upstream_headers.iter() {
        if headers::is_forwardable_response_header(name.as_str())
            && !response_headers.contains_key(name)
        {
            response_headers.insert(name.clone(), value.clone());
        }
    }

    let is_html = content_type
        .as_deref()
        .map(|ct| ct.to_ascii_lowercase().starts_with("text/html"))
        .unwrap_or(false);

    let final_body = if is_html {
        let decoded = charset::decode(&body_bytes, content_type.as_deref());
        let scraped = rewrite::scrape_urls(&decoded, &state.href_pattern);
        if let Some(frontier) = &state.frontier {
            if !scraped.is_empty() {
                frontier.send_urls(scraped).await;
            }
        }

        for action in rewrite::scrape_form_actions(&decoded, &state.form_action_pattern, state.config.proxy_port)
        {
            state.engine.adjust_directive("form-action", &action);
        }

        let rewritten = rewrite::rewrite_domain(&decoded, &state.domain_pattern);
        charset::encode(&rewritten, content_type.as_deref())
    } else {
        body_bytes.to_vec()
    };

    let mut builder = axum::http::Response::builder().status(status);
    for (name, value) in response_headers.iter() {
        builder = builder.header(name.clone(), value.clone());
    }
    builder
        .body(axum::body::Body::from(final_body))
        .expect("response with proxied headers always builds")
}

/// Resolve a request path against the target domain's origin, falling back
/// to plain concatenation if the domain does not parse as a URL authority.
///
/// Loopback targets (as used by local mock upstreams in tests) are fetched
/// over plain HTTP; every other target is assumed to speak TLS.
fn resolve_upstream_url(target_domain: &str, path_and_query: &str) -> String {
    let scheme = if target_domain.starts_with("127.0.0.1") || target_domain.starts_with("localhost") {
        "http"
    } else {
        "https"
    };
    Url::parse(&format!("{scheme}://{target_domain}"))
        .ok()
        .and_then(|base| base.join(path_and_query).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| format!("{scheme}://{target_domain}{path_and_query}"))
}

/// Best-effort response for an upstream fetch failure: propagate a gateway
/// error status, still inject the current CSP, but never a `Report-To`
/// (there is no response to attach it to).
fn error_response(state: &ProxyState, status: StatusCode) -> Response {
    let policy = state.engine.serialize();
    debug!("serving error response with policy {}", policy);
    let mut builder = axum::http::Response::builder().status(status);
    if let Ok(value) = HeaderValue::from_str(&policy) {
        builder = builder.header("content-security-policy-report-only", value);
    }
    builder
        .body(axum::body::Body::empty())
        .expect("error response always builds")
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::csp::Policy;
    use crate::engine::PolicyEngine;

    #[test]
    fn resolves_path_against_domain() {
        assert_eq!(
            resolve_upstream_url("example.com", "/a/b?x=1"),
            "https://example.com/a/b?x=1"
        );
    }

    #[test]
    fn resolves_bare_root() {
        assert_eq!(resolve_upstream_url("example.com", "/"), "https://example.com/");
    }

    /// End-to-end: a mocked upstream serves HTML carrying its own
    /// `Content-Security-Policy` and an absolute self-reference; the proxied
    /// response must inject `Content-Security-Policy-Report-Only`, drop the
    /// upstream's own CSP header, and rewrite the absolute reference to a
    /// root-relative path (spec.md §8 scenario 5).
    #[tokio::test]
    async fn forwards_and_rewrites_against_mocked_upstream() {
        let mock_server = MockServer::start().await;
        let target_domain = mock_server.address().to_string();

        let upstream_body = format!(
            r#"<html><body><a href="https://{target}/about">About</a></body></html>"#,
            target = target_domain
        );
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(upstream_body)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .insert_header("content-security-policy", "default-src 'self'"),
            )
            .mount(&mock_server)
            .await;

        let engine = Arc::new(PolicyEngine::new(
            Policy::make_strict(None, Some("http://localhost:9/uri")),
            Regex::new(r"^(https?://localhost:8080).*").unwrap(),
        ));
        let config = ProxyConfig {
            target_domain: target_domain.clone(),
            proxy_port: 8080,
            reporting_api_group: None,
        };
        let state = Arc::new(ProxyState::new(config, engine, None));
        let app = router(state);

        let request = Request::builder().method("GET").uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers().clone();
        assert!(headers.contains_key("content-security-policy-report-only"));
        assert!(!headers.contains_key("content-security-policy"));

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body_str = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert!(body_str.contains(r#"href="/about""#));
        assert!(!body_str.contains(&target_domain));
    }

    /// An upstream fetch failure still injects the current CSP, propagating
    /// a gateway status rather than hanging or panicking (spec.md §7).
    #[tokio::test]
    async fn upstream_failure_still_injects_csp() {
        // Nothing listens here: the connection itself fails, rather than
        // the mock server returning an error status.
        let target_domain = "127.0.0.1:1".to_string();

        let engine = Arc::new(PolicyEngine::new(
            Policy::make_strict(None, None),
            Regex::new(r"^(https?://localhost:8080).*").unwrap(),
        ));
        let config = ProxyConfig {
            target_domain,
            proxy_port: 8080,
            reporting_api_group: None,
        };
        let state = Arc::new(ProxyState::new(config, engine, None));
        let app = router(state);

        let request = Request::builder().method("GET").uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(response.headers().contains_key("content-security-policy-report-only"));
        assert!(!response.headers().contains_key("report-to"));
    }
}
