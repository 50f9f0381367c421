// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Header hygiene: which upstream headers are safe to forward verbatim.
//!
//! Hop-by-hop headers (RFC 7230 §6.1) never survive a proxy hop; a handful
//! of entity headers are recomputed by the proxy itself rather than copied.
//! Both lists live together as one static table so the predicate is a
//! single lookup, tested directly (spec.md §8's header-hygiene round-trip).

/// Headers the proxy never forwards, either because they are hop-by-hop or
/// because the proxy recomputes them itself (`content-length` changes when
/// the body is rewritten; `content-encoding` is dropped because the
/// rewritten body is always sent uncompressed).
const UNSAFE_RESPONSE_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
    "content-encoding",
];

/// Same hop-by-hop set, applied to the request the proxy forwards upstream.
/// `host` is excluded separately since the proxy always sets its own.
const UNSAFE_REQUEST_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

/// Whether an upstream response header may be copied onto the client
/// response. `Content-Security-Policy`, in any casing, is excluded too: the
/// proxy injects its own `Content-Security-Policy-Report-Only` and must not
/// let the origin's own policy header leak through.
pub fn is_forwardable_response_header(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    !UNSAFE_RESPONSE_HEADERS.contains(&lower.as_str()) && lower != "content-security-policy"
}

/// Whether a client request header may be forwarded to the upstream origin.
pub fn is_forwardable_request_header(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    !UNSAFE_REQUEST_HEADERS.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hop_by_hop_headers_are_not_forwardable() {
        for name in ["Connection", "Keep-Alive", "Transfer-Encoding", "Upgrade", "TE", "Trailer"] {
            assert!(!is_forwardable_response_header(name), "{name} should be filtered");
        }
    }

    #[test]
    fn recomputed_entity_headers_are_not_forwardable() {
        assert!(!is_forwardable_response_header("Content-Length"));
        assert!(!is_forwardable_response_header("content-encoding"));
    }

    #[test]
    fn csp_header_is_filtered_regardless_of_casing() {
        assert!(!is_forwardable_response_header("Content-Security-Policy"));
        assert!(!is_forwardable_response_header("content-security-policy"));
        assert!(!is_forwardable_response_header("CONTENT-SECURITY-POLICY"));
    }

    #[test]
    fn ordinary_headers_are_forwardable() {
        assert!(is_forwardable_response_header("X-Custom-Header"));
        assert!(is_forwardable_response_header("Cache-Control"));
    }

    #[test]
    fn host_header_is_not_forwarded_upstream() {
        assert!(!is_forwardable_request_header("Host"));
    }
}
