// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Directive option variants and their wire-form parsers/serializers.
//!
//! Each variant defines a parser that either recognizes a single
//! space-delimited token (`SingleOptionParser`) or dispatches over an
//! ordered list of recognizers (`MultiOptionParser`), splitting its input on
//! ASCII space and delegating each token to the first recognizer that
//! matches.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// One token of a `SourceOption`-typed directive's value.
///
/// The recognizer order used by [`SourceOption::parse_token`] matters: more
/// specific patterns must precede more permissive ones, with `HostSource`
/// last because its pattern is the most permissive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceOption {
    Self_,
    UnsafeEval,
    UnsafeHashes,
    UnsafeInline,
    None,
    StrictDynamic,
    ReportSample,
    Nonce(String),
    Hash(String, String),
    SchemeSource(String),
    HostSource {
        host: String,
        scheme: Option<String>,
        port: Option<String>,
    },
}

static NONCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^'nonce-([^'-]+)'$").unwrap());
static HASH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^'([^'-]+)-([^'-]+)'$").unwrap());
static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.-]*):$").unwrap());
static HOST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:([A-Za-z][A-Za-z0-9+.-]*):/{1,2})?([\w.~-]+)(?::([0-9]+|\*))?$").unwrap()
});

impl SourceOption {
    /// Parse a directive value made of space-separated `SourceOption` tokens.
    /// Unrecognized tokens are silently dropped.
    pub fn parse_all(value: &str) -> Vec<SourceOption> {
        value
            .split(' ')
            .filter(|t| !t.is_empty())
            .filter_map(Self::parse_token)
            .collect()
    }

    /// Recognize a single token, trying each variant in order of specificity.
    pub fn parse_token(token: &str) -> Option<SourceOption> {
        match token {
            "'self'" => return Some(SourceOption::Self_),
            "'unsafe-eval'" => return Some(SourceOption::UnsafeEval),
            "'unsafe-hashes'" => return Some(SourceOption::UnsafeHashes),
            "'unsafe-inline'" => return Some(SourceOption::UnsafeInline),
            "'none'" => return Some(SourceOption::None),
            "'strict-dynamic'" => return Some(SourceOption::StrictDynamic),
            "'report-sample'" => return Some(SourceOption::ReportSample),
            _ => {}
        }
        if let Some(caps) = NONCE_RE.captures(token) {
            return Some(SourceOption::Nonce(caps[1].to_string()));
        }
        if let Some(caps) = HASH_RE.captures(token) {
            return Some(SourceOption::Hash(caps[1].to_string(), caps[2].to_string()));
        }
        if let Some(caps) = SCHEME_RE.captures(token) {
            return Some(SourceOption::SchemeSource(caps[1].to_string()));
        }
        if let Some(caps) = HOST_RE.captures(token) {
            let scheme = caps.get(1).map(|m| m.as_str().to_string());
            let host = caps[2].to_string();
            let port = caps.get(3).map(|m| m.as_str().to_string());
            return Some(SourceOption::HostSource { host, scheme, port });
        }
        None
    }

    /// Attempt to build a [`SourceOption::HostSource`] from a full URI
    /// (scheme, authority, and possibly a path), used by `adjustToUri`.
    pub fn host_source_from_uri(uri: &str) -> Option<SourceOption> {
        let without_path = match uri.find("://") {
            Some(idx) => {
                let rest = &uri[idx + 3..];
                let end = rest.find('/').unwrap_or(rest.len());
                let scheme = &uri[..idx];
                format!("{}://{}", scheme, &rest[..end])
            }
            None => {
                let end = uri.find('/').unwrap_or(uri.len());
                uri[..end].to_string()
            }
        };
        Self::parse_token(&without_path)
    }
}

impl fmt::Display for SourceOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOption::Self_ => write!(f, "'self'"),
            SourceOption::UnsafeEval => write!(f, "'unsafe-eval'"),
            SourceOption::UnsafeHashes => write!(f, "'unsafe-hashes'"),
            SourceOption::UnsafeInline => write!(f, "'unsafe-inline'"),
            SourceOption::None => write!(f, "'none'"),
            SourceOption::StrictDynamic => write!(f, "'strict-dynamic'"),
            SourceOption::ReportSample => write!(f, "'report-sample'"),
            SourceOption::Nonce(n) => write!(f, "'nonce-{}'", n),
            SourceOption::Hash(alg, h) => write!(f, "'{}-{}'", alg, h),
            SourceOption::SchemeSource(s) => write!(f, "{}:", s),
            SourceOption::HostSource { host, scheme, port } => {
                if let Some(scheme) = scheme {
                    write!(f, "{}://{}", scheme, host)?;
                } else {
                    write!(f, "{}", host)?;
                }
                if let Some(port) = port {
                    write!(f, ":{}", port)?;
                }
                Ok(())
            }
        }
    }
}

/// A sandbox token, drawn from the fixed set the CSP grammar defines.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SandboxOption(pub String);

const SANDBOX_TOKENS: &[&str] = &[
    "allow-downloads",
    "allow-forms",
    "allow-modals",
    "allow-orientation-lock",
    "allow-pointer-lock",
    "allow-popups",
    "allow-popups-to-escape-sandbox",
    "allow-presentation",
    "allow-same-origin",
    "allow-scripts",
    "allow-storage-access-by-user-activation",
    "allow-top-navigation",
    "allow-top-navigation-by-user-activation",
    "allow-top-navigation-to-custom-protocols",
];

impl SandboxOption {
    pub fn parse_all(value: &str) -> Vec<SandboxOption> {
        value
            .split(' ')
            .filter(|t| !t.is_empty())
            .filter_map(Self::parse_token)
            .collect()
    }

    pub fn parse_token(token: &str) -> Option<SandboxOption> {
        SANDBOX_TOKENS
            .iter()
            .find(|&&known| known == token)
            .map(|&known| SandboxOption(known.to_string()))
    }
}

impl fmt::Display for SandboxOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A MIME type option: `type/subtype` plus optional `;param` segments, as
/// used by `plugin-types`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MimeTypeOption {
    pub kind: String,
    pub subtype: String,
    pub params: Vec<String>,
}

impl MimeTypeOption {
    pub fn parse_all(value: &str) -> Vec<MimeTypeOption> {
        value
            .split(' ')
            .filter(|t| !t.is_empty())
            .filter_map(Self::parse_token)
            .collect()
    }

    pub fn parse_token(token: &str) -> Option<MimeTypeOption> {
        let mut parts = token.split(';');
        let type_pair = parts.next()?;
        let (kind, subtype) = type_pair.split_once('/')?;
        if kind.is_empty() || subtype.is_empty() {
            return None;
        }
        let params = parts.map(|p| p.to_string()).collect();
        Some(MimeTypeOption {
            kind: kind.to_string(),
            subtype: subtype.to_string(),
            params,
        })
    }
}

impl fmt::Display for MimeTypeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)?;
        for param in &self.params {
            write!(f, ";{}", param)?;
        }
        Ok(())
    }
}

/// An opaque non-empty token, used for `report-to` group names and
/// `report-uri` URIs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArbitraryTextOption(pub String);

impl ArbitraryTextOption {
    pub fn parse_all(value: &str) -> Vec<ArbitraryTextOption> {
        value
            .split(' ')
            .filter(|t| !t.is_empty())
            .map(|t| ArbitraryTextOption(t.to_string()))
            .collect()
    }
}

impl fmt::Display for ArbitraryTextOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
