// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Directive names, families, flags, and the directive value itself.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::option::{ArbitraryTextOption, MimeTypeOption, SandboxOption, SourceOption};

/// The five directive families named by the CSP grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Document,
    Fetch,
    Navigation,
    Reporting,
    Boolean,
}

/// Which option variant a directive's value is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Source,
    Sandbox,
    Mime,
    Text,
    NoOption,
}

/// Static attributes consulted during policy generation.
#[derive(Debug, Clone, Copy)]
pub struct DirectiveSpec {
    pub name: &'static str,
    pub family: Family,
    pub option_kind: OptionKind,
    pub can_be_in_header: bool,
    pub can_be_in_report_only_header: bool,
    pub can_be_in_meta_element: bool,
}

/// The closed registry of every known directive, in declaration order. This
/// order is also the stable serialization order for a [`super::policy::Policy`].
pub static REGISTRY: &[DirectiveSpec] = &[
    spec("base-uri", Family::Document, OptionKind::Source, true),
    spec("plugin-types", Family::Document, OptionKind::Mime, true),
    DirectiveSpec {
        name: "sandbox",
        family: Family::Document,
        option_kind: OptionKind::Sandbox,
        can_be_in_header: true,
        can_be_in_report_only_header: false,
        can_be_in_meta_element: false,
    },
    spec("child-src", Family::Fetch, OptionKind::Source, true),
    spec("connect-src", Family::Fetch, OptionKind::Source, true),
    spec("default-src", Family::Fetch, OptionKind::Source, true),
    spec("font-src", Family::Fetch, OptionKind::Source, true),
    spec("frame-src", Family::Fetch, OptionKind::Source, true),
    spec("img-src", Family::Fetch, OptionKind::Source, true),
    spec("manifest-src", Family::Fetch, OptionKind::Source, true),
    spec("media-src", Family::Fetch, OptionKind::Source, true),
    spec("object-src", Family::Fetch, OptionKind::Source, true),
    spec("prefetch-src", Family::Fetch, OptionKind::Source, true),
    spec("script-src", Family::Fetch, OptionKind::Source, true),
    spec("script-src-attr", Family::Fetch, OptionKind::Source, true),
    spec("script-src-elem", Family::Fetch, OptionKind::Source, true),
    spec("style-src", Family::Fetch, OptionKind::Source, true),
    spec("style-src-attr", Family::Fetch, OptionKind::Source, true),
    spec("style-src-elem", Family::Fetch, OptionKind::Source, true),
    spec("worker-src", Family::Fetch, OptionKind::Source, true),
    spec("form-action", Family::Navigation, OptionKind::Source, true),
    DirectiveSpec {
        name: "frame-ancestors",
        family: Family::Navigation,
        option_kind: OptionKind::Source,
        can_be_in_header: true,
        can_be_in_report_only_header: true,
        can_be_in_meta_element: false,
    },
    DirectiveSpec {
        name: "navigate-to",
        family: Family::Navigation,
        option_kind: OptionKind::Source,
        can_be_in_header: true,
        can_be_in_report_only_header: true,
        can_be_in_meta_element: false,
    },
    DirectiveSpec {
        name: "report-to",
        family: Family::Reporting,
        option_kind: OptionKind::Text,
        can_be_in_header: true,
        can_be_in_report_only_header: true,
        can_be_in_meta_element: false,
    },
    DirectiveSpec {
        name: "report-uri",
        family: Family::Reporting,
        option_kind: OptionKind::Text,
        can_be_in_header: true,
        can_be_in_report_only_header: true,
        can_be_in_meta_element: false,
    },
    spec(
        "block-all-mixed-content",
        Family::Boolean,
        OptionKind::NoOption,
        true,
    ),
    spec(
        "upgrade-insecure-requests",
        Family::Boolean,
        OptionKind::NoOption,
        true,
    ),
];

/// Shorthand for the common case: `canBeInMetaElement = true`.
const fn spec(name: &'static str, family: Family, option_kind: OptionKind, meta: bool) -> DirectiveSpec {
    DirectiveSpec {
        name,
        family,
        option_kind,
        can_be_in_header: true,
        can_be_in_report_only_header: true,
        can_be_in_meta_element: meta,
    }
}

pub fn spec_for(name: &str) -> Option<&'static DirectiveSpec> {
    REGISTRY.iter().find(|s| s.name == name)
}

/// A directive's value: a collection of options of one specific variant.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectiveValue {
    Source(Vec<SourceOption>),
    Sandbox(Vec<SandboxOption>),
    Mime(Vec<MimeTypeOption>),
    Text(Vec<ArbitraryTextOption>),
    NoOption,
}

impl DirectiveValue {
    fn is_empty_options(&self) -> bool {
        match self {
            DirectiveValue::Source(v) => v.is_empty(),
            DirectiveValue::Sandbox(v) => v.is_empty(),
            DirectiveValue::Mime(v) => v.is_empty(),
            DirectiveValue::Text(v) => v.is_empty(),
            DirectiveValue::NoOption => false,
        }
    }

    fn serialize_options(&self) -> String {
        match self {
            DirectiveValue::Source(v) => v
                .iter()
                .map(|o| o.to_string())
                .collect::<Vec<_>>()
                .join(" "),
            DirectiveValue::Sandbox(v) => v
                .iter()
                .map(|o| o.to_string())
                .collect::<Vec<_>>()
                .join(" "),
            DirectiveValue::Mime(v) => v
                .iter()
                .map(|o| o.to_string())
                .collect::<Vec<_>>()
                .join(" "),
            DirectiveValue::Text(v) => v
                .iter()
                .map(|o| o.to_string())
                .collect::<Vec<_>>()
                .join(" "),
            DirectiveValue::NoOption => String::new(),
        }
    }
}

/// A name plus a collection of options of one specific option variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub name: String,
    pub value: DirectiveValue,
}

impl Directive {
    /// Parse a directive string: scans declared directive names, the first
    /// whose name is a prefix wins, and the remainder is handed to that
    /// directive's option parser. An unrecognized name yields no directive.
    pub fn parse(token: &str) -> Option<Directive> {
        let token = token.trim();
        let spec = REGISTRY
            .iter()
            .find(|s| token == s.name || token.starts_with(&format!("{} ", s.name)))?;
        let remainder = token[spec.name.len()..].trim_start();
        let value = match spec.option_kind {
            OptionKind::Source => DirectiveValue::Source(SourceOption::parse_all(remainder)),
            OptionKind::Sandbox => DirectiveValue::Sandbox(SandboxOption::parse_all(remainder)),
            OptionKind::Mime => DirectiveValue::Mime(MimeTypeOption::parse_all(remainder)),
            OptionKind::Text => DirectiveValue::Text(ArbitraryTextOption::parse_all(remainder)),
            OptionKind::NoOption => DirectiveValue::NoOption,
        };
        Some(Directive {
            name: spec.name.to_string(),
            value,
        })
    }

    /// Build the "strictest" instance for a directive name, per its option
    /// kind. Returns `None` for `Text`-kind directives (`report-to`,
    /// `report-uri`), which require `construct_simple` instead.
    pub fn make_strict(name: &str) -> Option<Directive> {
        let spec = spec_for(name)?;
        let value = match spec.option_kind {
            OptionKind::Source => DirectiveValue::Source(vec![SourceOption::None]),
            OptionKind::Sandbox => DirectiveValue::Sandbox(Vec::new()),
            OptionKind::Mime => DirectiveValue::Mime(Vec::new()),
            OptionKind::Text => return None,
            OptionKind::NoOption => DirectiveValue::NoOption,
        };
        Some(Directive {
            name: spec.name.to_string(),
            value,
        })
    }

    /// Build a `Text`-kind directive carrying a single arbitrary-text value,
    /// as used for `report-to` group names and `report-uri` endpoints.
    pub fn construct_simple(name: &str, value: impl Into<String>) -> Directive {
        Directive {
            name: name.to_string(),
            value: DirectiveValue::Text(vec![ArbitraryTextOption(value.into())]),
        }
    }

    /// `name` alone if there are no options, else `"name SP options"`.
    pub fn serialize(&self) -> String {
        if self.value.is_empty_options() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.value.serialize_options())
        }
    }

    /// Adjust a `SourceOption`-typed directive to additionally permit `uri`,
    /// per spec.md §4.A. Non-source directives are not adjustable and yield
    /// `None` (the caller removes the directive from the policy in that
    /// case).
    pub fn adjust_to_uri(&self, uri: &str, self_pattern: &Regex) -> Option<Directive> {
        let DirectiveValue::Source(options) = &self.value else {
            return None;
        };

        let mut new_options = options.clone();
        let added = if self_pattern.is_match(uri) {
            Some(SourceOption::Self_)
        } else if uri == "inline" {
            Some(SourceOption::UnsafeInline)
        } else if uri == "eval" {
            Some(SourceOption::UnsafeEval)
        } else if SCHEME_ONLY_RE.is_match(uri) {
            Some(SourceOption::SchemeSource(uri.to_string()))
        } else if let Some(host) = SourceOption::host_source_from_uri(uri) {
            Some(host)
        } else {
            warn!("Couldn't handle URI: {}", uri);
            None
        };

        let Some(added) = added else {
            return Some(Directive {
                name: self.name.clone(),
                value: DirectiveValue::Source(new_options),
            });
        };

        new_options.retain(|o| *o != SourceOption::None);
        if !new_options.contains(&added) {
            new_options.push(added);
        }

        Some(Directive {
            name: self.name.clone(),
            value: DirectiveValue::Source(new_options),
        })
    }
}

static SCHEME_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z-]+$").unwrap());
