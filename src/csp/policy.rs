// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The ordered-key-irrelevant directive map and its strict-scaffold builder.

use std::collections::HashMap;

use super::directive::{Directive, REGISTRY};

/// An ordered-key-irrelevant mapping from directive name to directive
/// instance. Invariant: only directives whose `canBeInReportOnlyHeader` is
/// true may appear (enforced by [`Policy::make_strict`] and by the policy
/// engine, which never inserts directives absent from the registry).
#[derive(Debug, Clone, Default)]
pub struct Policy {
    directives: HashMap<String, Directive>,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    /// `makeStrictPolicy(reportingApiGroup?, reportUriEndpoint?)`: iterates
    /// every known directive, filters out `canBeInReportOnlyHeader == false`,
    /// and for each remaining name either builds a simple reporting
    /// directive (if the matching endpoint is configured) or its strictest
    /// form. Directives for which neither applies are omitted.
    pub fn make_strict(reporting_api_group: Option<&str>, report_uri_endpoint: Option<&str>) -> Policy {
        let mut directives = HashMap::new();
        for spec in REGISTRY {
            if !spec.can_be_in_report_only_header {
                continue;
            }
            let directive = match spec.name {
                "report-to" => reporting_api_group.map(|g| Directive::construct_simple("report-to", g)),
                "report-uri" => report_uri_endpoint.map(|e| Directive::construct_simple("report-uri", e)),
                name => Directive::make_strict(name),
            };
            if let Some(directive) = directive {
                directives.insert(spec.name.to_string(), directive);
            }
        }
        Policy { directives }
    }

    pub fn get(&self, name: &str) -> Option<&Directive> {
        self.directives.get(name)
    }

    pub fn insert(&mut self, directive: Directive) {
        self.directives.insert(directive.name.clone(), directive);
    }

    pub fn remove(&mut self, name: &str) {
        self.directives.remove(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.directives.contains_key(name)
    }

    /// Directives joined by `"; "`. Order follows the registry's declaration
    /// order, which is stable within a process.
    pub fn serialize(&self) -> String {
        REGISTRY
            .iter()
            .filter_map(|spec| self.directives.get(spec.name))
            .map(|d| d.serialize())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
