// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Body/header rewriting: domain substitution, URL scraping, and the
//! `<form action>` scrape that feeds the policy engine directly.
//!
//! The scraping patterns are deliberately loose — per spec.md §9's open
//! questions, the `[^."#?]` capture class admits query-less, fragment-less
//! paths only, and the form-action pattern tolerates both escaped and
//! unescaped markup. Both are preserved verbatim rather than "fixed".

use fancy_regex::Regex as FancyRegex;
use regex::Regex;

/// Build the domain-substitution regex for one target domain: matches an
/// optional `https?:` scheme followed by `//<domain>`, so that
/// `https://example.com/x`, `http://example.com/x`, and `//example.com/x`
/// all collapse to the root-relative `/x`.
pub fn domain_pattern(target_domain: &str) -> Regex {
    let escaped = regex::escape(target_domain);
    Regex::new(&format!(r"(?:https?:)?//{escaped}")).expect("domain pattern always compiles")
}

/// Replace every absolute reference to `target_domain` with the empty
/// string, turning it into a root-relative path.
pub fn rewrite_domain(body: &str, pattern: &Regex) -> String {
    pattern.replace_all(body, "").into_owned()
}

/// Build the `href`/`action` URL-scraping regex for one target domain.
pub fn href_pattern(target_domain: &str) -> Regex {
    let escaped = regex::escape(target_domain);
    Regex::new(&format!(
        r#"(?:href|action)="(?:https?://)?(?:{escaped})?([^."#?]+(?:html?)?)""#
    ))
    .expect("href pattern always compiles")
}

/// Scrape every non-blank `href`/`action` path out of an HTML body.
pub fn scrape_urls(body: &str, pattern: &Regex) -> Vec<String> {
    pattern
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// The loose `<form action="...">` pattern, tolerant of both raw and
/// HTML-escaped angle brackets (`&lt;`/`&gt;`). `fancy-regex` is needed for
/// the negative-lookahead `(?!>|&lt).` spans that stop the scan at the
/// enclosing tag's boundary.
pub fn form_action_pattern() -> FancyRegex {
    FancyRegex::new(r#"(?:<|&gt)form(?:(?!>|&lt).)*action=["']([^"']*)["'](?:(?!>|&lt).)*(?:>|&lt)"#)
        .expect("form action pattern always compiles")
}

/// Scrape every `<form action>` path, each prefixed with
/// `https://localhost:<proxy_port>` when it starts with `/` (so the policy
/// engine sees a fully-qualified URI it can match against `selfPattern`).
pub fn scrape_form_actions(body: &str, pattern: &FancyRegex, proxy_port: u16) -> Vec<String> {
    pattern
        .captures_iter(body)
        .filter_map(|c| c.ok())
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty())
        .map(|path| {
            if let Some(stripped) = path.strip_prefix('/') {
                format!("https://localhost:{proxy_port}/{stripped}")
            } else {
                path
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_absolute_href() {
        let pattern = domain_pattern("example.com");
        let rewritten = rewrite_domain(r#"<a href="https://example.com/foo.html">"#, &pattern);
        assert_eq!(rewritten, r#"<a href="/foo.html">"#);
    }

    #[test]
    fn rewrites_protocol_relative_reference() {
        let pattern = domain_pattern("example.com");
        assert_eq!(rewrite_domain(r#"//example.com/x"#, &pattern), "/x");
    }

    #[test]
    fn leaves_other_domains_unchanged() {
        let pattern = domain_pattern("example.com");
        let body = r#"<a href="https://other.com/x">"#;
        assert_eq!(rewrite_domain(body, &pattern), body);
    }

    #[test]
    fn scrapes_href_and_action_paths() {
        let pattern = href_pattern("example.com");
        let body = r#"<a href="https://example.com/about">x</a><form action="/submit">"#;
        let urls = scrape_urls(body, &pattern);
        assert_eq!(urls, vec!["about", "/submit"]);
    }

    #[test]
    fn dotted_extension_is_not_captured() {
        // The capture class `[^."#?]` excludes the dot itself, so a path
        // ending in `.html`/`.htm` never reaches the closing quote and the
        // whole `href="..."` construct is skipped — preserved verbatim per
        // spec.md §9 rather than patched to "work".
        let pattern = href_pattern("example.com");
        let body = r#"<a href="https://example.com/foo.html">x</a>"#;
        assert!(scrape_urls(body, &pattern).is_empty());
    }

    #[test]
    fn scrapes_form_action_unescaped() {
        let pattern = form_action_pattern();
        let body = r#"<form method="post" action="/login"><input></form>"#;
        let actions = scrape_form_actions(body, &pattern, 8080);
        assert_eq!(actions, vec!["https://localhost:8080/login"]);
    }

    #[test]
    fn scrapes_form_action_html_escaped() {
        // The pattern's open/close entity tokens are preserved verbatim per
        // spec.md §9 (`&gt` opens, `&lt` closes) even though that reads
        // backwards from normal HTML escaping.
        let pattern = form_action_pattern();
        let body = r#"&gtform action="/signup"&lt"#;
        let actions = scrape_form_actions(body, &pattern, 8080);
        assert_eq!(actions, vec!["https://localhost:8080/signup"]);
    }

    #[test]
    fn absolute_form_action_is_not_reprefixed() {
        let pattern = form_action_pattern();
        let body = r#"<form action="https://other.example/submit">"#;
        let actions = scrape_form_actions(body, &pattern, 8080);
        assert_eq!(actions, vec!["https://other.example/submit"]);
    }
}
