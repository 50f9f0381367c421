// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Charset-aware HTML body decode/encode.
//!
//! Regex-based rewriting has to operate on code points, not bytes, so an
//! HTML body is decoded in its declared charset (default UTF-8), rewritten,
//! then re-encoded in that same charset before it goes back to the client.
//! Grounded on `encoding_rs`, the crate real browser engines in this pack
//! (`servo-servo`) use for exactly this job.

use encoding_rs::Encoding;

/// Extract the `charset=` parameter from a `Content-Type` header value, if
/// present, case-insensitively.
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}

/// Resolve a declared charset label to an [`Encoding`], defaulting to UTF-8
/// for an absent or unrecognized label.
fn encoding_for(label: Option<&str>) -> &'static Encoding {
    label
        .and_then(Encoding::for_label)
        .unwrap_or(encoding_rs::UTF_8)
}

/// Decode a raw body using the charset declared on its `Content-Type`
/// header (default UTF-8). Malformed sequences are replaced, never fatal.
pub fn decode(body: &[u8], content_type: Option<&str>) -> String {
    let label = content_type.and_then(charset_from_content_type);
    let encoding = encoding_for(label);
    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}

/// Re-encode a rewritten body string in the same charset it was decoded in.
pub fn encode(text: &str, content_type: Option<&str>) -> Vec<u8> {
    let label = content_type.and_then(charset_from_content_type);
    let encoding = encoding_for(label);
    let (bytes, _, _) = encoding.encode(text);
    bytes.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_charset_parameter() {
        assert_eq!(
            charset_from_content_type("text/html; charset=ISO-8859-1"),
            Some("ISO-8859-1")
        );
    }

    #[test]
    fn absent_charset_parameter() {
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn defaults_to_utf8_round_trip() {
        let body = "héllo wörld".as_bytes();
        let decoded = decode(body, Some("text/html"));
        assert_eq!(decoded, "héllo wörld");
        assert_eq!(encode(&decoded, Some("text/html")), body);
    }

    #[test]
    fn declared_charset_round_trips() {
        let original = "café";
        let (encoded, _, _) = encoding_rs::WINDOWS_1252.encode(original);
        let decoded = decode(&encoded, Some("text/html; charset=windows-1252"));
        assert_eq!(decoded, original);
    }
}
