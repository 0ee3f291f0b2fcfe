//! Best-effort field extraction
//!
//! Every function here is total: missing or malformed input degrades to an
//! empty/absent value, never an error. Nothing in this module may fail the
//! request path.

use axum::http::HeaderMap;
use std::collections::BTreeMap;

/// Header consulted for the originating client address.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

/// Resolve the originating client address.
///
/// A non-blank forwarding header wins: the first comma-separated element is
/// the nearest original client under a single trusted proxy hop. The header
/// is trusted verbatim — no proxy allow-list, no validation — so the result
/// is spoofable by any client that sets the header itself. Without the
/// header, the transport-level peer address is used; an empty string is the
/// sentinel when neither is available.
pub fn resolve_client_addr(forwarded_for: Option<&str>, peer: Option<&str>) -> String {
    if let Some(header) = forwarded_for {
        if !header.trim().is_empty() {
            if let Some(first) = header.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }
    peer.map(str::to_string).unwrap_or_default()
}

/// Extract the user-agent header, if present and readable.
pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

/// Take an immutable snapshot of the request headers.
///
/// Names come back lowercased (the http crate normalizes them); values that
/// are not UTF-8 are rendered lossily. Repeated headers keep the last value.
pub fn snapshot_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_chain_first_element_wins() {
        let resolved = resolve_client_addr(Some("10.0.0.1, 10.0.0.2"), Some("192.168.1.1"));
        assert_eq!(resolved, "10.0.0.1");
    }

    #[test]
    fn test_forwarded_single_value() {
        let resolved = resolve_client_addr(Some("203.0.113.7"), Some("192.168.1.1"));
        assert_eq!(resolved, "203.0.113.7");
    }

    #[test]
    fn test_forwarded_whitespace_trimmed() {
        let resolved = resolve_client_addr(Some("  10.0.0.1 ,10.0.0.2"), None);
        assert_eq!(resolved, "10.0.0.1");
    }

    #[test]
    fn test_peer_fallback_without_header() {
        let resolved = resolve_client_addr(None, Some("192.168.1.1"));
        assert_eq!(resolved, "192.168.1.1");
    }

    #[test]
    fn test_blank_header_falls_back_to_peer() {
        let resolved = resolve_client_addr(Some("   "), Some("192.168.1.1"));
        assert_eq!(resolved, "192.168.1.1");
    }

    #[test]
    fn test_nothing_available_yields_empty() {
        assert_eq!(resolve_client_addr(None, None), "");
        assert_eq!(resolve_client_addr(Some(""), None), "");
    }

    #[test]
    fn test_user_agent_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::USER_AGENT,
            HeaderValue::from_static("curl/8.0"),
        );
        assert_eq!(user_agent(&headers).as_deref(), Some("curl/8.0"));
        assert_eq!(user_agent(&HeaderMap::new()), None);
    }

    #[test]
    fn test_header_snapshot() {
        let mut headers = HeaderMap::new();
        headers.insert("x-custom", HeaderValue::from_static("one"));
        headers.insert("accept", HeaderValue::from_static("*/*"));

        let snapshot = snapshot_headers(&headers);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("x-custom").map(String::as_str), Some("one"));
        assert_eq!(snapshot.get("accept").map(String::as_str), Some("*/*"));
    }

    #[test]
    fn test_non_utf8_header_value_degrades() {
        let mut headers = HeaderMap::new();
        headers.insert("x-raw", HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());
        let snapshot = snapshot_headers(&headers);
        // Lossy rendering, never a panic or an error
        assert!(snapshot.contains_key("x-raw"));
    }
}
