// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan cursor and URL mutation
//!
//! The cursor is the single source of truth for which test case is in
//! flight. It is owned by the orchestrator and handed to the differ by
//! reference; incoming signals are attributed to its values at the moment
//! they are drained. Never ambient global state.

use url::Url;

/// Pseudo-parameter name used when injecting into the bare fragment
pub const FRAGMENT_PARAMETER: &str = "URL-FRAGMENT";

/// How the payload is placed into the URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionMode {
    /// Replace a query-string parameter value
    QueryParam,
    /// Replace a parameter value inside the fragment query string
    FragmentParam,
    /// Replace the whole fragment
    BareFragment,
}

/// Transient state of the in-flight test case
#[derive(Debug, Clone)]
pub struct ScanCursor {
    /// Mutated URL used to reach the current test case
    pub url: Url,
    /// Parameter under test
    pub parameter: String,
    /// Payload under test
    pub payload: String,
    /// Redirect latch: set at most once per parameter to suppress
    /// duplicate open-redirect findings
    pub redirected: bool,
}

impl ScanCursor {
    /// Fresh cursor at the start of a parameter's scan; the redirect
    /// latch starts cleared.
    pub fn new(origin: &Url, parameter: &str) -> Self {
        Self {
            url: origin.clone(),
            parameter: parameter.to_string(),
            payload: String::new(),
            redirected: false,
        }
    }

    /// Move the cursor to the next payload's test case
    pub fn advance(&mut self, url: Url, payload: &str) {
        self.url = url;
        self.payload = payload.to_string();
    }
}

/// Build the mutated URL for one test case. The original URL is cloned,
/// never mutated, so payloads cannot accumulate across iterations.
pub fn mutate_url(original: &Url, mode: InjectionMode, parameter: &str, payload: &str) -> Url {
    let mut url = original.clone();
    match mode {
        InjectionMode::QueryParam => {
            set_query_param(&mut url, parameter, payload);
        }
        InjectionMode::FragmentParam => {
            set_fragment_param(&mut url, parameter, payload);
        }
        InjectionMode::BareFragment => {
            url.set_fragment(Some(payload));
        }
    }
    url
}

/// Set a query parameter, replacing every existing occurrence of the name
/// while preserving the position of the first one.
fn set_query_param(url: &mut Url, parameter: &str, payload: &str) {
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (name, value) in url.query_pairs() {
        if name == parameter {
            if !replaced {
                pairs.push((name.into_owned(), payload.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((name.into_owned(), value.into_owned()));
        }
    }
    if !replaced {
        pairs.push((parameter.to_string(), payload.to_string()));
    }

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in &pairs {
        serializer.append_pair(name, value);
    }
    url.set_query(Some(&serializer.finish()));
}

/// Set a parameter inside the fragment query string, keeping the fragment
/// path prefix intact. A fragment without `?` gains one.
fn set_fragment_param(url: &mut Url, parameter: &str, payload: &str) {
    let fragment = url.fragment().unwrap_or_default();
    let (prefix, query) = match fragment.find('?') {
        Some(idx) => (&fragment[..idx], &fragment[idx + 1..]),
        None => (fragment, ""),
    };

    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut replaced = false;
    for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if name == parameter {
            if !replaced {
                pairs.push((name.into_owned(), payload.to_string()));
                replaced = true;
            }
        } else {
            pairs.push((name.into_owned(), value.into_owned()));
        }
    }
    if !replaced {
        pairs.push((parameter.to_string(), payload.to_string()));
    }

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in &pairs {
        serializer.append_pair(name, value);
    }
    let new_fragment = format!("{}?{}", prefix, serializer.finish());
    url.set_fragment(Some(&new_fragment));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_param_mutation_clones_original() {
        let original = Url::parse("https://site.test/page?q=hello&lang=en").unwrap();
        let mutated = mutate_url(&original, InjectionMode::QueryParam, "q", "PAYLOAD");

        assert_eq!(original.as_str(), "https://site.test/page?q=hello&lang=en");
        assert_eq!(mutated.as_str(), "https://site.test/page?q=PAYLOAD&lang=en");
    }

    #[test]
    fn test_query_param_appended_when_absent() {
        let original = Url::parse("https://site.test/page").unwrap();
        let mutated = mutate_url(&original, InjectionMode::QueryParam, "debug", "x");

        assert_eq!(mutated.query(), Some("debug=x"));
    }

    #[test]
    fn test_payload_is_percent_encoded() {
        let original = Url::parse("https://site.test/page?q=hello").unwrap();
        let mutated = mutate_url(
            &original,
            InjectionMode::QueryParam,
            "q",
            "MARKER<script>xyz('XSS')</script>",
        );

        let query = mutated.query().unwrap();
        assert!(query.contains("%3Cscript%3E"));
        assert!(!query.contains('<'));
    }

    #[test]
    fn test_fragment_param_mutation_keeps_prefix() {
        let original = Url::parse("https://site.test/app#/path?ref=home&tab=2").unwrap();
        let mutated = mutate_url(&original, InjectionMode::FragmentParam, "ref", "PAYLOAD");

        let fragment = mutated.fragment().unwrap();
        assert!(fragment.starts_with("/path?"));
        assert!(fragment.contains("ref=PAYLOAD"));
        assert!(fragment.contains("tab=2"));
    }

    #[test]
    fn test_bare_fragment_mutation() {
        let original = Url::parse("https://site.test/app#old").unwrap();
        let mutated = mutate_url(&original, InjectionMode::BareFragment, FRAGMENT_PARAMETER, "new");

        assert_eq!(mutated.fragment(), Some("new"));
    }

    #[test]
    fn test_cursor_redirect_latch_resets_per_parameter() {
        let origin = Url::parse("https://site.test/").unwrap();
        let mut cursor = ScanCursor::new(&origin, "q");
        cursor.redirected = true;

        let cursor = ScanCursor::new(&origin, "next");
        assert!(!cursor.redirected);
    }
}
