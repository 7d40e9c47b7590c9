// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Parameter extraction from the target URL

use url::Url;

use super::{ParamOrigin, ParameterMap};

/// Parameters extracted from a target URL
#[derive(Debug, Clone, Default)]
pub struct ExtractedParameters {
    /// Query-string parameters
    pub query: ParameterMap,
    /// Fragment query parameters, populated only when the fragment
    /// contains a `?`-delimited query string
    pub fragment: ParameterMap,
}

/// Parse the query string and the fragment query string of the target URL.
///
/// The input URL is never mutated; name collisions merge values into an
/// ordered list. A URL with neither yields empty maps and scanning still
/// proceeds to fragment-only mode and optional guessing.
pub fn extract(url: &Url) -> ExtractedParameters {
    let mut extracted = ExtractedParameters::default();

    for (name, value) in url.query_pairs() {
        extracted.query.insert(&name, &value, ParamOrigin::Query);
    }

    if let Some(fragment) = url.fragment() {
        if let Some(idx) = fragment.find('?') {
            let raw = &fragment[idx + 1..];
            for (name, value) in url::form_urlencoded::parse(raw.as_bytes()) {
                extracted
                    .fragment
                    .insert(&name, &value, ParamOrigin::Fragment);
            }
        }
    }

    extracted
}
