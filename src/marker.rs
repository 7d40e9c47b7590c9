// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Run-scoped marker token
//!
//! One random token per invocation tags every payload, so reflection and
//! request-leak detection never depend on the payload content itself.

use std::fmt;

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Substitution token in payload templates
pub const MARKER_TOKEN: &str = "MARKER";

/// Length of the generated marker string
const MARKER_LEN: usize = 8;

/// Run-unique random token embedded into payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker(String);

impl Marker {
    /// Generate a fresh marker, unique per invocation.
    ///
    /// Collision with content already present on the target page is
    /// avoided probabilistically, not verified.
    pub fn generate() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(MARKER_LEN)
            .map(|b| (b as char).to_ascii_lowercase())
            .collect();
        Marker(token)
    }

    /// Create a marker from a fixed value (deterministic runs, tests)
    pub fn from_value(value: impl Into<String>) -> Self {
        Marker(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute the marker into a payload template
    pub fn apply(&self, template: &str) -> String {
        template.replace(MARKER_TOKEN, &self.0)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_are_unique_per_invocation() {
        let a = Marker::generate();
        let b = Marker::generate();

        assert_eq!(a.as_str().len(), MARKER_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn test_apply_substitutes_token() {
        let marker = Marker::from_value("abc123");
        let payload = marker.apply("MARKER<script>xyz('XSS')</script>");

        assert_eq!(payload, "abc123<script>xyz('XSS')</script>");
        assert!(!payload.contains(MARKER_TOKEN));
    }

    #[test]
    fn test_generated_marker_is_lowercase_alphanumeric() {
        let marker = Marker::generate();
        assert!(marker
            .as_str()
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
