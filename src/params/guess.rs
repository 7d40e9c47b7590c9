// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Parameter guessing heuristics
//!
//! Three independent producers feed the reconciliation step:
//! - names of HTML input elements present after the baseline load
//! - identifiers declared in inline and same-origin external scripts,
//!   unioned with a static wordlist
//! - names observed by the URL-parameter-read hook at runtime (delivered
//!   as `PageSignal::ParamAccess`, collected by the orchestrator)

use std::collections::HashSet;

use regex::Regex;
use tracing::{debug, warn};
use url::Url;

use crate::driver::{BrowserDriver, INPUT_NAME_SCRIPT};

/// Static wordlist of common parameter names, merged into the extended
/// script-based guessing pass.
pub const PARAMETER_WORDLIST: &[&str] = &[
    "id", "page", "q", "query", "search", "s", "keyword", "lang", "locale", "debug", "test",
    "redirect", "redirect_uri", "redirect_url", "url", "uri", "next", "return", "returnUrl",
    "return_to", "goto", "dest", "destination", "continue", "callback", "cb", "jsonp", "ref",
    "referrer", "source", "src", "target", "state", "token", "view", "file", "path", "name",
    "user", "username", "email", "sort", "order", "filter", "type", "action", "mode", "tab",
    "step", "msg", "message", "error", "title", "content", "data", "value", "template",
];

/// Parameter guesser bound to one driver and the scan origin
pub struct ParameterGuesser<'a> {
    driver: &'a dyn BrowserDriver,
    origin: &'a Url,
}

impl<'a> ParameterGuesser<'a> {
    pub fn new(driver: &'a dyn BrowserDriver, origin: &'a Url) -> Self {
        Self { driver, origin }
    }

    /// Guess names from HTML input elements currently on the page.
    ///
    /// Evaluation failures are tolerated: a driver without script support
    /// simply contributes nothing.
    pub async fn from_input_fields(&self) -> Vec<String> {
        let value = match self.driver.evaluate(INPUT_NAME_SCRIPT).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "input field collection failed");
                return Vec::new();
            }
        };

        let names: Vec<String> = value
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if !names.is_empty() {
            debug!(?names, "guessed parameters from input fields");
        }
        dedup_preserving_order(names)
    }

    /// Guess names from variable declarations in inline scripts and
    /// same-origin external scripts, unioned with the static wordlist.
    pub async fn from_scripts(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();

        match self.driver.content().await {
            Ok(html) => {
                for script in inline_script_bodies(&html) {
                    names.extend(declared_identifiers(&script));
                }
                for src in external_script_sources(&html) {
                    let resolved = match self.origin.join(&src) {
                        Ok(u) => u,
                        Err(e) => {
                            debug!(src = %src, error = %e, "skipping unresolvable script source");
                            continue;
                        }
                    };
                    if resolved.host_str() != self.origin.host_str() {
                        continue;
                    }
                    match self.driver.fetch_script(&resolved).await {
                        Ok(text) => names.extend(declared_identifiers(&text)),
                        Err(e) => debug!(url = %resolved, error = %e, "script fetch failed"),
                    }
                }
            }
            Err(e) => warn!(error = %e, "document serialization failed during script guessing"),
        }

        names.extend(PARAMETER_WORDLIST.iter().map(|s| s.to_string()));
        dedup_preserving_order(names)
    }
}

/// Bodies of inline `<script>` elements
fn inline_script_bodies(html: &str) -> Vec<String> {
    let mut bodies = Vec::new();
    if let Ok(re) = Regex::new(r"(?is)<script([^>]*)>(.*?)</script>") {
        for caps in re.captures_iter(html) {
            let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            if attrs.to_ascii_lowercase().contains("src") {
                continue;
            }
            let body = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            if !body.trim().is_empty() {
                bodies.push(body.to_string());
            }
        }
    }
    bodies
}

/// `src` attributes of external `<script>` elements
fn external_script_sources(html: &str) -> Vec<String> {
    let mut sources = Vec::new();
    if let Ok(re) = Regex::new(r#"(?is)<script[^>]*\bsrc\s*=\s*["']([^"']+)["']"#) {
        for caps in re.captures_iter(html) {
            if let Some(src) = caps.get(1) {
                sources.push(src.as_str().to_string());
            }
        }
    }
    sources
}

/// Identifiers introduced with var/let/const
fn declared_identifiers(script: &str) -> Vec<String> {
    let mut idents = Vec::new();
    if let Ok(re) = Regex::new(r"\b(?:var|let|const)\s+([A-Za-z_$][A-Za-z0-9_$]*)") {
        for caps in re.captures_iter(script) {
            if let Some(ident) = caps.get(1) {
                idents.push(ident.as_str().to_string());
            }
        }
    }
    idents
}

fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names.into_iter().filter(|n| seen.insert(n.clone())).collect()
}
