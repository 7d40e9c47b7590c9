// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Findings and the append-only finding store
//!
//! A finding is classified evidence attributed to one (parameter, payload)
//! test case. The store never mutates or deletes; duplicates of the same
//! (payload, type) pair are kept and only collapsed at summary time.

mod summary;

pub use summary::{ParameterSummary, ScanSummary, SeverityBucket, TypeGroup};

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Finding classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingType {
    /// A hooked alert-equivalent function was invoked
    Xss,
    /// Console output indicates CSP enforcement or a syntax error
    PossibleXss,
    /// A redirect status was observed mid-scan
    OpenRedirect,
    /// The marker appeared in an outgoing request URL
    MarkerInUrl,
    /// The marker appeared in the rendered document
    MarkerReflected,
    /// A console message absent from the baseline
    NewConsoleMessage,
}

impl fmt::Display for FindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FindingType::Xss => "xss",
            FindingType::PossibleXss => "possible-xss",
            FindingType::OpenRedirect => "open-redirect",
            FindingType::MarkerInUrl => "marker-in-url",
            FindingType::MarkerReflected => "marker-reflected",
            FindingType::NewConsoleMessage => "new-console-message",
        };
        f.write_str(name)
    }
}

/// Finding severity, ordered info < low < medium < high
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        };
        f.write_str(name)
    }
}

/// A classified, severity-ranked piece of evidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub parameter: String,
    pub payload: String,
    pub finding_type: FindingType,
    pub severity: Severity,
    pub comment: String,
    pub recorded_at: DateTime<Utc>,
}

impl Finding {
    pub fn new(
        parameter: impl Into<String>,
        payload: impl Into<String>,
        finding_type: FindingType,
        severity: Severity,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            parameter: parameter.into(),
            payload: payload.into(),
            finding_type,
            severity,
            comment: comment.into(),
            recorded_at: Utc::now(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}/{}] parameter '{}' payload '{}'",
            self.finding_type, self.severity, self.parameter, self.payload
        )
    }
}

/// Append-only store, keyed by parameter name in first-report order
#[derive(Debug, Default)]
pub struct FindingStore {
    entries: Vec<(String, Vec<Finding>)>,
}

impl FindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding under its parameter
    pub fn record(&mut self, finding: Finding) {
        match self
            .entries
            .iter_mut()
            .find(|(name, _)| *name == finding.parameter)
        {
            Some((_, findings)) => findings.push(finding),
            None => self
                .entries
                .push((finding.parameter.clone(), vec![finding])),
        }
    }

    pub fn for_parameter(&self, name: &str) -> Option<&[Finding]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f.as_slice())
    }

    /// Parameters with findings, in first-report order
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Finding])> {
        self.entries
            .iter()
            .map(|(name, findings)| (name.as_str(), findings.as_slice()))
    }

    /// Number of parameters with at least one finding
    pub fn parameter_count(&self) -> usize {
        self.entries.len()
    }

    /// Total findings across all parameters
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, f)| f.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
