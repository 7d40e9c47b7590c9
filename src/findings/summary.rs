// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Summary reporter
//!
//! Aggregates the finding store into parameter → severity → type →
//! deduplicated payload list. A run with zero findings is reported
//! explicitly, never silently omitted.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::{Finding, FindingStore, FindingType, Severity};

/// Severity buckets in render order
const SEVERITY_ORDER: [Severity; 4] = [
    Severity::High,
    Severity::Medium,
    Severity::Low,
    Severity::Info,
];

/// Findings of one type, with payload texts deduplicated
#[derive(Debug, Clone, Serialize)]
pub struct TypeGroup {
    pub finding_type: FindingType,
    /// Distinct payload texts, first-report order
    pub payloads: Vec<String>,
    /// Findings collapsed into this group (pre-dedup count)
    pub finding_count: usize,
}

/// All findings of one severity for one parameter
#[derive(Debug, Clone, Serialize)]
pub struct SeverityBucket {
    pub severity: Severity,
    pub groups: Vec<TypeGroup>,
}

/// Aggregated findings for one parameter
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSummary {
    pub parameter: String,
    pub buckets: Vec<SeverityBucket>,
}

/// Aggregated scan result
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub parameters: Vec<ParameterSummary>,
}

impl ScanSummary {
    /// Aggregate a finding store
    pub fn build(store: &FindingStore) -> Self {
        let parameters = store
            .iter()
            .map(|(name, findings)| ParameterSummary {
                parameter: name.to_string(),
                buckets: build_buckets(findings),
            })
            .collect();
        Self { parameters }
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Number of parameters that produced findings
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn for_parameter(&self, name: &str) -> Option<&ParameterSummary> {
        self.parameters.iter().find(|p| p.parameter == name)
    }
}

fn build_buckets(findings: &[Finding]) -> Vec<SeverityBucket> {
    SEVERITY_ORDER
        .iter()
        .filter_map(|&severity| {
            let groups = build_groups(findings, severity);
            if groups.is_empty() {
                None
            } else {
                Some(SeverityBucket { severity, groups })
            }
        })
        .collect()
}

fn build_groups(findings: &[Finding], severity: Severity) -> Vec<TypeGroup> {
    let mut groups: Vec<TypeGroup> = Vec::new();

    for finding in findings.iter().filter(|f| f.severity == severity) {
        match groups
            .iter_mut()
            .find(|g| g.finding_type == finding.finding_type)
        {
            Some(group) => {
                group.finding_count += 1;
                if !group.payloads.contains(&finding.payload) {
                    group.payloads.push(finding.payload.clone());
                }
            }
            None => groups.push(TypeGroup {
                finding_type: finding.finding_type,
                payloads: vec![finding.payload.clone()],
                finding_count: 1,
            }),
        }
    }

    debug_assert!(groups.iter().all(|g| {
        let mut seen = HashSet::new();
        g.payloads.iter().all(|p| seen.insert(p))
    }));
    groups
}

impl ParameterSummary {
    pub fn bucket(&self, severity: Severity) -> Option<&SeverityBucket> {
        self.buckets.iter().find(|b| b.severity == severity)
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary:")?;
        if self.is_empty() {
            return writeln!(f, "  No findings.");
        }
        writeln!(
            f,
            "  There were findings for {} parameter(s) during this scan run.",
            self.parameter_count()
        )?;
        for param in &self.parameters {
            writeln!(f, "Parameter: {}", param.parameter)?;
            for bucket in &param.buckets {
                writeln!(
                    f,
                    "  * {} {} finding(s)",
                    bucket.groups.len(),
                    bucket.severity.to_string().to_uppercase()
                )?;
                for group in &bucket.groups {
                    writeln!(f, "    [{}]", group.finding_type)?;
                    for payload in &group.payloads {
                        writeln!(f, "    - Payload: {}", payload)?;
                    }
                }
            }
        }
        Ok(())
    }
}
