// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Signal classification
//!
//! Applies the fixed decision table to every signal drained during a scan
//! pass. A signal is "new" if and only if it is absent from the baseline
//! snapshot by text equality. Classification is deterministic: the match
//! order below is the priority order of the table.

use tracing::{debug, error, info, warn};

use super::baseline::{BaselineSnapshot, REDIRECT_STATUSES};
use super::cursor::ScanCursor;
use crate::driver::PageSignal;
use crate::findings::{Finding, FindingType, Severity};
use crate::marker::Marker;

/// Per-scan-pass signal classifier
pub struct SignalDiffer<'a> {
    baseline: &'a BaselineSnapshot,
    marker: &'a Marker,
    excluded_console: &'a [String],
}

impl<'a> SignalDiffer<'a> {
    pub fn new(
        baseline: &'a BaselineSnapshot,
        marker: &'a Marker,
        excluded_console: &'a [String],
    ) -> Self {
        Self {
            baseline,
            marker,
            excluded_console,
        }
    }

    /// Classify one signal against the in-flight test case. Returns a
    /// finding when the decision table matches; side effects are limited
    /// to the cursor's redirect latch and log output.
    pub fn classify(&self, signal: &PageSignal, cursor: &mut ScanCursor) -> Option<Finding> {
        match signal {
            PageSignal::HostCall { function, message } => {
                info!(
                    function = %function,
                    payload = %cursor.payload,
                    parameter = %cursor.parameter,
                    "hooked function triggered"
                );
                Some(self.finding(
                    cursor,
                    FindingType::Xss,
                    Severity::High,
                    format!("{}() triggered with message {}", function, message),
                ))
            }

            PageSignal::Response { status, url } if REDIRECT_STATUSES.contains(status) => {
                if cursor.redirected {
                    return None;
                }
                cursor.redirected = true;
                info!(status, url = %url, parameter = %cursor.parameter, "redirect observed");
                Some(self.finding(
                    cursor,
                    FindingType::OpenRedirect,
                    Severity::Medium,
                    format!("{} redirect to {}", status, url),
                ))
            }
            PageSignal::Response { status, url } if *status >= 400 => {
                warn!(status, url = %url, "error response during scan pass");
                None
            }
            PageSignal::Response { .. } => None,

            PageSignal::Console { text } => self.classify_console(text, cursor),

            PageSignal::Request { url } => {
                if url.contains(self.marker.as_str()) && url != cursor.url.as_str() {
                    info!(url = %url, "marker leaked into outgoing request URL");
                    Some(self.finding(
                        cursor,
                        FindingType::MarkerInUrl,
                        Severity::Info,
                        format!("{} in URL: {}", self.marker.as_str(), url),
                    ))
                } else {
                    None
                }
            }

            PageSignal::PageError { message } => {
                if !self.baseline.contains_page_error(message) {
                    error!(
                        message = %message,
                        payload = %cursor.payload,
                        parameter = %cursor.parameter,
                        "new page error"
                    );
                }
                None
            }

            PageSignal::RequestFailed { url, error } => {
                if !self.baseline.contains_failed_request(url) {
                    debug!(url = %url, error = %error, "new failed request");
                }
                None
            }

            // Routed to the guessing reconciliation by the orchestrator
            PageSignal::ParamAccess { .. } => None,
        }
    }

    /// Console decision rows, first match wins
    fn classify_console(&self, text: &str, cursor: &ScanCursor) -> Option<Finding> {
        if self.baseline.contains_console(text) {
            return None;
        }
        if self.excluded_console.iter().any(|ex| text.contains(ex)) {
            return None;
        }

        let trimmed = text.trim();
        if text.contains("Content Security Policy") || text.contains("Uncaught SyntaxError") {
            info!(
                message = %trimmed,
                payload = %cursor.payload,
                parameter = %cursor.parameter,
                "console message indicates CSP or syntax error"
            );
            Some(self.finding(
                cursor,
                FindingType::PossibleXss,
                Severity::Medium,
                format!("console message indicates CSP or syntax error: {}", trimmed),
            ))
        } else {
            debug!(
                message = %trimmed,
                payload = %cursor.payload,
                parameter = %cursor.parameter,
                "new console message"
            );
            Some(self.finding(
                cursor,
                FindingType::NewConsoleMessage,
                Severity::Low,
                trimmed,
            ))
        }
    }

    fn finding(
        &self,
        cursor: &ScanCursor,
        finding_type: FindingType,
        severity: Severity,
        comment: impl Into<String>,
    ) -> Finding {
        Finding::new(
            cursor.parameter.clone(),
            cursor.payload.clone(),
            finding_type,
            severity,
            comment,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn cursor() -> ScanCursor {
        let url = Url::parse("https://site.test/page?q=payload1").unwrap();
        let mut cursor = ScanCursor::new(&url, "q");
        cursor.advance(url, "payload1");
        cursor
    }

    fn differ<'a>(
        baseline: &'a BaselineSnapshot,
        marker: &'a Marker,
        excluded: &'a [String],
    ) -> SignalDiffer<'a> {
        SignalDiffer::new(baseline, marker, excluded)
    }

    #[test]
    fn test_host_call_is_high_severity_xss() {
        let baseline = BaselineSnapshot::default();
        let marker = Marker::from_value("m");
        let d = differ(&baseline, &marker, &[]);
        let mut cursor = cursor();

        let finding = d
            .classify(
                &PageSignal::HostCall {
                    function: "alert".into(),
                    message: "XSS".into(),
                },
                &mut cursor,
            )
            .unwrap();

        assert_eq!(finding.finding_type, FindingType::Xss);
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.parameter, "q");
        assert_eq!(finding.payload, "payload1");
    }

    #[test]
    fn test_redirect_latch_suppresses_duplicates() {
        let baseline = BaselineSnapshot::default();
        let marker = Marker::from_value("m");
        let d = differ(&baseline, &marker, &[]);
        let mut cursor = cursor();

        let redirect = PageSignal::Response {
            status: 302,
            url: "https://evil.test/".into(),
        };
        assert!(d.classify(&redirect, &mut cursor).is_some());
        assert!(d.classify(&redirect, &mut cursor).is_none());
        assert!(d.classify(&redirect, &mut cursor).is_none());
    }

    #[test]
    fn test_baseline_console_is_never_new() {
        let mut baseline = BaselineSnapshot::default();
        // Replay the exact baseline text during a mutated pass
        let noise = PageSignal::Console {
            text: "favicon not found".into(),
        };
        baseline.record(&noise);

        let marker = Marker::from_value("m");
        let d = differ(&baseline, &marker, &[]);
        let mut cursor = cursor();

        assert!(d.classify(&noise, &mut cursor).is_none());
    }

    #[test]
    fn test_csp_console_is_possible_xss() {
        let baseline = BaselineSnapshot::default();
        let marker = Marker::from_value("m");
        let d = differ(&baseline, &marker, &[]);
        let mut cursor = cursor();

        let finding = d
            .classify(
                &PageSignal::Console {
                    text: "Refused to execute: Content Security Policy directive".into(),
                },
                &mut cursor,
            )
            .unwrap();
        assert_eq!(finding.finding_type, FindingType::PossibleXss);
        assert_eq!(finding.severity, Severity::Medium);
    }

    #[test]
    fn test_other_console_is_low_unless_excluded() {
        let baseline = BaselineSnapshot::default();
        let marker = Marker::from_value("m");
        let excluded = vec!["analytics".to_string()];
        let d = differ(&baseline, &marker, &excluded);
        let mut cursor = cursor();

        let finding = d
            .classify(
                &PageSignal::Console {
                    text: "  unexpected token in payload  ".into(),
                },
                &mut cursor,
            )
            .unwrap();
        assert_eq!(finding.finding_type, FindingType::NewConsoleMessage);
        assert_eq!(finding.severity, Severity::Low);
        assert_eq!(finding.comment, "unexpected token in payload");

        assert!(d
            .classify(
                &PageSignal::Console {
                    text: "analytics beacon sent".into(),
                },
                &mut cursor,
            )
            .is_none());
    }

    #[test]
    fn test_marker_in_request_url_excludes_test_case_url() {
        let baseline = BaselineSnapshot::default();
        let marker = Marker::from_value("tok123");
        let d = differ(&baseline, &marker, &[]);

        let mutated = Url::parse("https://site.test/page?q=tok123abc").unwrap();
        let mut cursor = ScanCursor::new(&mutated, "q");
        cursor.advance(mutated, "tok123abc");

        // The URL used to reach the test case carries the marker but
        // never counts as a leak
        let own = PageSignal::Request {
            url: cursor.url.to_string(),
        };
        assert!(d.classify(&own, &mut cursor).is_none());

        let leak = PageSignal::Request {
            url: "https://third.party/track?q=tok123".into(),
        };
        let finding = d.classify(&leak, &mut cursor).unwrap();
        assert_eq!(finding.finding_type, FindingType::MarkerInUrl);
        assert_eq!(finding.severity, Severity::Info);
    }

    #[test]
    fn test_page_errors_and_failed_requests_yield_no_findings() {
        let baseline = BaselineSnapshot::default();
        let marker = Marker::from_value("m");
        let d = differ(&baseline, &marker, &[]);
        let mut cursor = cursor();

        assert!(d
            .classify(
                &PageSignal::PageError {
                    message: "TypeError".into()
                },
                &mut cursor
            )
            .is_none());
        assert!(d
            .classify(
                &PageSignal::RequestFailed {
                    url: "https://site.test/x".into(),
                    error: "net::ERR".into()
                },
                &mut cursor
            )
            .is_none());
    }
}
