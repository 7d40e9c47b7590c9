// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Baseline capture
//!
//! One unmutated page load records the reference snapshot used as the
//! noise filter for every subsequent comparison. The snapshot is immutable
//! once captured and is only ever used for membership tests.

use std::time::Duration;

use tracing::{debug, info, warn};
use url::Url;

use crate::driver::{drain, BrowserDriver, PageSignal, WaitPolicy, READY_FLAG_PREDICATE, READY_FLAG_SCRIPT};
use crate::error::Result;

/// HTTP statuses treated as redirects
pub const REDIRECT_STATUSES: [u16; 4] = [301, 302, 303, 307];

/// Reference signals from the single unmutated load
#[derive(Debug, Clone, Default)]
pub struct BaselineSnapshot {
    console: Vec<String>,
    page_errors: Vec<String>,
    failed_requests: Vec<String>,
}

impl BaselineSnapshot {
    pub fn contains_console(&self, text: &str) -> bool {
        self.console.iter().any(|c| c == text)
    }

    pub fn contains_page_error(&self, message: &str) -> bool {
        self.page_errors.iter().any(|m| m == message)
    }

    pub fn contains_failed_request(&self, url: &str) -> bool {
        self.failed_requests.iter().any(|u| u == url)
    }

    pub fn console_count(&self) -> usize {
        self.console.len()
    }

    pub(crate) fn record(&mut self, signal: &PageSignal) {
        match signal {
            PageSignal::Console { text } => self.console.push(text.clone()),
            PageSignal::PageError { message } => self.page_errors.push(message.clone()),
            PageSignal::RequestFailed { url, .. } => self.failed_requests.push(url.clone()),
            _ => {}
        }
    }
}

/// Result of the baseline pass
#[derive(Debug, Clone, Default)]
pub struct BaselineCapture {
    pub snapshot: BaselineSnapshot,
    /// Parameter names observed by the URL-parameter-read hook during the
    /// baseline load, fed into the guessing reconciliation
    pub observed_parameters: Vec<String>,
}

/// Load the unmutated target once and record all signals verbatim.
///
/// Waits for network-settled navigation, then the in-page readiness flag,
/// then an additional grace period to catch delayed asynchronous signals.
/// All listeners registered for this pass are torn down before scanning
/// begins (the subscription is dropped when this function returns).
pub async fn capture(
    driver: &dyn BrowserDriver,
    url: &Url,
    grace: Duration,
) -> Result<BaselineCapture> {
    let mut rx = driver.events();

    info!(url = %url, "initial page load");
    driver.navigate(url, WaitPolicy::NetworkSettled).await?;

    if let Err(e) = driver.evaluate(READY_FLAG_SCRIPT).await {
        debug!(error = %e, "readiness flag evaluation skipped");
    } else if let Err(e) = driver.wait_for_predicate(READY_FLAG_PREDICATE).await {
        debug!(error = %e, "readiness predicate wait skipped");
    }

    tokio::time::sleep(grace).await;

    let mut capture = BaselineCapture::default();
    for signal in drain(&mut rx) {
        match &signal {
            PageSignal::Response { status, url } if REDIRECT_STATUSES.contains(status) => {
                warn!(
                    status,
                    url = %url,
                    "redirect during initial load, may indicate an erroneous initial URL or missing cookies"
                );
            }
            PageSignal::ParamAccess { name, context } => {
                debug!(name = %name, context = %context, "parameter read observed during baseline");
                capture.observed_parameters.push(name.clone());
            }
            _ => {}
        }
        capture.snapshot.record(&signal);
    }

    info!(
        console = capture.snapshot.console.len(),
        page_errors = capture.snapshot.page_errors.len(),
        failed_requests = capture.snapshot.failed_requests.len(),
        "initial page load complete"
    );
    Ok(capture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::{MockDriver, MockVisit};

    #[tokio::test]
    async fn test_baseline_records_signals_verbatim() {
        let driver = MockDriver::new();
        driver.queue_visit(
            MockVisit::new("<html></html>")
                .signal(PageSignal::Console {
                    text: "favicon not found".into(),
                })
                .signal(PageSignal::PageError {
                    message: "boom".into(),
                })
                .signal(PageSignal::RequestFailed {
                    url: "https://site.test/missing.js".into(),
                    error: "net::ERR".into(),
                }),
        );

        let url = Url::parse("https://site.test/page?q=hello").unwrap();
        let capture = capture(&driver, &url, Duration::from_millis(0)).await.unwrap();

        assert!(capture.snapshot.contains_console("favicon not found"));
        assert!(capture.snapshot.contains_page_error("boom"));
        assert!(capture
            .snapshot
            .contains_failed_request("https://site.test/missing.js"));
        assert!(!capture.snapshot.contains_console("something else"));
    }

    #[tokio::test]
    async fn test_baseline_collects_observed_parameters() {
        let driver = MockDriver::new();
        driver.queue_visit(MockVisit::new("").signal(PageSignal::ParamAccess {
            name: "ref".into(),
            context: "URLSearchParams.get".into(),
        }));

        let url = Url::parse("https://site.test/").unwrap();
        let capture = capture(&driver, &url, Duration::from_millis(0)).await.unwrap();

        assert_eq!(capture.observed_parameters, vec!["ref"]);
        assert_eq!(capture.snapshot.console_count(), 0);
    }
}
