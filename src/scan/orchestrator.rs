// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan orchestrator
//!
//! Drives the per-parameter, per-payload state machine: mutate the URL,
//! navigate, wait for readiness, check reflection once per parameter,
//! drain and classify signals against the baseline, then move on. Exactly
//! one navigation is ever in flight; listener subscriptions are scoped to
//! one parameter's scan and dropped at its end.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use url::Url;

use super::baseline::{self, BaselineSnapshot};
use super::cursor::{mutate_url, InjectionMode, ScanCursor, FRAGMENT_PARAMETER};
use super::differ::SignalDiffer;
use crate::config::ScanConfig;
use crate::driver::{
    drain, BrowserDriver, PageSignal, WaitPolicy, ALERT_HOOK, READY_FLAG_PREDICATE,
    READY_FLAG_SCRIPT, SECONDARY_HOOK,
};
use crate::error::{Error, Result};
use crate::findings::{Finding, FindingStore, FindingType, ScanSummary, Severity};
use crate::marker::Marker;
use crate::params::{extract, ParameterGuesser, ParameterMap};
use crate::payloads::PayloadSet;

/// States of one parameter's scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Navigating,
    Evaluating,
    Recording,
    Done,
}

/// Result of a completed run
#[derive(Debug)]
pub struct ScanReport {
    pub findings: FindingStore,
    pub summary: ScanSummary,
}

/// The scan engine
pub struct Scanner {
    driver: Arc<dyn BrowserDriver>,
    origin: Url,
    config: ScanConfig,
    marker: Marker,
    payloads: PayloadSet,
    store: FindingStore,
    baseline: BaselineSnapshot,
    /// Names observed by the parameter-read hook, in observation order
    guessed: Vec<String>,
    state: ScanState,
    resume: Option<mpsc::Receiver<()>>,
    abort: Arc<AtomicBool>,
}

impl Scanner {
    /// Create a scanner for one target URL. Validates the configuration;
    /// a fresh marker and the built-in payload corpus are used unless
    /// overridden.
    pub fn new(driver: Arc<dyn BrowserDriver>, origin: Url, config: ScanConfig) -> Result<Self> {
        config.validate()?;
        let marker = Marker::generate();
        let payloads = PayloadSet::built_in(&marker);
        Ok(Self {
            driver,
            origin,
            config,
            marker,
            payloads,
            store: FindingStore::new(),
            baseline: BaselineSnapshot::default(),
            guessed: Vec::new(),
            state: ScanState::Idle,
            resume: None,
            abort: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Override the marker (deterministic runs, tests). Rebuilds the
    /// payload set from the built-in corpus with the new marker.
    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.payloads = PayloadSet::built_in(&marker);
        self.marker = marker;
        self
    }

    /// Override the payload set (externally loaded corpus)
    pub fn with_payloads(mut self, payloads: PayloadSet) -> Self {
        self.payloads = payloads;
        self
    }

    /// Attach the continue-signal channel required by interactive mode
    pub fn with_resume(mut self, resume: mpsc::Receiver<()>) -> Self {
        self.resume = Some(resume);
        self
    }

    /// Handle that aborts the run at the next parameter boundary. The
    /// summary still runs after an abort.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    fn aborted(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }

    fn is_excluded(&self, name: &str) -> bool {
        if self.config.excluded_parameters.contains(name) {
            info!(parameter = %name, "skipping excluded parameter");
            return true;
        }
        false
    }

    fn transition(&mut self, state: ScanState, parameter: &str) {
        debug!(parameter = %parameter, from = ?self.state, to = ?state, "scan state");
        self.state = state;
    }

    /// Run the full scan: baseline, query parameters, parameters guessed
    /// mid-scan, fragment parameters, the bare fragment, then the summary.
    pub async fn run(self) -> Result<ScanReport> {
        if self.config.interactive && self.resume.is_none() {
            return Err(Error::config(
                "interactive mode requires a continue-signal channel",
            ));
        }

        // One subscription to the out-of-band error channel for the whole
        // run. Messages are logged, never propagated, never findings.
        let mut oob = self.driver.out_of_band_errors();
        let oob_task = tokio::spawn(async move {
            loop {
                match oob.recv().await {
                    Ok(message) => {
                        error!(message = %message, "out-of-band error from the automated page");
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "out-of-band error messages dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        let result = self.execute().await;
        oob_task.abort();
        result
    }

    async fn execute(mut self) -> Result<ScanReport> {
        info!(url = %self.origin, marker = %self.marker, "starting scan");

        // Pass-through seeding and hooks, before any navigation
        self.driver.set_cookies(&self.config.cookies).await?;
        self.driver
            .set_local_storage(&self.config.local_storage)
            .await?;
        self.driver.expose_function(ALERT_HOOK).await?;
        self.driver.expose_function(SECONDARY_HOOK).await?;
        if self.config.guess_parameters {
            self.driver.observe_parameter_reads().await?;
        }
        self.driver.set_request_interception(true).await?;

        let mut extracted = extract(&self.origin);
        if extracted.query.is_empty() {
            warn!("no URL parameters found; only guessed, fragment and bare-fragment scanning will run");
        } else {
            info!(parameters = ?extracted.query.names(), "URL parameters");
        }
        if !extracted.fragment.is_empty() {
            info!(parameters = ?extracted.fragment.names(), "fragment parameters");
        }

        // Mutations of observed parameter values join the payload set
        let values: Vec<String> = extracted.query.values().map(str::to_string).collect();
        self.payloads
            .add_value_mutations(&self.marker, values.iter().map(String::as_str));
        debug!(payloads = self.payloads.len(), "payload set ready");

        let capture = baseline::capture(
            self.driver.as_ref(),
            &self.origin,
            self.config.baseline_grace,
        )
        .await?;
        self.baseline = capture.snapshot;
        self.guessed.extend(capture.observed_parameters);

        if self.config.guess_parameters {
            self.reconcile_guesses(&mut extracted.query).await;
        }

        let payload_list = self.payloads.to_vec();

        // Query parameters (including names guessed before the scan)
        for name in extracted.query.names() {
            if self.aborted() {
                warn!("scan aborted at parameter boundary");
                break;
            }
            if self.is_excluded(&name) {
                continue;
            }
            info!(parameter = %name, "scanning parameter");
            if let Err(e) = self
                .scan_parameter(&name, InjectionMode::QueryParam, &payload_list)
                .await
            {
                error!(parameter = %name, error = %e, "error during parameter scan");
            }
        }

        // Parameters revealed only while earlier payloads executed
        if self.config.guess_parameters && !self.aborted() {
            let late: Vec<String> = self
                .guessed
                .iter()
                .filter(|name| !extracted.query.contains(name))
                .cloned()
                .collect();
            if !late.is_empty() {
                info!(parameters = ?late, "additional parameters discovered since scan start");
            }
            for name in late {
                if self.aborted() {
                    warn!("scan aborted at parameter boundary");
                    break;
                }
                if !extracted.query.insert_guessed(&name, self.marker.as_str()) {
                    continue;
                }
                if self.is_excluded(&name) {
                    continue;
                }
                info!(parameter = %name, "scanning parameter");
                if let Err(e) = self
                    .scan_parameter(&name, InjectionMode::QueryParam, &payload_list)
                    .await
                {
                    error!(parameter = %name, error = %e, "error during parameter scan");
                }
            }
        }

        // Fragment parameters
        for name in extracted.fragment.names() {
            if self.aborted() {
                warn!("scan aborted at parameter boundary");
                break;
            }
            if self.is_excluded(&name) {
                continue;
            }
            info!(parameter = %name, "scanning fragment parameter");
            if let Err(e) = self
                .scan_parameter(&name, InjectionMode::FragmentParam, &payload_list)
                .await
            {
                error!(parameter = %name, error = %e, "error during fragment parameter scan");
            }
        }

        // Bare fragment
        if !self.aborted() {
            info!("scanning URL fragment for injections");
            if let Err(e) = self
                .scan_parameter(FRAGMENT_PARAMETER, InjectionMode::BareFragment, &payload_list)
                .await
            {
                error!(error = %e, "error during fragment scan");
            }
        }

        // The summary runs once at the end regardless of findings
        let summary = ScanSummary::build(&self.store);
        info!(
            parameters = self.store.parameter_count(),
            findings = self.store.total(),
            "scan complete"
        );
        Ok(ScanReport {
            findings: self.store,
            summary,
        })
    }

    /// Merge guessed names into the parameter map with the marker as
    /// sentinel value. Idempotent per name.
    async fn reconcile_guesses(&self, map: &mut ParameterMap) {
        let guesser = ParameterGuesser::new(self.driver.as_ref(), &self.origin);

        let mut names = guesser.from_input_fields().await;
        if self.config.guess_parameters_extended {
            names.extend(guesser.from_scripts().await);
        }
        names.extend(self.guessed.iter().cloned());

        let mut added = Vec::new();
        for name in names {
            if map.insert_guessed(&name, self.marker.as_str()) {
                added.push(name);
            }
        }
        if !added.is_empty() {
            info!(parameters = ?added, "guessed (but yet unverified) parameters");
        }
    }

    /// Scan one parameter (or the bare fragment) with every payload.
    ///
    /// Failure policy: any error during navigation, evaluation or the
    /// reflection check is logged and the loop continues with the next
    /// payload; a single payload never aborts the parameter's scan.
    async fn scan_parameter(
        &mut self,
        parameter: &str,
        mode: InjectionMode,
        payloads: &[String],
    ) -> Result<()> {
        self.transition(ScanState::Idle, parameter);
        let mut cursor = ScanCursor::new(&self.origin, parameter);
        let mut reflected = false;

        // Listener registration scoped to this parameter's scan
        let mut signals_rx = self.driver.events();

        for payload in payloads {
            self.transition(ScanState::Navigating, parameter);
            let url = mutate_url(&self.origin, mode, parameter, payload);
            cursor.advance(url, payload);
            debug!(url = %cursor.url, payload = %payload, "testing payload");

            if let Err(e) = self
                .driver
                .navigate(&cursor.url, WaitPolicy::NetworkSettled)
                .await
            {
                error!(payload = %payload, error = %e, "error during page load");
            } else if mode != InjectionMode::QueryParam {
                // Fragment-only changes may not trigger a navigation event
                if let Err(e) = self.driver.reload().await {
                    error!(error = %e, "error during fragment reload");
                }
            }

            self.transition(ScanState::Evaluating, parameter);
            if let Err(e) = self.driver.evaluate(READY_FLAG_SCRIPT).await {
                debug!(error = %e, "readiness flag evaluation skipped");
            } else if let Err(e) = self.driver.wait_for_predicate(READY_FLAG_PREDICATE).await {
                debug!(error = %e, "readiness predicate wait skipped");
            }

            // Reflection is checked once per parameter to reduce noise
            if !reflected {
                match self.driver.content().await {
                    Ok(html) if html.contains(self.marker.as_str()) => {
                        reflected = true;
                        info!(
                            payload = %payload,
                            parameter = %parameter,
                            "marker reflected on page"
                        );
                        self.store.record(Finding::new(
                            parameter,
                            payload.clone(),
                            FindingType::MarkerReflected,
                            Severity::Info,
                            format!("marker {} reflected in rendered document", self.marker),
                        ));
                    }
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "error during reflection check"),
                }
            }

            self.transition(ScanState::Recording, parameter);
            let signals = drain(&mut signals_rx);
            let differ = SignalDiffer::new(
                &self.baseline,
                &self.marker,
                &self.config.excluded_console_substrings,
            );
            for signal in &signals {
                if let PageSignal::ParamAccess { name, context } = signal {
                    if !self.guessed.iter().any(|g| g == name) {
                        info!(name = %name, context = %context, "parameter read observed");
                        self.guessed.push(name.clone());
                    }
                    continue;
                }
                if let Some(finding) = differ.classify(signal, &mut cursor) {
                    self.store.record(finding);
                }
            }

            debug!(payload = %payload, parameter = %parameter, "payload tested");
            if self.config.interactive {
                info!("waiting for continue signal");
                if let Some(resume) = self.resume.as_mut() {
                    if resume.recv().await.is_none() {
                        warn!("continue channel closed, proceeding without pausing");
                        self.config.interactive = false;
                    }
                }
            }
        }

        self.transition(ScanState::Done, parameter);
        Ok(())
    }
}
