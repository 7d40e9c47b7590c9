// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scripted driver for engine tests
//!
//! Each navigation pops the next scripted visit (signals to emit plus the
//! document to serve); when the queue is empty the fallback visit is
//! replayed. Every capability call is recorded for assertions.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use url::Url;

use async_trait::async_trait;

use super::signal::{
    out_of_band_channel, signal_channel, OutOfBandReceiver, OutOfBandSender, PageSignal,
    SignalReceiver, SignalSender,
};
use super::{BrowserDriver, WaitPolicy};
use crate::config::CookiePair;
use crate::error::{Error, Result};

/// One scripted page visit
#[derive(Debug, Clone, Default)]
pub(crate) struct MockVisit {
    pub signals: Vec<PageSignal>,
    pub content: String,
}

impl MockVisit {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            signals: Vec::new(),
            content: content.into(),
        }
    }

    pub fn signal(mut self, signal: PageSignal) -> Self {
        self.signals.push(signal);
        self
    }
}

pub(crate) struct MockDriver {
    tx: SignalSender,
    err_tx: OutOfBandSender,
    visits: Mutex<VecDeque<MockVisit>>,
    fallback: Mutex<MockVisit>,
    current: Mutex<MockVisit>,
    eval_results: Mutex<VecDeque<serde_json::Value>>,
    scripts: Mutex<HashMap<String, String>>,
    pub navigations: Mutex<Vec<String>>,
    pub reloads: Mutex<usize>,
    pub evaluations: Mutex<Vec<String>>,
    pub exposed: Mutex<Vec<String>>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            tx: signal_channel(),
            err_tx: out_of_band_channel(),
            visits: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(MockVisit::default()),
            current: Mutex::new(MockVisit::default()),
            eval_results: Mutex::new(VecDeque::new()),
            scripts: Mutex::new(HashMap::new()),
            navigations: Mutex::new(Vec::new()),
            reloads: Mutex::new(0),
            evaluations: Mutex::new(Vec::new()),
            exposed: Mutex::new(Vec::new()),
        }
    }

    /// Queue a scripted visit for the next navigation
    pub fn queue_visit(&self, visit: MockVisit) {
        self.visits.lock().push_back(visit);
    }

    /// Visit replayed once the queue is empty
    pub fn set_fallback(&self, visit: MockVisit) {
        *self.fallback.lock() = visit;
    }

    /// Queue an evaluation result
    pub fn queue_eval(&self, value: serde_json::Value) {
        self.eval_results.lock().push_back(value);
    }

    /// Register script text served by fetch_script
    pub fn add_script(&self, url: &str, text: &str) {
        self.scripts.lock().insert(url.to_string(), text.to_string());
    }

    /// Raise an out-of-band error
    pub fn emit_error(&self, message: &str) {
        let _ = self.err_tx.send(message.to_string());
    }
}

#[async_trait]
impl BrowserDriver for MockDriver {
    async fn navigate(&self, url: &Url, _wait: WaitPolicy) -> Result<()> {
        self.navigations.lock().push(url.to_string());

        let visit = self
            .visits
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.lock().clone());
        for signal in &visit.signals {
            let _ = self.tx.send(signal.clone());
        }
        *self.current.lock() = visit;
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        *self.reloads.lock() += 1;
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        self.evaluations.lock().push(script.to_string());
        Ok(self
            .eval_results
            .lock()
            .pop_front()
            .unwrap_or(serde_json::Value::Null))
    }

    async fn wait_for_predicate(&self, _predicate: &str) -> Result<()> {
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        Ok(self.current.lock().content.clone())
    }

    async fn fetch_script(&self, url: &Url) -> Result<String> {
        self.scripts
            .lock()
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| Error::driver(format!("no script registered for {}", url)))
    }

    fn events(&self) -> SignalReceiver {
        self.tx.subscribe()
    }

    fn out_of_band_errors(&self) -> OutOfBandReceiver {
        self.err_tx.subscribe()
    }

    async fn expose_function(&self, name: &str) -> Result<()> {
        self.exposed.lock().push(name.to_string());
        Ok(())
    }

    async fn observe_parameter_reads(&self) -> Result<()> {
        Ok(())
    }

    async fn set_request_interception(&self, _enabled: bool) -> Result<()> {
        Ok(())
    }

    async fn set_cookies(&self, _cookies: &[CookiePair]) -> Result<()> {
        Ok(())
    }

    async fn set_local_storage(&self, _entries: &[(String, String)]) -> Result<()> {
        Ok(())
    }
}
