// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser automation capability boundary
//!
//! The scan engine never owns a browser process. It consumes this trait:
//! navigation, in-page evaluation, predicate waits, document
//! serialization, event subscription and host-callable hooks. Process
//! lifecycle, proxying and throttling live behind whichever driver
//! implements it. `HttpDriver` is the bundled JS-free reference
//! implementation.

mod http;
mod signal;

#[cfg(test)]
pub(crate) mod mock;

pub use http::HttpDriver;
pub use signal::{
    drain, out_of_band_channel, signal_channel, OutOfBandReceiver, OutOfBandSender, PageSignal,
    SignalReceiver, SignalSender,
};

use async_trait::async_trait;
use url::Url;

use crate::config::CookiePair;
use crate::error::Result;

/// Wait condition for a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Resolve once the document finished loading
    DocumentLoaded,
    /// Resolve once network activity has settled
    NetworkSettled,
}

/// Name of the hooked alert-equivalent function
pub const ALERT_HOOK: &str = "alert";

/// Secondary hooked callback, conventionally invoked by payloads
pub const SECONDARY_HOOK: &str = "xyz";

/// Script setting the in-page readiness flag once evaluation ran
pub const READY_FLAG_SCRIPT: &str = "window.__domariReady = true;";

/// Predicate waiting on the readiness flag
pub const READY_FLAG_PREDICATE: &str = "window.__domariReady === true";

/// Script collecting the names of all input elements on the page
pub const INPUT_NAME_SCRIPT: &str = r#"(function () {
  const names = [];
  for (const el of document.getElementsByTagName('input')) {
    if (el.name) names.push(el.name);
  }
  return names;
})()"#;

/// Browser automation capability consumed by the scan engine.
///
/// Implementations must be cheap to share; a single page is exclusively
/// owned by the orchestrator for the run's duration, so no method is ever
/// called concurrently with another navigation in flight.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Navigate the page to a URL under the given wait policy
    async fn navigate(&self, url: &Url, wait: WaitPolicy) -> Result<()>;

    /// Force a reload of the current URL (fragment-only changes may not
    /// trigger a navigation otherwise)
    async fn reload(&self) -> Result<()>;

    /// Evaluate script in the page, returning its JSON-converted value
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;

    /// Wait until the given in-page predicate evaluates to true
    async fn wait_for_predicate(&self, predicate: &str) -> Result<()>;

    /// Serialize the rendered document
    async fn content(&self) -> Result<String>;

    /// Fetch raw script text, used for same-origin external scripts
    async fn fetch_script(&self, url: &Url) -> Result<String>;

    /// Subscribe to page signals. Dropping the receiver ends the
    /// subscription; this is the listener-isolation primitive.
    fn events(&self) -> SignalReceiver;

    /// Subscribe to errors the automated page raises outside any call
    /// into the driver. Subscribed to once per run; messages are logged
    /// and never become findings.
    fn out_of_band_errors(&self) -> OutOfBandReceiver;

    /// Expose a page-callable function whose invocations surface as
    /// [`PageSignal::HostCall`]
    async fn expose_function(&self, name: &str) -> Result<()>;

    /// Register a call observer on the page's URL-parameter-read API.
    /// Observed names surface as [`PageSignal::ParamAccess`] without
    /// altering the API's return behavior.
    async fn observe_parameter_reads(&self) -> Result<()>;

    /// Enable or disable request interception. While enabled, every
    /// outgoing request URL surfaces as [`PageSignal::Request`] and the
    /// request itself is continued unaltered.
    async fn set_request_interception(&self, enabled: bool) -> Result<()>;

    /// Seed cookies before the scan (pass-through configuration)
    async fn set_cookies(&self, cookies: &[CookiePair]) -> Result<()>;

    /// Seed localStorage entries before the scan (pass-through)
    async fn set_local_storage(&self, entries: &[(String, String)]) -> Result<()>;
}
