// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Reference driver backed by a plain HTTP client
//!
//! Executes no JavaScript. Good enough for reflection, redirect and
//! marker-in-url detection against server-rendered pages; payloads that
//! need a script engine require a full browser-backed driver.

use parking_lot::RwLock;
use reqwest::redirect::Policy;
use tracing::debug;
use url::Url;

use async_trait::async_trait;

use super::signal::{
    out_of_band_channel, signal_channel, OutOfBandReceiver, OutOfBandSender, PageSignal,
    SignalReceiver, SignalSender,
};
use super::{BrowserDriver, WaitPolicy};
use crate::config::{CookiePair, ScanConfig};
use crate::error::{Error, Result};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) domari/0.1";

/// Redirect hops followed per navigation
const MAX_REDIRECTS: usize = 10;

#[derive(Default)]
struct DriverState {
    current_url: Option<Url>,
    body: Option<String>,
    cookies: Vec<CookiePair>,
    intercepting: bool,
}

/// JS-free reference implementation of [`BrowserDriver`]
pub struct HttpDriver {
    client: reqwest::Client,
    tx: SignalSender,
    // Carried for the capability contract; this driver has no
    // asynchronous page, so nothing is ever sent on it
    err_tx: OutOfBandSender,
    state: RwLock<DriverState>,
}

impl HttpDriver {
    /// Build a driver from the scan configuration (user agent and proxy
    /// are honored; throttling is not supported by this driver)
    pub fn new(config: &ScanConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .redirect(Policy::none())
            .user_agent(
                config
                    .user_agent
                    .clone()
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            );

        if let Some(ref proxy) = config.proxy {
            builder = builder
                .proxy(reqwest::Proxy::all(proxy).map_err(Error::Http)?)
                .danger_accept_invalid_certs(true);
        }
        if config.throttle {
            debug!("throttling is not supported by the HTTP reference driver");
        }

        Ok(Self {
            client: builder.build()?,
            tx: signal_channel(),
            err_tx: out_of_band_channel(),
            state: RwLock::new(DriverState::default()),
        })
    }

    fn cookie_header(&self) -> Option<String> {
        let state = self.state.read();
        if state.cookies.is_empty() {
            return None;
        }
        Some(
            state
                .cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response> {
        let mut request = self.client.get(url.clone());
        if let Some(header) = self.cookie_header() {
            request = request.header(reqwest::header::COOKIE, header);
        }

        if self.state.read().intercepting {
            let _ = self.tx.send(PageSignal::Request {
                url: url.to_string(),
            });
        }

        match request.send().await {
            Ok(response) => Ok(response),
            Err(e) => {
                let _ = self.tx.send(PageSignal::RequestFailed {
                    url: url.to_string(),
                    error: e.to_string(),
                });
                Err(Error::navigation(url.to_string(), e.to_string()))
            }
        }
    }

    /// Fetch a URL, following redirects manually so every hop's status is
    /// observable as a signal.
    async fn load(&self, url: &Url) -> Result<()> {
        let mut current = url.clone();

        for _ in 0..MAX_REDIRECTS {
            let response = self.get(&current).await?;
            let status = response.status().as_u16();

            let _ = self.tx.send(PageSignal::Response {
                status,
                url: current.to_string(),
            });

            if response.status().is_redirection() {
                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                match location {
                    Some(loc) => {
                        current = current.join(&loc)?;
                        continue;
                    }
                    None => {
                        return Err(Error::navigation_with_status(
                            current.to_string(),
                            status,
                            "redirect without Location header",
                        ))
                    }
                }
            }

            let body = response
                .text()
                .await
                .map_err(|e| Error::navigation(current.to_string(), e.to_string()))?;

            let mut state = self.state.write();
            state.current_url = Some(current);
            state.body = Some(body);
            return Ok(());
        }

        Err(Error::navigation(url.to_string(), "too many redirects"))
    }
}

#[async_trait]
impl BrowserDriver for HttpDriver {
    async fn navigate(&self, url: &Url, _wait: WaitPolicy) -> Result<()> {
        // An HTTP fetch is settled once the body is read
        self.load(url).await
    }

    async fn reload(&self) -> Result<()> {
        let current = self.state.read().current_url.clone();
        match current {
            Some(url) => self.load(&url).await,
            None => Err(Error::navigation("about:blank", "no URL to reload")),
        }
    }

    async fn evaluate(&self, _script: &str) -> Result<serde_json::Value> {
        Err(Error::evaluation(
            "HTTP reference driver does not execute JavaScript",
        ))
    }

    async fn wait_for_predicate(&self, _predicate: &str) -> Result<()> {
        // Nothing runs asynchronously in this driver
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        self.state
            .read()
            .body
            .clone()
            .ok_or_else(|| Error::driver("no document loaded"))
    }

    async fn fetch_script(&self, url: &Url) -> Result<String> {
        let response = self.get(url).await?;
        Ok(response.text().await?)
    }

    fn events(&self) -> SignalReceiver {
        self.tx.subscribe()
    }

    fn out_of_band_errors(&self) -> OutOfBandReceiver {
        self.err_tx.subscribe()
    }

    async fn expose_function(&self, name: &str) -> Result<()> {
        debug!(name, "host function hooks are inert without a script engine");
        Ok(())
    }

    async fn observe_parameter_reads(&self) -> Result<()> {
        debug!("parameter-read observation is inert without a script engine");
        Ok(())
    }

    async fn set_request_interception(&self, enabled: bool) -> Result<()> {
        self.state.write().intercepting = enabled;
        Ok(())
    }

    async fn set_cookies(&self, cookies: &[CookiePair]) -> Result<()> {
        self.state.write().cookies.extend_from_slice(cookies);
        Ok(())
    }

    async fn set_local_storage(&self, entries: &[(String, String)]) -> Result<()> {
        if !entries.is_empty() {
            debug!("localStorage seeding is inert without a script engine");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::drain;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_navigate_stores_body_and_emits_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hi</html>"))
            .mount(&server)
            .await;

        let driver = HttpDriver::new(&ScanConfig::default()).unwrap();
        let mut rx = driver.events();
        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();

        driver.navigate(&url, WaitPolicy::NetworkSettled).await.unwrap();

        assert_eq!(driver.content().await.unwrap(), "<html>hi</html>");
        let signals = drain(&mut rx);
        assert!(signals
            .iter()
            .any(|s| matches!(s, PageSignal::Response { status: 200, .. })));
    }

    #[tokio::test]
    async fn test_redirect_hops_are_observable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/start"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/end"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/end"))
            .respond_with(ResponseTemplate::new(200).set_body_string("done"))
            .mount(&server)
            .await;

        let driver = HttpDriver::new(&ScanConfig::default()).unwrap();
        let mut rx = driver.events();
        let url = Url::parse(&format!("{}/start", server.uri())).unwrap();

        driver.navigate(&url, WaitPolicy::NetworkSettled).await.unwrap();

        let statuses: Vec<u16> = drain(&mut rx)
            .into_iter()
            .filter_map(|s| match s {
                PageSignal::Response { status, .. } => Some(status),
                _ => None,
            })
            .collect();
        assert_eq!(statuses, vec![302, 200]);
    }

    #[tokio::test]
    async fn test_interception_emits_request_signals() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let driver = HttpDriver::new(&ScanConfig::default()).unwrap();
        driver.set_request_interception(true).await.unwrap();
        let mut rx = driver.events();
        let url = Url::parse(&format!("{}/x?q=tok123", server.uri())).unwrap();

        driver.navigate(&url, WaitPolicy::NetworkSettled).await.unwrap();

        let signals = drain(&mut rx);
        assert!(signals.iter().any(
            |s| matches!(s, PageSignal::Request { url } if url.contains("tok123"))
        ));
    }

    #[tokio::test]
    async fn test_cookies_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(wiremock::matchers::header("cookie", "session=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string("authed"))
            .mount(&server)
            .await;

        let driver = HttpDriver::new(&ScanConfig::default()).unwrap();
        driver
            .set_cookies(&[CookiePair::new("session", "abc")])
            .await
            .unwrap();
        let url = Url::parse(&server.uri()).unwrap();

        driver.navigate(&url, WaitPolicy::NetworkSettled).await.unwrap();
        assert_eq!(driver.content().await.unwrap(), "authed");
    }
}
