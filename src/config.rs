// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan configuration
//!
//! Every recognized option is an explicit field with a default, validated
//! once at startup before any navigation occurs.

use std::collections::HashSet;
use std::time::Duration;

use crate::error::{Error, Result};

/// Cookie seeded into the browser before the scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePair {
    pub name: String,
    pub value: String,
}

impl CookiePair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse a `name=value` string
    pub fn parse(raw: &str) -> Result<Self> {
        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| Error::config(format!("invalid cookie '{}', expected name=value", raw)))?;
        Ok(Self::new(name, value))
    }
}

/// Scan configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Guess parameters from input fields and URL-parameter-read hooks
    pub guess_parameters: bool,
    /// Extended guessing from script variable declarations and the wordlist
    pub guess_parameters_extended: bool,
    /// Pause after each payload and wait for an external continue signal
    pub interactive: bool,
    /// Launch an operator-driven session before scanning (login, cookies)
    pub manual_login: bool,
    /// Whether the browser runs headless
    pub headless: bool,
    /// Parameter names never scanned
    pub excluded_parameters: HashSet<String>,
    /// Console messages containing any of these substrings are ignored
    pub excluded_console_substrings: Vec<String>,
    /// Verbose logging of every signal and navigation
    pub verbose: bool,
    /// User agent override, passed through to the driver
    pub user_agent: Option<String>,
    /// HTTP proxy, passed through to the driver
    pub proxy: Option<String>,
    /// Throttle the connection, passed through to the driver
    pub throttle: bool,
    /// Cookies seeded before the baseline load
    pub cookies: Vec<CookiePair>,
    /// localStorage entries seeded before the baseline load
    pub local_storage: Vec<(String, String)>,
    /// Grace period after the baseline load to catch delayed signals
    pub baseline_grace: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            guess_parameters: false,
            guess_parameters_extended: false,
            interactive: false,
            manual_login: false,
            headless: true,
            excluded_parameters: HashSet::new(),
            excluded_console_substrings: Vec::new(),
            verbose: false,
            user_agent: None,
            proxy: None,
            throttle: false,
            cookies: Vec::new(),
            local_storage: Vec::new(),
            baseline_grace: Duration::from_secs(10),
        }
    }
}

impl ScanConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable parameter guessing
    pub fn guess_parameters(mut self, enabled: bool) -> Self {
        self.guess_parameters = enabled;
        self
    }

    /// Enable extended parameter guessing
    pub fn guess_parameters_extended(mut self, enabled: bool) -> Self {
        self.guess_parameters_extended = enabled;
        // Extended guessing feeds the same reconciliation step
        if enabled {
            self.guess_parameters = true;
        }
        self
    }

    /// Enable interactive mode
    pub fn interactive(mut self, enabled: bool) -> Self {
        self.interactive = enabled;
        self
    }

    /// Enable the manual pre-scan login session
    pub fn manual_login(mut self, enabled: bool) -> Self {
        self.manual_login = enabled;
        self
    }

    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Exclude a parameter from scanning
    pub fn exclude_parameter(mut self, name: impl Into<String>) -> Self {
        self.excluded_parameters.insert(name.into());
        self
    }

    /// Ignore console messages containing the given substring
    pub fn exclude_console(mut self, substring: impl Into<String>) -> Self {
        self.excluded_console_substrings.push(substring.into());
        self
    }

    /// Enable verbose logging
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set an HTTP proxy
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Throttle the connection
    pub fn throttle(mut self, throttle: bool) -> Self {
        self.throttle = throttle;
        self
    }

    /// Seed a cookie
    pub fn cookie(mut self, cookie: CookiePair) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Seed a localStorage entry
    pub fn local_storage_entry(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.local_storage.push((key.into(), value.into()));
        self
    }

    /// Set the post-baseline grace period
    pub fn baseline_grace(mut self, grace: Duration) -> Self {
        self.baseline_grace = grace;
        self
    }

    /// Validate the configuration. Called once before any navigation.
    pub fn validate(&self) -> Result<()> {
        if self.manual_login && self.headless {
            return Err(Error::config(
                "manual login requires a headed browser (headless = false)",
            ));
        }
        Ok(())
    }
}
