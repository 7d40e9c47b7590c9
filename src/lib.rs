// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Domari - Dynamic DOM XSS Scanner
//!
//! Finds DOM-based cross-site scripting by driving a real page through a
//! browser automation boundary, injecting marker-tagged payloads into
//! every URL parameter and watching what the page does at runtime. No
//! static analysis - evidence comes from hooked callbacks, console
//! output, redirects and outgoing requests observed live.
//!
//! ## Features
//!
//! - Marker tracking: every payload carries a run-unique token
//! - Query, fragment and bare-fragment injection points
//! - Payload mutations derived from the parameter values already present
//! - Baseline diffing: pre-existing console noise never becomes a finding
//! - Parameter guessing from input fields, script variables and a runtime
//!   hook on the page's URL-parameter-read API
//! - Severity-ranked findings with payload-deduplicated summaries
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use domari::{HttpDriver, ScanConfig, Scanner};
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScanConfig::new().guess_parameters(true);
//!     let url = Url::parse("https://example.com/search?q=hello")?;
//!
//!     let driver = Arc::new(HttpDriver::new(&config)?);
//!     let report = Scanner::new(driver, url, config)?.run().await?;
//!
//!     println!("{}", report.summary);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod findings;
pub mod marker;
pub mod params;
pub mod payloads;
pub mod scan;

// Re-exports for convenience

// Configuration
pub use config::{CookiePair, ScanConfig};

// Driver boundary
pub use driver::{
    drain, BrowserDriver, HttpDriver, OutOfBandReceiver, OutOfBandSender, PageSignal,
    SignalReceiver, SignalSender, WaitPolicy,
};

// Errors
pub use error::{Error, Result};

// Findings and summaries
pub use findings::{
    Finding, FindingStore, FindingType, ParameterSummary, ScanSummary, Severity, SeverityBucket,
    TypeGroup,
};

// Markers and payloads
pub use marker::{Marker, MARKER_TOKEN};
pub use payloads::{PayloadSet, DEFAULT_CORPUS};

// Parameters
pub use params::{
    extract, ExtractedParameters, ParamOrigin, Parameter, ParameterGuesser, ParameterMap,
};

// Scan engine
pub use scan::{
    capture, mutate_url, BaselineCapture, BaselineSnapshot, InjectionMode, ScanCursor, ScanReport,
    ScanState, Scanner, SignalDiffer, FRAGMENT_PARAMETER,
};

/// Domari version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
