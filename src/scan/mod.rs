// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Scan engine
//!
//! Baseline capture, URL mutation, per-parameter orchestration and signal
//! classification.

mod baseline;
mod cursor;
mod differ;
mod orchestrator;

pub use baseline::{capture, BaselineCapture, BaselineSnapshot, REDIRECT_STATUSES};
pub use cursor::{mutate_url, InjectionMode, ScanCursor, FRAGMENT_PARAMETER};
pub use differ::SignalDiffer;
pub use orchestrator::{ScanReport, ScanState, Scanner};
