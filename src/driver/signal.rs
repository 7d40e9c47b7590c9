// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Browser signals
//!
//! Everything the automated page produces asynchronously arrives on one
//! broadcast channel: console output, uncaught errors, failed requests,
//! response statuses, intercepted request URLs, host-function invocations,
//! parameter-read observations and out-of-band driver errors. Dropping a
//! receiver cancels that subscription, which is how listener isolation
//! between scan passes is enforced.

use tokio::sync::broadcast;
use tracing::warn;

/// Capacity of the driver's signal channel
pub const SIGNAL_CHANNEL_CAPACITY: usize = 1024;

/// A signal delivered asynchronously by the automated page
#[derive(Debug, Clone)]
pub enum PageSignal {
    /// A console message was emitted
    Console { text: String },
    /// An uncaught page error occurred
    PageError { message: String },
    /// An outgoing request failed
    RequestFailed { url: String, error: String },
    /// A response was received
    Response { status: u16, url: String },
    /// An outgoing request was intercepted (URL inspection only)
    Request { url: String },
    /// A host-exposed function was invoked by page script
    HostCall { function: String, message: String },
    /// Page script read a URL parameter through the observed API
    ParamAccess { name: String, context: String },
}

pub type SignalSender = broadcast::Sender<PageSignal>;
pub type SignalReceiver = broadcast::Receiver<PageSignal>;

/// Errors raised by the automated page outside any call into the driver
/// travel on their own channel, subscribed to once per run. They are
/// logged and never become findings.
pub type OutOfBandSender = broadcast::Sender<String>;
pub type OutOfBandReceiver = broadcast::Receiver<String>;

/// Create the driver-side signal channel
pub fn signal_channel() -> SignalSender {
    broadcast::channel(SIGNAL_CHANNEL_CAPACITY).0
}

/// Create the driver-side out-of-band error channel
pub fn out_of_band_channel() -> OutOfBandSender {
    broadcast::channel(SIGNAL_CHANNEL_CAPACITY).0
}

/// Drain all currently buffered signals without waiting.
///
/// Lagged receivers lose the overwritten signals; that loss is logged and
/// tolerated, the baseline diff filters residual noise.
pub fn drain(rx: &mut SignalReceiver) -> Vec<PageSignal> {
    let mut signals = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(signal) => signals.push(signal),
            Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                warn!(missed, "signal receiver lagged, signals dropped");
            }
            Err(_) => break,
        }
    }
    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_channel() {
        let tx = signal_channel();
        let mut rx = tx.subscribe();

        tx.send(PageSignal::Console {
            text: "hello".into(),
        })
        .unwrap();
        tx.send(PageSignal::Response {
            status: 200,
            url: "https://site.test/".into(),
        })
        .unwrap();

        let signals = drain(&mut rx);
        assert_eq!(signals.len(), 2);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_dropped_receiver_misses_later_signals() {
        let tx = signal_channel();
        let rx = tx.subscribe();
        drop(rx);

        // No receiver: send fails and the signal is lost
        assert!(tx
            .send(PageSignal::Console {
                text: "unheard".into()
            })
            .is_err());
    }
}
