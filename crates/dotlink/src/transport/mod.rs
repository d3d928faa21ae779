// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cloud transport abstraction
//!
//! One implementation per cloud protocol:
//! - TCP line protocol ([`tcp::TcpTransport`])
//! - UDP line protocol ([`udp::UdpTransport`])
//! - HTTP API ([`http::HttpTransport`])
//! - Webhook ingestion ([`http::WebhookTransport`])
//!
//! ## Design Principles
//!
//! - **Blocking I/O** - one synchronous round-trip per call, no runtime
//! - **Connect per batch** - sockets are short-lived, nothing is kept open
//!   between calls (radios on battery-powered nodes power down in between)
//! - **Error handling** - Result-based, no panics

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::types::PublishFlags;

pub mod http;
pub mod tcp;
pub mod udp;

pub use http::{HttpTransport, WebhookTransport};
pub use tcp::TcpTransport;
pub use udp::UdpTransport;

/// One encoded batch handed to a transport
///
/// `payload` is already encoded for the transport's family: the full line
/// protocol frame for TCP/UDP, the JSON body for HTTP/webhook.
#[derive(Debug, Clone, Copy)]
pub struct BatchRequest<'a> {
    /// Device label the batch is stored under
    pub device_label: &'a str,

    /// Device name for auto-creation (line protocol only)
    pub device_name: Option<&'a str>,

    /// Encoded payload
    pub payload: &'a str,

    /// Webhook delivery flags (webhook only)
    pub flags: PublishFlags,
}

/// Transport trait for one cloud protocol
///
/// Implementors open the socket, push the payload, and classify the reply.
/// The facade never sees more detail than the `Result`.
pub trait CloudTransport {
    /// Send one encoded batch
    fn send_batch(&mut self, request: &BatchRequest<'_>) -> Result<()>;

    /// Fetch the last stored value of a variable
    fn get_value(&mut self, device_label: &str, variable_label: &str) -> Result<f32>;

    /// Enable or disable verbose wire logging
    fn set_debug(&mut self, debug: bool);

    /// Current debug flag
    fn is_debug(&self) -> bool;
}

/// Observable state behind a [`NullTransport`]
#[derive(Debug, Default)]
pub struct NullState {
    /// Payloads received via `send_batch`, in order
    pub sent: Vec<String>,

    /// Canned `get_value` reply; `None` makes reads fail
    pub reply: Option<f32>,

    /// Force `send_batch` to fail
    pub fail_sends: bool,

    /// Debug flag as last set by `set_debug`
    pub debug: bool,
}

/// Null transport (for testing and bring-your-own links)
///
/// Records every payload it is handed and answers `get_value` with a canned
/// reply. State is shared, so a handle obtained before boxing the transport
/// into a backend stays observable.
#[derive(Debug, Default, Clone)]
pub struct NullTransport {
    state: Arc<Mutex<NullState>>,
}

impl NullTransport {
    /// Create a null transport that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded state
    pub fn state(&self) -> Arc<Mutex<NullState>> {
        Arc::clone(&self.state)
    }
}

impl CloudTransport for NullTransport {
    fn send_batch(&mut self, request: &BatchRequest<'_>) -> Result<()> {
        let mut state = self.state.lock().expect("lock poisoned");
        if state.fail_sends {
            return Err(Error::SendFailed);
        }
        state.sent.push(request.payload.to_string());
        Ok(())
    }

    fn get_value(&mut self, _device_label: &str, _variable_label: &str) -> Result<f32> {
        self.state
            .lock()
            .expect("lock poisoned")
            .reply
            .ok_or(Error::BadResponse)
    }

    fn set_debug(&mut self, debug: bool) {
        self.state.lock().expect("lock poisoned").debug = debug;
    }

    fn is_debug(&self) -> bool {
        self.state.lock().expect("lock poisoned").debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_transport_records_payloads() {
        let mut transport = NullTransport::new();
        let state = transport.state();
        let request = BatchRequest {
            device_label: "kitchen",
            device_name: None,
            payload: "TOKEN|POST|kitchen=>temp:21.5|end",
            flags: PublishFlags::Private,
        };

        transport.send_batch(&request).unwrap();

        let state = state.lock().unwrap();
        assert_eq!(state.sent.len(), 1);
        assert!(state.sent[0].contains("temp:21.5"));
    }

    #[test]
    fn test_null_transport_canned_reply() {
        let mut transport = NullTransport::new();
        assert_eq!(
            transport.get_value("kitchen", "temp"),
            Err(Error::BadResponse)
        );

        transport.state().lock().unwrap().reply = Some(21.5);
        assert_eq!(transport.get_value("kitchen", "temp"), Ok(21.5));
    }

    #[test]
    fn test_null_transport_forced_failure() {
        let mut transport = NullTransport::new();
        transport.state().lock().unwrap().fail_sends = true;

        let request = BatchRequest {
            device_label: "kitchen",
            device_name: None,
            payload: "x",
            flags: PublishFlags::Private,
        };
        assert_eq!(transport.send_batch(&request), Err(Error::SendFailed));
        assert!(transport.state().lock().unwrap().sent.is_empty());
    }
}
