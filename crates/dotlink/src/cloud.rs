// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cloud backend: pending batch plus one protocol transport
//!
//! Owns the bounded dot batch and the transport selected by [`Protocol`].
//! Dots accumulate via [`CloudBackend::add`] and go out as one encoded
//! batch on [`CloudBackend::send`]; the batch is only cleared on confirmed
//! success, so a failed send can be retried by calling `send` again.

use heapless::Vec;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::transport::{
    BatchRequest, CloudTransport, HttpTransport, TcpTransport, UdpTransport, WebhookTransport,
};
use crate::types::{Dot, Protocol, SendOptions};
use crate::wire;
use crate::MAX_DOTS;

/// Build the transport for a cloud protocol
///
/// `Mesh` is normalized to TCP: a mesh session's uplink always rides the
/// TCP line protocol.
fn make_transport(protocol: Protocol, token: &str, config: &ClientConfig) -> Box<dyn CloudTransport> {
    match protocol {
        Protocol::Http => Box::new(HttpTransport::new(token, config)),
        Protocol::Udp => Box::new(UdpTransport::new(token, config)),
        Protocol::Webhook => Box::new(WebhookTransport::new(token, config)),
        Protocol::Tcp | Protocol::Mesh => Box::new(TcpTransport::new(token, config)),
    }
}

/// Cloud-side backend for one protocol
pub struct CloudBackend {
    protocol: Protocol,
    token: String,
    config: ClientConfig,
    transport: Box<dyn CloudTransport>,
    dots: Vec<Dot, MAX_DOTS>,
    debug: bool,
}

impl CloudBackend {
    /// Create a backend for the given protocol
    ///
    /// Requesting `Mesh` yields a TCP backend (the mesh uplink).
    pub fn new(token: &str, protocol: Protocol, config: &ClientConfig) -> Self {
        let protocol = match protocol {
            Protocol::Mesh => Protocol::Tcp,
            other => other,
        };
        Self {
            protocol,
            token: token.to_string(),
            config: config.clone(),
            transport: make_transport(protocol, token, config),
            dots: Vec::new(),
            debug: false,
        }
    }

    /// Active cloud protocol
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Number of dots waiting to be sent
    pub fn pending(&self) -> usize {
        self.dots.len()
    }

    /// Current debug flag
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Queue one dot for the next `send`
    ///
    /// The batch holds at most [`MAX_DOTS`] dots; overflow is dropped with
    /// a diagnostic, mirroring the context buffer policy.
    pub fn add(&mut self, dot: Dot) {
        if self.debug {
            log::debug!("queueing dot {}:{}", dot.variable_label, dot.value);
        }
        if let Err(dot) = self.dots.push(dot) {
            log::warn!(
                "dot batch full ({} dots): dropping '{}'",
                MAX_DOTS,
                dot.variable_label
            );
        }
    }

    /// Encode and send the pending batch
    ///
    /// The batch is cleared only when the transport confirms the send.
    /// Sending an empty batch is a no-op.
    pub fn send(&mut self, opts: &SendOptions<'_>) -> Result<()> {
        if self.dots.is_empty() {
            log::debug!("send with no pending dots; nothing to do");
            return Ok(());
        }

        let device_label = opts
            .device_label
            .unwrap_or(&self.config.default_device_label);
        let payload = match self.protocol {
            Protocol::Http | Protocol::Webhook => wire::encode_json_batch(&self.dots),
            _ => wire::encode_delimited_batch(&self.token, device_label, opts.device_name, &self.dots),
        };

        let request = BatchRequest {
            device_label,
            device_name: opts.device_name,
            payload: &payload,
            flags: opts.flags.unwrap_or_default(),
        };
        self.transport.send_batch(&request)?;
        self.dots.clear();
        Ok(())
    }

    /// Fetch the last stored value of a variable
    pub fn get(&mut self, device_label: &str, variable_label: &str) -> Result<f32> {
        self.transport.get_value(device_label, variable_label)
    }

    /// Enable or disable verbose diagnostics on this backend
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        self.transport.set_debug(debug);
    }

    /// Switch to a different cloud protocol, keeping the pending batch
    ///
    /// `Mesh` is not a cloud protocol and is ignored with a diagnostic.
    pub fn set_protocol(&mut self, protocol: Protocol) {
        if protocol == Protocol::Mesh {
            log::warn!("mesh is not a cloud protocol; keeping {:?}", self.protocol);
            return;
        }
        self.protocol = protocol;
        self.transport = make_transport(protocol, &self.token, &self.config);
        self.transport.set_debug(self.debug);
    }

    /// Replace the transport with a custom link
    ///
    /// For test doubles and bring-your-own links (e.g. an AT-command
    /// cellular modem driving the line protocol).
    pub fn replace_transport(&mut self, transport: Box<dyn CloudTransport>) {
        self.transport = transport;
        self.transport.set_debug(self.debug);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::transport::NullTransport;
    use crate::types::DotOptions;

    fn backend_with_null(protocol: Protocol) -> (CloudBackend, std::sync::Arc<std::sync::Mutex<crate::transport::NullState>>) {
        let mut backend = CloudBackend::new("TOKEN", protocol, &ClientConfig::default());
        let transport = NullTransport::new();
        let state = transport.state();
        backend.replace_transport(Box::new(transport));
        (backend, state)
    }

    fn dot(label: &str, value: f32) -> Dot {
        Dot::new(label, value, &DotOptions::default())
    }

    #[test]
    fn test_mesh_request_pins_tcp() {
        let backend = CloudBackend::new("TOKEN", Protocol::Mesh, &ClientConfig::default());
        assert_eq!(backend.protocol(), Protocol::Tcp);
    }

    #[test]
    fn test_send_delimited_batch() {
        let (mut backend, state) = backend_with_null(Protocol::Tcp);
        backend.add(dot("temp", 21.5));
        backend.add(dot("hum", 40.0));

        backend.send(&SendOptions::default()).unwrap();

        let state = state.lock().unwrap();
        assert_eq!(
            state.sent,
            vec!["TOKEN|POST|dotlink-device=>temp:21.5,hum:40|end"]
        );
        assert_eq!(backend.pending(), 0);
    }

    #[test]
    fn test_send_json_batch() {
        let (mut backend, state) = backend_with_null(Protocol::Http);
        backend.add(dot("temp", 21.5));

        backend
            .send(&SendOptions {
                device_label: Some("kitchen"),
                ..Default::default()
            })
            .unwrap();

        let state = state.lock().unwrap();
        assert_eq!(state.sent, vec!["{\"temp\":{\"value\":21.5}}"]);
    }

    #[test]
    fn test_failed_send_keeps_batch() {
        let (mut backend, state) = backend_with_null(Protocol::Tcp);
        state.lock().unwrap().fail_sends = true;
        backend.add(dot("temp", 21.5));

        assert_eq!(
            backend.send(&SendOptions::default()),
            Err(Error::SendFailed)
        );
        assert_eq!(backend.pending(), 1);

        // Retry after the link recovers.
        state.lock().unwrap().fail_sends = false;
        backend.send(&SendOptions::default()).unwrap();
        assert_eq!(backend.pending(), 0);
    }

    #[test]
    fn test_empty_send_is_noop() {
        let (mut backend, state) = backend_with_null(Protocol::Tcp);
        backend.send(&SendOptions::default()).unwrap();
        assert!(state.lock().unwrap().sent.is_empty());
    }

    #[test]
    fn test_batch_overflow_dropped() {
        let (mut backend, _state) = backend_with_null(Protocol::Tcp);
        for i in 0..MAX_DOTS + 2 {
            backend.add(dot(&format!("v{}", i), i as f32));
        }
        assert_eq!(backend.pending(), MAX_DOTS);
    }

    #[test]
    fn test_set_protocol_keeps_pending_dots() {
        let (mut backend, _state) = backend_with_null(Protocol::Tcp);
        backend.add(dot("temp", 21.5));

        backend.set_protocol(Protocol::Http);
        assert_eq!(backend.protocol(), Protocol::Http);
        assert_eq!(backend.pending(), 1);
    }

    #[test]
    fn test_set_protocol_rejects_mesh() {
        let (mut backend, _state) = backend_with_null(Protocol::Udp);
        backend.set_protocol(Protocol::Mesh);
        assert_eq!(backend.protocol(), Protocol::Udp);
    }

    #[test]
    fn test_get_forwards_to_transport() {
        let (mut backend, state) = backend_with_null(Protocol::Tcp);
        state.lock().unwrap().reply = Some(3.5);
        assert_eq!(backend.get("kitchen", "temp"), Ok(3.5));
    }

    #[test]
    fn test_debug_reaches_transport() {
        let (mut backend, state) = backend_with_null(Protocol::Tcp);
        backend.set_debug(true);
        assert!(backend.is_debug());
        assert!(state.lock().unwrap().debug);
    }
}
