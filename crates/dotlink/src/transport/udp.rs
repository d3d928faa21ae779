// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! UDP line-protocol transport
//!
//! Fire-and-forget: one datagram per batch, no acknowledgement. Suited to
//! high-rate sampling where an occasional lost batch is acceptable.
//! Last-value reads are not part of the datagram protocol.

use std::net::UdpSocket;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::transport::{BatchRequest, CloudTransport};

/// UDP line-protocol transport
pub struct UdpTransport {
    host: String,
    port: u16,
    debug: bool,
}

impl UdpTransport {
    /// Create a UDP transport for the configured endpoint
    pub fn new(_token: &str, config: &ClientConfig) -> Self {
        Self {
            host: config.endpoint.clone(),
            port: config.udp_port,
            debug: false,
        }
    }
}

impl CloudTransport for UdpTransport {
    fn send_batch(&mut self, request: &BatchRequest<'_>) -> Result<()> {
        let socket = UdpSocket::bind("0.0.0.0:0").map_err(|_| Error::ConnectionFailed)?;

        if self.debug {
            log::debug!("udp -> {}", request.payload);
        }
        socket
            .send_to(request.payload.as_bytes(), (self.host.as_str(), self.port))
            .map_err(|_| Error::SendFailed)?;
        Ok(())
    }

    fn get_value(&mut self, _device_label: &str, _variable_label: &str) -> Result<f32> {
        log::warn!("last-value reads are not available over UDP; use TCP or HTTP");
        Err(Error::Unsupported)
    }

    fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    fn is_debug(&self) -> bool {
        self.debug
    }
}
