// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TCP line-protocol transport
//!
//! One short-lived connection per batch: connect, write the frame, read the
//! acknowledgement, drop the socket. The endpoint acknowledges a stored
//! batch with a reply containing `OK`; a last-value request is answered
//! with the bare value.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::transport::{BatchRequest, CloudTransport};
use crate::wire;

/// TCP line-protocol transport
pub struct TcpTransport {
    token: String,
    host: String,
    port: u16,
    timeout: Duration,
    debug: bool,
}

impl TcpTransport {
    /// Create a TCP transport for the configured endpoint
    pub fn new(token: &str, config: &ClientConfig) -> Self {
        Self {
            token: token.to_string(),
            host: config.endpoint.clone(),
            port: config.tcp_port,
            timeout: config.network_timeout,
            debug: false,
        }
    }

    fn connect(&self) -> Result<TcpStream> {
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|_| Error::ConnectionFailed)?
            .next()
            .ok_or(Error::ConnectionFailed)?;

        let stream =
            TcpStream::connect_timeout(&addr, self.timeout).map_err(|_| Error::ConnectionFailed)?;
        stream
            .set_read_timeout(Some(self.timeout))
            .map_err(|_| Error::ConnectionFailed)?;
        stream
            .set_write_timeout(Some(self.timeout))
            .map_err(|_| Error::ConnectionFailed)?;
        Ok(stream)
    }

    /// Write one frame and read the reply
    fn round_trip(&self, payload: &str) -> Result<String> {
        let mut stream = self.connect()?;

        if self.debug {
            log::debug!("tcp -> {}", payload);
        }
        stream
            .write_all(payload.as_bytes())
            .map_err(|_| Error::SendFailed)?;

        let mut buf = [0u8; 256];
        let n = stream.read(&mut buf).map_err(map_read_error)?;
        let reply = String::from_utf8_lossy(&buf[..n]).into_owned();
        if self.debug {
            log::debug!("tcp <- {}", reply.trim_end());
        }
        Ok(reply)
    }
}

fn map_read_error(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Error::Timeout,
        _ => Error::SendFailed,
    }
}

impl CloudTransport for TcpTransport {
    fn send_batch(&mut self, request: &BatchRequest<'_>) -> Result<()> {
        let reply = self.round_trip(request.payload)?;
        if reply.contains("OK") {
            Ok(())
        } else {
            Err(Error::BadResponse)
        }
    }

    fn get_value(&mut self, device_label: &str, variable_label: &str) -> Result<f32> {
        let request = wire::encode_lv_request(&self.token, device_label, variable_label);
        let reply = self.round_trip(&request)?;
        wire::parse_value(&reply)
    }

    fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    fn is_debug(&self) -> bool {
        self.debug
    }
}
