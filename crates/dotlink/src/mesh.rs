// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Mesh backend: local-segment gathering with a cloud uplink
//!
//! Nodes on the same segment exchange dot lists as UDP broadcast
//! datagrams. A node with a cloud uplink (the gateway role) gathers its
//! own dots plus whatever [`MeshBackend::service`] hears from neighbors,
//! and [`MeshBackend::publish`] flushes the lot through a TCP uplink
//! pinned at construction. A node without cloud connectivity broadcasts
//! its queue toward a gateway instead.
//!
//! Duplicate suppression and multi-hop relaying are left to the segment
//! (one hop to a gateway is the supported topology).

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

use heapless::Vec;

use crate::cloud::CloudBackend;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::{Dot, Protocol, SendOptions};
use crate::wire;
use crate::MAX_DOTS;

/// UDP broadcast link on the local mesh segment
pub struct MeshLink {
    socket: UdpSocket,
    port: u16,
    debug: bool,
}

impl MeshLink {
    /// Bind the segment socket
    ///
    /// Port 0 binds an ephemeral port (useful on hosts running several
    /// nodes); the real port is reported by [`port`](Self::port).
    pub fn open(port: u16) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", port)).map_err(|_| Error::ConnectionFailed)?;
        socket
            .set_broadcast(true)
            .map_err(|_| Error::ConnectionFailed)?;
        socket
            .set_nonblocking(true)
            .map_err(|_| Error::ConnectionFailed)?;
        let port = socket.local_addr().map(|a| a.port()).unwrap_or(port);
        Ok(Self {
            socket,
            port,
            debug: false,
        })
    }

    /// Bound segment port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Broadcast one encoded dot list to the segment
    pub fn broadcast(&self, payload: &str) -> Result<()> {
        if self.debug {
            log::debug!("mesh -> {}", payload);
        }
        self.socket
            .send_to(payload.as_bytes(), (Ipv4Addr::BROADCAST, self.port))
            .map_err(|_| Error::SendFailed)?;
        Ok(())
    }

    /// Non-blocking poll for one datagram
    pub fn poll(&self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>> {
        match self.socket.recv_from(buf) {
            Ok((n, src)) => Ok(Some((n, src))),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
            Err(_) => Err(Error::ConnectionFailed),
        }
    }
}

/// Mesh-side backend
pub struct MeshBackend {
    dots: Vec<Dot, MAX_DOTS>,
    link: Option<MeshLink>,
    uplink: Option<CloudBackend>,
    debug: bool,
}

impl MeshBackend {
    /// Create a gateway-capable backend with a TCP cloud uplink
    pub fn with_uplink(token: &str, config: &ClientConfig) -> Self {
        Self {
            dots: Vec::new(),
            link: Self::open_link(config),
            uplink: Some(CloudBackend::new(token, Protocol::Tcp, config)),
            debug: false,
        }
    }

    /// Create a backend for platforms without cloud connectivity
    ///
    /// `publish` broadcasts toward a gateway node instead of uplinking.
    pub fn without_uplink(config: &ClientConfig) -> Self {
        Self {
            dots: Vec::new(),
            link: Self::open_link(config),
            uplink: None,
            debug: false,
        }
    }

    fn open_link(config: &ClientConfig) -> Option<MeshLink> {
        match MeshLink::open(config.mesh_port) {
            Ok(link) => Some(link),
            Err(e) => {
                log::warn!(
                    "mesh link unavailable on port {}: {}",
                    config.mesh_port,
                    e
                );
                None
            }
        }
    }

    /// Number of gathered dots waiting for the next publish
    pub fn pending(&self) -> usize {
        self.dots.len()
    }

    /// Current debug flag
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub(crate) fn uplink_mut(&mut self) -> Option<&mut CloudBackend> {
        self.uplink.as_mut()
    }

    /// Queue one dot for the next publish
    pub fn add(&mut self, dot: Dot) {
        if self.debug {
            log::debug!("gathering mesh dot {}:{}", dot.variable_label, dot.value);
        }
        if let Err(dot) = self.dots.push(dot) {
            log::warn!(
                "mesh queue full ({} dots): dropping '{}'",
                MAX_DOTS,
                dot.variable_label
            );
        }
    }

    /// Flush gathered dots to the cloud
    ///
    /// With an uplink, the queue moves into the uplink's batch and goes out
    /// as one send; a failed send keeps the dots in the uplink batch, so a
    /// later publish retries them. Without an uplink, the queue is
    /// broadcast to the segment for a gateway to pick up.
    pub fn publish(&mut self, opts: &SendOptions<'_>) -> Result<()> {
        match &mut self.uplink {
            Some(uplink) => {
                for dot in self.dots.iter() {
                    uplink.add(dot.clone());
                }
                self.dots.clear();
                uplink.send(opts)
            }
            None => {
                if self.dots.is_empty() {
                    return Ok(());
                }
                let link = self.link.as_ref().ok_or(Error::ConnectionFailed)?;
                let payload = wire::encode_dots(&self.dots);
                link.broadcast(&payload)?;
                self.dots.clear();
                Ok(())
            }
        }
    }

    /// Service the segment: ingest dot lists broadcast by neighbors
    ///
    /// Non-blocking; call regularly from the device main loop.
    pub fn service(&mut self) {
        let Some(link) = &self.link else {
            return;
        };
        let mut buf = [0u8; 1024];
        loop {
            match link.poll(&mut buf) {
                Ok(Some((n, src))) => {
                    let payload = String::from_utf8_lossy(&buf[..n]);
                    match wire::parse_dots(&payload) {
                        Ok(dots) => {
                            if self.debug {
                                log::debug!("mesh <- {} dots from {}", dots.len(), src);
                            }
                            for dot in dots {
                                if let Err(dot) = self.dots.push(dot) {
                                    log::warn!(
                                        "mesh queue full ({} dots): dropping '{}' from {}",
                                        MAX_DOTS,
                                        dot.variable_label,
                                        src
                                    );
                                }
                            }
                        }
                        Err(e) => {
                            log::warn!("discarding malformed mesh datagram from {}: {}", src, e);
                        }
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    log::warn!("mesh receive failed: {}", e);
                    break;
                }
            }
        }
    }

    /// Re-point the cloud uplink at a different protocol
    ///
    /// No-op with a diagnostic on platforms without an uplink.
    pub fn set_cloud_protocol(&mut self, protocol: Protocol) {
        match &mut self.uplink {
            Some(uplink) => uplink.set_protocol(protocol),
            None => log::warn!("no cloud uplink on this platform; ignoring protocol change"),
        }
    }

    /// Enable or disable verbose diagnostics on this backend
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        if let Some(link) = &mut self.link {
            link.debug = debug;
        }
        if let Some(uplink) = &mut self.uplink {
            uplink.set_debug(debug);
        }
    }
}
