// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Client configuration

use std::time::Duration;

/// Default industrial cloud endpoint
pub const DEFAULT_ENDPOINT: &str = "industrial.dotlink.io";

/// Default device label used when `send` is called without one
pub const DEFAULT_DEVICE_LABEL: &str = "dotlink-device";

/// Client configuration
///
/// All fields have working defaults; construct with `ClientConfig::default()`
/// and override what the deployment needs.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Cloud endpoint hostname (default: `industrial.dotlink.io`)
    pub endpoint: String,

    /// TCP line-protocol port (default: 9012)
    pub tcp_port: u16,

    /// UDP line-protocol port (default: 9012)
    pub udp_port: u16,

    /// HTTP API port (default: 80)
    pub http_port: u16,

    /// Webhook ingestion path on the endpoint (default: `/integrations/telemetry`)
    pub webhook_path: String,

    /// UDP port for the local mesh segment (default: 9601)
    pub mesh_port: u16,

    /// Device label used when the caller does not supply one (default: `dotlink-device`)
    pub default_device_label: String,

    /// Connect/read/write timeout for cloud sockets (default: 5 s)
    pub network_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            tcp_port: 9012,
            udp_port: 9012,
            http_port: 80,
            webhook_path: "/integrations/telemetry".to_string(),
            mesh_port: 9601,
            default_device_label: DEFAULT_DEVICE_LABEL.to_string(),
            network_timeout: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }
}
