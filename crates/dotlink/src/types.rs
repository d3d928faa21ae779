// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Core types: protocols, dots, call options

use crate::context::ContextFamily;

/// Cloud/mesh protocol selection
///
/// Chosen once at client construction. Determines both the network backend
/// used for `send`/`get` and which of the two context encodings applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// HTTP API (JSON body)
    Http,

    /// TCP line protocol
    Tcp,

    /// UDP line protocol (fire-and-forget)
    Udp,

    /// Webhook ingestion (JSON body, delivery flags)
    Webhook,

    /// Local mesh segment with a TCP cloud uplink
    Mesh,
}

impl Protocol {
    /// Context encoding family for this protocol
    ///
    /// `Tcp`/`Udp` use the `$`-delimited encoding, `Http`/`Webhook` the JSON
    /// fragment encoding. `Mesh` has no encoding of its own: rendering the
    /// context under `Mesh` produces an empty string.
    pub const fn context_family(self) -> Option<ContextFamily> {
        match self {
            Protocol::Tcp | Protocol::Udp => Some(ContextFamily::Delimited),
            Protocol::Http | Protocol::Webhook => Some(ContextFamily::Json),
            Protocol::Mesh => None,
        }
    }

    /// True for the cloud-side protocols (everything but `Mesh`)
    pub const fn is_cloud(self) -> bool {
        !matches!(self, Protocol::Mesh)
    }
}

/// Webhook delivery visibility flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishFlags {
    /// Deliver to the account's private webhook consumers
    #[default]
    Private,

    /// Deliver to public webhook consumers as well
    Public,
}

/// One timestamped telemetry sample
#[derive(Debug, Clone, PartialEq)]
pub struct Dot {
    /// Variable label the sample is stored under
    pub variable_label: String,

    /// Sample value
    pub value: f32,

    /// Pre-rendered context string, if any
    pub context: Option<String>,

    /// Sample timestamp in seconds; `None` lets the cloud stamp arrival time
    pub timestamp_seconds: Option<u64>,

    /// Millisecond remainder added to `timestamp_seconds`
    pub timestamp_millis: u16,
}

impl Dot {
    /// Build a dot from a variable label, a value and call options
    pub fn new(variable_label: &str, value: f32, opts: &DotOptions<'_>) -> Self {
        Self {
            variable_label: variable_label.to_string(),
            value,
            context: opts.context.map(str::to_string),
            timestamp_seconds: opts.timestamp_seconds,
            timestamp_millis: opts.timestamp_millis,
        }
    }

    /// Combined millisecond timestamp, if the dot carries one
    pub fn timestamp_ms(&self) -> Option<u64> {
        self.timestamp_seconds
            .map(|secs| secs * 1000 + u64::from(self.timestamp_millis))
    }
}

/// Options for `DotClient::add`
///
/// Every field defaults to "absent".
#[derive(Debug, Clone, Copy, Default)]
pub struct DotOptions<'a> {
    /// Pre-rendered context to attach to the dot (default: none)
    pub context: Option<&'a str>,

    /// Timestamp in seconds (default: none, cloud stamps arrival)
    pub timestamp_seconds: Option<u64>,

    /// Millisecond remainder for `timestamp_seconds` (default: 0)
    pub timestamp_millis: u16,
}

/// Options for `DotClient::send` and `DotClient::mesh_publish`
#[derive(Debug, Clone, Copy, Default)]
pub struct SendOptions<'a> {
    /// Device label to store the batch under (default: the configured label)
    pub device_label: Option<&'a str>,

    /// Device name to create the device with; honored by the TCP/UDP line
    /// protocol only (default: none)
    pub device_name: Option<&'a str>,

    /// Webhook delivery flags; ignored by the other protocols (default: private)
    pub flags: Option<PublishFlags>,
}
