// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # dotlink - Device-side telemetry client
//!
//! Publishes timestamped sensor samples ("dots") to a cloud telemetry
//! platform and reads values back, from microcontroller-class devices
//! (ESP32/esp-idf, embedded Linux gateways) and host test runners.
//!
//! ## Design Constraints
//!
//! - **Bounded buffers** - context and batches use fixed-capacity
//!   `heapless` vectors; overflow drops with a diagnostic, never grows
//! - **Blocking I/O** - one synchronous round-trip per send, no runtime
//! - **No panics** - facade methods report failure as `false`/NaN plus a
//!   `log` line
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------+
//! |  Application (device main loop)          |
//! +------------------------------------------+
//!           v                    ^
//! +------------------------------------------+
//! |  DotClient (context buffer + dispatch)   |
//! +------------------------------------------+
//!      v              v
//! +-----------+  +---------------------------+
//! | MeshBack- |  | CloudBackend (dot batch)  |
//! | end + TCP |  +---------------------------+
//! | uplink    |       v
//! +-----------+  +---------------------------+
//!      v         | Transport (TCP/UDP/HTTP/  |
//! (UDP segment)  |            webhook)       |
//!                +---------------------------+
//! ```
//!
//! ## Feature Flags
//!
//! - `mesh-only` -- build for hardware variants without a cloud radio;
//!   the selector always produces a mesh-only session
//!
//! ## Example
//!
//! ```no_run
//! use dotlink::{DotClient, DotOptions, Protocol, SendOptions};
//!
//! let mut client = DotClient::new("BBFF-token", Protocol::Http);
//! client.add_context("loc", "office");
//! let context = client.get_context();
//! client.add("temp", 21.5, DotOptions { context: Some(&context), ..Default::default() });
//! client.send(SendOptions::default());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Cloud backend: pending batch plus one protocol transport
pub mod cloud;

/// Client configuration
pub mod config;

/// Fixed-capacity context buffer and its two wire encodings
pub mod context;

/// Error types
pub mod error;

/// Mesh backend: local-segment gathering with a cloud uplink
pub mod mesh;

/// Construction-time backend selection
pub mod session;

/// Cloud transport abstraction (TCP, UDP, HTTP, webhook)
pub mod transport;

/// Core types: protocols, dots, call options
pub mod types;

/// Wire codec for the line protocol and the JSON batch body
pub mod wire;

mod client;

// Re-exports for convenience
pub use crate::client::DotClient;
pub use crate::config::ClientConfig;
pub use crate::context::{ContextBuffer, ContextFamily};
pub use crate::error::{Error, Result};
pub use crate::session::Capability;
pub use crate::types::{Dot, DotOptions, Protocol, PublishFlags, SendOptions};

/// Maximum number of buffered context key/value pairs
pub const MAX_CONTEXT_PAIRS: usize = 10;

/// Maximum number of dots in a pending batch
pub const MAX_DOTS: usize = 10;

/// Version of dotlink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
