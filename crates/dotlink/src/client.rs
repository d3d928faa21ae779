// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `DotClient` - the device-facing facade
//!
//! One object per device, constructed once and kept for the process
//! lifetime. It owns the context buffer and the selected backends, and
//! dispatches every call by the active protocol. Methods never panic and
//! never return errors: failures surface as `false`/NaN plus a log line,
//! which is what a sampling loop on a sensor node can actually act on.
//!
//! Not reentrant-safe: all calls must come from the device main loop, not
//! from an interrupt context.

use crate::config::ClientConfig;
use crate::context::ContextBuffer;
use crate::mesh::MeshBackend;
use crate::session::{Capability, Session};
use crate::types::{Dot, DotOptions, Protocol, SendOptions};

/// Device-side telemetry client
///
/// # Example
///
/// ```no_run
/// use dotlink::{DotClient, DotOptions, Protocol, SendOptions};
///
/// let mut client = DotClient::new("BBFF-token", Protocol::Tcp);
/// client.add_context("loc", "office");
/// let context = client.get_context();
/// client.add("temp", 21.5, DotOptions { context: Some(&context), ..Default::default() });
/// if !client.send(SendOptions::default()) {
///     // batch kept, try again next cycle
/// }
/// ```
pub struct DotClient {
    protocol: Protocol,
    context: ContextBuffer,
    session: Session,
    debug: bool,
}

impl DotClient {
    /// Create a client against the default industrial endpoint
    pub fn new(token: &str, protocol: Protocol) -> Self {
        Self::with_config(token, protocol, ClientConfig::default())
    }

    /// Create a client with an explicit configuration
    pub fn with_config(token: &str, protocol: Protocol, config: ClientConfig) -> Self {
        Self::with_capability(token, protocol, config, Capability::from_build())
    }

    /// Create a client with an explicit platform capability
    ///
    /// `with_config` resolves the capability from the build; this
    /// constructor pins it, which is how host tests exercise the
    /// mesh-only selection path.
    pub fn with_capability(
        token: &str,
        protocol: Protocol,
        config: ClientConfig,
        capability: Capability,
    ) -> Self {
        Self {
            protocol,
            context: ContextBuffer::new(),
            session: Session::select(token, protocol, &config, capability),
            debug: false,
        }
    }

    /// Active protocol, as requested at construction
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// True when the platform forced a mesh-only session
    pub fn is_mesh_only(&self) -> bool {
        matches!(self.session, Session::MeshOnly { .. })
    }

    /// Current debug flag
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Protocol of the live cloud backend, if the session has one
    pub fn cloud_protocol(&self) -> Option<Protocol> {
        match &self.session {
            Session::Dual { cloud, .. } => Some(cloud.protocol()),
            Session::MeshOnly { .. } => None,
        }
    }

    /// Number of buffered context pairs
    pub fn context_len(&self) -> usize {
        self.context.len()
    }

    fn mesh_mut(&mut self) -> &mut MeshBackend {
        match &mut self.session {
            Session::MeshOnly { mesh } | Session::Dual { mesh, .. } => mesh,
        }
    }

    /// Record one dot for later transmission
    ///
    /// Queued in the mesh backend when the active protocol is `Mesh`,
    /// otherwise in the cloud backend. See [`DotOptions`] for the
    /// defaults of the optional fields.
    pub fn add(&mut self, variable_label: &str, value: f32, opts: DotOptions<'_>) {
        let dot = Dot::new(variable_label, value, &opts);
        match &mut self.session {
            Session::MeshOnly { mesh } => mesh.add(dot),
            Session::Dual { mesh, .. } if self.protocol == Protocol::Mesh => mesh.add(dot),
            Session::Dual { cloud, .. } => cloud.add(dot),
        }
    }

    /// Flush the cloud backend's pending batch
    ///
    /// Returns `true` on backend-confirmed success. A failed send keeps
    /// the batch queued. Mesh-only sessions have no cloud backend to
    /// flush; use [`mesh_publish`](Self::mesh_publish) there.
    pub fn send(&mut self, opts: SendOptions<'_>) -> bool {
        match &mut self.session {
            Session::MeshOnly { .. } => {
                log::warn!("send requires a cloud backend; mesh-only platforms use mesh_publish");
                false
            }
            Session::Dual { cloud, .. } => match cloud.send(&opts) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("send failed: {}", e);
                    false
                }
            },
        }
    }

    /// Fetch the last stored value of a variable
    ///
    /// Returns NaN when the active protocol is `Mesh` (unsupported) or
    /// when the read fails; check [`f32::is_nan`] before trusting the
    /// result.
    pub fn get(&mut self, device_label: &str, variable_label: &str) -> f32 {
        match &mut self.session {
            Session::Dual { cloud, .. } if self.protocol != Protocol::Mesh => {
                match cloud.get(device_label, variable_label) {
                    Ok(value) => value,
                    Err(e) => {
                        log::warn!("get {}/{} failed: {}", device_label, variable_label, e);
                        f32::NAN
                    }
                }
            }
            _ => {
                log::warn!("get is not supported for mesh devices");
                f32::NAN
            }
        }
    }

    /// Enable or disable verbose diagnostics
    ///
    /// Propagated to the currently active backend.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        match &mut self.session {
            Session::MeshOnly { mesh } => mesh.set_debug(debug),
            Session::Dual { mesh, .. } if self.protocol == Protocol::Mesh => mesh.set_debug(debug),
            Session::Dual { cloud, .. } => cloud.set_debug(debug),
        }
    }

    /// Buffer one context key/value pair for the next dots
    ///
    /// At most [`crate::MAX_CONTEXT_PAIRS`] pairs are kept; overflow is
    /// dropped with a diagnostic.
    pub fn add_context(&mut self, key_label: &str, key_value: &str) {
        self.context.add(key_label, key_value);
    }

    /// Render the buffered context for the active protocol
    ///
    /// See [`get_context_as`](Self::get_context_as); under `Mesh` the
    /// result is empty.
    pub fn get_context(&mut self) -> String {
        self.get_context_as(self.protocol)
    }

    /// Render the buffered context for an explicit target protocol
    ///
    /// Only a render for the active protocol's family consumes the
    /// buffer; rendering for the other family leaves every pair in place.
    pub fn get_context_as(&mut self, protocol: Protocol) -> String {
        let Some(family) = protocol.context_family() else {
            return String::new();
        };
        let rendered = self.context.render(family);
        if self.protocol.context_family() == Some(family) {
            self.context.clear();
        }
        rendered
    }

    /// Flush mesh-gathered dots to the cloud
    ///
    /// Returns `true` on confirmed success. On platforms without a cloud
    /// uplink the queue is broadcast toward a gateway node instead.
    pub fn mesh_publish(&mut self, opts: SendOptions<'_>) -> bool {
        match self.mesh_mut().publish(&opts) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("mesh publish failed: {}", e);
                false
            }
        }
    }

    /// Service mesh traffic; call regularly from the device main loop
    pub fn mesh_loop(&mut self) {
        self.mesh_mut().service();
    }

    /// Re-point the mesh backend's cloud uplink at a different protocol
    ///
    /// Leaves the session and the main cloud backend untouched.
    pub fn set_cloud_protocol(&mut self, protocol: Protocol) {
        self.mesh_mut().set_cloud_protocol(protocol);
    }
}
