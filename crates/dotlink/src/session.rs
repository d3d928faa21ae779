// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Construction-time backend selection
//!
//! A session is selected exactly once and never re-selected. Platforms
//! without cloud connectivity get the mesh-only variant no matter what was
//! requested; everything else gets both backends, kept live for the whole
//! process lifetime:
//!
//! - requested `Mesh`: the cloud backend is pinned to TCP (mesh-to-cloud
//!   forwarding rides a TCP uplink)
//! - any other request: the cloud backend is configured for that exact
//!   protocol, and the mesh backend still exists for mesh-forwarding use

use crate::cloud::CloudBackend;
use crate::config::ClientConfig;
use crate::mesh::MeshBackend;
use crate::types::Protocol;

/// Platform connectivity capability
///
/// Resolved from the build by default (`mesh-only` feature for hardware
/// variants without a cloud radio); can be passed explicitly for host
/// testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Cloud protocols and the mesh segment are both available
    CloudAndMesh,

    /// Only the mesh segment is available
    MeshOnly,
}

impl Capability {
    /// Capability of the current build
    pub const fn from_build() -> Self {
        if cfg!(feature = "mesh-only") {
            Capability::MeshOnly
        } else {
            Capability::CloudAndMesh
        }
    }
}

/// The selected backends of one client
pub enum Session {
    /// Platform-forced variant without cloud connectivity
    MeshOnly {
        /// The only backend; publishes by broadcasting toward a gateway
        mesh: MeshBackend,
    },

    /// Both backend families, live for the process lifetime
    Dual {
        /// Mesh backend with its own TCP cloud uplink
        mesh: MeshBackend,
        /// Cloud backend for the requested protocol (TCP when `Mesh` was
        /// requested)
        cloud: CloudBackend,
    },
}

impl Session {
    /// Select the backends for a requested protocol
    ///
    /// Infallible: unsupported combinations fall back to what the platform
    /// allows.
    pub fn select(
        token: &str,
        protocol: Protocol,
        config: &ClientConfig,
        capability: Capability,
    ) -> Self {
        match capability {
            Capability::MeshOnly => Session::MeshOnly {
                mesh: MeshBackend::without_uplink(config),
            },
            Capability::CloudAndMesh => Session::Dual {
                mesh: MeshBackend::with_uplink(token, config),
                cloud: CloudBackend::new(token, protocol, config),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ClientConfig {
        ClientConfig {
            mesh_port: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_mesh_request_yields_dual_with_tcp_cloud() {
        let session = Session::select(
            "TOKEN",
            Protocol::Mesh,
            &test_config(),
            Capability::CloudAndMesh,
        );
        match session {
            Session::Dual { cloud, .. } => assert_eq!(cloud.protocol(), Protocol::Tcp),
            Session::MeshOnly { .. } => panic!("expected a dual session"),
        }
    }

    #[test]
    fn test_cloud_request_keeps_exact_protocol() {
        let session = Session::select(
            "TOKEN",
            Protocol::Http,
            &test_config(),
            Capability::CloudAndMesh,
        );
        match session {
            Session::Dual { cloud, .. } => assert_eq!(cloud.protocol(), Protocol::Http),
            Session::MeshOnly { .. } => panic!("expected a dual session"),
        }
    }

    #[test]
    fn test_restricted_platform_forces_mesh_only() {
        let session = Session::select(
            "TOKEN",
            Protocol::Tcp,
            &test_config(),
            Capability::MeshOnly,
        );
        match session {
            Session::MeshOnly { mut mesh } => assert!(mesh.uplink_mut().is_none()),
            Session::Dual { .. } => panic!("expected a mesh-only session"),
        }
    }
}
