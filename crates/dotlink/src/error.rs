// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for dotlink

use core::fmt;

/// Result type for dotlink operations
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for dotlink
///
/// Facade methods never surface these directly; they are folded into the
/// boolean/float return conventions of the public API. Backends and
/// transports propagate them with `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Fixed-capacity buffer is full, entry dropped
    CapacityExceeded,

    /// Operation not supported by the active backend
    Unsupported,

    /// Could not reach the cloud endpoint
    ConnectionFailed,

    /// Payload could not be written to the wire
    SendFailed,

    /// Endpoint replied with something we could not parse
    BadResponse,

    /// Network operation timed out
    Timeout,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::CapacityExceeded => write!(f, "Buffer capacity exceeded"),
            Error::Unsupported => write!(f, "Operation not supported"),
            Error::ConnectionFailed => write!(f, "Connection failed"),
            Error::SendFailed => write!(f, "Send failed"),
            Error::BadResponse => write!(f, "Bad response from endpoint"),
            Error::Timeout => write!(f, "Operation timed out"),
        }
    }
}

impl std::error::Error for Error {}
