// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-capacity context buffer and its two wire encodings
//!
//! Context is a small set of key/value annotations attached to the next
//! batch of dots. The buffer holds at most [`MAX_CONTEXT_PAIRS`] entries;
//! appends beyond that are dropped with a diagnostic. Insertion order is
//! preserved and significant: rendering walks the buffer front to back.

use heapless::Vec;

use crate::MAX_CONTEXT_PAIRS;

/// The two textual context encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextFamily {
    /// `key1=value1$key2=value2` -- TCP/UDP line protocol
    Delimited,

    /// `"key1":"value1","key2":"value2"` -- JSON fragment, no surrounding
    /// braces (the backend wraps it)
    Json,
}

/// One key/value annotation, immutable once stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEntry {
    key: String,
    value: String,
}

impl ContextEntry {
    /// Key label
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Key value
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Ordered key/value buffer with fixed capacity
///
/// Overflow policy: the excess entry is dropped and a warning is logged;
/// the buffer never grows past [`MAX_CONTEXT_PAIRS`]. Clearing is driven
/// by the facade, which only consumes the buffer when the rendered family
/// matches the session's active protocol.
#[derive(Debug, Default)]
pub struct ContextBuffer {
    entries: Vec<ContextEntry, MAX_CONTEXT_PAIRS>,
}

impl ContextBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one key/value pair
    ///
    /// If the buffer already holds [`MAX_CONTEXT_PAIRS`] entries the pair is
    /// dropped and a capacity diagnostic is emitted. No error is returned;
    /// capacity is authoritative.
    pub fn add(&mut self, key: &str, value: &str) {
        let entry = ContextEntry {
            key: key.to_string(),
            value: value.to_string(),
        };
        if self.entries.push(entry).is_err() {
            log::warn!(
                "context buffer full ({} pairs): dropping key '{}'",
                MAX_CONTEXT_PAIRS,
                key
            );
        }
    }

    /// Number of buffered pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no pairs are buffered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all buffered pairs
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Render the buffered pairs for the given family, in insertion order
    ///
    /// Rendering does not consume the buffer; the caller decides whether to
    /// [`clear`](Self::clear) afterwards.
    pub fn render(&self, family: ContextFamily) -> String {
        let mut out = String::new();
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                out.push(match family {
                    ContextFamily::Delimited => '$',
                    ContextFamily::Json => ',',
                });
            }
            match family {
                ContextFamily::Delimited => {
                    out.push_str(&entry.key);
                    out.push('=');
                    out.push_str(&entry.value);
                }
                ContextFamily::Json => {
                    out.push('"');
                    out.push_str(&entry.key);
                    out.push_str("\":\"");
                    out.push_str(&entry.value);
                    out.push('"');
                }
            }
        }
        out
    }
}
