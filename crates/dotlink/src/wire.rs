// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire codec for the cloud line protocol and the JSON batch body
//!
//! Two textual encodings, hand-assembled because the context arrives as a
//! pre-rendered fragment that must be spliced verbatim:
//!
//! - **Line protocol** (TCP/UDP):
//!   `TOKEN|POST|DEVICE[:NAME]=>VAR:VALUE[$CONTEXT][@TS_MS][,VAR2:...]|end`
//!   plus the value-read request `TOKEN|LV|DEVICE:VAR|end`.
//! - **JSON body** (HTTP/webhook):
//!   `{"VAR":{"value":V[,"timestamp":TS_MS][,"context":{FRAGMENT}]},...}`
//!
//! Labels and context values are written verbatim; the platform restricts
//! them to `[A-Za-z0-9_-]`, so no escaping is performed here.
//!
//! Timestamps are milliseconds (`timestamp_seconds * 1000 +
//! timestamp_millis`). A dot without a timestamp is encoded without the
//! field and the cloud stamps arrival time.

use crate::error::{Error, Result};
use crate::types::Dot;

/// Terminator of every line-protocol frame
pub const LINE_TERMINATOR: &str = "|end";

/// Format a sample value with up to six decimals, trailing zeros trimmed
pub fn fmt_value(value: f32) -> String {
    let s = format!("{:.6}", value);
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Encode a batch of dots as the line-protocol dot list
///
/// Produces `VAR:VALUE[$CONTEXT][@TS_MS]` per dot, comma-joined. This is
/// also the payload of one mesh datagram.
pub fn encode_dots(dots: &[Dot]) -> String {
    let mut out = String::new();
    for (i, dot) in dots.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&dot.variable_label);
        out.push(':');
        out.push_str(&fmt_value(dot.value));
        if let Some(context) = &dot.context {
            if !context.is_empty() {
                out.push('$');
                out.push_str(context);
            }
        }
        if let Some(ts) = dot.timestamp_ms() {
            out.push('@');
            out.push_str(&ts.to_string());
        }
    }
    out
}

/// Encode a full line-protocol POST frame
pub fn encode_delimited_batch(
    token: &str,
    device_label: &str,
    device_name: Option<&str>,
    dots: &[Dot],
) -> String {
    let mut out = String::new();
    out.push_str(token);
    out.push_str("|POST|");
    out.push_str(device_label);
    if let Some(name) = device_name {
        out.push(':');
        out.push_str(name);
    }
    out.push_str("=>");
    out.push_str(&encode_dots(dots));
    out.push_str(LINE_TERMINATOR);
    out
}

/// Encode a line-protocol last-value request
pub fn encode_lv_request(token: &str, device_label: &str, variable_label: &str) -> String {
    format!(
        "{}|LV|{}:{}{}",
        token, device_label, variable_label, LINE_TERMINATOR
    )
}

/// Encode a batch of dots as the JSON request body
///
/// The per-dot context is the pre-rendered JSON-fragment encoding and is
/// wrapped in braces here.
pub fn encode_json_batch(dots: &[Dot]) -> String {
    let mut out = String::from("{");
    for (i, dot) in dots.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push('"');
        out.push_str(&dot.variable_label);
        out.push_str("\":{\"value\":");
        out.push_str(&fmt_value(dot.value));
        if let Some(ts) = dot.timestamp_ms() {
            out.push_str(",\"timestamp\":");
            out.push_str(&ts.to_string());
        }
        if let Some(context) = &dot.context {
            if !context.is_empty() {
                out.push_str(",\"context\":{");
                out.push_str(context);
                out.push('}');
            }
        }
        out.push('}');
    }
    out.push('}');
    out
}

/// Parse a line-protocol dot list (the inverse of [`encode_dots`])
///
/// Used when ingesting mesh datagrams from neighbor nodes.
pub fn parse_dots(payload: &str) -> Result<Vec<Dot>> {
    let mut dots = Vec::new();
    if payload.is_empty() {
        return Ok(dots);
    }
    for item in payload.split(',') {
        let (head, timestamp) = match item.rsplit_once('@') {
            Some((head, ts)) => {
                let ms: u64 = ts.parse().map_err(|_| Error::BadResponse)?;
                (head, Some(ms))
            }
            None => (item, None),
        };
        let (var_value, context) = match head.split_once('$') {
            Some((var_value, context)) => (var_value, Some(context.to_string())),
            None => (head, None),
        };
        let (variable_label, value) = var_value.split_once(':').ok_or(Error::BadResponse)?;
        let value: f32 = value.parse().map_err(|_| Error::BadResponse)?;

        dots.push(Dot {
            variable_label: variable_label.to_string(),
            value,
            context,
            timestamp_seconds: timestamp.map(|ms| ms / 1000),
            timestamp_millis: timestamp.map_or(0, |ms| (ms % 1000) as u16),
        });
    }
    Ok(dots)
}

/// Parse a bare value reply (line protocol or HTTP body)
pub fn parse_value(reply: &str) -> Result<f32> {
    let trimmed = reply.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("error") {
        return Err(Error::BadResponse);
    }
    trimmed.parse().map_err(|_| Error::BadResponse)
}
