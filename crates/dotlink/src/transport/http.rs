// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP API and webhook transports
//!
//! Minimal HTTP/1.1 over a short-lived `TcpStream`. Requests are assembled
//! by hand: the JSON body carries a pre-rendered context fragment that has
//! to be spliced verbatim, so there is no request builder between the codec
//! and the socket. `Connection: close` delimits the response.
//!
//! - [`HttpTransport`] talks to the device REST API
//!   (`POST /api/v1.6/devices/{label}`, `GET .../{variable}/lv`).
//! - [`WebhookTransport`] pushes the same JSON body to a configured
//!   ingestion path and supports delivery visibility flags.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::transport::{BatchRequest, CloudTransport};
use crate::types::PublishFlags;
use crate::wire;

/// Open a connection, write the request, read the full response
fn round_trip(host: &str, port: u16, timeout: Duration, request: &str) -> Result<String> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|_| Error::ConnectionFailed)?
        .next()
        .ok_or(Error::ConnectionFailed)?;

    let mut stream =
        TcpStream::connect_timeout(&addr, timeout).map_err(|_| Error::ConnectionFailed)?;
    stream
        .set_read_timeout(Some(timeout))
        .map_err(|_| Error::ConnectionFailed)?;
    stream
        .set_write_timeout(Some(timeout))
        .map_err(|_| Error::ConnectionFailed)?;

    stream
        .write_all(request.as_bytes())
        .map_err(|_| Error::SendFailed)?;

    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => Error::Timeout,
            _ => Error::SendFailed,
        })?;
    Ok(response)
}

/// Status code of an HTTP/1.x response line
fn status_code(response: &str) -> Result<u16> {
    response
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .ok_or(Error::BadResponse)
}

/// Body of an HTTP response (everything after the blank line)
fn body_of(response: &str) -> &str {
    response
        .split_once("\r\n\r\n")
        .map_or("", |(_, body)| body)
}

fn build_post(host: &str, path: &str, token: &str, body: &str) -> String {
    format!(
        "POST {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: dotlink/{}\r\nX-Auth-Token: {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        path,
        host,
        crate::VERSION,
        token,
        body.len(),
        body
    )
}

fn build_get(host: &str, path: &str, token: &str) -> String {
    format!(
        "GET {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: dotlink/{}\r\nX-Auth-Token: {}\r\nConnection: close\r\n\r\n",
        path,
        host,
        crate::VERSION,
        token
    )
}

/// HTTP API transport
pub struct HttpTransport {
    token: String,
    host: String,
    port: u16,
    timeout: Duration,
    debug: bool,
}

impl HttpTransport {
    /// Create an HTTP transport for the configured endpoint
    pub fn new(token: &str, config: &ClientConfig) -> Self {
        Self {
            token: token.to_string(),
            host: config.endpoint.clone(),
            port: config.http_port,
            timeout: config.network_timeout,
            debug: false,
        }
    }
}

impl CloudTransport for HttpTransport {
    fn send_batch(&mut self, request: &BatchRequest<'_>) -> Result<()> {
        let path = format!("/api/v1.6/devices/{}", request.device_label);
        let http_request = build_post(&self.host, &path, &self.token, request.payload);

        if self.debug {
            log::debug!("http -> POST {} {}", path, request.payload);
        }
        let response = round_trip(&self.host, self.port, self.timeout, &http_request)?;
        if self.debug {
            log::debug!("http <- {}", response.lines().next().unwrap_or(""));
        }

        match status_code(&response)? {
            200..=299 => Ok(()),
            _ => Err(Error::BadResponse),
        }
    }

    fn get_value(&mut self, device_label: &str, variable_label: &str) -> Result<f32> {
        let path = format!("/api/v1.6/devices/{}/{}/lv", device_label, variable_label);
        let http_request = build_get(&self.host, &path, &self.token);

        if self.debug {
            log::debug!("http -> GET {}", path);
        }
        let response = round_trip(&self.host, self.port, self.timeout, &http_request)?;

        match status_code(&response)? {
            200..=299 => wire::parse_value(body_of(&response)),
            _ => Err(Error::BadResponse),
        }
    }

    fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    fn is_debug(&self) -> bool {
        self.debug
    }
}

/// Webhook ingestion transport
///
/// One-way: batches go up, reads are not available at the ingestion path.
pub struct WebhookTransport {
    token: String,
    host: String,
    port: u16,
    path: String,
    timeout: Duration,
    debug: bool,
}

impl WebhookTransport {
    /// Create a webhook transport for the configured ingestion path
    pub fn new(token: &str, config: &ClientConfig) -> Self {
        Self {
            token: token.to_string(),
            host: config.endpoint.clone(),
            port: config.http_port,
            path: config.webhook_path.clone(),
            timeout: config.network_timeout,
            debug: false,
        }
    }
}

impl CloudTransport for WebhookTransport {
    fn send_batch(&mut self, request: &BatchRequest<'_>) -> Result<()> {
        let mut path = format!("{}/{}", self.path, request.device_label);
        if request.flags == PublishFlags::Public {
            path.push_str("?visibility=public");
        }
        let http_request = build_post(&self.host, &path, &self.token, request.payload);

        if self.debug {
            log::debug!("webhook -> POST {} {}", path, request.payload);
        }
        let response = round_trip(&self.host, self.port, self.timeout, &http_request)?;

        match status_code(&response)? {
            200..=299 => Ok(()),
            _ => Err(Error::BadResponse),
        }
    }

    fn get_value(&mut self, _device_label: &str, _variable_label: &str) -> Result<f32> {
        log::warn!("webhook ingestion is one-way; last-value reads are not available");
        Err(Error::Unsupported)
    }

    fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    fn is_debug(&self) -> bool {
        self.debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    /// One-shot HTTP server: reads a request, answers `response`, returns
    /// what it read.
    fn spawn_server(response: &'static str) -> (u16, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 2048];
            let n = stream.read(&mut buf).unwrap();
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });
        (port, handle)
    }

    fn config_for(port: u16) -> ClientConfig {
        ClientConfig {
            endpoint: "127.0.0.1".to_string(),
            http_port: port,
            network_timeout: Duration::from_secs(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_post_batch_ok() {
        let (port, handle) = spawn_server("HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n");
        let mut transport = HttpTransport::new("TOKEN", &config_for(port));

        let result = transport.send_batch(&BatchRequest {
            device_label: "kitchen",
            device_name: None,
            payload: "{\"temp\":{\"value\":21.5}}",
            flags: PublishFlags::Private,
        });
        assert_eq!(result, Ok(()));

        let seen = handle.join().unwrap();
        assert!(seen.starts_with("POST /api/v1.6/devices/kitchen HTTP/1.1\r\n"));
        assert!(seen.contains("X-Auth-Token: TOKEN\r\n"));
        assert!(seen.contains("Content-Type: application/json\r\n"));
        assert!(seen.ends_with("{\"temp\":{\"value\":21.5}}"));
    }

    #[test]
    fn test_post_batch_server_error() {
        let (port, _handle) =
            spawn_server("HTTP/1.1 500 Internal Server Error\r\nConnection: close\r\n\r\n");
        let mut transport = HttpTransport::new("TOKEN", &config_for(port));

        let result = transport.send_batch(&BatchRequest {
            device_label: "kitchen",
            device_name: None,
            payload: "{}",
            flags: PublishFlags::Private,
        });
        assert_eq!(result, Err(Error::BadResponse));
    }

    #[test]
    fn test_get_value() {
        let (port, handle) = spawn_server("HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n21.5");
        let mut transport = HttpTransport::new("TOKEN", &config_for(port));

        let value = transport.get_value("kitchen", "temp").unwrap();
        assert_eq!(value, 21.5);

        let seen = handle.join().unwrap();
        assert!(seen.starts_with("GET /api/v1.6/devices/kitchen/temp/lv HTTP/1.1\r\n"));
    }

    #[test]
    fn test_webhook_public_flag_in_path() {
        let (port, handle) = spawn_server("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n");
        let mut transport = WebhookTransport::new("TOKEN", &config_for(port));

        let result = transport.send_batch(&BatchRequest {
            device_label: "kitchen",
            device_name: None,
            payload: "{\"temp\":{\"value\":21.5}}",
            flags: PublishFlags::Public,
        });
        assert_eq!(result, Ok(()));

        let seen = handle.join().unwrap();
        assert!(seen
            .starts_with("POST /integrations/telemetry/kitchen?visibility=public HTTP/1.1\r\n"));
    }

    #[test]
    fn test_webhook_get_unsupported() {
        let mut transport = WebhookTransport::new("TOKEN", &ClientConfig::default());
        assert_eq!(
            transport.get_value("kitchen", "temp"),
            Err(Error::Unsupported)
        );
    }

    #[test]
    fn test_status_code_parsing() {
        assert_eq!(status_code("HTTP/1.1 200 OK\r\n"), Ok(200));
        assert_eq!(status_code("HTTP/1.1 404 Not Found\r\n"), Ok(404));
        assert_eq!(status_code("garbage"), Err(Error::BadResponse));
    }

    #[test]
    fn test_body_extraction() {
        assert_eq!(body_of("HTTP/1.1 200 OK\r\n\r\n3.14"), "3.14");
        assert_eq!(body_of("no blank line"), "");
    }
}
