// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! End-to-end loopback tests: a full client against in-process servers

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use dotlink::{Capability, ClientConfig, DotClient, DotOptions, Protocol, SendOptions};

/// One-shot server: reads a frame, answers `reply`, returns what it read
fn spawn_server(reply: &'static str) -> (u16, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 2048];
        let n = stream.read(&mut buf).unwrap();
        stream.write_all(reply.as_bytes()).unwrap();
        String::from_utf8_lossy(&buf[..n]).into_owned()
    });
    (port, handle)
}

fn config(tcp_port: u16, http_port: u16) -> ClientConfig {
    ClientConfig {
        endpoint: "127.0.0.1".to_string(),
        tcp_port,
        http_port,
        mesh_port: 0,
        network_timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

#[test]
fn tcp_batch_with_context_reaches_the_server() {
    let (port, handle) = spawn_server("OK");
    let mut client = DotClient::with_capability(
        "TOKEN",
        Protocol::Tcp,
        config(port, 0),
        Capability::CloudAndMesh,
    );

    client.add_context("loc", "office");
    client.add_context("temp", "22");
    let context = client.get_context();
    assert_eq!(context, "loc=office$temp=22");

    client.add(
        "temp",
        21.5,
        DotOptions {
            context: Some(&context),
            ..Default::default()
        },
    );
    assert!(client.send(SendOptions {
        device_label: Some("kitchen"),
        ..Default::default()
    }));

    let seen = handle.join().unwrap();
    assert_eq!(seen, "TOKEN|POST|kitchen=>temp:21.5$loc=office$temp=22|end");
}

#[test]
fn http_batch_with_context_reaches_the_server() {
    let (port, handle) = spawn_server("HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n");
    let mut client = DotClient::with_capability(
        "TOKEN",
        Protocol::Http,
        config(0, port),
        Capability::CloudAndMesh,
    );

    client.add_context("loc", "office");
    let context = client.get_context();
    assert_eq!(context, "\"loc\":\"office\"");

    client.add(
        "temp",
        21.5,
        DotOptions {
            context: Some(&context),
            ..Default::default()
        },
    );
    assert!(client.send(SendOptions {
        device_label: Some("kitchen"),
        ..Default::default()
    }));

    let seen = handle.join().unwrap();
    assert!(seen.starts_with("POST /api/v1.6/devices/kitchen HTTP/1.1\r\n"));
    assert!(seen.ends_with("{\"temp\":{\"value\":21.5,\"context\":{\"loc\":\"office\"}}}"));
}

#[test]
fn tcp_get_reads_the_last_value() {
    let (port, handle) = spawn_server("3.14");
    let mut client = DotClient::with_capability(
        "TOKEN",
        Protocol::Tcp,
        config(port, 0),
        Capability::CloudAndMesh,
    );

    let value = client.get("kitchen", "temp");
    assert_eq!(value, 3.14);

    let seen = handle.join().unwrap();
    assert_eq!(seen, "TOKEN|LV|kitchen:temp|end");
}

#[test]
fn unreachable_endpoint_reports_false_not_panic() {
    // Bind then drop to get a port nothing listens on.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let mut client = DotClient::with_capability(
        "TOKEN",
        Protocol::Tcp,
        config(port, 0),
        Capability::CloudAndMesh,
    );

    client.add("temp", 21.5, DotOptions::default());
    assert!(!client.send(SendOptions::default()));
    assert!(client.get("kitchen", "temp").is_nan());
}
