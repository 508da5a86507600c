//! Integration tests for the baton binary surface.

#![allow(clippy::expect_used)]

use std::net::UdpSocket;
use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;
use rosc::{OscMessage, OscPacket, OscType};

/// Spawns a one-shot DAW peer on a std socket; returns its port.
///
/// Answers a single request then exits; a read timeout keeps the thread
/// from outliving a failed test.
fn spawn_fake_daw_once(initial_tempo: f32) -> u16 {
    let socket = UdpSocket::bind("127.0.0.1:0").expect("failed to bind fake DAW socket");
    let port = socket
        .local_addr()
        .expect("fake DAW has no local addr")
        .port();
    socket
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("failed to set read timeout");

    std::thread::spawn(move || {
        let mut tempo = initial_tempo;
        let mut buf = [0u8; rosc::decoder::MTU];
        let Ok((len, from)) = socket.recv_from(&mut buf) else {
            return;
        };
        let Ok((_, OscPacket::Message(message))) = rosc::decoder::decode_udp(&buf[..len]) else {
            return;
        };
        if message.addr == "/live/song/set/tempo" {
            if let Some(OscType::Float(bpm)) = message.args.first() {
                tempo = *bpm;
            }
        }
        let reply = OscPacket::Message(OscMessage {
            addr: message.addr,
            args: vec![OscType::Float(tempo)],
        });
        let bytes = rosc::encoder::encode(&reply).expect("failed to encode reply");
        let _ = socket.send_to(&bytes, from);
    });

    port
}

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("baton")
        .expect("binary not built")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("tempo"));
}

#[test]
fn test_version() {
    Command::cargo_bin("baton")
        .expect("binary not built")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("baton"));
}

#[test]
fn test_ask_without_credential_fails() {
    Command::cargo_bin("baton")
        .expect("binary not built")
        .env_remove("OPENAI_API_KEY")
        .arg("ask")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_tempo_get() {
    let port = spawn_fake_daw_once(123.0);

    Command::cargo_bin("baton")
        .expect("binary not built")
        .args(["--send-port", &port.to_string(), "--recv-port", "0"])
        .args(["tempo", "get"])
        .assert()
        .success()
        .stdout(predicate::str::contains("123 BPM"));
}

#[test]
fn test_tempo_set() {
    let port = spawn_fake_daw_once(110.0);

    Command::cargo_bin("baton")
        .expect("binary not built")
        .args(["--send-port", &port.to_string(), "--recv-port", "0"])
        .args(["tempo", "set", "140"])
        .assert()
        .success()
        .stdout(predicate::str::contains("140 BPM"));
}

#[test]
fn test_tempo_get_json_format() {
    let port = spawn_fake_daw_once(123.0);

    Command::cargo_bin("baton")
        .expect("binary not built")
        .args(["--format", "json"])
        .args(["--send-port", &port.to_string(), "--recv-port", "0"])
        .args(["tempo", "get"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"tempo\": 123.0"));
}
