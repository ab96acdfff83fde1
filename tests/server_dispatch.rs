//! End-to-end command dispatch over a real socket.

use std::{sync::Arc, time::Duration};

use livebridge::{ClientError, InlineScheduler};
use livebridge_testing::{FakeHost, TestServer, init_logging, spawn_ui_thread};
use serde_json::{Map, Value, json};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

fn params(entries: &[(&str, Value)]) -> Map<String, Value> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}

#[tokio::test]
async fn session_info_reports_the_live_session() {
    init_logging();
    let host = Arc::new(FakeHost::new());
    let server = TestServer::start(Arc::clone(&host) as _, Arc::new(InlineScheduler)).await;
    let mut client = server.client();

    let result = client
        .send_command("get_session_info", Map::new())
        .await
        .expect("get_session_info");
    assert_eq!(result["tempo"], 120.0);
    assert_eq!(result["track_count"], 2);

    server.stop().await;
}

#[tokio::test]
async fn unknown_command_keeps_the_connection_usable() {
    init_logging();
    let host = Arc::new(FakeHost::new());
    let server = TestServer::start(Arc::clone(&host) as _, Arc::new(InlineScheduler)).await;
    let mut client = server.client();

    let err = client
        .send_command("frobnicate", Map::new())
        .await
        .expect_err("unknown command");
    match err {
        ClientError::Host(message) => assert_eq!(message, "Unknown command: frobnicate"),
        other => panic!("expected host error, got {other:?}"),
    }

    // The failure was semantic, not transport: same link, next command works.
    assert!(client.is_connected());
    client
        .send_command("get_session_info", Map::new())
        .await
        .expect("follow-up command");

    server.stop().await;
}

#[tokio::test]
async fn host_failure_becomes_an_error_response() {
    init_logging();
    let host = Arc::new(FakeHost::new());
    host.fail_with("track_info", "Track index out of range: 9");
    let server = TestServer::start(Arc::clone(&host) as _, Arc::new(InlineScheduler)).await;
    let mut client = server.client();

    let err = client
        .send_command("get_track_info", params(&[("track_index", json!(9))]))
        .await
        .expect_err("host failure");
    match err {
        ClientError::Host(message) => assert_eq!(message, "Track index out of range: 9"),
        other => panic!("expected host error, got {other:?}"),
    }
    assert!(client.is_connected());

    server.stop().await;
}

#[tokio::test]
async fn marshalled_command_mutates_state_on_the_privileged_thread() {
    init_logging();
    let host = Arc::new(FakeHost::new());
    let (scheduler, ui_thread) = spawn_ui_thread(Duration::from_secs(5));
    let server = TestServer::start(Arc::clone(&host) as _, Arc::clone(&scheduler) as _).await;
    let mut client = server.client();

    client
        .send_command("set_tempo", params(&[("tempo", json!(92.5))]))
        .await
        .expect("set_tempo");
    assert!((host.tempo() - 92.5).abs() < f64::EPSILON);

    client
        .send_command("set_track_name", params(&[
            ("track_index", json!(1)),
            ("name", json!("Bassline")),
        ]))
        .await
        .expect("set_track_name");
    assert_eq!(host.track_name(1).as_deref(), Some("Bassline"));

    // Both mutations ran on the same dedicated thread, not a connection task.
    let tempo_threads = host.threads_of("set_tempo");
    let name_threads = host.threads_of("set_track_name");
    assert_eq!(tempo_threads.len(), 1);
    assert_eq!(tempo_threads, name_threads);

    server.stop().await;
    drop(client);
    drop(scheduler);
    ui_thread.join().expect("privileged thread");
}

#[tokio::test]
async fn sequential_commands_get_matching_responses_in_order() {
    init_logging();
    let host = Arc::new(FakeHost::new());
    let (scheduler, ui_thread) = spawn_ui_thread(Duration::from_secs(5));
    let server = TestServer::start(Arc::clone(&host) as _, Arc::clone(&scheduler) as _).await;
    let mut client = server.client();

    for tempo in [60.0, 75.0, 98.0, 132.0, 174.0] {
        let result = client
            .send_command("set_tempo", params(&[("tempo", json!(tempo))]))
            .await
            .expect("set_tempo");
        assert_eq!(result["tempo"], tempo);
        let session = client
            .send_command("get_session_info", Map::new())
            .await
            .expect("get_session_info");
        assert_eq!(session["tempo"], tempo);
    }

    server.stop().await;
    drop(client);
    drop(scheduler);
    ui_thread.join().expect("privileged thread");
}

#[tokio::test]
async fn malformed_payload_gets_an_error_then_the_connection_closes() {
    init_logging();
    let host = Arc::new(FakeHost::new());
    let server = TestServer::start(Arc::clone(&host) as _, Arc::new(InlineScheduler)).await;

    let mut stream = TcpStream::connect(server.addr()).await.expect("connect");
    stream
        .write_all(b"this is not json")
        .await
        .expect("write garbage");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read to close");
    let response: Value = serde_json::from_slice(&raw).expect("error response");
    assert_eq!(response["status"], "error");
    assert!(
        response["message"]
            .as_str()
            .expect("message")
            .contains("malformed request")
    );

    server.stop().await;
}
