//! Client link lifecycle against scripted peers.

use std::time::Duration;

use livebridge::{BridgeClient, ClientConfig, ClientError, Command, FramedReader, Response};
use livebridge_testing::init_logging;
use serde_json::{Map, json};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
};

/// Read one complete command from `stream` using the wire's framing rules.
async fn read_command(stream: &mut TcpStream) -> Command {
    use tokio::io::AsyncReadExt;

    let mut reader = FramedReader::new();
    let mut chunk = vec![0_u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.expect("scripted peer read");
        assert_ne!(n, 0, "client hung up mid-script");
        if let Some(command) = reader.push(&chunk[..n]).expect("well-formed command") {
            return command;
        }
    }
}

async fn write_response(stream: &mut TcpStream, response: &Response) {
    let payload = serde_json::to_vec(response).expect("encode response");
    stream.write_all(&payload).await.expect("scripted peer write");
}

/// Answer the validating round trip a fresh link always performs.
async fn answer_hello(stream: &mut TcpStream) {
    let hello = read_command(stream).await;
    assert_eq!(hello.kind, "get_session_info");
    write_response(stream, &Response::success(json!({ "tempo": 120.0 }))).await;
}

fn fast_client(addr: std::net::SocketAddr) -> BridgeClient {
    let mut config = ClientConfig::for_addr(addr);
    config.connect_retry_delay = Duration::from_millis(20);
    config.settle_delay = Duration::from_millis(1);
    BridgeClient::new(config)
}

#[tokio::test]
async fn reconnects_transparently_after_the_host_drops_the_link() {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let script = tokio::spawn(async move {
        // First connection: hello, one command, then hang up.
        let (mut first, _) = listener.accept().await.expect("accept first");
        answer_hello(&mut first).await;
        let command = read_command(&mut first).await;
        assert_eq!(command.kind, "list_scenes");
        write_response(&mut first, &Response::success(json!([{"index": 0}]))).await;
        drop(first);

        // Second connection: the client noticed the dead link and came back.
        let (mut second, _) = listener.accept().await.expect("accept second");
        answer_hello(&mut second).await;
        let command = read_command(&mut second).await;
        assert_eq!(command.kind, "list_scenes");
        write_response(&mut second, &Response::success(json!([{"index": 1}]))).await;
    });

    let mut client = fast_client(addr);
    let first = client
        .send_command("list_scenes", Map::new())
        .await
        .expect("first command");
    assert_eq!(first, json!([{"index": 0}]));

    // Give the peer's FIN time to arrive so the probe sees a dead socket.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let second = client
        .send_command("list_scenes", Map::new())
        .await
        .expect("command after reconnect");
    assert_eq!(second, json!([{"index": 1}]));

    script.await.expect("scripted peer");
}

#[tokio::test]
async fn response_split_across_chunks_is_reassembled() {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let script = tokio::spawn(async move {
        let (mut peer, _) = listener.accept().await.expect("accept");
        answer_hello(&mut peer).await;
        let command = read_command(&mut peer).await;
        assert_eq!(command.kind, "get_browser_tree");

        let payload =
            serde_json::to_vec(&Response::success(json!({"categories": ["Sounds", "Drums"]})))
                .expect("encode");
        let thirds = payload.len() / 3;
        for part in [&payload[..thirds], &payload[thirds..2 * thirds], &payload[2 * thirds..]] {
            peer.write_all(part).await.expect("write chunk");
            peer.flush().await.expect("flush chunk");
            tokio::time::sleep(Duration::from_millis(30)).await;
        }
    });

    let mut client = fast_client(addr);
    let result = client
        .send_command("get_browser_tree", Map::new())
        .await
        .expect("chunked response");
    assert_eq!(result["categories"], json!(["Sounds", "Drums"]));

    script.await.expect("scripted peer");
}

#[tokio::test]
async fn host_reported_error_does_not_invalidate_the_link() {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let script = tokio::spawn(async move {
        let (mut peer, _) = listener.accept().await.expect("accept");
        answer_hello(&mut peer).await;
        let _ = read_command(&mut peer).await;
        write_response(&mut peer, &Response::error("Track index out of range: 5")).await;
        // Same connection must still be used for the next command.
        let _ = read_command(&mut peer).await;
        write_response(&mut peer, &Response::success(json!({}))).await;
    });

    let mut client = fast_client(addr);
    let err = client
        .send_command("get_track_info", Map::new())
        .await
        .expect_err("host error");
    assert!(matches!(err, ClientError::Host(message) if message.contains("out of range")));
    assert!(client.is_connected());

    client
        .send_command("list_scenes", Map::new())
        .await
        .expect("command on the same link");

    script.await.expect("scripted peer");
}

#[tokio::test]
async fn silent_host_times_out_and_drops_the_link() {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();
    let script = tokio::spawn(async move {
        let (mut peer, _) = listener.accept().await.expect("accept");
        answer_hello(&mut peer).await;
        let _ = read_command(&mut peer).await;
        // Never answer; hold the socket open until the client gives up.
        let _ = done_rx.await;
        drop(peer);
    });

    let mut config = ClientConfig::for_addr(addr);
    config.read_timeout = Duration::from_millis(100);
    config.connect_retry_delay = Duration::from_millis(20);
    let mut client = BridgeClient::new(config);

    let err = client
        .send_command("list_scenes", Map::new())
        .await
        .expect_err("silent host");
    assert!(matches!(err, ClientError::Timeout));
    assert!(!client.is_connected());

    let _ = done_tx.send(());
    script.await.expect("scripted peer");
}

#[tokio::test]
async fn partial_response_at_the_deadline_reports_the_payload() {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let (done_tx, done_rx) = tokio::sync::oneshot::channel::<()>();
    let script = tokio::spawn(async move {
        let (mut peer, _) = listener.accept().await.expect("accept");
        answer_hello(&mut peer).await;
        let _ = read_command(&mut peer).await;
        // A truncated response, then silence until the client gives up.
        peer.write_all(br#"{"status":"succ"#).await.expect("write fragment");
        peer.flush().await.expect("flush fragment");
        let _ = done_rx.await;
        drop(peer);
    });

    let mut config = ClientConfig::for_addr(addr);
    config.read_timeout = Duration::from_millis(100);
    config.connect_retry_delay = Duration::from_millis(20);
    let mut client = BridgeClient::new(config);

    let err = client
        .send_command("list_scenes", Map::new())
        .await
        .expect_err("truncated response");
    match err {
        // Not a bare timeout: the fragment is quoted for diagnosis.
        ClientError::Decode { snippet, .. } => assert!(snippet.contains("succ")),
        other => panic!("expected decode error with snippet, got {other:?}"),
    }
    assert!(!client.is_connected());

    let _ = done_tx.send(());
    script.await.expect("scripted peer");
}

#[tokio::test]
async fn explicit_disconnect_forces_a_fresh_connection() {
    init_logging();
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");

    let script = tokio::spawn(async move {
        for scene_index in 0..2 {
            let (mut peer, _) = listener.accept().await.expect("accept");
            answer_hello(&mut peer).await;
            let command = read_command(&mut peer).await;
            assert_eq!(command.kind, "list_scenes");
            write_response(&mut peer, &Response::success(json!([{"index": scene_index}]))).await;
        }
    });

    let mut client = fast_client(addr);
    let first = client
        .send_command("list_scenes", Map::new())
        .await
        .expect("first command");
    assert_eq!(first, json!([{"index": 0}]));

    client.disconnect();
    assert!(!client.is_connected());

    let second = client
        .send_command("list_scenes", Map::new())
        .await
        .expect("command after disconnect");
    assert_eq!(second, json!([{"index": 1}]));
    assert!(client.is_connected());

    script.await.expect("scripted peer");
}

#[tokio::test]
async fn unreachable_host_fails_after_the_configured_attempts() {
    init_logging();
    // Grab a port nobody is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let mut config = ClientConfig::for_addr(addr);
    config.connect_attempts = 2;
    config.connect_retry_delay = Duration::from_millis(10);
    let mut client = BridgeClient::new(config);

    let err = client
        .send_command("get_session_info", Map::new())
        .await
        .expect_err("nothing listening");
    assert!(matches!(err, ClientError::ConnectFailed { attempts: 2 }));
    assert!(!client.is_connected());
}
