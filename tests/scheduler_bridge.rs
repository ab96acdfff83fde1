//! Marshalling behaviour observed through the full server stack.

use std::{sync::Arc, time::Duration};

use livebridge::ClientError;
use livebridge_testing::{FakeHost, TestServer, init_logging, spawn_ui_thread, stalled_scheduler};
use serde_json::{Map, Value, json};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_connections_share_one_privileged_thread() {
    init_logging();
    let host = Arc::new(FakeHost::new());
    let (scheduler, ui_thread) = spawn_ui_thread(Duration::from_secs(5));
    let server = TestServer::start(Arc::clone(&host) as _, Arc::clone(&scheduler) as _).await;

    let mut workers = Vec::new();
    for n in 0..4_u32 {
        let mut client = server.client();
        workers.push(tokio::spawn(async move {
            for step in 0..5_u32 {
                let mut params = Map::new();
                params.insert("tempo".into(), json!(f64::from(60 + n * 10 + step)));
                client
                    .send_command("set_tempo", params)
                    .await
                    .expect("set_tempo");
            }
        }));
    }
    for worker in workers {
        worker.await.expect("worker");
    }

    let threads = host.threads_of("set_tempo");
    assert_eq!(threads.len(), 20);
    assert!(
        threads.iter().all(|id| *id == threads[0]),
        "every mutation must run on the single privileged thread"
    );

    server.stop().await;
    drop(scheduler);
    ui_thread.join().expect("privileged thread");
}

#[tokio::test]
async fn stalled_privileged_thread_reports_a_timeout() {
    init_logging();
    let host = Arc::new(FakeHost::new());
    // Queue exists but nothing drives it; keep it alive so submissions wait.
    let (scheduler, queue) = stalled_scheduler(Duration::from_millis(200));
    let server = TestServer::start(Arc::clone(&host) as _, Arc::clone(&scheduler) as _).await;
    let mut client = server.client();

    let mut params = Map::new();
    params.insert("tempo".into(), json!(140.0));
    let err = client
        .send_command("set_tempo", params)
        .await
        .expect_err("stalled scheduler");
    match err {
        ClientError::Host(message) => {
            assert_eq!(message, "Timeout waiting for operation to complete");
        }
        other => panic!("expected host-reported timeout, got {other:?}"),
    }

    // Read commands bypass the scheduler and still work.
    let result: Value = client
        .send_command("get_session_info", Map::new())
        .await
        .expect("direct command");
    assert_eq!(result["tempo"], 120.0);

    server.stop().await;
    drop(queue);
}

#[tokio::test]
async fn direct_commands_run_on_connection_tasks_not_the_privileged_thread() {
    init_logging();
    let host = Arc::new(FakeHost::new());
    let (scheduler, ui_thread) = spawn_ui_thread(Duration::from_secs(5));
    let server = TestServer::start(Arc::clone(&host) as _, Arc::clone(&scheduler) as _).await;
    let mut client = server.client();

    let mut params = Map::new();
    params.insert("tempo".into(), json!(99.0));
    client.send_command("set_tempo", params).await.expect("set_tempo");
    client
        .send_command("get_track_info", Map::new())
        .await
        .expect("get_track_info");

    let mutation_threads = host.threads_of("set_tempo");
    let read_threads = host.threads_of("track_info");
    assert_eq!(mutation_threads.len(), 1);
    assert_eq!(read_threads.len(), 1);
    assert_ne!(mutation_threads[0], read_threads[0]);

    server.stop().await;
    drop(client);
    drop(scheduler);
    ui_thread.join().expect("privileged thread");
}
