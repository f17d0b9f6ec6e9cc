mod e2e_utils;

use e2e_utils::{read_until_closed, send_get, TestGracefulServer};
use graceful::adapters::StaticResponder;
use graceful::domain::GracefulError;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

#[tokio::test]
async fn test_stuck_request_is_killed_after_timeout() {
    let server = TestGracefulServer::start(Duration::from_secs(30), Duration::from_millis(100))
        .await
        .expect("Failed to start server");

    let mut stream = send_get(server.addr()).await;
    sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    assert!(server.shutdown());

    let response = read_until_closed(&mut stream).await;
    assert!(!response.contains("200"), "Request should have been killed, got: {}", response);

    assert_eq!(server.finished().await, Err(GracefulError::ServerClosed));
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(100), "returned after {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(2), "returned after {:?}", elapsed);
}

#[tokio::test]
async fn test_fast_requests_survive_while_slow_ones_are_killed() {
    let slow = TestGracefulServer::start(Duration::from_secs(30), Duration::from_millis(300))
        .await
        .expect("Failed to start slow server");
    let fast = TestGracefulServer::start(Duration::from_millis(50), Duration::from_millis(300))
        .await
        .expect("Failed to start fast server");

    let mut slow_stream = send_get(slow.addr()).await;
    let mut fast_stream = send_get(fast.addr()).await;
    sleep(Duration::from_millis(20)).await;
    assert!(slow.shutdown());
    assert!(fast.shutdown());

    let fast_response = read_until_closed(&mut fast_stream).await;
    let slow_response = read_until_closed(&mut slow_stream).await;

    assert!(fast_response.starts_with("HTTP/1.1 200"), "got: {}", fast_response);
    assert!(slow_response.is_empty(), "got: {}", slow_response);

    assert_eq!(fast.finished().await, Err(GracefulError::ServerClosed));
    assert_eq!(slow.finished().await, Err(GracefulError::ServerClosed));
}

#[tokio::test]
async fn test_bind_failure_is_reported_before_serving() {
    let taken = TestGracefulServer::start(Duration::ZERO, Duration::from_secs(1))
        .await
        .expect("Failed to start server");

    let handler = Arc::new(StaticResponder::new("unused", Duration::ZERO));
    let result = graceful::run(&taken.addr().to_string(), Duration::from_secs(1), handler).await;

    match result {
        Err(GracefulError::Bind { addr, .. }) => assert_eq!(addr, taken.addr().to_string()),
        other => panic!("expected a bind error, got {:?}", other),
    }

    assert!(taken.shutdown());
    assert_eq!(taken.finished().await, Err(GracefulError::ServerClosed));
}
