//! The deferred-job poll loop, exercised without a network: an unroutable
//! download URL behaves exactly like a file that is never ready.

use std::time::{Duration, Instant};

use nsrdb::{ApiResponse, Client};
use serde_json::json;

fn quiet_client() -> Client {
    Client::new()
        .unwrap()
        .with_progress(false)
        .with_poll_interval(Duration::from_millis(20))
}

#[test]
fn submission_without_download_url_is_returned_unchanged() {
    let client = quiet_client();
    let submission = json!({"outputs": {"message": "queued"}, "inputs": {}});

    match client
        .poll_download(&submission, Duration::from_secs(60))
        .unwrap()
    {
        ApiResponse::Pending(reply) => assert_eq!(reply, submission),
        other => panic!("expected pending, got {other:?}"),
    }
}

#[test]
fn zero_timeout_returns_the_submission_without_polling() {
    let client = quiet_client();
    let submission = json!({"outputs": {"downloadUrl": "http://127.0.0.1:9/files/out.zip"}});

    let start = Instant::now();
    let response = client.poll_download(&submission, Duration::ZERO).unwrap();
    assert!(start.elapsed() < Duration::from_secs(1));

    match response {
        ApiResponse::Pending(reply) => assert_eq!(reply, submission),
        other => panic!("expected pending, got {other:?}"),
    }
}

#[test]
fn unreachable_url_expires_shortly_after_the_timeout() {
    let client = quiet_client();
    let submission = json!({"outputs": {"downloadUrl": "http://127.0.0.1:9/files/out.zip"}});
    let timeout = Duration::from_millis(200);

    let start = Instant::now();
    let response = client.poll_download(&submission, timeout).unwrap();
    // Timeout plus one poll interval, with generous slack for slow machines.
    assert!(start.elapsed() < Duration::from_secs(5));

    match response {
        ApiResponse::Pending(reply) => assert_eq!(reply, submission),
        other => panic!("expected pending, got {other:?}"),
    }
}
