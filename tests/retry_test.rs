use covergen::{PipelineError, RequestSpec, RetryPolicy, RetryingRequester};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn quick_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new()
        .with_max_retries(max_retries)
        .with_base_delay(Duration::from_millis(10))
        .with_timeout(Duration::from_secs(5))
}

fn spec_for(server: &MockServer) -> RequestSpec {
    RequestSpec::post(format!("{}/generate", server.uri()))
        .with_bearer_auth("test-key")
        .unwrap()
        .with_json_body(&serde_json::json!({ "ping": true }))
        .unwrap()
}

/// Fails the first `failures` calls with 500, then succeeds.
struct FailThenSucceed {
    failures: usize,
    calls: AtomicUsize,
}

impl FailThenSucceed {
    fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Respond for FailThenSucceed {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            ResponseTemplate::new(500).set_body_json(serde_json::json!({ "message": "boom" }))
        } else {
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true }))
        }
    }
}

/// Returns an unparseable body with a 200 status for the first `broken`
/// calls, then valid JSON.
struct GarbageThenJson {
    broken: usize,
    calls: AtomicUsize,
}

impl Respond for GarbageThenJson {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.broken {
            ResponseTemplate::new(200).set_body_string("definitely not json")
        } else {
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true }))
        }
    }
}

#[tokio::test]
async fn success_on_first_attempt_sends_exactly_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let requester = RetryingRequester::new();
    let response = requester
        .send(&spec_for(&server), &quick_policy(3))
        .await
        .expect("request should succeed");

    assert_eq!(response.status, 200);
    assert_eq!(response.body["ok"], serde_json::json!(true));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn failing_endpoint_exhausts_all_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": { "message": "server exploded" }
        })))
        .expect(4)
        .mount(&server)
        .await;

    let requester = RetryingRequester::new();
    let started = Instant::now();
    let result = requester.send(&spec_for(&server), &quick_policy(3)).await;
    let elapsed = started.elapsed();

    let err = result.expect_err("all attempts should fail");
    assert!(matches!(err, PipelineError::RequestError(_)));
    assert_eq!(err.message(), "server exploded");
    assert_eq!(server.received_requests().await.unwrap().len(), 4);
    // Backoff lower bound: 10 + 20 + 40 ms between the four attempts.
    assert!(elapsed >= Duration::from_millis(70), "elapsed: {:?}", elapsed);
}

#[tokio::test]
async fn zero_retries_means_a_single_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let requester = RetryingRequester::new();
    let err = requester
        .send(&spec_for(&server), &quick_policy(0))
        .await
        .expect_err("single attempt should fail");

    assert_eq!(err.message(), "HTTP 503");
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn early_success_stops_further_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(FailThenSucceed::new(1))
        .mount(&server)
        .await;

    let requester = RetryingRequester::new();
    let response = requester
        .send(&spec_for(&server), &quick_policy(3))
        .await
        .expect("second attempt should succeed");

    assert_eq!(response.status, 200);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn malformed_success_body_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(GarbageThenJson {
            broken: 1,
            calls: AtomicUsize::new(0),
        })
        .mount(&server)
        .await;

    let requester = RetryingRequester::new();
    let response = requester
        .send(&spec_for(&server), &quick_policy(3))
        .await
        .expect("retry should recover from the unparseable body");

    assert_eq!(response.body["ok"], serde_json::json!(true));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn persistently_malformed_success_body_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .expect(3)
        .mount(&server)
        .await;

    let requester = RetryingRequester::new();
    let err = requester
        .send(&spec_for(&server), &quick_policy(2))
        .await
        .expect_err("unparseable bodies on every attempt should fail");

    assert!(err.message().contains("invalid response body"));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn slow_response_times_out_and_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "ok": true }))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let policy = quick_policy(1).with_timeout(Duration::from_millis(50));
    let requester = RetryingRequester::new();
    let result = requester.send(&spec_for(&server), &policy).await;

    assert!(result.is_err());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn nested_error_message_wins_over_top_level() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "message": "nested" },
            "message": "outer"
        })))
        .mount(&server)
        .await;

    let requester = RetryingRequester::new();
    let err = requester
        .send(&spec_for(&server), &quick_policy(0))
        .await
        .expect_err("400 should fail");

    assert_eq!(err.message(), "nested");
}
