//! HTTP delivery tests against a local mock endpoint.
//!
//! The sender uses a blocking client, so every send runs on the blocking
//! pool while the mock server lives on the test runtime.

mod common;

use std::time::Duration;

use common::*;
use serde_json::Value;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use playreport::callback::report::Report;
use playreport::callback::ReporterCallback;
use playreport::config::ReporterConfig;
use playreport::notify::{NotificationError, ReportSender, WebhookSender};
use playreport::traits::ExecutionCallback;

/// Builds a report by replaying a small play without delivering it.
fn sample_report() -> Report {
    let mut reporter = ReporterCallback::with_sender(None);
    reporter.replay(&[
        playbook_start("site.yml"),
        play_start("webservers", &["web1", "web2"]),
        task_start("Install nginx"),
        ok("web1", true),
        failed("web2", false),
        stats(),
    ]);
    reporter
        .last_report()
        .cloned()
        .expect("report should be assembled")
}

#[tokio::test(flavor = "multi_thread")]
async fn test_posts_report_as_json_with_bearer_token() {
    let server = MockServer::start().await;
    let user_agent = format!("playreport/{}", playreport::VERSION);
    Mock::given(method("POST"))
        .and(path("/api/plays"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer t0ken"))
        .and(header("user-agent", user_agent.as_str()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/api/plays", server.uri());
    let result = tokio::task::spawn_blocking(move || {
        let sender =
            WebhookSender::new(url, Duration::from_secs(5), Some("t0ken".to_string()))?;
        sender.send(&sample_report())
    })
    .await
    .unwrap();
    assert!(result.is_ok(), "unexpected error: {:?}", result);

    let requests: Vec<Request> = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["status"], "failed");
    assert_eq!(body["play"]["name"], "webservers");
    assert_eq!(body["stats"]["web1"]["changed"], 1);
    assert_eq!(body["stats"]["web2"]["failed"], 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_no_authorization_header_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let url = server.uri();
    tokio::task::spawn_blocking(move || {
        WebhookSender::new(url, Duration::from_secs(5), None)
            .unwrap()
            .send(&sample_report())
            .unwrap();
    })
    .await
    .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_is_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database is down"))
        .expect(1)
        .mount(&server)
        .await;

    let url = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        WebhookSender::new(url, Duration::from_secs(5), None)
            .unwrap()
            .send(&sample_report())
    })
    .await
    .unwrap()
    .unwrap_err();

    match err {
        NotificationError::Http { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database is down");
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let url = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        WebhookSender::new(url, Duration::from_secs(1), None)
            .unwrap()
            .send(&sample_report())
    })
    .await
    .unwrap()
    .unwrap_err();

    assert!(matches!(err, NotificationError::Timeout(_)), "{:?}", err);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reporter_survives_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header_exists("content-type"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = ReporterConfig::default().with_api_url(server.uri());
    let report_built = tokio::task::spawn_blocking(move || {
        let mut reporter = ReporterCallback::new(&config);
        assert!(reporter.is_enabled());
        reporter.replay(&[
            play_start("p", &["web1"]),
            task_start("t"),
            ok("web1", false),
            stats(),
        ]);
        reporter.last_report().is_some()
    })
    .await
    .unwrap();

    assert!(report_built);
}

#[test]
fn test_connection_refused_is_network_error() {
    // Port 9 (discard) is not expected to be listening on test machines.
    let sender = WebhookSender::new("http://127.0.0.1:9/", Duration::from_secs(2), None).unwrap();
    let err = sender.send(&sample_report()).unwrap_err();
    assert!(
        matches!(
            err,
            NotificationError::Network(_) | NotificationError::Timeout(_)
        ),
        "{:?}",
        err
    );
}
