//! Integration tests for the status client and poller against a mock service.

use std::time::Duration;

use monitor_client::{
    ElementId, Endpoint, Endpoints, FetchError, PollOutcome, PollerConfig, RenderOptions,
    StatusClient, StatusPoller,
};
use serde_json::json;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> PollerConfig {
    PollerConfig {
        endpoints: Endpoints::new(server.uri()),
        render: RenderOptions {
            utc_offset: chrono::FixedOffset::east_opt(0),
            ..Default::default()
        },
        ..Default::default()
    }
}

async fn mount_json(server: &MockServer, route: &str, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

async fn request_count(server: &MockServer, route: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == route)
        .count()
}

mod client_tests {
    use super::*;

    /// The data request must ask every cache layer to skip stored copies.
    #[tokio::test]
    async fn test_data_request_bypasses_cache() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data"))
            .and(header_exists("cache-control"))
            .and(header("pragma", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_detections": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let client = StatusClient::new(Endpoints::new(server.uri()), None).unwrap();
        let payload = client.fetch_data().await.unwrap().unwrap();
        assert_eq!(payload.total_detections_text(), "1");

        let requests = server.received_requests().await.unwrap();
        let cache_control = requests[0]
            .headers
            .get("cache-control")
            .and_then(|value| value.to_str().ok());
        assert_eq!(cache_control, Some("no-cache, no-store"));
    }

    #[tokio::test]
    async fn test_data_non_success_status_fails() {
        let server = MockServer::start().await;
        mount_json(&server, "/data", 503, json!({"recent_detections": []})).await;

        let client = StatusClient::new(Endpoints::new(server.uri()), None).unwrap();
        let err = client.fetch_data().await.unwrap_err();
        assert!(matches!(err, FetchError::Status(code) if code.as_u16() == 503));
    }

    #[tokio::test]
    async fn test_data_malformed_body_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = StatusClient::new(Endpoints::new(server.uri()), None).unwrap();
        let err = client.fetch_data().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    /// Health accepts any JSON body regardless of the status code.
    #[tokio::test]
    async fn test_health_ignores_status_code() {
        let server = MockServer::start().await;
        mount_json(&server, "/health", 500, json!({"camera": "stalled"})).await;

        let client = StatusClient::new(Endpoints::new(server.uri()), None).unwrap();
        let health = client.fetch_health().await.unwrap();
        assert_eq!(health.camera_label(), "stalled");
        assert_eq!(health.model_label(), "-");
    }

    #[tokio::test]
    async fn test_request_timeout_applies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"camera": "ok"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = StatusClient::new(Endpoints::new(server.uri()), Some(Duration::from_millis(50))).unwrap();
        let err = client.fetch_health().await.unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
    }
}

mod refresh_tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_health_writes_labels() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/health",
            200,
            json!({"camera": "streaming", "database": "connected", "model": "yolov8n"}),
        )
        .await;

        let poller = StatusPoller::new(&config_for(&server)).unwrap();
        poller.refresh_health().await;

        let dashboard = poller.dashboard();
        let view = dashboard.read().unwrap();
        assert_eq!(view.text(ElementId::CameraStatus), Some("Camera: streaming"));
        assert_eq!(view.text(ElementId::DbStatus), Some("DB: connected"));
        assert_eq!(view.text(ElementId::ModelStatus), Some("Model: yolov8n"));
    }

    /// A failed health check replaces previously good labels with placeholders.
    #[tokio::test]
    async fn test_refresh_health_failure_resets_labels() {
        let server = MockServer::start().await;
        let poller = StatusPoller::new(&config_for(&server)).unwrap();

        mount_json(&server, "/health", 200, json!({"camera": "ok", "database": "ok", "model": "ok"})).await;
        poller.refresh_health().await;
        assert_eq!(
            poller.dashboard().read().unwrap().text(ElementId::CameraStatus),
            Some("Camera: ok")
        );

        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        poller.refresh_health().await;

        let dashboard = poller.dashboard();
        let view = dashboard.read().unwrap();
        assert_eq!(view.text(ElementId::CameraStatus), Some("Camera: -"));
        assert_eq!(view.text(ElementId::DbStatus), Some("DB: -"));
        assert_eq!(view.text(ElementId::ModelStatus), Some("Model: -"));
    }

    #[tokio::test]
    async fn test_refresh_data_example_payload() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/data",
            200,
            json!({
                "total_detections": 57,
                "human_count": 1,
                "recent_detections": [
                    {"timestamp": 1_700_000_000_000_i64, "status": "person", "delay": 20, "jitter": 5},
                    {"timestamp": 1_700_000_002_000_i64, "status": "person", "delay": 30, "jitter": 5},
                ],
            }),
        )
        .await;

        let poller = StatusPoller::new(&config_for(&server)).unwrap();
        let mut events = poller.subscribe();
        poller.refresh_data().await;

        let event = events.recv().await.unwrap();
        assert_eq!(event.endpoint, Endpoint::Data);
        assert_eq!(event.outcome, PollOutcome::Applied { rows: 2 });

        let dashboard = poller.dashboard();
        let view = dashboard.read().unwrap();
        assert_eq!(view.text(ElementId::HumanCount), Some("1"));
        assert_eq!(view.text(ElementId::TotalDetections), Some("57"));
        assert_eq!(view.text(ElementId::AvgDelay), Some("25.0 ms"));
        assert_eq!(view.text(ElementId::AvgJitter), Some("5.0 ms"));
        assert_eq!(view.text(ElementId::Fps), Some("30"));
        assert_eq!(view.rows()[1].time, "22:13:22");
    }

    /// A failed data refresh leaves the previous values on screen.
    #[tokio::test]
    async fn test_refresh_data_failure_keeps_previous_values() {
        let server = MockServer::start().await;
        let poller = StatusPoller::new(&config_for(&server)).unwrap();

        mount_json(
            &server,
            "/data",
            200,
            json!({"total_detections": 9, "recent_detections": [{"delay": 50, "jitter": 2}]}),
        )
        .await;
        poller.refresh_data().await;
        let before = poller.dashboard().read().unwrap().clone();
        assert_eq!(before.text(ElementId::Fps), Some("20"));

        server.reset().await;
        mount_json(&server, "/data", 500, json!({"error": "db down"})).await;
        let mut events = poller.subscribe();
        poller.refresh_data().await;

        let event = events.recv().await.unwrap();
        assert!(matches!(event.outcome, PollOutcome::Failed(ref msg) if msg.contains("500")));

        let after = poller.dashboard().read().unwrap().clone();
        assert_eq!(after.text(ElementId::TotalDetections), Some("9"));
        assert_eq!(after.text(ElementId::Fps), Some("20"));
        assert_eq!(after.rows(), before.rows());
    }

    #[tokio::test]
    async fn test_refresh_data_null_payload_is_ignored() {
        let server = MockServer::start().await;
        mount_json(&server, "/data", 200, json!(null)).await;

        let poller = StatusPoller::new(&config_for(&server)).unwrap();
        let mut events = poller.subscribe();
        poller.refresh_data().await;

        assert_eq!(events.recv().await.unwrap().outcome, PollOutcome::Ignored);
        assert!(poller.dashboard().read().unwrap().data_updated_at.is_none());
    }

    #[tokio::test]
    async fn test_refresh_data_renders_at_most_ten_rows() {
        let server = MockServer::start().await;
        let records: Vec<_> = (0..40).map(|i| json!({"delay": 10 + i, "jitter": 1})).collect();
        mount_json(&server, "/data", 200, json!({"recent_detections": records})).await;

        let poller = StatusPoller::new(&config_for(&server)).unwrap();
        poller.refresh_data().await;

        assert_eq!(poller.dashboard().read().unwrap().rows().len(), 10);
    }
}

mod schedule_tests {
    use super::*;

    fn fast_config(server: &MockServer) -> PollerConfig {
        PollerConfig {
            data_interval: Duration::from_millis(100),
            health_interval: Duration::from_millis(250),
            ..config_for(server)
        }
    }

    /// Both endpoints are hit immediately on start, before any interval elapses.
    #[tokio::test]
    async fn test_first_refresh_is_immediate() {
        let server = MockServer::start().await;
        mount_json(&server, "/data", 200, json!({"total_detections": 3})).await;
        mount_json(&server, "/health", 200, json!({"camera": "ok"})).await;

        let config = PollerConfig {
            data_interval: Duration::from_secs(60),
            health_interval: Duration::from_secs(60),
            ..config_for(&server)
        };
        let handle = StatusPoller::new(&config).unwrap().spawn();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(request_count(&server, "/data").await, 1);
        assert_eq!(request_count(&server, "/health").await, 1);

        let view = handle.snapshot();
        assert_eq!(view.text(ElementId::TotalDetections), Some("3"));
        assert_eq!(view.text(ElementId::CameraStatus), Some("Camera: ok"));
    }

    #[tokio::test]
    async fn test_schedules_repeat_independently() {
        let server = MockServer::start().await;
        mount_json(&server, "/data", 200, json!({"recent_detections": []})).await;
        mount_json(&server, "/health", 200, json!({"camera": "ok"})).await;

        let handle = StatusPoller::new(&fast_config(&server)).unwrap().spawn();
        tokio::time::sleep(Duration::from_millis(560)).await;
        handle.shutdown();

        let data = request_count(&server, "/data").await;
        let health = request_count(&server, "/health").await;
        assert!(data >= 4, "expected at least 4 data requests, got {data}");
        assert!((2..=4).contains(&health), "expected 2-4 health requests, got {health}");
        assert!(data > health);
    }

    /// Slow responses do not hold back later ticks: requests overlap.
    #[tokio::test]
    async fn test_slow_requests_overlap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"recent_detections": []}))
                    .set_delay(Duration::from_millis(400)),
            )
            .mount(&server)
            .await;
        mount_json(&server, "/health", 200, json!({})).await;

        let handle = StatusPoller::new(&fast_config(&server)).unwrap().spawn();
        tokio::time::sleep(Duration::from_millis(350)).await;

        // No response has arrived yet, but several requests are in flight
        let data = request_count(&server, "/data").await;
        assert!(data >= 3, "expected overlapping data requests, got {data}");
        assert!(handle.snapshot().data_updated_at.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_stops_polling() {
        let server = MockServer::start().await;
        mount_json(&server, "/data", 200, json!({})).await;
        mount_json(&server, "/health", 200, json!({})).await;

        let handle = StatusPoller::new(&fast_config(&server)).unwrap().spawn();
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.shutdown();
        assert!(!handle.is_running());

        tokio::time::sleep(Duration::from_millis(50)).await;
        let stopped_at = request_count(&server, "/data").await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(request_count(&server, "/data").await, stopped_at);
    }

    #[tokio::test]
    async fn test_dropping_handle_stops_polling() {
        let server = MockServer::start().await;
        mount_json(&server, "/data", 200, json!({})).await;
        mount_json(&server, "/health", 200, json!({})).await;

        let handle = StatusPoller::new(&fast_config(&server)).unwrap().spawn();
        tokio::time::sleep(Duration::from_millis(150)).await;
        drop(handle);

        tokio::time::sleep(Duration::from_millis(50)).await;
        let stopped_at = request_count(&server, "/data").await;
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(request_count(&server, "/data").await, stopped_at);
    }
}
