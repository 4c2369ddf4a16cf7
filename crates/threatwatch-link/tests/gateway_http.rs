//! CommandGateway against a local HTTP server that returns canned responses.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use threatwatch_core::{Position, UnitStatus};
use threatwatch_link::{CommandGateway, LinkConfig, LinkError, RegisterUnit, TelemetryUpdate};

struct Captured {
    request_line: String,
    body: serde_json::Value,
}

/// Serve exactly one request, answer with `status` and `body`, and hand the
/// request back to the test.
async fn one_shot_server(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending body");
            buf.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        let body_bytes = &buf[header_end..header_end + content_length];
        let _ = tx.send(Captured {
            request_line: head.lines().next().unwrap_or_default().to_string(),
            body: serde_json::from_slice(body_bytes).unwrap_or(serde_json::Value::Null),
        });
    });

    (format!("http://{addr}/api"), rx)
}

fn gateway(api_url: String) -> CommandGateway {
    let config = LinkConfig {
        api_url,
        request_timeout: Duration::from_secs(5),
        ..LinkConfig::default()
    };
    CommandGateway::new(config).unwrap()
}

const UNIT_JSON: &str = r#"{"unit_id":"alpha-1","label":"Alpha","lat":37.77,"lon":-122.41,"speed_mps":0.0,"direction_deg":0.0,"status":"idle","anomaly_score":0.0,"risk_score":0.0,"last_update":"2026-01-01T00:00:00Z","destination":null}"#;

#[tokio::test]
async fn assign_destination_posts_expected_body() {
    let (url, captured) = one_shot_server("200 OK", r#"{"status":"ok"}"#).await;
    gateway(url)
        .assign_destination("alpha-1", Position::new(37.81, -122.45))
        .await
        .unwrap();

    let captured = captured.await.unwrap();
    assert_eq!(captured.request_line, "POST /api/assign-destination HTTP/1.1");
    assert_eq!(
        captured.body,
        serde_json::json!({"unit_id": "alpha-1", "destination": {"lat": 37.81, "lon": -122.45}})
    );
}

#[tokio::test]
async fn rejection_carries_backend_detail_verbatim() {
    let (url, _captured) = one_shot_server("404 Not Found", r#"{"detail":"'Unit alpha-9 not found'"}"#).await;
    let err = gateway(url)
        .assign_destination("alpha-9", Position::new(0.0, 0.0))
        .await
        .unwrap_err();
    match err {
        LinkError::Rejected(detail) => assert_eq!(detail, "'Unit alpha-9 not found'"),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_status() {
    let (url, _captured) = one_shot_server("502 Bad Gateway", "upstream down").await;
    let err = gateway(url)
        .assign_destination("alpha-1", Position::new(0.0, 0.0))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Request failed (502)");
}

#[tokio::test]
async fn register_unit_returns_echoed_unit() {
    let (url, captured) = one_shot_server("201 Created", UNIT_JSON).await;
    let request = RegisterUnit {
        unit_id: "alpha-1".into(),
        label: Some("Alpha".into()),
        position: Position::new(37.77, -122.41),
        speed_mps: 0.0,
        direction_deg: 0.0,
    };
    let unit = gateway(url).register_unit(&request).await.unwrap();
    assert_eq!(unit.unit_id, "alpha-1");
    assert_eq!(unit.label.as_deref(), Some("Alpha"));
    assert_eq!(unit.position, Position::new(37.77, -122.41));

    let captured = captured.await.unwrap();
    assert_eq!(captured.request_line, "POST /api/register-unit HTTP/1.1");
    assert_eq!(captured.body["position"]["lon"], -122.41);
}

#[tokio::test]
async fn update_telemetry_sends_only_present_fields() {
    let (url, captured) = one_shot_server("200 OK", UNIT_JSON).await;
    let update = TelemetryUpdate {
        status: Some(UnitStatus::Offline),
        ..TelemetryUpdate::new("alpha-1")
    };
    gateway(url).update_telemetry(&update).await.unwrap();

    let captured = captured.await.unwrap();
    assert_eq!(captured.request_line, "POST /api/update-telemetry HTTP/1.1");
    assert_eq!(captured.body, serde_json::json!({"unit_id": "alpha-1", "status": "offline"}));
}

#[tokio::test]
async fn unreachable_backend_is_an_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = gateway(format!("http://{addr}/api"))
        .assign_destination("alpha-1", Position::new(0.0, 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, LinkError::Http(_)), "got {err:?}");
}

#[tokio::test]
async fn slow_backend_hits_request_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let config = LinkConfig {
        api_url: format!("http://{addr}/api"),
        request_timeout: Duration::from_millis(200),
        ..LinkConfig::default()
    };
    let err = CommandGateway::new(config)
        .unwrap()
        .assign_destination("alpha-1", Position::new(0.0, 0.0))
        .await
        .unwrap_err();
    match err {
        LinkError::Http(e) => assert!(e.is_timeout(), "expected timeout, got {e}"),
        other => panic!("expected http timeout, got {other:?}"),
    }
}
