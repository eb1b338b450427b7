use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;

use alert_client::{
    AlertQueryAdapter, AlertTransport, ApiConfig, ApiRequest, CancelToken, HttpTransport,
    TransportError,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// Serves exactly one HTTP response on loopback and reports the request line it received.
fn serve_once(status: &str, body: &str) -> (HttpTransport, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
         Connection: close\r\n\r\n{body}",
        body.len()
    );
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut received = Vec::new();
        let mut chunk = [0u8; 1024];
        while !received.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut chunk).expect("read");
            if n == 0 {
                break;
            }
            received.extend_from_slice(&chunk[..n]);
        }
        let request_line = String::from_utf8_lossy(&received)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();
        tx.send(request_line).expect("send");
        stream.write_all(response.as_bytes()).expect("write");
    });

    let transport = HttpTransport::new(&ApiConfig {
        base_url: format!("http://127.0.0.1:{port}/api"),
        timeout_ms: 5_000,
    })
    .expect("transport");
    (transport, rx)
}

fn get(status: &str, body: &str) -> Result<Value, TransportError> {
    let (transport, _rx) = serve_once(status, body);
    transport.get_json(&ApiRequest::new(["alerts", "a-1"]), &CancelToken::new())
}

#[test]
fn ok_body_is_parsed_and_path_is_encoded() {
    let (transport, rx) = serve_once("200 OK", r#"{"id": "a 1"}"#);
    let body = transport
        .get_json(&ApiRequest::new(["alerts", "a 1"]), &CancelToken::new())
        .expect("ok");
    assert_eq!(body, json!({"id": "a 1"}));
    assert_eq!(rx.recv().expect("request line"), "GET /api/alerts/a%201 HTTP/1.1");
}

#[test]
fn empty_ok_body_is_null() {
    assert_eq!(get("200 OK", ""), Ok(Value::Null));
}

#[test]
fn invalid_json_is_a_decode_error() {
    assert!(matches!(get("200 OK", "{not json"), Err(TransportError::Decode(_))));
}

#[test]
fn status_codes_map_to_transport_errors() {
    assert_eq!(
        get("404 Not Found", ""),
        Err(TransportError::NotFound {
            path: "/alerts/a-1".to_string()
        })
    );
    assert_eq!(
        get("401 Unauthorized", ""),
        Err(TransportError::Unauthorized { status: 401 })
    );
    assert_eq!(
        get("403 Forbidden", ""),
        Err(TransportError::Unauthorized { status: 403 })
    );
    assert_eq!(
        get("500 Internal Server Error", ""),
        Err(TransportError::Server { status: 500 })
    );
    assert_eq!(
        get("503 Service Unavailable", ""),
        Err(TransportError::Server { status: 503 })
    );
}

#[test]
fn refused_connection_is_a_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let transport = HttpTransport::new(&ApiConfig {
        base_url: format!("http://127.0.0.1:{port}"),
        timeout_ms: 2_000,
    })
    .expect("transport");
    let err = transport
        .get_json(&ApiRequest::new(["alerts"]), &CancelToken::new())
        .expect_err("nothing listening");
    assert!(matches!(err, TransportError::Network(_)));
    assert!(err.is_retryable());
}

#[test]
fn adapter_over_http_distinguishes_missing_from_failed() {
    let (transport, _rx) = serve_once("404 Not Found", "");
    let adapter = AlertQueryAdapter::new(transport);
    assert_eq!(adapter.get_alert("a-1", &CancelToken::new()), Ok(None));

    let (transport, _rx) = serve_once("403 Forbidden", "");
    let adapter = AlertQueryAdapter::new(transport);
    assert_eq!(
        adapter.get_alert("a-1", &CancelToken::new()),
        Err(TransportError::Unauthorized { status: 403 })
    );

    let (transport, _rx) = serve_once("500 Internal Server Error", "");
    let adapter = AlertQueryAdapter::new(transport);
    assert_eq!(
        adapter.get_alert("a-1", &CancelToken::new()),
        Err(TransportError::Server { status: 500 })
    );

    let (transport, _rx) = serve_once("200 OK", r#"{"id": "a-1", "severity": "high"}"#);
    let adapter = AlertQueryAdapter::new(transport);
    let alert = adapter
        .get_alert("a-1", &CancelToken::new())
        .expect("ok")
        .expect("present");
    assert_eq!(alert.id, "a-1");
}
