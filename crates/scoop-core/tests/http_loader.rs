//! Tests for [`HttpLoader`] against a local one-shot HTTP server.

use std::time::Duration;

use scoop_core::{HttpLoader, LoadError, LoaderConfig, PayloadFormat, RemoteLoader};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const PLIST: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<plist version=\"1.0\"><array>\
<dict><key>name</key><string>Vanilla</string><key>topColor</key><string>F7F2E1</string></dict>\
<dict><key>name</key><string>Chocolate</string></dict>\
</array></plist>";

/// Serve a single canned response; the raw request is sent back on the
/// returned receiver.
async fn serve_once(
    status: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (req_tx, req_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let _ = req_tx.send(String::from_utf8_lossy(&request).into_owned());

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });

    (format!("http://{addr}/downloads/Flavors.plist"), req_rx)
}

#[tokio::test]
async fn fetches_plist_by_content_type() {
    let (url, _req) = serve_once("200 OK", "application/x-plist", PLIST).await;
    let loader = HttpLoader::new(LoaderConfig::default());

    let records = loader.fetch(&url).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], "Vanilla");
    assert_eq!(records[0]["topColor"], "F7F2E1");
    assert_eq!(records[1]["name"], "Chocolate");
}

#[tokio::test]
async fn fetches_json_and_sends_user_agent() {
    let (url, req) = serve_once(
        "200 OK",
        "application/json",
        r#"[{"name":"Mint"},{"color":"brown"}]"#,
    )
    .await;
    let loader = HttpLoader::new(LoaderConfig {
        user_agent: "scoop-test/1.0".into(),
        ..LoaderConfig::default()
    });

    let records = loader.fetch(&url).await.unwrap();
    assert_eq!(records.len(), 2);

    let request = req.await.unwrap().to_ascii_lowercase();
    assert!(request.starts_with("get /downloads/flavors.plist"));
    assert!(request.contains("user-agent: scoop-test/1.0"));
}

#[tokio::test]
async fn sniffs_body_when_content_type_is_generic() {
    let (url, _req) = serve_once("200 OK", "application/octet-stream", PLIST).await;
    let loader = HttpLoader::new(LoaderConfig::default());
    assert_eq!(loader.fetch(&url).await.unwrap().len(), 2);
}

#[tokio::test]
async fn forced_format_overrides_content_type() {
    let (url, _req) = serve_once("200 OK", "text/plain", r#"[{"name":"Mint"}]"#).await;
    let loader = HttpLoader::new(LoaderConfig {
        format: PayloadFormat::Json,
        ..LoaderConfig::default()
    });
    assert_eq!(loader.fetch(&url).await.unwrap().len(), 1);
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let (url, _req) = serve_once("404 Not Found", "text/plain", "missing").await;
    let loader = HttpLoader::new(LoaderConfig::default());
    assert!(matches!(
        loader.fetch(&url).await,
        Err(LoadError::Status(404))
    ));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let (url, _req) = serve_once("200 OK", "application/json", r#"{"name":"Vanilla"}"#).await;
    let loader = HttpLoader::new(LoaderConfig::default());
    assert!(matches!(loader.fetch(&url).await, Err(LoadError::Decode(_))));
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let loader = HttpLoader::new(LoaderConfig::default());
    let result = loader.fetch(&format!("http://{addr}/Flavors.plist")).await;
    assert!(matches!(result, Err(LoadError::Transport(_))));
}

#[tokio::test]
async fn slow_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let loader = HttpLoader::new(LoaderConfig {
        timeout: Duration::from_millis(200),
        ..LoaderConfig::default()
    });
    let result = loader.fetch(&format!("http://{addr}/Flavors.plist")).await;
    assert!(matches!(result, Err(LoadError::Transport(_))));
}
