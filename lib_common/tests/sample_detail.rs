//! Loopback integration tests for the sample detail context.
//!
//! A minimal HTTP/1.1 stub is bound to an ephemeral local port for each
//! test. It serves the record, violation, and image endpoints for one
//! sample, tracks how often each is fetched, and flips the stored
//! classification on a successful PUT, so the reload-from-backend contract
//! can be asserted from the outside.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use lib_common::{BufferLedger, DapurApi, SampleDetail};

struct BackendStub {
    is_clean: Mutex<bool>,
    record_fetches: AtomicUsize,
    image_fetches: AtomicUsize,
    reject_updates: bool,
}

impl BackendStub {
    fn new(reject_updates: bool) -> Arc<Self> {
        Arc::new(Self {
            is_clean: Mutex::new(false),
            record_fetches: AtomicUsize::new(0),
            image_fetches: AtomicUsize::new(0),
            reject_updates,
        })
    }

    fn respond(&self, method: &str, path: &str) -> (u16, &'static str, Vec<u8>) {
        match (method, path) {
            ("GET", "/sample/7") => {
                self.record_fetches.fetch_add(1, Ordering::SeqCst);
                let is_clean = *self.is_clean.lock().unwrap();
                let body = format!(
                    r#"{{"message":"ok","success":true,"data":{{"id":7,"created_at":"2024-03-05T08:30:00Z","is_clean":{is_clean}}}}}"#,
                );
                (200, "application/json", body.into_bytes())
            }
            ("GET", "/violation/sample/7") => (
                200,
                "application/json",
                br#"{"data":[{"id":1,"name":"missing_hairnet","total":2}]}"#.to_vec(),
            ),
            ("GET", "/image/raw/7") => {
                self.image_fetches.fetch_add(1, Ordering::SeqCst);
                (200, "image/jpeg", b"raw-bytes".to_vec())
            }
            ("GET", "/image/result/7") => (200, "image/jpeg", b"result-bytes".to_vec()),
            ("PUT", "/sample/7") => {
                if self.reject_updates {
                    (500, "application/json", br#"{"success":false}"#.to_vec())
                } else {
                    let mut is_clean = self.is_clean.lock().unwrap();
                    *is_clean = !*is_clean;
                    (
                        200,
                        "application/json",
                        br#"{"message":"updated","success":true,"data":null}"#.to_vec(),
                    )
                }
            }
            ("DELETE", "/sample/7") => (
                200,
                "application/json",
                br#"{"message":"deleted","success":true,"data":null}"#.to_vec(),
            ),
            _ => (404, "application/json", br#"{"message":"not found"}"#.to_vec()),
        }
    }
}

/// Serves one-request-per-connection HTTP until the listener is dropped.
async fn serve(listener: TcpListener, stub: Arc<BackendStub>) {
    loop {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        let stub = Arc::clone(&stub);
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 2048];
            let request_line = loop {
                let n = match stream.read(&mut chunk).await {
                    Ok(0) | Err(_) => return,
                    Ok(n) => n,
                };
                buf.extend_from_slice(&chunk[..n]);
                if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&buf[..end]).into_owned();
                    let content_length = head
                        .lines()
                        .filter_map(|line| line.split_once(':'))
                        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    // Drain the body before answering, or the client may see
                    // a reset instead of the response.
                    while buf.len() < end + 4 + content_length {
                        let n = match stream.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => n,
                        };
                        buf.extend_from_slice(&chunk[..n]);
                    }
                    break head.lines().next().unwrap_or_default().to_string();
                }
            };

            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_string();
            let path = parts
                .next()
                .unwrap_or_default()
                .split('?')
                .next()
                .unwrap_or_default()
                .to_string();

            let (status, content_type, body) = stub.respond(&method, &path);
            let reason = match status {
                200 => "OK",
                404 => "Not Found",
                _ => "Internal Server Error",
            };
            let head = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(&body).await;
            let _ = stream.shutdown().await;
        });
    }
}

async fn start(reject_updates: bool) -> (DapurApi, Arc<BackendStub>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let stub = BackendStub::new(reject_updates);
    tokio::spawn(serve(listener, Arc::clone(&stub)));
    (DapurApi::new(&format!("http://{addr}/")), stub)
}

#[tokio::test]
async fn load_all_populates_every_piece() {
    let (api, _stub) = start(false).await;
    let ledger = BufferLedger::new();
    let mut detail = SampleDetail::new(7, &ledger);

    detail.load_all(&api).await;

    assert!(!detail.sample.as_ref().unwrap().is_clean);
    assert_eq!(detail.violations.len(), 1);
    assert_eq!(detail.violations[0].name, "missing_hairnet");
    assert_eq!(detail.raw.latest().unwrap().as_ref(), b"raw-bytes");
    assert_eq!(detail.result.latest().unwrap().as_ref(), b"result-bytes");
    assert_eq!(ledger.live_handles(), 2);
}

#[tokio::test]
async fn successful_toggle_reloads_from_the_backend() {
    let (api, stub) = start(false).await;
    let ledger = BufferLedger::new();
    let mut detail = SampleDetail::new(7, &ledger);
    detail.load_all(&api).await;

    let records_before = stub.record_fetches.load(Ordering::SeqCst);
    let images_before = stub.image_fetches.load(Ordering::SeqCst);

    assert!(detail.toggle_clean(&api).await);

    // The new classification comes from the backend's reconfirmation, not a
    // local flip, and the whole context is refetched.
    assert!(detail.sample.as_ref().unwrap().is_clean);
    assert_eq!(stub.record_fetches.load(Ordering::SeqCst), records_before + 1);
    assert_eq!(stub.image_fetches.load(Ordering::SeqCst), images_before + 1);
    assert_eq!(ledger.live_handles(), 2);
}

#[tokio::test]
async fn rejected_toggle_leaves_state_untouched() {
    let (api, stub) = start(true).await;
    let ledger = BufferLedger::new();
    let mut detail = SampleDetail::new(7, &ledger);
    detail.load_all(&api).await;

    let records_before = stub.record_fetches.load(Ordering::SeqCst);

    assert!(!detail.toggle_clean(&api).await);

    assert!(!detail.sample.as_ref().unwrap().is_clean);
    assert_eq!(stub.record_fetches.load(Ordering::SeqCst), records_before);
    assert_eq!(ledger.live_handles(), 2);
}

#[tokio::test]
async fn delete_releases_both_image_slots() {
    let (api, _stub) = start(false).await;
    let ledger = BufferLedger::new();
    let mut detail = SampleDetail::new(7, &ledger);
    detail.load_all(&api).await;
    assert_eq!(ledger.live_handles(), 2);

    assert!(detail.delete(&api).await);

    assert!(detail.sample.is_none());
    assert!(detail.violations.is_empty());
    assert!(!detail.raw.is_occupied());
    assert!(!detail.result.is_occupied());
    assert_eq!(ledger.live_handles(), 0);
}
