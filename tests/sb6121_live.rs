//! SB6121 signal page served by an in-process mock modem.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use surfer::modem::sb6121::{Sb6121, SIGNAL_PATH};
use surfer::modem::ModemConfig;
use surfer::transport::{endpoint, HttpTransport};
use surfer::{CancellationToken, Channel, Error, Modem, Registry};
use tokio::net::TcpListener;

const SIGNAL_PAGE: &str = include_str!("../testdata/SB6121-signal.html");

struct MockModem {
    busy: bool,
}

async fn signal_page(State(modem): State<Arc<MockModem>>) -> impl IntoResponse {
    if modem.busy {
        return (StatusCode::INTERNAL_SERVER_ERROR, "modem busy").into_response();
    }
    ([("content-type", "text/html")], SIGNAL_PAGE).into_response()
}

async fn start(busy: bool) -> SocketAddr {
    let app = Router::new()
        .route(SIGNAL_PATH, get(signal_page))
        .with_state(Arc::new(MockModem { busy }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    addr
}

fn config(addr: SocketAddr) -> ModemConfig {
    ModemConfig {
        base_url: format!("http://{}", addr),
        timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_identify_and_poll_live_sb6121() {
    let addr = start(false).await;
    let cancel = CancellationToken::new();

    // The S33 page at `/` is a 404 here, which only rules out the S33.
    let found = Registry::with_builtin_models()
        .identify(&config(addr), &cancel)
        .await
        .unwrap();
    assert_eq!(found.name(), "SB6121");

    let signal = found.status(&cancel).await.unwrap();
    assert_eq!(signal.downstream.len(), 4);
    assert_eq!(signal.upstream.len(), 3);
    assert_eq!(signal.downstream[&Channel::from("8")].unerrored, 1392433163.0);
}

#[tokio::test]
async fn test_server_error_is_transport_error() {
    let addr = start(true).await;

    let result = Sb6121::new(config(addr))
        .status(&CancellationToken::new())
        .await;

    assert!(
        matches!(&result, Err(Error::Transport(e)) if e.status() == Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR)),
        "{:?}",
        result
    );
}

#[tokio::test]
async fn test_page_is_cut_at_limit() {
    let addr = start(false).await;
    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
    let url = endpoint(&format!("http://{}", addr), SIGNAL_PATH).unwrap();

    let body = transport
        .get_page(&url, 64, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(body, SIGNAL_PAGE.as_bytes()[..64]);
}

#[tokio::test]
async fn test_busy_page_still_fetched_when_identifying() {
    let addr = start(true).await;
    let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
    let url = endpoint(&format!("http://{}", addr), SIGNAL_PATH).unwrap();

    let body = transport
        .get_limited(&url, 1024, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(body, b"modem busy");
}
