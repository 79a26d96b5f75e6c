//! Live update surfaces: the SSE stream and the WebSocket endpoint.

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use broker_dashboard::{DashboardConfig, DashboardServer, LiveUpdate};
use broker_metrics::Snapshot;
use futures::StreamExt;
use http_body_util::BodyExt;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::{connect_async, tungstenite, MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

fn snapshot(clients: u64) -> Snapshot {
    Snapshot {
        connected_clients: clients,
        subscriptions: clients * 2,
        ..Snapshot::default()
    }
}

struct RunningServer {
    server: DashboardServer,
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
}

impl RunningServer {
    async fn start(config: DashboardConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = DashboardServer::new(config).unwrap();
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();

        let running = server.clone();
        tokio::spawn(async move {
            running
                .serve_on(listener, async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        Self {
            server,
            addr,
            shutdown,
        }
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/api/ws", self.addr)
    }

    fn stop(self) {
        let _ = self.shutdown.send(());
    }
}

async fn next_update(client: &mut Client) -> LiveUpdate {
    let message = tokio::time::timeout(Duration::from_secs(2), client.next())
        .await
        .expect("no frame within timeout")
        .expect("connection closed")
        .unwrap();
    serde_json::from_str(message.to_text().unwrap()).unwrap()
}

#[tokio::test]
async fn sse_stream_delivers_history_updates() {
    let server = DashboardServer::new(DashboardConfig::default()).unwrap();
    let state = server.state();

    let request = Request::builder()
        .uri("/api/events")
        .body(Body::empty())
        .unwrap();
    let response = server.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    state.ingest(Some(snapshot(7)));

    let mut body = response.into_body();
    let frame = tokio::time::timeout(Duration::from_secs(2), body.frame())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();

    assert!(text.starts_with("event: history_updated\n"), "{text}");
    let data = text
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .unwrap();
    match serde_json::from_str::<LiveUpdate>(data).unwrap() {
        LiveUpdate::HistoryUpdated { history } => {
            assert_eq!(history.len(), 1);
            assert_eq!(history.connections[0].clients, 7);
        }
        other => panic!("unexpected update: {other:?}"),
    }
}

#[tokio::test]
async fn ws_over_connection_limit_is_unavailable() {
    let running = RunningServer::start(DashboardConfig::default().with_max_ws_connections(0)).await;

    match connect_async(running.ws_url()).await {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), 503);
            if let Some(body) = response.body() {
                assert!(String::from_utf8_lossy(body).contains("too_many_connections"));
            }
        }
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("upgrade should have been refused"),
    }

    assert_eq!(running.server.ws_connection_count(), 0);
    running.stop();
}

#[tokio::test]
async fn ws_sends_current_history_then_updates() {
    let running = RunningServer::start(DashboardConfig::default()).await;
    let state = running.server.state();
    state.ingest(Some(snapshot(1)));
    state.ingest(Some(snapshot(2)));

    let (mut client, _) = connect_async(running.ws_url()).await.unwrap();

    match next_update(&mut client).await {
        LiveUpdate::HistoryUpdated { history } => {
            assert_eq!(history, state.get_history());
            assert_eq!(history.len(), 2);
        }
        other => panic!("unexpected first frame: {other:?}"),
    }

    // The client is subscribed before its first frame is sent.
    state.ingest(Some(snapshot(3)));

    match next_update(&mut client).await {
        LiveUpdate::HistoryUpdated { history } => {
            assert_eq!(history.len(), 3);
            assert_eq!(history.connections[2].clients, 3);
        }
        other => panic!("unexpected update: {other:?}"),
    }

    running.stop();
}

#[tokio::test]
async fn ws_close_releases_slot_and_subscription() {
    let running = RunningServer::start(DashboardConfig::default()).await;
    let state = running.server.state();

    let (mut client, _) = connect_async(running.ws_url()).await.unwrap();
    next_update(&mut client).await;

    assert_eq!(state.ws_connection_count(), 1);
    assert_eq!(state.subscriber_count(), 1);

    client.close(None).await.unwrap();

    tokio::time::timeout(Duration::from_secs(2), async {
        while state.ws_connection_count() > 0 || state.subscriber_count() > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("connection slot or subscription not released");

    running.stop();
}

#[tokio::test]
async fn ws_zero_ping_interval_still_sends_heartbeats() {
    let mut config = DashboardConfig::default();
    config.ws_ping_interval = Duration::ZERO;
    let running = RunningServer::start(config).await;

    let (mut client, _) = connect_async(running.ws_url()).await.unwrap();

    assert!(matches!(
        next_update(&mut client).await,
        LiveUpdate::HistoryUpdated { .. }
    ));
    assert!(matches!(
        next_update(&mut client).await,
        LiveUpdate::Heartbeat { .. }
    ));

    let _ = client.close(None).await;
    running.stop();
}
