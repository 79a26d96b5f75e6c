//! End-to-end tests: snapshots pushed through the feed, read back over HTTP.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use broker_dashboard::{DashboardConfig, DashboardServer, LiveUpdate};
use broker_metrics::Snapshot;
use http_body_util::BodyExt;
use tower::ServiceExt;

fn snapshot(n: u64) -> Snapshot {
    Snapshot {
        connected_clients: n,
        subscriptions: n * 3,
        message_rate_published: n as f64 + 0.4,
        message_rate_received: n as f64 + 0.6,
        throughput_inbound: (n * 1024) as f64,
        throughput_outbound: 1536.0,
        ..Snapshot::default()
    }
}

async fn get_json(server: &DashboardServer, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = server.router().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
}

/// Push events and wait until the feed task has recorded `expected` updates.
async fn push_all(server: &DashboardServer, events: Vec<Option<Snapshot>>, expected: u64) {
    let feed = server.feed();
    for event in events {
        feed.push(event).await.unwrap();
    }

    let state = server.state();
    tokio::time::timeout(Duration::from_secs(2), async {
        while state.get_history().updates < expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn thirty_five_snapshots_leave_the_last_thirty() {
    let server = DashboardServer::new(DashboardConfig::default()).unwrap();
    push_all(&server, (1..=35).map(|n| Some(snapshot(n))).collect(), 35).await;

    let (status, json) = get_json(&server, "/api/history").await;
    assert_eq!(status, StatusCode::OK);

    for family in ["rates", "throughput", "connections"] {
        assert_eq!(json[family].as_array().unwrap().len(), 30, "{family}");
    }

    assert_eq!(json["connections"][0]["clients"], 6);
    assert_eq!(json["connections"][29]["clients"], 35);
    assert_eq!(json["connections"][29]["subscriptions"], 105);
    assert_eq!(json["rates"][0]["published"], 6.0);
    assert_eq!(json["rates"][0]["received"], 7.0);
    assert_eq!(json["throughput"][0]["inbound"], 6.0);
    assert_eq!(json["throughput"][0]["outbound"], 2.0);
}

#[tokio::test]
async fn null_events_do_not_create_points() {
    let server = DashboardServer::new(DashboardConfig::default()).unwrap();
    push_all(
        &server,
        vec![None, Some(snapshot(1)), None, None, Some(snapshot(2)), None],
        2,
    )
    .await;

    let (_, json) = get_json(&server, "/api/history/connections").await;

    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["clients"], 1);
    assert_eq!(points[1]["clients"], 2);
}

#[tokio::test]
async fn subscribers_see_every_recorded_snapshot() {
    let server = DashboardServer::new(DashboardConfig::default().with_history_capacity(5)).unwrap();
    let mut rx = server.state().subscribe();

    push_all(&server, (1..=8).map(|n| Some(snapshot(n))).collect(), 8).await;

    let mut lengths = Vec::new();
    for _ in 0..8 {
        match rx.recv().await.unwrap() {
            LiveUpdate::HistoryUpdated { history } => {
                assert_eq!(history.rates.len(), history.connections.len());
                lengths.push(history.len());
            }
            LiveUpdate::Heartbeat { .. } => {}
        }
    }

    assert_eq!(lengths, vec![1, 2, 3, 4, 5, 5, 5, 5]);
}

#[tokio::test]
async fn raw_snapshot_is_the_last_one_recorded() {
    let server = DashboardServer::new(DashboardConfig::default()).unwrap();
    push_all(&server, vec![Some(snapshot(3)), None], 1).await;

    // Give the trailing `None` time to drain; it must not clear the snapshot.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let (status, json) = get_json(&server, "/api/snapshot").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["connectedClients"], 3);
}
