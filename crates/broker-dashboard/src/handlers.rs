//! HTTP request handlers for the dashboard API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use broker_metrics::{
    ConnectionPoint, HistoryView, MetricFamily, RatePoint, SeriesPoint, Snapshot, ThroughputPoint,
};
use futures::stream::Stream;
use serde::Serialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::error::{DashboardError, DashboardResult};
use crate::state::DashboardState;
use crate::types::FamilyHistoryResponse;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status message.
    pub status: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
}

/// Handle GET /api/health - health check endpoint.
pub async fn health_check(State(state): State<Arc<DashboardState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Handle GET /api/history - all three series.
pub async fn get_history(State(state): State<Arc<DashboardState>>) -> Json<HistoryView> {
    Json(state.get_history())
}

/// Handle GET /api/history/:family - one series.
pub async fn get_family_history(
    State(state): State<Arc<DashboardState>>,
    Path(family): Path<String>,
) -> DashboardResult<Json<FamilyHistoryResponse>> {
    let family: MetricFamily = family.parse()?;
    let history = state.get_history();

    Ok(Json(FamilyHistoryResponse {
        family,
        series: series_names(family),
        capacity: history.capacity,
        points: history.family(family),
    }))
}

/// Handle GET /api/snapshot - most recent raw snapshot.
pub async fn get_snapshot(
    State(state): State<Arc<DashboardState>>,
) -> DashboardResult<Json<Snapshot>> {
    state
        .get_last_snapshot()
        .map(Json)
        .ok_or_else(|| DashboardError::NotFound("snapshot".to_string()))
}

/// Handle GET /api/events - SSE stream of all live updates.
pub async fn stream_events(
    State(state): State<Arc<DashboardState>>,
) -> Sse<impl Stream<Item = Result<Event, std::convert::Infallible>>> {
    let update_rx = state.subscribe();

    let stream = BroadcastStream::new(update_rx).filter_map(|result| match result {
        Ok(update) => {
            let event_type = update.event_type();
            serde_json::to_string(&update)
                .ok()
                .map(|data| Ok(Event::default().event(event_type).data(data)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

const fn series_names(family: MetricFamily) -> &'static [&'static str] {
    match family {
        MetricFamily::Rate => RatePoint::SERIES,
        MetricFamily::Throughput => ThroughputPoint::SERIES,
        MetricFamily::Connections => ConnectionPoint::SERIES,
    }
}
