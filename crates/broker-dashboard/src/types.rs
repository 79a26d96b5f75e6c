//! Dashboard API types for history responses and live updates.

use broker_metrics::{FamilySeries, HistoryView, MetricFamily};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response body for `GET /api/history/{family}`.
#[derive(Debug, Clone, Serialize)]
pub struct FamilyHistoryResponse {
    /// Family name.
    pub family: MetricFamily,
    /// Series names present on every point.
    pub series: &'static [&'static str],
    /// Maximum points per family.
    pub capacity: usize,
    /// Points, oldest first.
    pub points: FamilySeries,
}

/// Real-time update sent over WebSocket and SSE.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LiveUpdate {
    /// A snapshot was recorded; carries the full history after the update.
    HistoryUpdated {
        /// History after the update.
        history: HistoryView,
    },

    /// Heartbeat/ping message.
    Heartbeat {
        /// Server timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl LiveUpdate {
    /// Get the event type name for SSE.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::HistoryUpdated { .. } => "history_updated",
            Self::Heartbeat { .. } => "heartbeat",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_types() {
        let update = LiveUpdate::HistoryUpdated {
            history: HistoryView::empty(),
        };
        assert_eq!(update.event_type(), "history_updated");

        let update = LiveUpdate::Heartbeat {
            timestamp: Utc::now(),
        };
        assert_eq!(update.event_type(), "heartbeat");
    }

    #[test]
    fn test_live_update_is_adjacently_tagged() {
        let update = LiveUpdate::HistoryUpdated {
            history: HistoryView::empty(),
        };

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["type"], "HistoryUpdated");
        assert_eq!(json["data"]["history"]["capacity"], 30);

        let back: LiveUpdate = serde_json::from_value(json).unwrap();
        assert!(matches!(back, LiveUpdate::HistoryUpdated { .. }));
    }

    #[test]
    fn test_family_response_serialization() {
        let response = FamilyHistoryResponse {
            family: MetricFamily::Throughput,
            series: &["inbound", "outbound"],
            capacity: 30,
            points: FamilySeries::Throughput(Vec::new()),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["family"], "throughput");
        assert_eq!(json["series"][1], "outbound");
        assert!(json["points"].as_array().unwrap().is_empty());
    }
}
