use axum::{extract::State, Json};
use tracing::{info, instrument};

use super::service::RoomStats;
use crate::shared::AppState;

/// HTTP handler reporting live rooms and open connections
///
/// GET /stats
#[instrument(name = "room_stats", skip(state))]
pub async fn room_stats(State(state): State<AppState>) -> Json<RoomStats> {
    let stats = state.coordinator.stats().await;

    info!(
        rooms = stats.rooms,
        connections = stats.connections,
        "Room stats requested"
    );

    Json(stats)
}
