//! Playlist discovery
//!
//! POST /api/playlists/discover returns either the admitted playlists or
//! the full fallback catalog. GET /api/playlists/fallback exposes the
//! catalog directly.

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use tracing::info;

use super::request::{parse_object, take_items};
use super::ApiError;
use crate::fallback::{self, FallbackPlaylist};
use crate::model::Playlist;
use crate::pipeline::Discovery;
use crate::AppState;

pub const PLAYLISTS_REQUIRED: &str = "Playlists array is required";

/// POST /api/playlists/discover
///
/// Body: `{playlists: [...], userInfo?}`.
/// Response: `{source: "live" | "fallback", playlists: [...]}`.
pub async fn discover_playlists(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Discovery>, ApiError> {
    let mut request = parse_object(&body, PLAYLISTS_REQUIRED)?;
    let playlists: Vec<Playlist> =
        take_items(&mut request, "playlists", "playlist", PLAYLISTS_REQUIRED)?;
    let user_info = request.get("userInfo").filter(|v| !v.is_null());

    let evaluated = playlists.len();
    let discovery = state.pipeline.discover_playlists(playlists, user_info);

    match &discovery {
        Discovery::Live(admitted) => info!(
            "Playlist discovery: {} of {} admitted",
            admitted.len(),
            evaluated
        ),
        Discovery::Fallback(_) => info!(
            "Playlist discovery: 0 of {} admitted, serving fallback catalog",
            evaluated
        ),
    }

    Ok(Json(discovery))
}

#[derive(Debug, Serialize)]
pub struct FallbackResponse {
    pub playlists: &'static [FallbackPlaylist],
}

/// GET /api/playlists/fallback
pub async fn fallback_playlists() -> Json<FallbackResponse> {
    Json(FallbackResponse {
        playlists: fallback::catalog(),
    })
}
