//! Batch track classification
//!
//! POST /api/content-filter annotates every submitted track with its
//! classification and returns recommendations, a summary and the
//! institution's compliance block.

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use tracing::{debug, info};

use super::request::{parse_object, take_items};
use super::ApiError;
use crate::model::Track;
use crate::pipeline::BatchOutcome;
use crate::{AppState, ComplianceInfo};

pub const TRACKS_REQUIRED: &str = "Tracks array is required";

/// Batch response: pipeline outcome plus compliance block
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFilterResponse {
    #[serde(flatten)]
    pub outcome: BatchOutcome,
    pub compliance_info: ComplianceInfo,
}

/// POST /api/content-filter
///
/// Body: `{tracks: [...], userInfo?, accessToken?}`. The access token is
/// accepted for compatibility and never read or logged.
pub async fn filter_content(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ContentFilterResponse>, ApiError> {
    let mut request = parse_object(&body, TRACKS_REQUIRED)?;
    let tracks: Vec<Track> = take_items(&mut request, "tracks", "track", TRACKS_REQUIRED)?;
    let user_info = request.get("userInfo").filter(|v| !v.is_null());

    debug!(
        "Content filter request: {} tracks, user context {}, access token {}",
        tracks.len(),
        if user_info.is_some() { "present" } else { "absent" },
        if request.get("accessToken").is_some() { "present" } else { "absent" },
    );

    let outcome = state.pipeline.filter_tracks(tracks, user_info);

    info!(
        "Classified {} tracks ({} explicit, {} educational)",
        outcome.summary.total_tracks,
        outcome.summary.explicit_tracks,
        outcome.summary.educational_tracks
    );

    Ok(Json(ContentFilterResponse {
        outcome,
        compliance_info: (*state.compliance_info).clone(),
    }))
}
