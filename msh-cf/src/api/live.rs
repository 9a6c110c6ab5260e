//! Live track gate
//!
//! Called by the player on every track change. The answer is a hard
//! play/skip; unlike the batch path there is no score and the educational
//! exemption does not apply.

use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

use super::request::parse_object;
use super::ApiError;
use crate::model::Track;
use crate::pipeline::LiveDecision;
use crate::AppState;

pub const TRACK_REQUIRED: &str = "Track object is required";

/// POST /api/live-gate
///
/// Body: a track object, or `{track: {...}}` as sent by the player SDK's
/// state-change payload.
pub async fn live_gate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<LiveDecision>, ApiError> {
    let mut request = parse_object(&body, TRACK_REQUIRED)?;

    let track_value = match request.get_mut("track").map(Value::take) {
        Some(inner @ Value::Object(_)) => inner,
        Some(_) => return Err(ApiError::bad_request(TRACK_REQUIRED)),
        None => request,
    };

    let track: Track = serde_json::from_value(track_value)
        .map_err(|e| ApiError::bad_request(format!("Invalid track: {}", e)))?;

    Ok(Json(state.pipeline.live_gate(&track)))
}
