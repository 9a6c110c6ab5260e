//! Server-Sent Events feed of compliance log entries

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

use crate::{AppState, MODULE_NAME};

/// GET /api/compliance/events
///
/// Streams one `ComplianceEvent` per classified item from the moment the
/// client connects. Earlier entries are not replayed.
pub async fn compliance_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    msh_common::sse::compliance_event_stream(MODULE_NAME, state.bus.subscribe())
}
