//! Server-Sent Events (SSE) utilities
//!
//! Shared SSE implementations for Music Study Hub services.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::events::ComplianceEvent;

/// Interval between heartbeat comments on idle streams
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Stream compliance events from a bus subscription to an SSE client
///
/// Sends an initial `ConnectionStatus` event, then one `ComplianceEvent`
/// per entry received. A lagging client is told how many entries it missed
/// via a `Lagged` event and keeps streaming; the stream ends when the bus
/// is dropped.
///
/// # Example
/// ```rust,ignore
/// pub async fn compliance_events(
///     State(state): State<AppState>,
/// ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
///     msh_common::sse::compliance_event_stream("msh-cf", state.bus.subscribe())
/// }
/// ```
pub fn compliance_event_stream(
    service_name: &'static str,
    mut rx: broadcast::Receiver<ComplianceEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to {} compliance events", service_name);

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(entry) => {
                    match Event::default().event("ComplianceEvent").json_data(&entry) {
                        Ok(event) => yield Ok(event),
                        Err(e) => warn!("SSE: failed to encode compliance event: {}", e),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!("SSE: {} client lagged by {} events", service_name, skipped);
                    yield Ok(Event::default()
                        .event("Lagged")
                        .data(skipped.to_string()));
                }
                Err(RecvError::Closed) => {
                    info!("SSE: {} compliance bus closed, ending stream", service_name);
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}
