//! HTTP API handlers for msh-cf

pub mod buildinfo;
pub mod content_filter;
pub mod error;
pub mod events;
pub mod health;
pub mod live;
pub mod playlists;
mod request;

pub use buildinfo::get_build_info;
pub use content_filter::filter_content;
pub use error::{not_found, ApiError};
pub use events::compliance_events;
pub use health::health_routes;
pub use live::live_gate;
pub use playlists::{discover_playlists, fallback_playlists};
