//! Pre-approved playlists substituted when discovery admits nothing

use serde::Serialize;

/// One hand-curated playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackPlaylist {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Artwork path relative to the front-end's static root
    pub image: &'static str,
    /// Vendor playlist URI used to start playback
    pub uri: &'static str,
}

const CATALOG: &[FallbackPlaylist] = &[
    FallbackPlaylist {
        id: "fallback-focus",
        name: "Focus & Concentration",
        description: "Instrumental music for deep focus",
        image: "icons/focus-playlist.png",
        uri: "spotify:playlist:37i9dQZF1DWZeKCadgRdKQ",
    },
    FallbackPlaylist {
        id: "fallback-ambient",
        name: "Study Ambient",
        description: "Ambient sounds for studying",
        image: "icons/ambient-playlist.png",
        uri: "spotify:playlist:37i9dQZF1DX3Ogo9pFvBkY",
    },
    FallbackPlaylist {
        id: "fallback-classical",
        name: "Classical Study",
        description: "Classical music for learning",
        image: "icons/classical-playlist.png",
        uri: "spotify:playlist:37i9dQZF1DWWEJlAGA9gs0",
    },
];

/// The fixed fallback catalog, in display order. Never empty.
pub fn catalog() -> &'static [FallbackPlaylist] {
    CATALOG
}
