//! Catalog item and classification types
//!
//! Incoming tracks and playlists are vendor JSON records. Only the fields
//! the classifier reads are typed; everything else is kept in `extra` and
//! echoed back untouched. Every typed field is optional so a sparse record
//! still classifies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use msh_common::events::RiskLevel;

/// Artist reference on a track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Track record as received from the client or vendor API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub explicit: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient::texts",
        skip_serializing_if = "Option::is_none"
    )]
    pub genres: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "lenient::records",
        skip_serializing_if = "Option::is_none"
    )]
    pub artists: Option<Vec<Artist>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Track {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit.unwrap_or(false)
    }

    pub fn genres(&self) -> &[String] {
        self.genres.as_deref().unwrap_or_default()
    }

    /// Name of the first listed artist, or `""`
    pub fn primary_artist(&self) -> &str {
        self.artist_names().next().unwrap_or_default()
    }

    /// Names of all listed artists, skipping artists without a name
    pub fn artist_names(&self) -> impl Iterator<Item = &str> {
        self.artists
            .iter()
            .flatten()
            .filter_map(|a| a.name.as_deref())
    }
}

/// Track count and summaries owned by a playlist
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistTracks {
    #[serde(
        default,
        deserialize_with = "lenient::count",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient::records",
        skip_serializing_if = "Option::is_none"
    )]
    pub items: Option<Vec<Track>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Playlist record as received from the client or vendor API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::flag",
        skip_serializing_if = "Option::is_none"
    )]
    pub explicit: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient::record",
        skip_serializing_if = "Option::is_none"
    )]
    pub tracks: Option<PlaylistTracks>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Playlist {
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit.unwrap_or(false)
    }

    /// Reported total, or the number of embedded summaries when absent
    pub fn track_count(&self) -> u32 {
        match &self.tracks {
            Some(PlaylistTracks { total: Some(total), .. }) => *total,
            Some(PlaylistTracks { items: Some(items), .. }) => items.len() as u32,
            _ => 0,
        }
    }
}

/// Field decoders that never reject a record
///
/// Vendor payloads are loosely typed. A value of the wrong type is coerced
/// where the meaning is obvious and otherwise treated as absent, so one bad
/// field never fails the batch it arrived in.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn coerce_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// String, with numbers and booleans rendered as text
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(coerce_text(Value::deserialize(d)?))
    }

    /// Boolean by truthiness: zero, empty string and null are false
    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            Value::Bool(b) => Some(b),
            Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
            Value::String(s) => Some(!s.is_empty()),
            Value::Array(_) | Value::Object(_) => Some(true),
        })
    }

    /// List of strings; elements without a text form are dropped
    pub fn texts<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => Some(items.into_iter().filter_map(coerce_text).collect()),
            _ => None,
        })
    }

    /// Non-negative integer count
    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(Value::deserialize(d)?
            .as_u64()
            .and_then(|n| u32::try_from(n).ok()))
    }

    /// Nested record; anything that does not decode is absent
    pub fn record<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(serde_json::from_value(Value::deserialize(d)?).ok())
    }

    /// List of records; an element that does not decode becomes the default record
    pub fn records<'de, D, T>(d: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .map(|item| serde_json::from_value(item).unwrap_or_default())
                    .collect(),
            ),
            _ => None,
        })
    }
}

/// Outcome of classifying one track or playlist
///
/// Attached next to the item it describes, never merged into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub is_explicit: bool,
    pub educational_value: u32,
    pub risk_level: RiskLevel,
    pub admitted: bool,
    pub reasons: Vec<String>,
}

impl ClassificationResult {
    /// Reasons in compliance-log form
    pub fn notes(&self) -> String {
        self.reasons.join("; ")
    }
}
