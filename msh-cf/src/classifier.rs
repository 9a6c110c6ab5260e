//! Keyword and explicit-flag classifier for tracks and playlists
//!
//! Tracks and playlists are judged by different rules:
//!
//! - **Tracks** are scored, never hard-blocked on keywords. Each matched
//!   educational term adds [`EDUCATIONAL_WEIGHT`]; explicit tracks are
//!   marked medium risk and stay admissible under the educational
//!   exemption.
//! - **Playlists** pass an AND-gate: at least one educational match, zero
//!   blocked matches, and not explicit.
//!
//! The live player check is a third, separate rule (see
//! [`crate::pipeline::FilterPipeline::live_gate`]). The three are deliberately not unified.

use std::sync::Arc;

use crate::model::{ClassificationResult, Playlist, RiskLevel, Track};
use crate::rules::KeywordRuleSet;

/// Score added per matched educational term
pub const EDUCATIONAL_WEIGHT: u32 = 10;

pub const REASON_EXPLICIT: &str = "Contains explicit language - requires user consent";
pub const REASON_EXEMPTION: &str = "Allowed under educational exemption with user consent";
pub const REASON_EXPLICIT_BLOCKED: &str =
    "Explicit content blocked: educational exemption disabled";
pub const REASON_NO_EDUCATIONAL_MATCH: &str = "No educational keywords matched";

/// Classifier bound to one rule set and explicit-content policy
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Arc<KeywordRuleSet>,
    allow_explicit_with_educational_context: bool,
}

impl Classifier {
    pub fn new(rules: Arc<KeywordRuleSet>, allow_explicit_with_educational_context: bool) -> Self {
        Self {
            rules,
            allow_explicit_with_educational_context,
        }
    }

    /// Score a single track
    pub fn classify_track(&self, track: &Track) -> ClassificationResult {
        let text = track_search_text(track);
        let mut result = ClassificationResult {
            is_explicit: track.is_explicit(),
            admitted: true,
            ..Default::default()
        };

        self.score_educational(&text, &mut result);

        if result.is_explicit {
            result.risk_level = RiskLevel::Medium;
            result.reasons.push(REASON_EXPLICIT.to_string());

            if self.allow_explicit_with_educational_context {
                result.reasons.push(REASON_EXEMPTION.to_string());
            } else {
                result.risk_level = RiskLevel::High;
                result.admitted = false;
                result.reasons.push(REASON_EXPLICIT_BLOCKED.to_string());
            }
        }

        result
    }

    /// Classify a playlist under the discovery AND-gate
    pub fn classify_playlist(&self, playlist: &Playlist) -> ClassificationResult {
        let text = playlist_search_text(playlist);
        let mut result = ClassificationResult {
            is_explicit: playlist.is_explicit(),
            ..Default::default()
        };

        self.score_educational(&text, &mut result);

        let mut blocked_hits = 0usize;
        for term in self.rules.blocked_matches(&text) {
            blocked_hits += 1;
            result.reasons.push(format!("Blocked keyword: {}", term));
        }
        if blocked_hits > 0 {
            result.risk_level = RiskLevel::High;
        }

        if result.is_explicit {
            result.risk_level = result.risk_level.max(RiskLevel::Medium);
            result.reasons.push(REASON_EXPLICIT.to_string());
        }

        if result.educational_value == 0 {
            result.reasons.push(REASON_NO_EDUCATIONAL_MATCH.to_string());
        }

        result.admitted = result.educational_value > 0 && blocked_hits == 0 && !result.is_explicit;
        result
    }

    /// First blocked term found in a track's name or any artist name
    pub fn blocked_term_in_track(&self, track: &Track) -> Option<&str> {
        let mut fields = vec![track.name()];
        fields.extend(track.artist_names());
        let text = search_text(&fields);
        let mut hits = self.rules.blocked_matches(&text);
        hits.next()
    }

    fn score_educational(&self, text: &str, result: &mut ClassificationResult) {
        for term in self.rules.educational_matches(text) {
            result.educational_value += EDUCATIONAL_WEIGHT;
            result.reasons.push(format!("Educational content: {}", term));
        }
    }
}

/// Fields are joined by a newline so no term can match across two of them
const FIELD_SEPARATOR: &str = "\n";

fn search_text(fields: &[&str]) -> String {
    fields.join(FIELD_SEPARATOR).to_lowercase()
}

/// Lowercased name, primary artist and genres, one per line
pub fn track_search_text(track: &Track) -> String {
    let mut fields = vec![track.name(), track.primary_artist()];
    fields.extend(track.genres().iter().map(String::as_str));
    search_text(&fields)
}

/// Lowercased name and description, one per line
pub fn playlist_search_text(playlist: &Playlist) -> String {
    search_text(&[playlist.name(), playlist.description()])
}
