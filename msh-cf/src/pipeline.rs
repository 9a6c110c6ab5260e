//! Filtering pipeline
//!
//! Three independent paths share one classifier and logger:
//!
//! - [`FilterPipeline::filter_tracks`]: batch annotation. Every input track
//!   comes back with its classification attached; nothing is removed.
//! - [`FilterPipeline::discover_playlists`]: AND-gate over playlists with
//!   the fallback catalog substituted when nothing passes.
//! - [`FilterPipeline::live_gate`]: hard play/skip check for the track that
//!   is currently playing.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::classifier::Classifier;
use crate::compliance::ComplianceLogger;
use crate::fallback::{self, FallbackPlaylist};
use crate::model::{ClassificationResult, Playlist, Track};

/// Keys the pipeline adds to annotated tracks; stripped from input first
const ANNOTATION_KEYS: &[&str] = &["contentAnalysis", "cipaCompliant", "educationalContext"];

/// Key the pipeline adds to admitted playlists
const PLAYLIST_ANNOTATION_KEY: &str = "contentAnalysis";

/// Track echoed back with its classification attached
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedTrack {
    #[serde(flatten)]
    pub track: Track,
    pub content_analysis: ClassificationResult,
    pub cipa_compliant: bool,
    pub educational_context: String,
}

/// Aggregate counts for one batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSummary {
    pub total_tracks: usize,
    pub explicit_tracks: usize,
    pub educational_tracks: usize,
    /// Mean educational value; 0.0 for an empty batch
    pub average_educational_value: f64,
}

/// Result of the batch path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub filtered_tracks: Vec<AnnotatedTrack>,
    pub educational_recommendations: Vec<AnnotatedTrack>,
    pub summary: FilterSummary,
}

/// Playlist echoed back with its classification attached
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedPlaylist {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub content_analysis: ClassificationResult,
}

/// Result of the playlist discovery path: live matches or the full
/// fallback catalog, never a mix and never empty
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "playlists", rename_all = "lowercase")]
pub enum Discovery {
    Live(Vec<AnnotatedPlaylist>),
    Fallback(&'static [FallbackPlaylist]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LiveAction {
    Play,
    Skip,
}

/// Play/skip verdict for the currently playing track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveDecision {
    pub admit: bool,
    pub action: LiveAction,
    pub reason: String,
}

/// Orchestrates classification, logging and aggregation
#[derive(Clone)]
pub struct FilterPipeline {
    classifier: Classifier,
    logger: ComplianceLogger,
    context_note: String,
    recommendation_limit: usize,
}

impl FilterPipeline {
    pub fn new(
        classifier: Classifier,
        logger: ComplianceLogger,
        context_note: impl Into<String>,
        recommendation_limit: usize,
    ) -> Self {
        Self {
            classifier,
            logger,
            context_note: context_note.into(),
            recommendation_limit,
        }
    }

    /// Classify, log and annotate every track in input order
    pub fn filter_tracks(&self, tracks: Vec<Track>, user_info: Option<&Value>) -> BatchOutcome {
        let filtered_tracks: Vec<AnnotatedTrack> = tracks
            .into_iter()
            .map(|mut track| {
                let content_analysis = self.classifier.classify_track(&track);
                self.logger.log_track(&track, &content_analysis, user_info);

                for key in ANNOTATION_KEYS {
                    track.extra.remove(*key);
                }
                AnnotatedTrack {
                    track,
                    content_analysis,
                    cipa_compliant: true,
                    educational_context: self.context_note.clone(),
                }
            })
            .collect();

        let educational_recommendations = recommend(&filtered_tracks, self.recommendation_limit);
        let summary = summarize(&filtered_tracks);

        debug!(
            "Filtered {} tracks: {} explicit, {} educational, {} recommended",
            summary.total_tracks,
            summary.explicit_tracks,
            summary.educational_tracks,
            educational_recommendations.len()
        );

        BatchOutcome {
            filtered_tracks,
            educational_recommendations,
            summary,
        }
    }

    /// Admit playlists through the AND-gate, falling back to the catalog
    pub fn discover_playlists(
        &self,
        playlists: Vec<Playlist>,
        user_info: Option<&Value>,
    ) -> Discovery {
        let evaluated = playlists.len();
        let admitted: Vec<AnnotatedPlaylist> = playlists
            .into_iter()
            .filter_map(|mut playlist| {
                let content_analysis = self.classifier.classify_playlist(&playlist);
                self.logger.log_playlist(&playlist, &content_analysis, user_info);
                playlist.extra.remove(PLAYLIST_ANNOTATION_KEY);
                content_analysis.admitted.then_some(AnnotatedPlaylist {
                    playlist,
                    content_analysis,
                })
            })
            .collect();

        if admitted.is_empty() {
            debug!(
                "No playlists admitted out of {}; substituting fallback catalog",
                evaluated
            );
            Discovery::Fallback(fallback::catalog())
        } else {
            debug!("Admitted {} of {} playlists", admitted.len(), evaluated);
            Discovery::Live(admitted)
        }
    }

    /// Hard play/skip check: not explicit and no blocked term in name or artists
    pub fn live_gate(&self, track: &Track) -> LiveDecision {
        let decision = if track.is_explicit() {
            skip("Explicit content".to_string())
        } else if let Some(term) = self.classifier.blocked_term_in_track(track) {
            skip(format!("Blocked keyword: {}", term))
        } else {
            LiveDecision {
                admit: true,
                action: LiveAction::Play,
                reason: "Educationally appropriate".to_string(),
            }
        };

        debug!(
            "Live gate for '{}' ({}): {:?} - {}",
            track.name(),
            track.id(),
            decision.action,
            decision.reason
        );
        decision
    }
}

fn skip(reason: String) -> LiveDecision {
    LiveDecision {
        admit: false,
        action: LiveAction::Skip,
        reason,
    }
}

/// Tracks with positive educational value, highest first, at most `limit`
///
/// Stable: equal scores keep their input order.
pub fn recommend(items: &[AnnotatedTrack], limit: usize) -> Vec<AnnotatedTrack> {
    let mut candidates: Vec<&AnnotatedTrack> = items
        .iter()
        .filter(|t| t.content_analysis.educational_value > 0)
        .collect();
    candidates.sort_by(|a, b| {
        b.content_analysis
            .educational_value
            .cmp(&a.content_analysis.educational_value)
    });
    candidates.into_iter().take(limit).cloned().collect()
}

/// Aggregate counts; the average of an empty batch is 0.0
pub fn summarize(items: &[AnnotatedTrack]) -> FilterSummary {
    let total_tracks = items.len();
    let explicit_tracks = items.iter().filter(|t| t.content_analysis.is_explicit).count();
    let educational_tracks = items
        .iter()
        .filter(|t| t.content_analysis.educational_value > 0)
        .count();
    let total_value: u64 = items
        .iter()
        .map(|t| u64::from(t.content_analysis.educational_value))
        .sum();

    let average_educational_value = if total_tracks == 0 {
        0.0
    } else {
        total_value as f64 / total_tracks as f64
    };

    FilterSummary {
        total_tracks,
        explicit_tracks,
        educational_tracks,
        average_educational_value,
    }
}
