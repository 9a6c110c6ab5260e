//! Keyword rule set
//!
//! Two lists of lowercase substrings: terms that signal study-friendly
//! content and terms that are never acceptable in a playlist surfaced to
//! students. The set is built once at startup and shared read-only.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use tracing::warn;

use msh_common::config::RulesConfig;

/// Built-in study-friendly terms
pub const DEFAULT_EDUCATIONAL: &[&str] = &[
    "classical",
    "instrumental",
    "study",
    "focus",
    "ambient",
    "meditation",
    "concentration",
    "piano",
    "acoustic",
    "jazz",
    "chill",
    "lofi",
    "lo-fi",
];

/// Built-in blocked terms
pub const DEFAULT_BLOCKED: &[&str] = &[
    "party",
    "club",
    "drunk",
    "drinking",
    "drugs",
    "violence",
    "hate-speech",
    "hate speech",
    "self-harm",
    "illegal-activities",
    "nsfw",
];

static DEFAULT_RULES: Lazy<KeywordRuleSet> = Lazy::new(|| {
    KeywordRuleSet::new(
        DEFAULT_EDUCATIONAL.iter().copied(),
        DEFAULT_BLOCKED.iter().copied(),
    )
});

/// Educational and blocked keyword lists
///
/// Terms are stored lowercase and matched as substrings of lowercased text.
/// The two lists are expected to be disjoint but this is not enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRuleSet {
    educational: Vec<String>,
    blocked: Vec<String>,
}

impl KeywordRuleSet {
    /// Build a rule set, normalizing terms
    ///
    /// Terms are trimmed and lowercased; empty terms are dropped and
    /// duplicates collapse to their first occurrence.
    pub fn new<E, B, S1, S2>(educational: E, blocked: B) -> Self
    where
        E: IntoIterator<Item = S1>,
        B: IntoIterator<Item = S2>,
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        Self {
            educational: normalize_terms(educational),
            blocked: normalize_terms(blocked),
        }
    }

    /// Process-wide built-in rule set
    pub fn builtin() -> &'static KeywordRuleSet {
        &DEFAULT_RULES
    }

    /// Apply configured overrides on top of the built-in lists
    ///
    /// Each list is replaced independently; an absent list keeps the
    /// built-in terms.
    pub fn from_config(config: &RulesConfig) -> Self {
        let builtin = Self::builtin();
        let educational = match &config.educational {
            Some(terms) => normalize_terms(terms),
            None => builtin.educational.clone(),
        };
        let blocked = match &config.blocked {
            Some(terms) => normalize_terms(terms),
            None => builtin.blocked.clone(),
        };

        let rules = Self { educational, blocked };
        let overlap = rules.overlap();
        if !overlap.is_empty() {
            warn!(
                "Keyword lists overlap; these terms are both educational and blocked: {}",
                overlap.join(", ")
            );
        }
        rules
    }

    pub fn educational(&self) -> &[String] {
        &self.educational
    }

    pub fn blocked(&self) -> &[String] {
        &self.blocked
    }

    /// Educational terms contained in already-lowercased `text`, in list order
    pub fn educational_matches<'a, 't>(&'a self, text: &'t str) -> impl Iterator<Item = &'a str> + 't
    where
        'a: 't,
    {
        matching(&self.educational, text)
    }

    /// Blocked terms contained in already-lowercased `text`, in list order
    pub fn blocked_matches<'a, 't>(&'a self, text: &'t str) -> impl Iterator<Item = &'a str> + 't
    where
        'a: 't,
    {
        matching(&self.blocked, text)
    }

    /// Terms present in both lists
    pub fn overlap(&self) -> Vec<&str> {
        let blocked: HashSet<&str> = self.blocked.iter().map(String::as_str).collect();
        self.educational
            .iter()
            .map(String::as_str)
            .filter(|t| blocked.contains(t))
            .collect()
    }
}

impl Default for KeywordRuleSet {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

fn matching<'a, 't>(terms: &'a [String], text: &'t str) -> impl Iterator<Item = &'a str> + 't
where
    'a: 't,
{
    terms
        .iter()
        .map(String::as_str)
        .filter(move |term| text.contains(term))
}

fn normalize_terms<I, S>(terms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    terms
        .into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
