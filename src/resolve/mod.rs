//! Multi-tier audio-track language resolution.
//!
//! One document offers up to three partially redundant views of its audio
//! tracks: the caption-level track list, the per-format annotations, and
//! the microformat default-language hints. The resolver reconciles them in
//! ordered discovery tiers:
//!
//! - Tier 0 indexes per-format track languages and auto-dub flags.
//! - Tier 1 cross-references caption tracks when the document offers
//!   genuine multiple audio tracks.
//! - Tier 2 merges the per-format index unconditionally.
//! - Tier 3 falls back to bare format languages when tiers 0–2 saw nothing.
//! - Tier 4 falls back to the default track's caption language when even
//!   tier 3 produced nothing.
//!
//! Tiers 1 and 2 are complementary and both run; tiers 3 and 4 are
//! mutually exclusive last resorts.

use std::collections::HashMap;

use serde::Serialize;

use crate::metadata::{AudioTrack, CaptionTrack, MetadataDocument};

/// Derives a language code from an audio-track identifier.
///
/// Supplied when a provider encodes the language inside the track id; when
/// absent, the resolver relies on caption-index cross-referencing and
/// explicit per-format language fields alone. This parameter is what lets
/// one algorithm serve multiple provider document shapes.
pub trait LanguageStrategy: Send + Sync {
    /// Returns the language encoded in `track_id`, when one exists.
    fn language_for(&self, track_id: &str) -> Option<String>;
}

/// Extracts the prefix of a dotted track id (`"de.3"` → `"de"`).
#[derive(Debug, Default, Clone, Copy)]
pub struct DottedPrefixStrategy;

impl LanguageStrategy for DottedPrefixStrategy {
    fn language_for(&self, track_id: &str) -> Option<String> {
        let (prefix, _) = track_id.split_once('.')?;
        if prefix.is_empty() {
            None
        } else {
            Some(prefix.to_string())
        }
    }
}

/// Tri-state auto-dub flag.
///
/// `True` is absorbing: once any track reports machine dubbing, later
/// observations cannot downgrade the flag. `False` and `Unknown` reflect
/// the most recent observation otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoDub {
    #[default]
    Unknown,
    False,
    True,
}

impl AutoDub {
    /// Records one track's observation: `Some(true)` promotes to `True`,
    /// `Some(false)` and `None` overwrite each other but never `True`.
    pub fn record(&mut self, observed: Option<bool>) {
        match observed {
            Some(true) => *self = Self::True,
            Some(false) if *self != Self::True => *self = Self::False,
            None if *self != Self::True => *self = Self::Unknown,
            _ => {}
        }
    }

    /// Wire value, identical to the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::False => "false",
            Self::True => "true",
        }
    }
}

/// Insertion-ordered language-code set: deterministic output order, no
/// duplicates.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LanguageSet(Vec<String>);

impl LanguageSet {
    /// Inserts a language unless empty or already present.
    pub fn insert(&mut self, language: &str) {
        if !language.is_empty() && !self.contains(language) {
            self.0.push(language.to_string());
        }
    }

    #[must_use]
    pub fn contains(&self, language: &str) -> bool {
        self.0.iter().any(|known| known == language)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Resolved audio-track summary for one document.
#[derive(Debug, Clone, Serialize)]
pub struct AudioTrackSummary {
    /// Every discovered language, first-discovery order.
    pub languages_all: LanguageSet,
    /// Languages not known to be machine-dubbed.
    pub languages_non_auto: LanguageSet,
    /// Whether any track is machine-dubbed.
    pub has_auto_dub: AutoDub,
    /// The document's default audio language, empty when unknown.
    pub default_audio_language: String,
    /// Provenance tag naming the document shape that was resolved.
    pub source: String,
}

/// Tier 0 output: per-track-id language candidates and auto-dub flags.
#[derive(Debug, Default)]
struct FormatIndex {
    /// Insertion-ordered; a later format for the same track id overwrites
    /// the language but keeps the original position.
    languages: Vec<(String, String)>,
    auto_dub: HashMap<String, bool>,
}

impl FormatIndex {
    fn set_language(&mut self, track_id: &str, language: String) {
        if let Some(entry) = self.languages.iter_mut().find(|(id, _)| id == track_id) {
            entry.1 = language;
        } else {
            self.languages.push((track_id.to_string(), language));
        }
    }

    fn set_auto_dub(&mut self, track_id: &str, auto_dubbed: bool) {
        self.auto_dub.insert(track_id.to_string(), auto_dubbed);
    }

    fn auto_dub(&self, track_id: &str) -> Option<bool> {
        self.auto_dub.get(track_id).copied()
    }

    fn has_no_languages(&self) -> bool {
        self.languages.is_empty()
    }
}

fn caption_language(caption_tracks: &[CaptionTrack], index: Option<i64>) -> Option<&str> {
    let index = usize::try_from(index?).ok()?;
    caption_tracks
        .get(index)?
        .language_code
        .as_deref()
        .filter(|code| !code.is_empty())
}

fn strategy_language(
    strategy: Option<&dyn LanguageStrategy>,
    track_id: &str,
) -> Option<String> {
    strategy?.language_for(track_id).filter(|lang| !lang.is_empty())
}

fn build_format_index(
    doc: &MetadataDocument,
    strategy: Option<&dyn LanguageStrategy>,
) -> FormatIndex {
    let mut index = FormatIndex::default();
    for format in doc.adaptive_formats() {
        let Some(track) = format.audio_track.as_ref() else {
            continue;
        };
        let Some(track_id) = track.track_id() else {
            continue;
        };

        if format.is_audio() {
            let language = format
                .language()
                .map(ToString::to_string)
                .or_else(|| track.display_name_text().map(|name| name.into_owned()))
                .or_else(|| strategy_language(strategy, track_id));
            if let Some(language) = language {
                index.set_language(track_id, language);
            }
        }

        // Presence of the flag is the signal; the value rides along. The
        // strategy alias mirrors the flag so tier 1 can find it by language.
        if let Some(auto_dubbed) = track.is_auto_dubbed {
            index.set_auto_dub(track_id, auto_dubbed);
            if let Some(alias) = strategy_language(strategy, track_id) {
                index.set_auto_dub(&alias, auto_dubbed);
            }
        }
    }
    index
}

fn reconcile_multi_track(
    doc: &MetadataDocument,
    strategy: Option<&dyn LanguageStrategy>,
    index: &FormatIndex,
    languages_all: &mut LanguageSet,
    languages_non_auto: &mut LanguageSet,
    has_auto_dub: &mut AutoDub,
) {
    let caption_tracks = doc.caption_tracks();
    for track in doc.audio_tracks() {
        let track_id = track.audio_track_id.as_deref().unwrap_or("");

        let mut track_languages: Vec<String> = Vec::new();
        for caption_index in &track.caption_track_indices {
            if let Some(language) = caption_language(caption_tracks, Some(*caption_index)) {
                languages_all.insert(language);
                track_languages.push(language.to_string());
            }
        }

        // An id-derived language is authoritative: it replaces whatever the
        // caption indices said for this track.
        let alias = strategy_language(strategy, track_id);
        if let Some(derived) = alias.clone() {
            track_languages.clear();
            languages_all.insert(&derived);
            track_languages.push(derived);
        }

        let observed = index
            .auto_dub(track_id)
            .or_else(|| alias.as_deref().and_then(|a| index.auto_dub(a)));
        has_auto_dub.record(observed);
        if observed != Some(true) {
            for language in &track_languages {
                languages_non_auto.insert(language);
            }
        }
    }
}

/// Resolves the audio-track summary for one metadata document.
///
/// Pure function of its inputs: no I/O, the document is never mutated.
/// `source` is carried through as provenance only and does not affect the
/// resolution.
#[must_use]
pub fn resolve_audio_tracks(
    doc: &MetadataDocument,
    strategy: Option<&dyn LanguageStrategy>,
    source: &str,
) -> AudioTrackSummary {
    let mut languages_all = LanguageSet::default();
    let mut languages_non_auto = LanguageSet::default();
    let mut has_auto_dub = AutoDub::Unknown;

    // Tier 0: per-format track/language/auto-dub index.
    let index = build_format_index(doc, strategy);

    // Tier 1: caption cross-referencing, only for genuine multi-track docs.
    if doc.audio_tracks().len() > 1 {
        reconcile_multi_track(
            doc,
            strategy,
            &index,
            &mut languages_all,
            &mut languages_non_auto,
            &mut has_auto_dub,
        );
    }

    // Tier 2: merge the per-format index. Exact-id auto-dub lookup only.
    for (track_id, language) in &index.languages {
        languages_all.insert(language);
        let observed = index.auto_dub(track_id);
        has_auto_dub.record(observed);
        if observed != Some(true) {
            languages_non_auto.insert(language);
        }
    }

    // Tier 3: bare format languages, only when tiers 0-2 saw nothing.
    if languages_all.is_empty() && index.has_no_languages() {
        for format in doc.adaptive_formats() {
            if !format.is_audio() {
                continue;
            }
            if let Some(language) = format.language() {
                languages_all.insert(language);
                languages_non_auto.insert(language);
            }
        }
    }

    // Tier 4: the default track's caption language as a last resort.
    let audio_tracks = doc.audio_tracks();
    if languages_all.is_empty() && !audio_tracks.is_empty() {
        let default_index = doc
            .default_audio_track_index()
            .and_then(|index| usize::try_from(index).ok())
            .filter(|index| *index < audio_tracks.len())
            .unwrap_or(0);
        let track: &AudioTrack = &audio_tracks[default_index];
        let caption_index = track
            .default_caption_track_index
            .or_else(|| track.caption_track_indices.first().copied());
        if let Some(language) = caption_language(doc.caption_tracks(), caption_index) {
            languages_all.insert(language);
            languages_non_auto.insert(language);
        }
    }

    AudioTrackSummary {
        languages_all,
        languages_non_auto,
        has_auto_dub,
        default_audio_language: doc.default_language().to_string(),
        source: source.to_string(),
    }
}
