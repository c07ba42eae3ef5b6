/*!
 * Subtitle track selection and switching.
 *
 * `SubtitleTrackState` owns the cue sequence the overlay reads on every time
 * update. A track switch bumps a generation counter; the parsed result of a
 * switch is only installed if no newer switch has started since, and it is
 * installed with a single pointer swap, so readers see either the old
 * sequence or the complete new one.
 */

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cue_resolver;
use crate::errors::SubtitleError;
use crate::language_utils;
use crate::subtitle_processor::{self, CueSequence};

// @const: Trailing language tag of a subtitle file stem, e.g. `movie.en`
static LANGUAGE_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.([A-Za-z]{2,3})$").expect("language tag regex is valid")
});

/// One selectable subtitle track of a movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleTrackDescriptor {
    /// Label shown in the track picker
    pub language_label: String,

    /// Path or URL the subtitle text is fetched from
    pub source_locator: String,

    /// ISO 639 code the label was derived from, when known
    #[serde(default)]
    pub language_code: Option<String>,
}

impl SubtitleTrackDescriptor {
    pub fn new(language_label: impl Into<String>, source_locator: impl Into<String>) -> Self {
        Self {
            language_label: language_label.into(),
            source_locator: source_locator.into(),
            language_code: None,
        }
    }

    /// Build a descriptor from a `name.<lang>.<ext>` file path.
    ///
    /// Recognized ISO codes become English language names; an unknown tag is
    /// used verbatim and a missing tag yields `"Default"`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();

        let tag = LANGUAGE_TAG_REGEX
            .captures(&stem)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_lowercase());

        let (language_label, language_code) = match tag {
            Some(code) => match language_utils::get_language_name(&code) {
                Ok(name) => (name, Some(code)),
                Err(_) => (code, None),
            },
            None => ("Default".to_string(), None),
        };

        Self {
            language_label,
            source_locator: path.to_string_lossy().to_string(),
            language_code,
        }
    }
}

/// Pick the track to show by default.
///
/// Preference order: the preferred language, then English, then the first track.
pub fn select_track<'a>(
    tracks: &'a [SubtitleTrackDescriptor],
    preferred_language: &str,
) -> Option<&'a SubtitleTrackDescriptor> {
    let matches_language = |track: &&SubtitleTrackDescriptor, code: &str| {
        track
            .language_code
            .as_deref()
            .is_some_and(|track_code| language_utils::language_codes_match(track_code, code))
    };

    tracks
        .iter()
        .find(|track| matches_language(track, preferred_language))
        .or_else(|| tracks.iter().find(|track| matches_language(track, "en")))
        .or_else(|| tracks.first())
}

/// Where subtitle text comes from (local files, HTTP, embedded resources, ...)
#[async_trait]
pub trait SubtitleSource: Send + Sync {
    /// Fetch and decode the text of a track
    async fn fetch(&self, track: &SubtitleTrackDescriptor) -> Result<String, SubtitleError>;
}

/// Proof that a switch was started; only the newest ticket can complete
#[derive(Debug, Clone)]
pub struct SwitchTicket {
    generation: u64,
    track: Option<SubtitleTrackDescriptor>,
}

impl SwitchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn track(&self) -> Option<&SubtitleTrackDescriptor> {
        self.track.as_ref()
    }
}

#[derive(Debug, Default)]
struct TrackSlot {
    generation: u64,
    active_track: Option<SubtitleTrackDescriptor>,
    cues: Arc<CueSequence>,
}

/// The currently displayed subtitle track and its cues
#[derive(Debug, Default)]
pub struct SubtitleTrackState {
    slot: RwLock<TrackSlot>,
}

impl SubtitleTrackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the authoritative cue sequence
    pub fn cues(&self) -> Arc<CueSequence> {
        Arc::clone(&self.slot.read().cues)
    }

    /// Track whose cues are currently installed
    pub fn active_track(&self) -> Option<SubtitleTrackDescriptor> {
        self.slot.read().active_track.clone()
    }

    pub fn generation(&self) -> u64 {
        self.slot.read().generation
    }

    /// Active text at `current_time` against the current snapshot
    pub fn resolve(&self, current_time: f64) -> String {
        let slot = self.slot.read();
        cue_resolver::resolve(&slot.cues, current_time).to_string()
    }

    /// Start a switch; every earlier ticket becomes stale.
    ///
    /// `None` switches subtitles off. The current cues stay visible until the
    /// returned ticket completes.
    pub fn begin_switch(&self, track: Option<SubtitleTrackDescriptor>) -> SwitchTicket {
        let mut slot = self.slot.write();
        slot.generation += 1;
        SwitchTicket {
            generation: slot.generation,
            track,
        }
    }

    /// Install `cues` for `ticket`. Returns `false` and drops the cues when a
    /// newer switch has started in the meantime.
    pub fn complete_switch(&self, ticket: SwitchTicket, cues: CueSequence) -> bool {
        let mut slot = self.slot.write();
        if slot.generation != ticket.generation {
            warn!(
                "Discarding superseded subtitle load (generation {} < {})",
                ticket.generation, slot.generation
            );
            return false;
        }

        debug!(
            "Installing {} cue(s) for track {:?}",
            cues.len(),
            ticket.track.as_ref().map(|t| t.language_label.as_str())
        );
        slot.active_track = ticket.track;
        slot.cues = Arc::new(cues);
        true
    }

    /// Switch subtitles off
    pub fn clear(&self) -> bool {
        let ticket = self.begin_switch(None);
        self.complete_switch(ticket, CueSequence::new())
    }

    /// Fetch, parse and install a track.
    ///
    /// Parsing runs on the blocking pool so large files do not stall the
    /// caller. Returns `Ok(false)` when a newer switch superseded this one.
    pub async fn load_track(
        &self,
        track: SubtitleTrackDescriptor,
        source: &dyn SubtitleSource,
    ) -> Result<bool, SubtitleError> {
        let ticket = self.begin_switch(Some(track.clone()));
        let text = source.fetch(&track).await?;

        let cues = tokio::task::spawn_blocking(move || subtitle_processor::parse_cues(&text))
            .await
            .map_err(|e| SubtitleError::ParseTask(e.to_string()))?;

        Ok(self.complete_switch(ticket, cues))
    }
}
