/*!
 * Tests for subtitle track switching and selection
 */

use std::collections::HashMap;
use std::time::Duration;
use async_trait::async_trait;
use cuetrack::errors::SubtitleError;
use cuetrack::subtitle_processor::{parse_cues, CueSequence};
use cuetrack::track::{select_track, SubtitleSource, SubtitleTrackDescriptor, SubtitleTrackState};
use crate::common;

/// In-memory source with a per-track delay
struct DelayedSource {
    tracks: HashMap<String, (u64, String)>,
}

impl DelayedSource {
    fn new(entries: &[(&str, u64, &str)]) -> Self {
        let tracks = entries
            .iter()
            .map(|(locator, delay_ms, text)| (locator.to_string(), (*delay_ms, text.to_string())))
            .collect();
        Self { tracks }
    }
}

#[async_trait]
impl SubtitleSource for DelayedSource {
    async fn fetch(&self, track: &SubtitleTrackDescriptor) -> Result<String, SubtitleError> {
        let (delay_ms, text) = self.tracks.get(&track.source_locator).ok_or_else(|| {
            SubtitleError::SourceUnavailable {
                locator: track.source_locator.clone(),
                message: "not found".to_string(),
            }
        })?;
        tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        Ok(text.clone())
    }
}

fn track(label: &str, locator: &str, code: Option<&str>) -> SubtitleTrackDescriptor {
    SubtitleTrackDescriptor {
        language_label: label.to_string(),
        source_locator: locator.to_string(),
        language_code: code.map(str::to_string),
    }
}

#[test]
fn test_trackState_new_shouldStartEmpty() {
    let state = SubtitleTrackState::new();
    assert!(state.cues().is_empty());
    assert!(state.active_track().is_none());
    assert_eq!(state.resolve(1.0), "");
}

#[test]
fn test_completeSwitch_withCurrentTicket_shouldInstallCues() {
    let state = SubtitleTrackState::new();
    let ticket = state.begin_switch(Some(track("English", "a.vtt", Some("en"))));

    assert!(state.complete_switch(ticket, parse_cues(common::SAMPLE_VTT)));
    assert_eq!(state.cues().len(), 2);
    assert_eq!(state.resolve(1.5), "Hello");
    assert_eq!(state.active_track().unwrap().source_locator, "a.vtt");
}

#[test]
fn test_beginSwitch_beforeCompletion_shouldKeepOldCuesVisible() {
    let state = SubtitleTrackState::new();
    let first = state.begin_switch(Some(track("English", "a.vtt", None)));
    state.complete_switch(first, parse_cues(common::SAMPLE_VTT));

    let _pending = state.begin_switch(Some(track("French", "b.vtt", None)));
    assert_eq!(state.resolve(3.5), "World");
    assert_eq!(state.active_track().unwrap().source_locator, "a.vtt");
}

#[test]
fn test_completeSwitch_withSupersededTicket_shouldDiscardResult() {
    common::init_logging();
    let state = SubtitleTrackState::new();
    let stale = state.begin_switch(Some(track("English", "a.vtt", None)));
    let fresh = state.begin_switch(Some(track("French", "b.vtt", None)));
    assert!(fresh.generation() > stale.generation());

    let french = CueSequence::from(vec![cuetrack::Cue::new(1.0, 2.0, "Bonjour")]);
    assert!(state.complete_switch(fresh, french));
    assert!(!state.complete_switch(stale, parse_cues(common::SAMPLE_VTT)));

    assert_eq!(state.resolve(1.5), "Bonjour");
    assert_eq!(state.active_track().unwrap().source_locator, "b.vtt");
}

#[test]
fn test_clear_shouldRemoveCuesAndTrack() {
    let state = SubtitleTrackState::new();
    let ticket = state.begin_switch(Some(track("English", "a.vtt", None)));
    state.complete_switch(ticket, parse_cues(common::SAMPLE_VTT));

    assert!(state.clear());
    assert!(state.cues().is_empty());
    assert!(state.active_track().is_none());
}

#[test]
fn test_cuesSnapshot_shouldSurviveLaterSwitch() {
    let state = SubtitleTrackState::new();
    let ticket = state.begin_switch(None);
    state.complete_switch(ticket, parse_cues(common::SAMPLE_VTT));

    let snapshot = state.cues();
    state.clear();
    assert_eq!(snapshot.len(), 2);
}

#[tokio::test]
async fn test_loadTrack_withSource_shouldParseAndInstall() {
    let source = DelayedSource::new(&[("en.srt", 0, common::SAMPLE_SRT)]);
    let state = SubtitleTrackState::new();

    let installed = state.load_track(track("English", "en.srt", Some("en")), &source).await.unwrap();
    assert!(installed);
    assert_eq!(*state.cues(), parse_cues(common::SAMPLE_SRT));
}

#[tokio::test]
async fn test_loadTrack_withSlowSupersededLoad_shouldKeepNewerTrack() {
    common::init_logging();
    let source = DelayedSource::new(&[
        ("slow.srt", 200, common::SAMPLE_SRT),
        ("fast.srt", 0, "1\n00:00:01,000 --> 00:00:02,000\nFast\n"),
    ]);
    let state = SubtitleTrackState::new();

    let (slow, fast) = tokio::join!(
        state.load_track(track("Slow", "slow.srt", None), &source),
        state.load_track(track("Fast", "fast.srt", None), &source),
    );

    assert!(!slow.unwrap());
    assert!(fast.unwrap());
    assert_eq!(state.resolve(1.5), "Fast");
    assert_eq!(state.active_track().unwrap().source_locator, "fast.srt");
}

#[tokio::test]
async fn test_loadTrack_withMissingSource_shouldKeepPreviousCues() {
    let source = DelayedSource::new(&[("en.srt", 0, common::SAMPLE_SRT)]);
    let state = SubtitleTrackState::new();
    state.load_track(track("English", "en.srt", None), &source).await.unwrap();

    let result = state.load_track(track("Missing", "missing.srt", None), &source).await;
    assert!(matches!(result, Err(SubtitleError::SourceUnavailable { .. })));
    assert_eq!(state.resolve(1.5), "Hello");
}

#[test]
fn test_selectTrack_withPreferredLanguage_shouldPickIt() {
    let tracks = vec![
        track("English", "en.srt", Some("en")),
        track("German", "ger.srt", Some("ger")),
    ];
    assert_eq!(select_track(&tracks, "de").unwrap().source_locator, "ger.srt");
}

#[test]
fn test_selectTrack_withoutPreferredLanguage_shouldFallBackToEnglish() {
    let tracks = vec![
        track("French", "fr.srt", Some("fr")),
        track("English", "eng.srt", Some("eng")),
    ];
    assert_eq!(select_track(&tracks, "it").unwrap().source_locator, "eng.srt");
}

#[test]
fn test_selectTrack_withoutKnownLanguages_shouldUseFirstTrack() {
    let tracks = vec![track("Default", "a.srt", None), track("Other", "b.srt", None)];
    assert_eq!(select_track(&tracks, "en").unwrap().source_locator, "a.srt");
    assert!(select_track(&[], "en").is_none());
}

#[test]
fn test_fromPath_withBibliographicCode_shouldResolveName() {
    let descriptor = SubtitleTrackDescriptor::from_path("Heat.fre.vtt");
    assert_eq!(descriptor.language_label, "French");
    assert_eq!(descriptor.language_code.as_deref(), Some("fre"));
}
