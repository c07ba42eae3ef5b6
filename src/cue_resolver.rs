/*!
 * Active cue lookup for the subtitle overlay.
 *
 * The resolver is a plain linear scan in sequence order: the first cue whose
 * closed interval `[start_time, end_time]` contains the playback time wins.
 * Sequences are not assumed to be sorted, so no binary search is used.
 */

use log::trace;

use crate::subtitle_processor::{Cue, CueSequence};

/// First cue in sequence order containing `current_time`
pub fn active_cue(cues: &CueSequence, current_time: f64) -> Option<&Cue> {
    cues.iter().find(|cue| cue.contains(current_time))
}

/// Text of the active cue, or an empty string when nothing is showing
pub fn resolve(cues: &CueSequence, current_time: f64) -> &str {
    active_cue(cues, current_time).map_or("", |cue| cue.text.as_str())
}

/// Player-side overlay state fed by time updates.
///
/// Each update runs the resolver afresh; the overlay only remembers what it
/// last displayed so it can tell the renderer when the text changes.
#[derive(Debug, Default)]
pub struct SubtitleOverlay {
    displayed: String,
}

impl SubtitleOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text currently on screen
    pub fn displayed(&self) -> &str {
        &self.displayed
    }

    /// Handle one time update; returns the new text when it differs from what is shown
    pub fn on_time_update(&mut self, cues: &CueSequence, current_time: f64) -> Option<&str> {
        let text = resolve(cues, current_time);
        if text == self.displayed {
            return None;
        }

        trace!("Overlay at {:.3}s: {:?} -> {:?}", current_time, self.displayed, text);
        self.displayed.clear();
        self.displayed.push_str(text);
        Some(&self.displayed)
    }

    /// Clear the overlay, e.g. after the subtitle track is switched off
    pub fn reset(&mut self) {
        self.displayed.clear();
    }
}
