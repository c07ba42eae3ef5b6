use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_config::Config;
use crate::cue_resolver::{self, SubtitleOverlay};
use crate::errors::AppError;
use crate::file_utils::{FileManager, FileSubtitleSource};
use crate::subtitle_processor::{self, CueSequence, ParseReport};
use crate::track::{self, SubtitleTrackDescriptor, SubtitleTrackState};

// @module: Application controller for subtitle inspection and playback

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Track currently loaded for playback
    tracks: SubtitleTrackState,
}

impl Controller {
    /// Create a controller with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| AppError::Config(format!("{:#}", e)))?;
        Ok(Self {
            config,
            tracks: SubtitleTrackState::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tracks(&self) -> &SubtitleTrackState {
        &self.tracks
    }

    /// Choose which of several subtitle files of one movie to show.
    ///
    /// Files are labelled by their `name.<lang>.ext` tag and picked by the
    /// configured preferred language, then English, then the first file.
    pub fn select_track_file(&self, files: &[PathBuf]) -> Result<PathBuf> {
        let tracks: Vec<SubtitleTrackDescriptor> =
            files.iter().map(SubtitleTrackDescriptor::from_path).collect();
        let preferred = &self.config.subtitles.preferred_language;

        let chosen = track::select_track(&tracks, preferred).ok_or(AppError::NoTracks)?;
        let (file, _) = files
            .iter()
            .zip(&tracks)
            .find(|(_, descriptor)| *descriptor == chosen)
            .ok_or(AppError::NoTracks)?;

        if tracks.len() > 1 {
            info!(
                "Selected {} track {:?} (preferred language: {})",
                chosen.language_label, file, preferred
            );
        }
        Ok(file.clone())
    }

    /// Parse a subtitle file, honoring the configured strictness
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<CueSequence> {
        let path = path.as_ref();
        let text = FileManager::read_subtitle_file(path)?;

        if self.config.subtitles.strict {
            subtitle_processor::parse_cues_strict(&text)
                .with_context(|| format!("Rejected subtitle file: {:?}", path))
        } else {
            Ok(subtitle_processor::parse_cues(&text))
        }
    }

    /// Parse a subtitle file and report everything the parser tolerated
    pub fn check_file<P: AsRef<Path>>(&self, path: P) -> Result<ParseReport> {
        let text = FileManager::read_subtitle_file(path)?;
        Ok(subtitle_processor::parse_cues_with_diagnostics(&text))
    }

    /// Text shown at `time` seconds for the given file
    pub fn cue_at<P: AsRef<Path>>(&self, path: P, time: f64) -> Result<String> {
        let cues = self.parse_file(path)?;
        Ok(cue_resolver::resolve(&cues, time).to_string())
    }

    /// Re-render a subtitle file as WebVTT.
    ///
    /// Without an explicit output the file is written next to the input with a
    /// `.vtt` extension.
    pub fn convert_file<P: AsRef<Path>>(
        &self,
        input: P,
        output: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<PathBuf> {
        let input = input.as_ref();
        let output = output.unwrap_or_else(|| input.with_extension("vtt"));

        if output == input {
            return Err(anyhow!("Refusing to overwrite the input file: {:?}", input));
        }
        if FileManager::file_exists(&output) && !force_overwrite {
            return Err(anyhow!(
                "Output file already exists: {:?}. Use -f to force overwrite.",
                output
            ));
        }

        let cues = self.parse_file(input)?;
        FileManager::write_to_file(&output, &cues.to_webvtt())?;
        info!("Wrote {} cue(s) to {:?}", cues.len(), output);
        Ok(output)
    }

    /// Load a subtitle file as the active track
    pub async fn load_track<P: AsRef<Path>>(&self, path: P) -> Result<SubtitleTrackDescriptor> {
        let path = path.as_ref();
        if !FileManager::is_subtitle_file(path) {
            warn!("{:?} does not have a .srt or .vtt extension, parsing anyway", path);
        }

        let track = SubtitleTrackDescriptor::from_path(path);
        let installed = self
            .tracks
            .load_track(track.clone(), &FileSubtitleSource)
            .await
            .map_err(AppError::from)?;
        if !installed {
            return Err(AppError::Superseded(track.source_locator).into());
        }

        debug!("Active track: {} ({})", track.language_label, track.source_locator);
        Ok(track)
    }

    /// Drive the overlay with simulated time updates between `from` and `until`.
    ///
    /// `on_change` receives the media time and the new overlay text every time
    /// the displayed text changes. Returns the number of changes.
    pub async fn simulate_playback<P, F>(
        &self,
        path: P,
        from: f64,
        until: Option<f64>,
        mut on_change: F,
    ) -> Result<usize>
    where
        P: AsRef<Path>,
        F: FnMut(f64, &str),
    {
        self.load_track(path).await?;
        let cues = self.tracks.cues();

        let until = match until {
            Some(until) => until,
            None => cues.iter().map(|cue| cue.end_time).fold(from, f64::max),
        };

        let interval_ms = self.config.playback.time_update_interval_ms;
        let step = interval_ms as f64 / 1000.0 * self.config.playback.playback_rate;
        let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
        let mut overlay = SubtitleOverlay::new();
        let mut changes = 0;
        let mut current_time = from;

        info!("Playing {} cue(s) from {:.3}s to {:.3}s", cues.len(), from, until);

        while current_time <= until {
            ticker.tick().await;
            if let Some(text) = overlay.on_time_update(&cues, current_time) {
                on_change(current_time, text);
                changes += 1;
            }
            current_time += step;
        }

        Ok(changes)
    }
}

/// Parse a time argument given either as plain seconds or as a timestamp
pub fn parse_time_argument(raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.contains(':') {
        subtitle_processor::try_parse_timestamp(raw)
            .ok_or_else(|| anyhow!("Invalid timestamp: {}", raw))
    } else {
        raw.parse::<f64>()
            .ok()
            .filter(|t| t.is_finite())
            .ok_or_else(|| anyhow!("Invalid time in seconds: {}", raw))
    }
}
