/*!
 * # cuetrack - subtitle parsing and synchronization for the movie browser
 *
 * One shared implementation of the WebVTT/SRT parser used by the server
 * (subtitle pre-validation and conversion) and the player (overlay
 * rendering), so both sides agree on cue timing by construction.
 *
 * ## Features
 *
 * - Timestamp parsing for `HH:MM:SS.fff`, `MM:SS.fff` and their `,` variants
 * - Permissive WebVTT/SRT cue parsing, with an optional diagnostic and
 *   strict mode
 * - Active cue resolution for any playback time
 * - Atomic subtitle track switching that discards superseded loads
 * - BOM aware decoding of subtitle files (UTF-8, UTF-16, Windows-1252)
 *
 * ## Architecture
 *
 * - `subtitle_processor`: timestamp and cue parsing, WebVTT/SRT rendering
 * - `cue_resolver`: active cue lookup and the overlay change tracker
 * - `track`: track descriptors, track selection and the switchable cue state
 * - `file_utils`: subtitle file reading and text decoding
 * - `language_utils`: ISO 639 language labels
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller used by the CLI
 * - `errors`: Custom error types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod cue_resolver;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod subtitle_processor;
pub mod track;

// Re-export main types for easier usage
pub use app_config::Config;
pub use cue_resolver::{active_cue, resolve, SubtitleOverlay};
pub use errors::{AppError, SubtitleError};
pub use subtitle_processor::{
    parse_cues, parse_cues_strict, parse_cues_with_diagnostics, parse_timestamp, Cue, CueSequence,
    ParseReport, ParseWarning, SubtitleFormat,
};
pub use track::{SubtitleSource, SubtitleTrackDescriptor, SubtitleTrackState};
