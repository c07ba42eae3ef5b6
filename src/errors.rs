/*!
 * Error types for the cuetrack library.
 *
 * Default subtitle parsing never fails; these errors come from strict parsing,
 * subtitle loading and the application layer, using the thiserror crate for
 * ergonomic error definitions.
 */

use thiserror::Error;

use crate::subtitle_processor::ParseWarning;

/// Errors that can occur during subtitle processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Strict parsing rejected the input on its first warning
    #[error("Strict parse failed: {0}")]
    Strict(ParseWarning),

    /// The subtitle source could not be read
    #[error("Failed to read subtitle source '{locator}': {message}")]
    SourceUnavailable {
        /// Path or URL of the track
        locator: String,
        /// Underlying failure
        message: String,
    },

    /// The background parse task did not finish
    #[error("Subtitle parse task failed: {0}")]
    ParseTask(String),
}

/// Errors reported by the application controller
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from subtitle loading or strict parsing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Track selection was asked to choose among no files
    #[error("No subtitle track to choose from")]
    NoTracks,

    /// A newer track switch started before this load finished
    #[error("Loading '{0}' was superseded by another track")]
    Superseded(String),
}
