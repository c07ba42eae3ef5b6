use std::fmt;
use std::fmt::Write as _;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::SubtitleError;

// @module: Subtitle parsing for WebVTT and SRT text

// @const: Header token that switches the parser to WebVTT mode
pub const WEBVTT_HEADER: &str = "WEBVTT";

// @const: Separator between the start and end timestamps of a cue
const CUE_ARROW: &str = "-->";

/// Subtitle file format, decided from the first non-empty line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    /// WebVTT (first line is exactly `WEBVTT`)
    WebVtt,
    /// SubRip (everything else)
    Srt,
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WebVtt => write!(f, "webvtt"),
            Self::Srt => write!(f, "srt"),
        }
    }
}

/// Fractional-seconds separator used when rendering timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampStyle {
    /// `HH:MM:SS.mmm`
    WebVtt,
    /// `HH:MM:SS,mmm`
    Srt,
}

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    // @field: Start time in seconds
    pub start_time: f64,

    // @field: End time in seconds (not checked against start_time)
    pub end_time: f64,

    // @field: Display text, source lines joined with single spaces
    pub text: String,
}

impl Cue {
    pub fn new(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Cue {
            start_time,
            end_time,
            text: text.into(),
        }
    }

    /// Whether `time` falls inside the closed interval `[start_time, end_time]`
    pub fn contains(&self, time: f64) -> bool {
        self.start_time <= time && time <= self.end_time
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{} --> {}] {}",
            format_timestamp(self.start_time, TimestampStyle::WebVtt),
            format_timestamp(self.end_time, TimestampStyle::WebVtt),
            self.text
        )
    }
}

/// Cues in the order they appeared in the source file.
///
/// The order is never changed after parsing, even when start times are not
/// monotonic; the resolver relies on it for its first-match tie-break.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CueSequence {
    cues: Vec<Cue>,
}

impl CueSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Cue> {
        self.cues.iter()
    }

    /// Render the sequence as a WebVTT document
    pub fn to_webvtt(&self) -> String {
        let mut output = format!("{}\n\n", WEBVTT_HEADER);
        for cue in &self.cues {
            let _ = write!(
                output,
                "{} --> {}\n{}\n\n",
                format_timestamp(cue.start_time, TimestampStyle::WebVtt),
                format_timestamp(cue.end_time, TimestampStyle::WebVtt),
                cue.text
            );
        }
        output
    }

    /// Render the sequence as a numbered SRT document
    pub fn to_srt(&self) -> String {
        let mut output = String::new();
        for (index, cue) in self.cues.iter().enumerate() {
            let _ = write!(
                output,
                "{}\n{} --> {}\n{}\n\n",
                index + 1,
                format_timestamp(cue.start_time, TimestampStyle::Srt),
                format_timestamp(cue.end_time, TimestampStyle::Srt),
                cue.text
            );
        }
        output
    }
}

impl From<Vec<Cue>> for CueSequence {
    fn from(cues: Vec<Cue>) -> Self {
        CueSequence { cues }
    }
}

impl<'a> IntoIterator for &'a CueSequence {
    type Item = &'a Cue;
    type IntoIter = std::slice::Iter<'a, Cue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cues.iter()
    }
}

/// Something the permissive parser silently tolerated
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// A line outside any cue that was dropped
    UnparsedLine { line: usize, content: String },
    /// A timestamp that did not parse and was read as 0 seconds
    TimestampFallback { line: usize, raw: String },
    /// A cue that ends before it starts
    ReversedTimeRange { line: usize, start: f64, end: f64 },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnparsedLine { line, content } => {
                write!(f, "line {}: ignored text outside a cue: {:?}", line, content)
            }
            Self::TimestampFallback { line, raw } => {
                write!(f, "line {}: unparseable timestamp {:?}, using 0", line, raw)
            }
            Self::ReversedTimeRange { line, start, end } => {
                write!(f, "line {}: cue ends ({}) before it starts ({})", line, end, start)
            }
        }
    }
}

/// Cues plus everything the parser tolerated along the way
#[derive(Debug, Clone, Serialize)]
pub struct ParseReport {
    pub format: SubtitleFormat,
    pub cues: CueSequence,
    pub warnings: Vec<ParseWarning>,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Parse a WebVTT or SRT timestamp into seconds.
///
/// Accepts `HH:MM:SS.fff`, `MM:SS.fff` and the same shapes with `,` as the
/// fractional separator. Anything else yields `0.0`.
pub fn parse_timestamp(raw: &str) -> f64 {
    try_parse_timestamp(raw).unwrap_or(0.0)
}

/// Like [`parse_timestamp`], but returns `None` where the zero fallback applies
pub fn try_parse_timestamp(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').map(str::trim).collect();

    let seconds = match parts.as_slice() {
        [hours, minutes, seconds] => {
            let hours: i64 = hours.parse().ok()?;
            let minutes: i64 = minutes.parse().ok()?;
            let seconds: f64 = seconds.parse().ok()?;
            hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds
        }
        [minutes, seconds] => {
            let minutes: i64 = minutes.parse().ok()?;
            let seconds: f64 = seconds.parse().ok()?;
            minutes as f64 * 60.0 + seconds
        }
        _ => return None,
    };

    seconds.is_finite().then_some(seconds)
}

/// Format seconds as `HH:MM:SS.mmm` or `HH:MM:SS,mmm`; negative input clamps to zero
pub fn format_timestamp(seconds: f64, style: TimestampStyle) -> String {
    let total_ms = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).round() as u64
    } else {
        0
    };
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;
    let separator = match style {
        TimestampStyle::WebVtt => '.',
        TimestampStyle::Srt => ',',
    };

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, separator, millis)
}

/// Decide the format from the first non-empty line
pub fn detect_format(raw: &str) -> SubtitleFormat {
    match raw.lines().map(str::trim).find(|line| !line.is_empty()) {
        Some(WEBVTT_HEADER) => SubtitleFormat::WebVtt,
        _ => SubtitleFormat::Srt,
    }
}

/// Parse WebVTT or SRT text into cues.
///
/// Never fails: malformed timestamps read as 0 seconds and stray lines are
/// dropped. Use [`parse_cues_with_diagnostics`] to see what was tolerated.
pub fn parse_cues(raw: &str) -> CueSequence {
    let report = parse_cues_with_diagnostics(raw);
    debug!(
        "Parsed {} {} cue(s), {} line(s) tolerated",
        report.cues.len(),
        report.format,
        report.warnings.len()
    );
    report.cues
}

/// Parse and fail on the first thing the permissive parser would tolerate
pub fn parse_cues_strict(raw: &str) -> Result<CueSequence, SubtitleError> {
    let report = parse_cues_with_diagnostics(raw);
    match report.warnings.into_iter().next() {
        Some(warning) => Err(SubtitleError::Strict(warning)),
        None => Ok(report.cues),
    }
}

/// Parse cues and keep track of every tolerated irregularity.
///
/// The returned cues are exactly what [`parse_cues`] returns for the same input.
pub fn parse_cues_with_diagnostics(raw: &str) -> ParseReport {
    // Line numbers refer to the raw input, counted before empty lines are dropped
    let lines: Vec<(usize, &str)> = raw
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    let format = match lines.first() {
        Some((_, first)) if *first == WEBVTT_HEADER => SubtitleFormat::WebVtt,
        _ => SubtitleFormat::Srt,
    };

    let mut cues = Vec::new();
    let mut warnings = Vec::new();
    let mut current: Option<Cue> = None;
    let mut text_buffer: Vec<&str> = Vec::new();

    for (line_number, line) in lines {
        let skip = match format {
            SubtitleFormat::WebVtt => line == WEBVTT_HEADER,
            SubtitleFormat::Srt => is_sequence_number(line),
        };
        if skip {
            continue;
        }

        if line.contains(CUE_ARROW) {
            if let Some(mut cue) = current.take() {
                cue.text = join_cue_text(&text_buffer);
                cues.push(cue);
            }
            text_buffer.clear();

            let mut sides = line.split(CUE_ARROW);
            let start_raw = sides.next().unwrap_or_default().trim();
            let end_raw = sides.next().unwrap_or_default().trim();
            let start_time = timestamp_or_warn(start_raw, line_number, &mut warnings);
            let end_time = timestamp_or_warn(end_raw, line_number, &mut warnings);

            if end_time < start_time {
                warnings.push(ParseWarning::ReversedTimeRange {
                    line: line_number,
                    start: start_time,
                    end: end_time,
                });
            }

            current = Some(Cue::new(start_time, end_time, String::new()));
        } else if current.is_some() {
            text_buffer.push(line);
        } else {
            warnings.push(ParseWarning::UnparsedLine {
                line: line_number,
                content: line.to_string(),
            });
        }
    }

    if let Some(mut cue) = current.take() {
        cue.text = join_cue_text(&text_buffer);
        cues.push(cue);
    }

    ParseReport {
        format,
        cues: CueSequence::from(cues),
        warnings,
    }
}

fn timestamp_or_warn(raw: &str, line: usize, warnings: &mut Vec<ParseWarning>) -> f64 {
    match try_parse_timestamp(raw) {
        Some(seconds) => seconds,
        None => {
            warnings.push(ParseWarning::TimestampFallback {
                line,
                raw: raw.to_string(),
            });
            0.0
        }
    }
}

// SRT cue index lines; the caller guarantees the line is non-empty
fn is_sequence_number(line: &str) -> bool {
    line.bytes().all(|b| b.is_ascii_digit())
}

fn join_cue_text(lines: &[&str]) -> String {
    lines.join(" ").trim().to_string()
}
