use anyhow::{Result, Context};
use async_trait::async_trait;
use encoding_rs::WINDOWS_1252;
use log::debug;
use std::fs;
use std::path::Path;

use crate::errors::SubtitleError;
use crate::track::{SubtitleSource, SubtitleTrackDescriptor};

// @module: Subtitle file reading and text decoding

// @const: Byte order marks recognized when decoding subtitle files
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Text encoding a subtitle file was decoded from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    /// Legacy single-byte files (Windows-1252, a superset of Latin-1)
    Windows1252,
}

/// Decode raw subtitle bytes into text.
///
/// BOMs decide UTF-8 and UTF-16 and are stripped; BOM-less input is read as
/// UTF-8 when valid, otherwise as Windows-1252.
pub fn decode_subtitle_bytes(bytes: &[u8]) -> (String, TextEncoding) {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return (String::from_utf8_lossy(rest).into_owned(), TextEncoding::Utf8Bom);
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        return (decode_utf16(rest, u16::from_le_bytes), TextEncoding::Utf16Le);
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        return (decode_utf16(rest, u16::from_be_bytes), TextEncoding::Utf16Be);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), TextEncoding::Utf8),
        Err(_) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            (text.into_owned(), TextEncoding::Windows1252)
        }
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let pairs = bytes.chunks_exact(2);
    let truncated = !pairs.remainder().is_empty();
    let units: Vec<u16> = pairs.map(|pair| to_unit([pair[0], pair[1]])).collect();

    let mut text = String::from_utf16_lossy(&units);
    // Dangling half of a code unit
    if truncated {
        text.push(char::REPLACEMENT_CHARACTER);
    }
    text
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Subtitle extension (.srt / .vtt)
    pub fn is_subtitle_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                ext.eq_ignore_ascii_case("srt") || ext.eq_ignore_ascii_case("vtt")
            })
            .unwrap_or(false)
    }

    /// Read and decode a subtitle file
    pub fn read_subtitle_file<P: AsRef<Path>>(path: P) -> Result<String> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read subtitle file: {:?}", path))?;
        let (text, encoding) = decode_subtitle_bytes(&bytes);
        debug!("Decoded {:?} as {:?} ({} bytes)", path, encoding, bytes.len());
        Ok(text)
    }

    /// Write a string to a file, creating parent directories
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path))
    }
}

/// Loads tracks whose locator is a local file path
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSubtitleSource;

#[async_trait]
impl SubtitleSource for FileSubtitleSource {
    async fn fetch(&self, track: &SubtitleTrackDescriptor) -> Result<String, SubtitleError> {
        let bytes = tokio::fs::read(&track.source_locator)
            .await
            .map_err(|e| SubtitleError::SourceUnavailable {
                locator: track.source_locator.clone(),
                message: e.to_string(),
            })?;
        Ok(decode_subtitle_bytes(&bytes).0)
    }
}
