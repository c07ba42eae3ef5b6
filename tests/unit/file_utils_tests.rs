/*!
 * Tests for subtitle file reading and decoding
 */

use anyhow::Result;
use cuetrack::errors::SubtitleError;
use cuetrack::file_utils::{decode_subtitle_bytes, FileManager, FileSubtitleSource, TextEncoding};
use cuetrack::track::{SubtitleSource, SubtitleTrackDescriptor};
use crate::common;

#[test]
fn test_decode_withPlainUtf8_shouldKeepText() {
    let (text, encoding) = decode_subtitle_bytes("Ça va?".as_bytes());
    assert_eq!(text, "Ça va?");
    assert_eq!(encoding, TextEncoding::Utf8);
}

#[test]
fn test_decode_withUtf8Bom_shouldStripBom() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(b"WEBVTT\n");
    let (text, encoding) = decode_subtitle_bytes(&bytes);
    assert_eq!(text, "WEBVTT\n");
    assert_eq!(encoding, TextEncoding::Utf8Bom);
}

#[test]
fn test_decode_withUtf16LeBom_shouldDecode() {
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "WEBVTT é".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let (text, encoding) = decode_subtitle_bytes(&bytes);
    assert_eq!(text, "WEBVTT é");
    assert_eq!(encoding, TextEncoding::Utf16Le);
}

#[test]
fn test_decode_withUtf16BeBom_shouldDecode() {
    let mut bytes = vec![0xFE, 0xFF];
    for unit in "1\n00:01,000".encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    let (text, encoding) = decode_subtitle_bytes(&bytes);
    assert_eq!(text, "1\n00:01,000");
    assert_eq!(encoding, TextEncoding::Utf16Be);
}

#[test]
fn test_decode_withLatin1Bytes_shouldMapBytesToChars() {
    let (text, encoding) = decode_subtitle_bytes(b"caf\xe9");
    assert_eq!(text, "café");
    assert_eq!(encoding, TextEncoding::Windows1252);
}

#[test]
fn test_decode_withWindows1252Punctuation_shouldDecodeQuotesAndEllipsis() {
    let (text, encoding) = decode_subtitle_bytes(b"It\x92s\x85 \x93fine\x94 \x96 ok");
    assert_eq!(text, "It\u{2019}s\u{2026} \u{201C}fine\u{201D} \u{2013} ok");
    assert_eq!(encoding, TextEncoding::Windows1252);
    assert!(!text.chars().any(|c| c.is_control()));
}

#[test]
fn test_decode_withOddUtf16Length_shouldMarkDanglingByte() {
    let mut le = vec![0xFF, 0xFE];
    for unit in "Hi".encode_utf16() {
        le.extend_from_slice(&unit.to_le_bytes());
    }
    le.push(0x41);
    let (text, encoding) = decode_subtitle_bytes(&le);
    assert_eq!(text, "Hi\u{FFFD}");
    assert_eq!(encoding, TextEncoding::Utf16Le);

    let mut be = vec![0xFE, 0xFF];
    for unit in "Hi".encode_utf16() {
        be.extend_from_slice(&unit.to_be_bytes());
    }
    be.push(0x00);
    let (text, encoding) = decode_subtitle_bytes(&be);
    assert_eq!(text, "Hi\u{FFFD}");
    assert_eq!(encoding, TextEncoding::Utf16Be);
}

#[test]
fn test_isSubtitleFile_shouldCheckExtension() {
    assert!(FileManager::is_subtitle_file("movie.en.SRT"));
    assert!(FileManager::is_subtitle_file("movie.vtt"));
    assert!(!FileManager::is_subtitle_file("movie.mkv"));
    assert!(!FileManager::is_subtitle_file("srt"));
}

#[test]
fn test_readSubtitleFile_withBomFile_shouldReturnCleanText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(common::SAMPLE_VTT.as_bytes());
    let path = common::create_binary_test_file(temp_dir.path(), "movie.en.vtt", &bytes)?;

    let text = FileManager::read_subtitle_file(&path)?;
    assert_eq!(text, common::SAMPLE_VTT);
    Ok(())
}

#[test]
fn test_readSubtitleFile_withMissingFile_shouldFail() {
    assert!(FileManager::read_subtitle_file("/nonexistent/movie.srt").is_err());
}

#[test]
fn test_writeToFile_withNestedPath_shouldCreateParents() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("a").join("b").join("out.vtt");

    FileManager::write_to_file(&path, "WEBVTT\n")?;
    assert!(FileManager::file_exists(&path));
    assert_eq!(std::fs::read_to_string(&path)?, "WEBVTT\n");
    Ok(())
}

#[tokio::test]
async fn test_fileSubtitleSource_withExistingFile_shouldFetchText() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "movie.en.srt", common::SAMPLE_SRT)?;

    let text = FileSubtitleSource.fetch(&SubtitleTrackDescriptor::from_path(&path)).await?;
    assert_eq!(text, common::SAMPLE_SRT);
    Ok(())
}

#[tokio::test]
async fn test_fileSubtitleSource_withMissingFile_shouldReportLocator() {
    let track = SubtitleTrackDescriptor::new("English", "/nonexistent/movie.en.srt");
    match FileSubtitleSource.fetch(&track).await {
        Err(SubtitleError::SourceUnavailable { locator, .. }) => {
            assert_eq!(locator, "/nonexistent/movie.en.srt");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}
