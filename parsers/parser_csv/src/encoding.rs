use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{DecoderResult, Encoding, UTF_8};
use log::{debug, warn};

use crate::{CsvError, Result};

/// Number of leading bytes handed to the statistical detector
pub const DETECTION_PREFIX_LEN: usize = 2048;

/// Number of leading bytes every candidate must decode without error
pub const SAMPLE_LEN: usize = 100;

/// Labels tried after the detected encoding, in order
const FALLBACK_LABELS: [&str; 4] = ["utf-8", "iso-8859-1", "cp1252", "latin1"];

/// Outcome of copying a file into the normalized area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOutcome {
    /// Encoding detected for the source file
    pub encoding: &'static Encoding,
    /// False when the decode/encode round-trip failed and bytes were copied verbatim
    pub reencoded: bool,
}

/// Detect the text encoding of `bytes`.
///
/// The detected encoding is tried first, followed by UTF-8 and the Latin-1
/// family. The first candidate that decodes the sample prefix cleanly wins.
/// Never fails: empty input and exhausted candidates both resolve to UTF-8.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    let prefix = &bytes[..bytes.len().min(DETECTION_PREFIX_LEN)];
    if prefix.is_empty() {
        return UTF_8;
    }

    let detected = guess(prefix, bytes.len() <= DETECTION_PREFIX_LEN);
    let sample = &prefix[..prefix.len().min(SAMPLE_LEN)];

    for candidate in candidates(detected) {
        if sample_decodes(candidate, sample) {
            debug!("Resolved encoding {} (detector guessed {})", candidate.name(), detected.name());
            return candidate;
        }
    }

    UTF_8
}

/// Detect the encoding of a file from its leading bytes.
///
/// Unreadable files resolve to UTF-8; the read error surfaces later when the
/// caller actually opens the file.
pub fn detect_file_encoding(path: &Path) -> &'static Encoding {
    let mut prefix = Vec::with_capacity(DETECTION_PREFIX_LEN);
    let read = File::open(path)
        .and_then(|file| file.take(DETECTION_PREFIX_LEN as u64).read_to_end(&mut prefix));

    match read {
        Ok(_) => detect_encoding(&prefix),
        Err(e) => {
            debug!("Could not read {} for encoding detection: {}", path.display(), e);
            UTF_8
        }
    }
}

fn guess(prefix: &[u8], last: bool) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(prefix) {
        return encoding;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(prefix, last);
    detector.guess(None, true)
}

fn candidates(detected: &'static Encoding) -> Vec<&'static Encoding> {
    let mut list = vec![detected];
    for label in FALLBACK_LABELS {
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            if !list.contains(&encoding) {
                list.push(encoding);
            }
        }
    }
    list
}

fn sample_decodes(encoding: &'static Encoding, sample: &[u8]) -> bool {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let Some(capacity) = decoder.max_utf8_buffer_length_without_replacement(sample.len()) else {
        return false;
    };

    let mut decoded = String::with_capacity(capacity);
    // A multi-byte sequence cut at the sample boundary stays pending instead of failing
    let (result, _) = decoder.decode_to_string_without_replacement(sample, &mut decoded, false);
    matches!(result, DecoderResult::InputEmpty)
}

/// Decode `bytes` without replacement characters. A leading BOM is honoured and stripped.
pub fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (encoding, bom_len) = Encoding::for_bom(bytes).unwrap_or((encoding, 0));
    encoding
        .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
        .map(|text| text.into_owned())
        .ok_or(CsvError::Decode { encoding: encoding.name() })
}

/// Encode `text` in `encoding`, failing instead of substituting unmappable characters
pub fn encode_strict(text: &str, encoding: &'static Encoding) -> Result<Vec<u8>> {
    let (bytes, used, had_errors) = encoding.encode(text);
    if had_errors || used != encoding {
        return Err(CsvError::Encode { encoding: encoding.name() });
    }
    Ok(bytes.into_owned())
}

/// Copy `source` to `destination` re-encoded with the source's own encoding.
///
/// Any failure of the decode/encode round-trip degrades to a byte-for-byte copy.
pub fn copy_preserving_encoding(source: &Path, destination: &Path) -> Result<CopyOutcome> {
    let bytes = fs::read(source)?;
    let encoding = detect_encoding(&bytes);

    let reencoded = encoding
        .decode_without_bom_handling_and_without_replacement(&bytes)
        .ok_or(CsvError::Decode { encoding: encoding.name() })
        .and_then(|text| encode_strict(&text, encoding))
        .and_then(|content| fs::write(destination, content).map_err(CsvError::from));

    match reencoded {
        Ok(()) => Ok(CopyOutcome { encoding, reencoded: true }),
        Err(e) => {
            warn!(
                "Re-encoding {} as {} failed ({}), copying bytes verbatim",
                source.display(),
                encoding.name(),
                e
            );
            fs::copy(source, destination)?;
            Ok(CopyOutcome { encoding, reencoded: false })
        }
    }
}
