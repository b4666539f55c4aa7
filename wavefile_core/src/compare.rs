//! Byte-level similarity of the sample data of two WAVE files.

use std::path::{Path, PathBuf};

use log::info;

use crate::format::FmtChunk;
use crate::reader::read_file;
use crate::WaveError;

/// Result of comparing the payloads of two WAVE files.
#[derive(Clone, Debug, PartialEq)]
pub enum Comparison {
    /// Percentage of aligned bytes that matched, rounded to two decimals.
    Similarity(f64),
    /// The files encode audio differently; `field` names the first difference.
    Incompatible { field: &'static str },
    /// The file at this path does not exist or could not be opened.
    Unavailable(PathBuf),
}

impl Comparison {
    pub fn similarity(&self) -> Option<f64> {
        match self {
            Self::Similarity(percent) => Some(*percent),
            _ => None,
        }
    }
}

/// Compare the sample data of two WAVE files.
///
/// Sample bytes are considered equal when they differ by at most `threshold`.
pub fn compare_files<P, Q>(first: P, second: Q, threshold: u8) -> Result<Comparison, WaveError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (first, second) = (first.as_ref(), second.as_ref());

    let Some(a) = read_file(first, true)? else {
        return Ok(Comparison::Unavailable(first.to_path_buf()));
    };
    let Some(b) = read_file(second, true)? else {
        return Ok(Comparison::Unavailable(second.to_path_buf()));
    };

    if let Some(field) = mismatched_field(&a.fmt, &b.fmt) {
        info!(
            "'{}' and '{}' are not comparable: {field} differs",
            first.display(),
            second.display()
        );
        return Ok(Comparison::Incompatible { field });
    }

    let percent = similarity(
        a.data.payload().unwrap_or_default(),
        b.data.payload().unwrap_or_default(),
        threshold,
    );
    info!(
        "'{}' and '{}' are {percent}% similar",
        first.display(),
        second.display()
    );
    Ok(Comparison::Similarity(percent))
}

fn mismatched_field(a: &FmtChunk, b: &FmtChunk) -> Option<&'static str> {
    if a.audio_format != b.audio_format {
        Some("audio format")
    } else if a.num_channels != b.num_channels {
        Some("channel count")
    } else if a.sample_rate != b.sample_rate {
        Some("sample rate")
    } else if a.byte_rate != b.byte_rate {
        Some("byte rate")
    } else if a.bits_per_sample != b.bits_per_sample {
        Some("bits per sample")
    } else {
        None
    }
}

/// Positional similarity of two byte sequences, as a percentage.
///
/// Both sequences are scanned front to back. Matching bytes advance both
/// cursors. On a mismatch the cursor of the sequence whose remaining
/// effective length is greater is advanced alone, shrinking the difference
/// between the two lengths; once the lengths agree both cursors advance.
/// The match count is divided by the longer length. This is not an edit
/// distance: at most one skip per byte of length difference is taken.
pub fn similarity(a: &[u8], b: &[u8], threshold: u8) -> f64 {
    let (len1, len2) = (a.len(), b.len());
    let longest = len1.max(len2);
    if longest == 0 {
        return 100.0;
    }

    let threshold = i16::from(threshold);
    let mut effective_len1 = len1;
    let (mut i, mut j, mut matches) = (0usize, 0usize, 0usize);

    while i < len1 && j < len2 {
        let (x, y) = (i16::from(a[i]), i16::from(b[j]));
        if x >= y - threshold && x <= y + threshold {
            matches += 1;
            i += 1;
            j += 1;
        } else if effective_len1 < len2 {
            effective_len1 += 1;
            j += 1;
        } else if effective_len1 > len2 {
            i += 1;
            effective_len1 -= 1;
        } else {
            i += 1;
            j += 1;
        }
    }

    round_to_hundredths(matches as f64 / longest as f64 * 100.0)
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
