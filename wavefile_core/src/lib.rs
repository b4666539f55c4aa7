//! Reading, generating and comparing RIFF/WAVE PCM files.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub mod chunk;
pub mod codec;
pub mod compare;
pub mod format;
pub mod reader;
pub mod writer;

pub use compare::{compare_files, similarity, Comparison};
pub use format::{audio_format_name, ChunkId, DataChunk, FmtChunk, RiffHeader, WaveFile};
pub use reader::{read_file, read_from};
pub use writer::{
    create_pcm_file, create_pcm_file_with, AlphanumericNoise, PayloadSource, PcmFormat,
    PcmFormatBuilder,
};

/// Errors that can occur while reading or writing WAVE files.
///
/// A path that does not exist is not an error: readers return `Ok(None)`
/// and [`compare_files`] returns [`Comparison::Unavailable`] instead.
#[derive(Debug, Error)]
pub enum WaveError {
    /// A field needed more bytes than were left in the file.
    #[error("unexpected end of file: needed {expected} bytes but only {available} remain")]
    Truncated { expected: usize, available: usize },

    /// The file cannot even hold the canonical 44 byte header.
    #[error("file too small: {size} bytes")]
    FileTooSmall { size: u64 },

    /// The byte rate field disagrees with sample rate, channels and width.
    #[error("byte rate field mismatch: expected {expected}, found {found}")]
    ByteRateMismatch { expected: u64, found: u32 },

    /// The block align field disagrees with channels and width.
    #[error("block align field mismatch: expected {expected}, found {found}")]
    BlockAlignMismatch { expected: u64, found: u16 },

    /// The file does not start with a RIFF tag.
    #[error("RIFF chunk ID invalid: '{0}'")]
    InvalidRiffId(ChunkId),

    /// The RIFF form type is something other than WAVE.
    #[error("RIFF form type is not WAVE: '{0}'")]
    InvalidWaveId(ChunkId),

    /// The first subchunk is not tagged fmt.
    #[error("fmt subchunk ID invalid: '{0}'")]
    InvalidFmtId(ChunkId),

    /// Also returned when no data chunk was found at all.
    #[error("data subchunk ID invalid: '{0}'")]
    InvalidDataId(ChunkId),

    /// Rejected generation settings.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The destination could not be opened for writing.
    #[error("failed to create '{}'", .path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file that was just written could not be opened again.
    #[error("'{}' disappeared after it was written", .0.display())]
    Vanished(PathBuf),

    /// Wrapper around other IO errors.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl WaveError {
    /// Whether the error describes malformed file contents rather than an IO
    /// or usage problem.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::Truncated { .. }
                | Self::FileTooSmall { .. }
                | Self::ByteRateMismatch { .. }
                | Self::BlockAlignMismatch { .. }
                | Self::InvalidRiffId(_)
                | Self::InvalidWaveId(_)
                | Self::InvalidFmtId(_)
                | Self::InvalidDataId(_)
        )
    }
}
