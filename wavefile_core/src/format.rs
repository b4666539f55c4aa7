//! In-memory representation of the RIFF, fmt and data chunks.

use std::fmt;
use std::time::Duration;

/// Four byte RIFF chunk tag, kept exactly as it appeared on disk.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChunkId([u8; 4]);

impl ChunkId {
    pub const RIFF: ChunkId = ChunkId(*b"RIFF");
    pub const WAVE: ChunkId = ChunkId(*b"WAVE");
    pub const FMT: ChunkId = ChunkId(*b"fmt ");
    pub const DATA: ChunkId = ChunkId(*b"data");

    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Whether the tag is made only of NUL bytes, as in an unset [`DataChunk`].
    pub fn is_empty(&self) -> bool {
        self.0 == [0; 4]
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkId({:?})", String::from_utf8_lossy(&self.0))
    }
}

/// Audio format code for uncompressed PCM.
pub const AUDIO_FORMAT_PCM: u16 = 1;

/// Size of the canonical RIFF + fmt + data header of a PCM file.
pub const HEADER_LEN: u64 = 44;

/// Outer RIFF header: tag, size of everything after the size field, form type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RiffHeader {
    pub chunk_id: ChunkId,
    pub chunk_size: u32,
    pub format: ChunkId,
}

/// The "fmt " subchunk describing how samples are encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FmtChunk {
    pub id: ChunkId,
    pub size: u32,
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Zero for PCM.
    pub extra_param_size: u16,
    /// Codec specific parameters following the fixed fields of non-PCM formats.
    pub extra_params: Option<Vec<u8>>,
}

impl FmtChunk {
    pub fn is_pcm(&self) -> bool {
        self.audio_format == AUDIO_FORMAT_PCM
    }

    pub fn audio_format_name(&self) -> Option<&'static str> {
        audio_format_name(u32::from(self.audio_format))
    }

    /// Whole bytes per sample; partial bytes are dropped.
    pub fn bytes_per_sample(&self) -> u16 {
        self.bits_per_sample / 8
    }
}

/// The "data" subchunk selected by the chunk walker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataChunk {
    pub id: ChunkId,
    pub size: u32,
    /// Raw sample bytes, present only when the payload was requested.
    pub payload: Option<Vec<u8>>,
}

impl DataChunk {
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }
}

/// A parsed WAVE file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveFile {
    pub header: RiffHeader,
    pub fmt: FmtChunk,
    pub data: DataChunk,
}

impl WaveFile {
    /// Playback length implied by the data size and byte rate.
    pub fn duration(&self) -> Option<Duration> {
        if self.fmt.byte_rate == 0 {
            return None;
        }
        Some(Duration::from_secs_f64(
            f64::from(self.data.size) / f64::from(self.fmt.byte_rate),
        ))
    }
}

/// Human readable name of a WAVE audio format code, if the code is known.
pub fn audio_format_name(code: u32) -> Option<&'static str> {
    let name = match code {
        1 => "PCM",
        2 => "Microsoft ADPCM",
        6 => "ITU G.711 a-law",
        7 => "ITU G.711 µ-law",
        17 => "IMA ADPCM",
        20 => "ITU G.723 ADPCM (Yamaha)",
        49 => "GSM 6.10",
        64 => "ITU G.721 ADPCM",
        80 => "MPEG",
        65_536 => "Experimental",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_format_names() {
        assert_eq!(audio_format_name(1), Some("PCM"));
        assert_eq!(audio_format_name(6), Some("ITU G.711 a-law"));
        assert_eq!(audio_format_name(7), Some("ITU G.711 µ-law"));
        assert_eq!(audio_format_name(65_536), Some("Experimental"));
        assert_eq!(audio_format_name(9_999), None);
    }

    #[test]
    fn chunk_id_display_is_lossy() {
        assert_eq!(ChunkId::FMT.to_string(), "fmt ");
        assert_eq!(ChunkId::new([b'd', 0xFF, b't', b'a']).to_string(), "d\u{FFFD}ta");
        assert!(ChunkId::default().is_empty());
        assert!(!ChunkId::DATA.is_empty());
    }

    #[test]
    fn duration_follows_byte_rate() {
        let file = WaveFile {
            header: RiffHeader {
                chunk_id: ChunkId::RIFF,
                chunk_size: 36 + 32_000,
                format: ChunkId::WAVE,
            },
            fmt: FmtChunk {
                id: ChunkId::FMT,
                size: 16,
                audio_format: AUDIO_FORMAT_PCM,
                num_channels: 1,
                sample_rate: 8_000,
                byte_rate: 16_000,
                block_align: 2,
                bits_per_sample: 16,
                extra_param_size: 0,
                extra_params: None,
            },
            data: DataChunk {
                id: ChunkId::DATA,
                size: 32_000,
                payload: None,
            },
        };

        assert_eq!(file.duration(), Some(Duration::from_secs(2)));
        assert_eq!(file.fmt.audio_format_name(), Some("PCM"));
        assert!(file.fmt.is_pcm());
    }
}
