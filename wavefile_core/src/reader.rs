//! Parsing and validation of WAVE files.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, warn};

use crate::chunk::ChunkWalker;
use crate::codec::{read_chunk_id, read_fixed_string, read_u16_le, read_u32_le, skip};
use crate::format::{ChunkId, FmtChunk, RiffHeader, WaveFile, HEADER_LEN};
use crate::WaveError;

/// RIFF header (12 bytes) plus the fmt tag and size.
const FMT_BODY_OFFSET: u64 = 20;
/// Fixed fmt fields from audio format through bits per sample.
const FMT_FIXED_LEN: u64 = 16;

/// Read the headers, and optionally the sample data, of the WAVE file at `path`.
///
/// Returns `Ok(None)` when the path does not exist or cannot be opened for
/// reading. A file that can be opened but is malformed is reported as an error.
pub fn read_file<P: AsRef<Path>>(
    path: P,
    read_data: bool,
) -> Result<Option<WaveFile>, WaveError> {
    let path = path.as_ref();

    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            warn!("'{}' is not readable: {err}", path.display());
            return Ok(None);
        }
    };
    let metadata = match file.metadata() {
        Ok(metadata) if metadata.is_file() => metadata,
        Ok(_) => {
            warn!("'{}' is not a regular file", path.display());
            return Ok(None);
        }
        Err(err) => {
            warn!("failed to query '{}': {err}", path.display());
            return Ok(None);
        }
    };

    debug!("reading '{}' ({} bytes)", path.display(), metadata.len());
    let mut reader = BufReader::new(file);
    read_from(&mut reader, metadata.len(), read_data).map(Some)
}

/// Parse a WAVE stream of `len` bytes positioned at its first byte.
pub fn read_from<R: Read>(
    source: &mut R,
    len: u64,
    read_data: bool,
) -> Result<WaveFile, WaveError> {
    if len < HEADER_LEN {
        return Err(WaveError::FileTooSmall { size: len });
    }

    let header = RiffHeader {
        chunk_id: read_chunk_id(source)?,
        chunk_size: read_u32_le(source)?,
        format: read_chunk_id(source)?,
    };

    let mut fmt = FmtChunk {
        id: read_chunk_id(source)?,
        size: read_u32_le(source)?,
        audio_format: read_u16_le(source)?,
        num_channels: read_u16_le(source)?,
        sample_rate: read_u32_le(source)?,
        byte_rate: read_u32_le(source)?,
        block_align: read_u16_le(source)?,
        bits_per_sample: read_u16_le(source)?,
        extra_param_size: 0,
        extra_params: None,
    };

    let mut consumed = FMT_FIXED_LEN;
    if !fmt.is_pcm() {
        fmt.extra_param_size = read_u16_le(source)?;
        fmt.extra_params = Some(read_fixed_string(source, fmt.extra_param_size.into())?);
        consumed += 2 + u64::from(fmt.extra_param_size);
    }

    let mut position = FMT_BODY_OFFSET + consumed;
    let declared = u64::from(fmt.size);
    if declared > consumed {
        position += skip(source, declared - consumed)?;
    }

    let walk = ChunkWalker::new(source, position, len).find_data(read_data)?;
    debug!("chunk walk ended with {:?}", walk.end);

    let file = WaveFile {
        header,
        fmt,
        data: walk.data,
    };
    validate(&file)?;
    Ok(file)
}

/// Check the field relations and tags every WAVE file must satisfy.
pub fn validate(file: &WaveFile) -> Result<(), WaveError> {
    let fmt = &file.fmt;
    let bytes_per_sample = u64::from(fmt.bytes_per_sample());

    let byte_rate = u64::from(fmt.num_channels) * u64::from(fmt.sample_rate) * bytes_per_sample;
    if byte_rate != u64::from(fmt.byte_rate) {
        return Err(WaveError::ByteRateMismatch {
            expected: byte_rate,
            found: fmt.byte_rate,
        });
    }

    let block_align = u64::from(fmt.num_channels) * bytes_per_sample;
    if block_align != u64::from(fmt.block_align) {
        return Err(WaveError::BlockAlignMismatch {
            expected: block_align,
            found: fmt.block_align,
        });
    }

    if file.header.chunk_id != ChunkId::RIFF {
        return Err(WaveError::InvalidRiffId(file.header.chunk_id));
    }
    if file.header.format != ChunkId::WAVE {
        return Err(WaveError::InvalidWaveId(file.header.format));
    }
    if fmt.id != ChunkId::FMT {
        return Err(WaveError::InvalidFmtId(fmt.id));
    }
    if file.data.id != ChunkId::DATA {
        return Err(WaveError::InvalidDataId(file.data.id));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct Fixture {
        riff: &'static [u8; 4],
        wave: &'static [u8; 4],
        fmt: &'static [u8; 4],
        audio_format: u16,
        channels: u16,
        sample_rate: u32,
        byte_rate: u32,
        block_align: u16,
        bits: u16,
        extra: Option<Vec<u8>>,
        chunks: Vec<u8>,
    }

    impl Default for Fixture {
        fn default() -> Self {
            Self {
                riff: b"RIFF",
                wave: b"WAVE",
                fmt: b"fmt ",
                audio_format: 1,
                channels: 2,
                sample_rate: 44_100,
                byte_rate: 176_400,
                block_align: 4,
                bits: 16,
                extra: None,
                chunks: data_chunk(&[1, 2, 3, 4, 5, 6, 7, 8]),
            }
        }
    }

    impl Fixture {
        fn bytes(&self) -> Vec<u8> {
            let mut fmt_body = Vec::new();
            fmt_body.extend_from_slice(&self.audio_format.to_le_bytes());
            fmt_body.extend_from_slice(&self.channels.to_le_bytes());
            fmt_body.extend_from_slice(&self.sample_rate.to_le_bytes());
            fmt_body.extend_from_slice(&self.byte_rate.to_le_bytes());
            fmt_body.extend_from_slice(&self.block_align.to_le_bytes());
            fmt_body.extend_from_slice(&self.bits.to_le_bytes());
            if let Some(extra) = &self.extra {
                fmt_body.extend_from_slice(&(extra.len() as u16).to_le_bytes());
                fmt_body.extend_from_slice(extra);
            }

            let mut bytes = self.riff.to_vec();
            let riff_size = 4 + 8 + fmt_body.len() + self.chunks.len();
            bytes.extend_from_slice(&(riff_size as u32).to_le_bytes());
            bytes.extend_from_slice(self.wave);
            bytes.extend_from_slice(self.fmt);
            bytes.extend_from_slice(&(fmt_body.len() as u32).to_le_bytes());
            bytes.extend(fmt_body);
            bytes.extend_from_slice(&self.chunks);
            bytes
        }

        fn read(&self, read_data: bool) -> Result<WaveFile, WaveError> {
            let bytes = self.bytes();
            let len = bytes.len() as u64;
            read_from(&mut Cursor::new(bytes), len, read_data)
        }
    }

    fn data_chunk(payload: &[u8]) -> Vec<u8> {
        let mut bytes = b"data".to_vec();
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn reads_pcm_header_fields() {
        let wav = Fixture::default().read(false).unwrap();

        assert_eq!(wav.header.chunk_id, ChunkId::RIFF);
        assert_eq!(wav.header.chunk_size, 4 + 8 + 16 + 16);
        assert_eq!(wav.fmt.num_channels, 2);
        assert_eq!(wav.fmt.sample_rate, 44_100);
        assert_eq!(wav.fmt.byte_rate, 176_400);
        assert_eq!(wav.fmt.block_align, 4);
        assert_eq!(wav.fmt.bits_per_sample, 16);
        assert_eq!(wav.fmt.extra_param_size, 0);
        assert!(wav.fmt.extra_params.is_none());
        assert_eq!(wav.data.size, 8);
        assert!(wav.data.payload.is_none());
    }

    #[test]
    fn reads_payload_on_request() {
        let wav = Fixture::default().read(true).unwrap();
        assert_eq!(wav.data.payload(), Some(&[1u8, 2, 3, 4, 5, 6, 7, 8][..]));
    }

    #[test]
    fn reads_extra_params_of_non_pcm_formats() {
        let fixture = Fixture {
            audio_format: 6,
            channels: 1,
            sample_rate: 8_000,
            byte_rate: 8_000,
            block_align: 1,
            bits: 8,
            extra: Some(vec![0xDE, 0xAD]),
            ..Fixture::default()
        };

        let wav = fixture.read(true).unwrap();
        assert_eq!(wav.fmt.audio_format_name(), Some("ITU G.711 a-law"));
        assert_eq!(wav.fmt.size, 20);
        assert_eq!(wav.fmt.extra_param_size, 2);
        assert_eq!(wav.fmt.extra_params.as_deref(), Some(&[0xDE, 0xAD][..]));
        assert_eq!(wav.data.size, 8);
    }

    #[test]
    fn skips_unread_tail_of_fmt_chunk() {
        let mut bytes = Fixture::default().bytes();
        // Declare an 18 byte fmt chunk with a zero cbSize, as some encoders do.
        bytes[16..20].copy_from_slice(&18u32.to_le_bytes());
        bytes.insert(36, 0);
        bytes.insert(36, 0);
        let len = bytes.len() as u64;

        let wav = read_from(&mut Cursor::new(bytes), len, true).unwrap();
        assert_eq!(wav.fmt.size, 18);
        assert_eq!(wav.data.size, 8);
    }

    #[test]
    fn rejects_files_shorter_than_header() {
        let bytes = Fixture::default().bytes();
        let err = read_from(&mut Cursor::new(&bytes[..43]), 43, false).unwrap_err();
        assert!(matches!(err, WaveError::FileTooSmall { size: 43 }));
        assert!(err.is_format_error());
    }

    #[test]
    fn rejects_byte_rate_mismatch() {
        let fixture = Fixture {
            byte_rate: 1,
            ..Fixture::default()
        };
        match fixture.read(false) {
            Err(WaveError::ByteRateMismatch { expected, found }) => {
                assert_eq!(expected, 176_400);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_block_align_mismatch() {
        let fixture = Fixture {
            block_align: 3,
            ..Fixture::default()
        };
        assert!(matches!(
            fixture.read(false),
            Err(WaveError::BlockAlignMismatch { expected: 4, found: 3 })
        ));
    }

    #[test]
    fn rejects_bad_tags() {
        let riff = Fixture {
            riff: b"RIFX",
            ..Fixture::default()
        };
        assert!(matches!(riff.read(false), Err(WaveError::InvalidRiffId(_))));

        let wave = Fixture {
            wave: b"AVI ",
            ..Fixture::default()
        };
        assert!(matches!(wave.read(false), Err(WaveError::InvalidWaveId(_))));

        let fmt = Fixture {
            fmt: b"fmtx",
            ..Fixture::default()
        };
        assert!(matches!(fmt.read(false), Err(WaveError::InvalidFmtId(_))));
    }

    #[test]
    fn missing_data_chunk_fails_validation() {
        let mut chunks = b"LIST".to_vec();
        chunks.extend_from_slice(&8u32.to_le_bytes());
        chunks.extend_from_slice(b"INFOabcd");
        let fixture = Fixture {
            chunks,
            ..Fixture::default()
        };

        match fixture.read(true) {
            Err(WaveError::InvalidDataId(id)) => assert!(id.is_empty()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn field_checks_run_before_tag_checks() {
        let fixture = Fixture {
            riff: b"JUNK",
            block_align: 7,
            ..Fixture::default()
        };
        assert!(matches!(
            fixture.read(false),
            Err(WaveError::BlockAlignMismatch { .. })
        ));
    }

    #[test]
    fn missing_path_is_not_an_error() {
        let result = read_file("/definitely/not/here.wav", false).unwrap();
        assert!(result.is_none());
    }
}
