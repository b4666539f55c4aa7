//! Generation of PCM WAVE files with a placeholder payload.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::chunk::MIN_TRAILING_BODY_LEN;
use crate::codec::{encode_u16_le, encode_u32_le};
use crate::format::{ChunkId, WaveFile, AUDIO_FORMAT_PCM};
use crate::reader::read_file;
use crate::WaveError;

/// Size of the fmt chunk body written for PCM files.
const PCM_FMT_SIZE: u32 = 16;
/// Bytes of RIFF chunk that precede the sample data: "WAVE", fmt chunk, data header.
const RIFF_OVERHEAD: u32 = 36;
/// Products this close to a whole frame count are taken as exact.
const FRAME_EPSILON: f64 = 1e-6;

/// Channel count, sample rate and sample width of a PCM file to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PcmFormat {
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

impl Default for PcmFormat {
    /// Mono, 8 kHz, 16 bit.
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 8_000,
            bits_per_sample: 16,
        }
    }
}

impl PcmFormat {
    /// Start building a format from the mono 8 kHz 16 bit defaults.
    pub fn builder() -> PcmFormatBuilder {
        PcmFormatBuilder {
            format: Self::default(),
        }
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Frames per second.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Bytes per sample frame across all channels.
    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    /// Bytes per second, as stored in the fmt chunk.
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }

    /// Number of sample bytes needed for `seconds` of audio.
    ///
    /// Fractional durations are truncated to a whole number of frames. A
    /// product within rounding noise of a whole frame count, such as
    /// `0.7 * 44100`, counts as that many frames. The result must be at least
    /// [`MIN_TRAILING_BODY_LEN`] bytes, since a shorter data chunk at the end
    /// of a file is not found when the file is read back.
    pub fn data_size(&self, seconds: f64) -> Result<u32, WaveError> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(WaveError::InvalidParameter(format!(
                "duration must be a non-negative number of seconds, got {seconds}"
            )));
        }

        let exact = seconds * f64::from(self.sample_rate);
        let nearest = exact.round();
        let frames = if (exact - nearest).abs() < FRAME_EPSILON {
            nearest
        } else {
            exact.floor()
        };
        let bytes = frames * f64::from(self.block_align());
        if bytes > f64::from(u32::MAX - RIFF_OVERHEAD) {
            return Err(WaveError::InvalidParameter(format!(
                "{seconds} seconds of audio does not fit in a RIFF file"
            )));
        }

        if bytes < MIN_TRAILING_BODY_LEN as f64 {
            return Err(WaveError::InvalidParameter(format!(
                "{seconds} seconds gives {bytes} data bytes, fewer than the \
                 {MIN_TRAILING_BODY_LEN} needed to read the file back"
            )));
        }

        Ok(bytes as u32)
    }
}

/// Builder for [`PcmFormat`].
#[derive(Clone, Debug)]
pub struct PcmFormatBuilder {
    format: PcmFormat,
}

impl PcmFormatBuilder {
    pub fn channels(mut self, channels: u16) -> Self {
        self.format.channels = channels;
        self
    }

    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.format.sample_rate = sample_rate;
        self
    }

    pub fn bits_per_sample(mut self, bits_per_sample: u16) -> Self {
        self.format.bits_per_sample = bits_per_sample;
        self
    }

    /// Validate the settings and produce the format.
    pub fn build(self) -> Result<PcmFormat, WaveError> {
        let PcmFormat {
            channels,
            sample_rate,
            bits_per_sample,
        } = self.format;

        if channels == 0 {
            return Err(WaveError::InvalidParameter(
                "channel count must be at least one".into(),
            ));
        }
        if sample_rate == 0 {
            return Err(WaveError::InvalidParameter(
                "sample rate must be greater than zero".into(),
            ));
        }
        if bits_per_sample == 0 || bits_per_sample % 8 != 0 {
            return Err(WaveError::InvalidParameter(format!(
                "bits per sample must be a non-zero multiple of 8, got {bits_per_sample}"
            )));
        }

        let block_align = u32::from(channels) * u32::from(bits_per_sample / 8);
        if block_align > u32::from(u16::MAX)
            || u64::from(block_align) * u64::from(sample_rate) > u64::from(u32::MAX)
        {
            return Err(WaveError::InvalidParameter(
                "byte rate does not fit in the fmt chunk".into(),
            ));
        }

        Ok(self.format)
    }
}

/// Supplies the sample bytes written into generated files.
pub trait PayloadSource {
    fn fill(&mut self, buf: &mut [u8]);
}

/// Placeholder payload drawn from the 62 ASCII letters and digits.
///
/// The bytes are noise, not meaningful audio.
#[derive(Clone, Debug)]
pub struct AlphanumericNoise<R = StdRng> {
    rng: R,
}

impl AlphanumericNoise<StdRng> {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// A reproducible stream, mostly useful in tests.
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for AlphanumericNoise<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> AlphanumericNoise<R> {
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> PayloadSource for AlphanumericNoise<R> {
    fn fill(&mut self, buf: &mut [u8]) {
        for byte in buf.iter_mut() {
            *byte = self.rng.sample(Alphanumeric);
        }
    }
}

/// Write `seconds` of alphanumeric noise as a PCM WAVE file at `path`.
///
/// The file is read back before returning, so the result reflects what is on
/// disk rather than what was intended.
pub fn create_pcm_file<P: AsRef<Path>>(
    path: P,
    seconds: f64,
    format: PcmFormat,
) -> Result<WaveFile, WaveError> {
    create_pcm_file_with(path, seconds, format, &mut AlphanumericNoise::new())
}

/// Like [`create_pcm_file`], drawing the sample bytes from `payload`.
pub fn create_pcm_file_with<P, S>(
    path: P,
    seconds: f64,
    format: PcmFormat,
    payload: &mut S,
) -> Result<WaveFile, WaveError>
where
    P: AsRef<Path>,
    S: PayloadSource + ?Sized,
{
    let path = path.as_ref();
    let data_size = format.data_size(seconds)?;

    let file = File::create(path).map_err(|source| WaveError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    writer.write_all(&riff_header(data_size))?;
    writer.write_all(&fmt_chunk(&format))?;
    writer.write_all(&data_header(data_size))?;

    let mut samples = vec![0u8; data_size as usize];
    payload.fill(&mut samples);
    writer.write_all(&samples)?;
    writer.flush()?;
    drop(writer);

    info!(
        "wrote '{}': {} ch, {} Hz, {} bit, {} data bytes",
        path.display(),
        format.channels,
        format.sample_rate,
        format.bits_per_sample,
        data_size
    );

    read_file(path, false)?.ok_or_else(|| WaveError::Vanished(path.to_path_buf()))
}

fn riff_header(data_size: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(12);
    bytes.extend_from_slice(ChunkId::RIFF.as_bytes());
    bytes.extend_from_slice(&encode_u32_le(RIFF_OVERHEAD + data_size));
    bytes.extend_from_slice(ChunkId::WAVE.as_bytes());
    bytes
}

fn fmt_chunk(format: &PcmFormat) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(24);
    bytes.extend_from_slice(ChunkId::FMT.as_bytes());
    bytes.extend_from_slice(&encode_u32_le(PCM_FMT_SIZE));
    bytes.extend_from_slice(&encode_u16_le(AUDIO_FORMAT_PCM));
    bytes.extend_from_slice(&encode_u16_le(format.channels));
    bytes.extend_from_slice(&encode_u32_le(format.sample_rate));
    bytes.extend_from_slice(&encode_u32_le(format.byte_rate()));
    bytes.extend_from_slice(&encode_u16_le(format.block_align()));
    bytes.extend_from_slice(&encode_u16_le(format.bits_per_sample));
    bytes
}

fn data_header(data_size: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(8);
    bytes.extend_from_slice(ChunkId::DATA.as_bytes());
    bytes.extend_from_slice(&encode_u32_le(data_size));
    bytes
}
