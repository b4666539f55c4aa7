//! Little-endian field primitives shared by the reader and the writer.

use std::io::{self, ErrorKind, Read};

use byteorder::{ByteOrder, LittleEndian};

use crate::format::ChunkId;
use crate::WaveError;

/// Read exactly `n` bytes verbatim.
///
/// No encoding validation is performed; chunk tags and opaque parameter
/// blobs are both handled as raw bytes.
pub fn read_fixed_string<R: Read>(source: &mut R, n: usize) -> Result<Vec<u8>, WaveError> {
    let mut buf = vec![0u8; n];
    fill(source, &mut buf)?;
    Ok(buf)
}

/// Read a four byte chunk tag.
pub fn read_chunk_id<R: Read>(source: &mut R) -> Result<ChunkId, WaveError> {
    let mut buf = [0u8; 4];
    fill(source, &mut buf)?;
    Ok(ChunkId::new(buf))
}

/// Read a little-endian `u16`.
pub fn read_u16_le<R: Read>(source: &mut R) -> Result<u16, WaveError> {
    let mut buf = [0u8; 2];
    fill(source, &mut buf)?;
    Ok(LittleEndian::read_u16(&buf))
}

/// Read a little-endian `u32`.
pub fn read_u32_le<R: Read>(source: &mut R) -> Result<u32, WaveError> {
    let mut buf = [0u8; 4];
    fill(source, &mut buf)?;
    Ok(LittleEndian::read_u32(&buf))
}

/// Little-endian bytes of `value`.
pub fn encode_u16_le(value: u16) -> [u8; 2] {
    let mut buf = [0u8; 2];
    LittleEndian::write_u16(&mut buf, value);
    buf
}

/// Little-endian bytes of `value`.
pub fn encode_u32_le(value: u32) -> [u8; 4] {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value);
    buf
}

/// Like `read_exact`, but reports how many bytes were actually available.
fn fill<R: Read>(source: &mut R, buf: &mut [u8]) -> Result<(), WaveError> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(WaveError::Truncated {
                    expected: buf.len(),
                    available: filled,
                })
            }
            Ok(read) => filled += read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(WaveError::Io(err)),
        }
    }
    Ok(())
}

/// Discard up to `count` bytes, returning how many were skipped.
pub(crate) fn skip<R: Read>(source: &mut R, count: u64) -> Result<u64, WaveError> {
    Ok(io::copy(&mut source.by_ref().take(count), &mut io::sink())?)
}
