//! Sequential walk over the chunks that follow the fmt subchunk.

use std::io::Read;

use log::debug;

use crate::codec::{read_chunk_id, read_fixed_string, read_u32_le, skip};
use crate::format::{ChunkId, DataChunk};
use crate::WaveError;

const CHUNK_HEADER_LEN: u64 = 8;
/// The walk ends once fewer bytes than this are left.
const MIN_REMAINING: u64 = 12;

/// Smallest chunk body that can be found when it is the last chunk in a stream.
pub const MIN_TRAILING_BODY_LEN: u64 = MIN_REMAINING - CHUNK_HEADER_LEN;

/// Tag and declared size of a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: ChunkId,
    pub size: u32,
}

/// Why the walk stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkEnd {
    /// Fewer than twelve bytes were left in the stream.
    EndOfChunks,
    /// A zero sized chunk was found.
    Sentinel,
    /// A data chunk was found and its payload read.
    DataFound,
}

/// Outcome of [`ChunkWalker::find_data`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Walk {
    /// Last data chunk seen, or an empty chunk when there was none.
    pub data: DataChunk,
    pub end: WalkEnd,
}

/// Iterates RIFF chunks over a byte source whose total length is known.
pub struct ChunkWalker<'a, R> {
    source: &'a mut R,
    position: u64,
    len: u64,
}

impl<'a, R: Read> ChunkWalker<'a, R> {
    /// `position` is the current offset of `source` within a stream of `len` bytes.
    pub fn new(source: &'a mut R, position: u64, len: u64) -> Self {
        Self {
            source,
            position,
            len,
        }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.position)
    }

    /// Read the next chunk header, or `None` once fewer than twelve bytes remain.
    pub fn next_header(&mut self) -> Result<Option<ChunkHeader>, WaveError> {
        if self.remaining() < MIN_REMAINING {
            return Ok(None);
        }

        let id = read_chunk_id(self.source)?;
        let size = read_u32_le(self.source)?;
        self.position += CHUNK_HEADER_LEN;
        Ok(Some(ChunkHeader { id, size }))
    }

    /// Skip the body of the chunk whose header was just read.
    pub fn skip_body(&mut self, header: &ChunkHeader) -> Result<(), WaveError> {
        let skipped = skip(self.source, u64::from(header.size))?;
        self.position += skipped;
        debug!(
            "skipped '{}' chunk ({} of {} bytes)",
            header.id, skipped, header.size
        );
        Ok(())
    }

    /// Read the body of the chunk whose header was just read.
    pub fn read_body(&mut self, header: &ChunkHeader) -> Result<Vec<u8>, WaveError> {
        let size = u64::from(header.size);
        if size > self.remaining() {
            return Err(WaveError::Truncated {
                expected: header.size as usize,
                available: self.remaining() as usize,
            });
        }

        let body = read_fixed_string(self.source, header.size as usize)?;
        self.position += size;
        Ok(body)
    }

    /// Walk until a data chunk is located.
    ///
    /// With `read_data` the first data chunk is read and ends the walk.
    /// Without it every data chunk is recorded and skipped, so the last one
    /// seen before the end of the stream is the one returned.
    pub fn find_data(mut self, read_data: bool) -> Result<Walk, WaveError> {
        let mut data = DataChunk::default();

        loop {
            let Some(header) = self.next_header()? else {
                return Ok(Walk {
                    data,
                    end: WalkEnd::EndOfChunks,
                });
            };

            if header.size == 0 {
                debug!("chunk list ended at offset {}", self.position);
                return Ok(Walk {
                    data,
                    end: WalkEnd::Sentinel,
                });
            }

            if header.id == ChunkId::DATA {
                if read_data {
                    let payload = self.read_body(&header)?;
                    return Ok(Walk {
                        data: DataChunk {
                            id: header.id,
                            size: header.size,
                            payload: Some(payload),
                        },
                        end: WalkEnd::DataFound,
                    });
                }

                data = DataChunk {
                    id: header.id,
                    size: header.size,
                    payload: None,
                };
            }

            self.skip_body(&header)?;
        }
    }
}
