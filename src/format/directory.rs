// Patch directory parsing.
//
// The directory is self-describing: magic token, a chunk count, then one
// typed record per chunk. Record order is semantically significant — it
// is both parse order and output-write order. Parsing is pure and the
// resulting directory is immutable.

use crate::deflate::DeflateParams;
use crate::error::ApplyError;
use crate::format::{CHUNK_DEFLATE, CHUNK_NORMAL, CHUNK_RAW, MAGIC, PatchCursor};

// ---------------------------------------------------------------------------
// Chunk records
// ---------------------------------------------------------------------------

/// A chunk over an uncompressed region of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalChunk {
    /// Offset of the region in the source image.
    pub src_start: u64,
    /// Length of the region in bytes.
    pub src_len: u64,
    /// Offset in the patch stream where this chunk's delta payload begins.
    pub patch_offset: u64,
}

/// A chunk over a raw-deflate compressed region of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeflateChunk {
    pub src_start: u64,
    pub src_len: u64,
    pub patch_offset: u64,
    /// Expected size of the decompressed source range (after optionally
    /// appending bonus data).
    pub src_expanded_len: u64,
    /// Expected size of the delta-reconstructed plaintext.
    pub target_expected_len: u64,
    /// Recompression parameters recorded by the encoder.
    pub params: DeflateParams,
}

/// One parsed chunk record. A closed union: accepting or rejecting a
/// chunk kind is an exhaustive-match decision, not a lookup miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkRecord {
    Normal(NormalChunk),
    Deflate(DeflateChunk),
    /// Tag 3. The record carries no fields and processing one always
    /// fails; it exists so a directory containing one can still be
    /// reported before the run aborts.
    Raw,
}

impl ChunkRecord {
    /// Short human-readable kind name, used in progress logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ChunkRecord::Normal(_) => "normal",
            ChunkRecord::Deflate(_) => "deflate",
            ChunkRecord::Raw => "raw",
        }
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// The ordered chunk directory of a patch stream.
#[derive(Debug, Clone)]
pub struct PatchDirectory {
    chunks: Vec<ChunkRecord>,
}

impl PatchDirectory {
    /// Parse the directory from the head of the patch stream, leaving
    /// the cursor just past the last record.
    pub fn parse(cursor: &mut PatchCursor<'_>) -> Result<Self, ApplyError> {
        let header = cursor.read_bytes(MAGIC.len())?;
        if header != MAGIC {
            return Err(ApplyError::BadMagic {
                found: header.try_into().unwrap(),
            });
        }

        let count = cursor.read_i32()?;
        if count < 0 {
            return Err(ApplyError::InvalidChunkCount(count));
        }

        let mut chunks = Vec::with_capacity(count as usize);
        for _ in 0..count {
            chunks.push(read_record(cursor)?);
        }
        Ok(Self { chunks })
    }

    /// The records, in directory (and therefore output-write) order.
    pub fn chunks(&self) -> &[ChunkRecord] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

fn read_record(cursor: &mut PatchCursor<'_>) -> Result<ChunkRecord, ApplyError> {
    let tag = cursor.read_i32()?;
    match tag {
        CHUNK_NORMAL => Ok(ChunkRecord::Normal(NormalChunk {
            src_start: cursor.read_u64()?,
            src_len: cursor.read_u64()?,
            patch_offset: cursor.read_u64()?,
        })),
        CHUNK_DEFLATE => Ok(ChunkRecord::Deflate(DeflateChunk {
            src_start: cursor.read_u64()?,
            src_len: cursor.read_u64()?,
            patch_offset: cursor.read_u64()?,
            src_expanded_len: cursor.read_u64()?,
            target_expected_len: cursor.read_u64()?,
            params: DeflateParams {
                level: cursor.read_i32()?,
                method: cursor.read_i32()?,
                window_bits: cursor.read_i32()?,
                mem_level: cursor.read_i32()?,
                strategy: cursor.read_i32()?,
            },
        })),
        CHUNK_RAW => Ok(ChunkRecord::Raw),
        other => Err(ApplyError::UnknownChunkType(other)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
