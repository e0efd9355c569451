// Patch application engine: chunk processing and output sequencing.
//
// Orchestrates the whole run:
//   - Parse the chunk directory (format module)
//   - Seed the output sink with a verbatim copy of the source, rewind
//   - For each record, in directory order, produce that chunk's output
//     bytes and append them at the implicit cursor position
//
// Chunk inputs always come from the untouched source view, never from
// the output sink, even though the sink's early region starts out
// byte-identical to the source.

use std::io::{Seek, SeekFrom, Write};

use log::{debug, info};

use crate::deflate;
use crate::delta::{BsdiffApplier, DeltaApplier};
use crate::error::ApplyError;
use crate::format::{ChunkRecord, DeflateChunk, NormalChunk, PatchCursor, PatchDirectory};
use crate::source::{BonusData, SourceImage};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Summary of a completed run.
#[derive(Debug, Clone, Copy)]
pub struct ApplyStats {
    /// Number of chunks processed.
    pub chunk_count: usize,
    /// Source image size in bytes (also the size of the output seed).
    pub source_len: u64,
    /// Total bytes written by chunk processing, i.e. the final cursor
    /// position.
    pub bytes_written: u64,
    /// Final output length: the seed, possibly extended by the chunks.
    pub output_len: u64,
}

// ---------------------------------------------------------------------------
// Top-level apply
// ---------------------------------------------------------------------------

/// Apply an IMGDIFF2 patch with the default BSDIFF40 delta engine.
///
/// `bonus` is the optional supplementary blob consumed by at most one
/// deflate chunk. The output sink receives a full copy of `source`
/// first, then each chunk's bytes sequentially from position 0.
pub fn apply<W: Write + Seek>(
    source: &[u8],
    patch: &[u8],
    bonus: Option<&[u8]>,
    output: &mut W,
) -> Result<ApplyStats, ApplyError> {
    apply_with(&BsdiffApplier, source, patch, bonus, output)
}

/// Apply with a caller-supplied delta engine.
pub fn apply_with<D: DeltaApplier, W: Write + Seek>(
    delta: &D,
    source: &[u8],
    patch: &[u8],
    bonus: Option<&[u8]>,
    output: &mut W,
) -> Result<ApplyStats, ApplyError> {
    let source = SourceImage::new(source);
    let mut cursor = PatchCursor::new(patch);
    let directory = PatchDirectory::parse(&mut cursor)?;
    info!("patch directory: {} chunks", directory.len());

    // Seed the output with the source image, then rewind. Later chunks
    // overwrite from the front; whatever they do not reach stays as-is.
    output.write_all(source.as_bytes())?;
    output.seek(SeekFrom::Start(0))?;

    let mut bonus = match bonus {
        Some(data) => BonusData::new(data),
        None => BonusData::empty(),
    };

    let mut written = 0u64;
    for (index, record) in directory.chunks().iter().enumerate() {
        let bytes = match record {
            ChunkRecord::Normal(chunk) => process_normal(delta, &source, &mut cursor, chunk)?,
            ChunkRecord::Deflate(chunk) => {
                process_deflate(delta, &source, &mut cursor, &mut bonus, chunk)?
            }
            ChunkRecord::Raw => return Err(ApplyError::UnsupportedChunkType),
        };
        debug!(
            "chunk {index} ({}): output {written}..{} ({} bytes)",
            record.kind(),
            written + bytes.len() as u64,
            bytes.len()
        );
        output.write_all(&bytes)?;
        written += bytes.len() as u64;
    }

    let stats = ApplyStats {
        chunk_count: directory.len(),
        source_len: source.len(),
        bytes_written: written,
        output_len: source.len().max(written),
    };
    info!(
        "applied {} chunks: {} bytes written, output is {} bytes",
        stats.chunk_count, stats.bytes_written, stats.output_len
    );
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Chunk processing
// ---------------------------------------------------------------------------

fn process_normal<D: DeltaApplier>(
    delta: &D,
    source: &SourceImage<'_>,
    cursor: &mut PatchCursor<'_>,
    chunk: &NormalChunk,
) -> Result<Vec<u8>, ApplyError> {
    cursor.seek(chunk.patch_offset)?;
    let payload = cursor.read_remaining();
    let base = source.read(chunk.src_start, chunk.src_len)?;
    delta.apply(base, payload).map_err(ApplyError::Delta)
}

fn process_deflate<D: DeltaApplier>(
    delta: &D,
    source: &SourceImage<'_>,
    cursor: &mut PatchCursor<'_>,
    bonus: &mut BonusData<'_>,
    chunk: &DeflateChunk,
) -> Result<Vec<u8>, ApplyError> {
    cursor.seek(chunk.patch_offset)?;
    let payload = cursor.read_remaining();

    // The source range is a headerless raw-deflate stream.
    let compressed = source.read(chunk.src_start, chunk.src_len)?;
    let mut expanded = deflate::inflate_bounded(compressed, chunk.src_expanded_len)?;
    expanded.extend_from_slice(bonus.take_remaining());
    if expanded.len() as u64 != chunk.src_expanded_len {
        return Err(ApplyError::ExpansionLengthMismatch {
            actual: expanded.len() as u64,
            expected: chunk.src_expanded_len,
        });
    }

    let plain = delta.apply(&expanded, payload).map_err(ApplyError::Delta)?;
    if plain.len() as u64 != chunk.target_expected_len {
        return Err(ApplyError::ReconstructionLengthMismatch {
            actual: plain.len() as u64,
            expected: chunk.target_expected_len,
        });
    }

    deflate::recompress(&plain, &chunk.params)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
