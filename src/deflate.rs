// Raw-deflate handling for compressed chunks.
//
// Decompression uses the raw convention (no zlib/gzip framing, the
// negative window-bits form) and is bounded by the expanded length the
// patch declares. Recompression replays the exact parameters recorded in
// the chunk record and deliberately never finalizes the stream: the
// original encoder emitted each chunk as an unterminated fragment for
// embedding inside a larger still-being-built image, and bit-identity
// requires doing the same.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use crate::error::ApplyError;

/// Deflate method tag for "deflated" (the only method zlib defines).
const METHOD_DEFLATED: i32 = 8;

/// The mem_level every known encoder records (the zlib default).
const DEFAULT_MEM_LEVEL: i32 = 8;

/// Z_DEFAULT_STRATEGY.
const DEFAULT_STRATEGY: i32 = 0;

/// Granularity for growing the recompression output buffer.
const CHUNK_OUT: usize = 32 * 1024;

// ---------------------------------------------------------------------------
// Recompression parameters
// ---------------------------------------------------------------------------

/// The five recompression parameters recorded in a deflate chunk record,
/// in the order they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeflateParams {
    pub level: i32,
    pub method: i32,
    pub window_bits: i32,
    pub mem_level: i32,
    pub strategy: i32,
}

impl DeflateParams {
    /// Parameters every known encoder records for raw streams.
    pub fn raw_defaults(level: i32) -> Self {
        Self {
            level,
            method: METHOD_DEFLATED,
            window_bits: -15,
            mem_level: DEFAULT_MEM_LEVEL,
            strategy: DEFAULT_STRATEGY,
        }
    }

    /// Reject parameter combinations the backend cannot replay
    /// bit-identically. Failing loudly here beats producing an image
    /// whose compressed regions differ from the encoder's.
    pub fn validate(&self) -> Result<(), ApplyError> {
        let window_ok = matches!(self.window_bits.unsigned_abs(), 9..=15);
        if (0..=9).contains(&self.level)
            && self.method == METHOD_DEFLATED
            && window_ok
            && self.mem_level == DEFAULT_MEM_LEVEL
            && self.strategy == DEFAULT_STRATEGY
        {
            Ok(())
        } else {
            Err(ApplyError::UnsupportedDeflateParams {
                level: self.level,
                method: self.method,
                window_bits: self.window_bits,
                mem_level: self.mem_level,
                strategy: self.strategy,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Bounded decompression
// ---------------------------------------------------------------------------

/// Inflate a headerless raw-deflate stream, producing at most `limit`
/// bytes plus one probe byte.
///
/// The probe byte is how a stream longer than the declared expanded
/// length is detected: callers treat an output of `limit + 1` bytes as a
/// length mismatch instead of silently truncating. A stream that ends
/// early (the bonus-data case) simply yields fewer bytes; the caller
/// checks the combined length.
pub fn inflate_bounded(data: &[u8], limit: u64) -> Result<Vec<u8>, ApplyError> {
    let cap = usize::try_from(limit)
        .ok()
        .and_then(|l| l.checked_add(1))
        .ok_or(ApplyError::ExpansionLengthMismatch {
            actual: u64::MAX,
            expected: limit,
        })?;

    let mut inflater = Decompress::new(false);
    let mut out = Vec::with_capacity(cap);

    loop {
        let consumed = inflater.total_in() as usize;
        if out.len() >= cap || consumed == data.len() {
            break;
        }
        let status = inflater.decompress_vec(&data[consumed..], &mut out, FlushDecompress::None)?;
        match status {
            Status::StreamEnd => break,
            Status::Ok => {}
            // No forward progress possible: either the output is full or
            // the stream needs more input than exists.
            Status::BufError => break,
        }
    }

    // The allocator may hand out more capacity than requested; clamp to
    // the declared bound plus the probe byte.
    out.truncate(cap);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Parameter-replay recompression
// ---------------------------------------------------------------------------

/// Compress `plain` with the recorded parameters, as a single pass with
/// no flush and no stream finalization.
///
/// The result is whatever the deflater emitted while consuming the
/// input; tail data still buffered inside the deflater is dropped, which
/// is exactly what the original encoder did.
pub fn recompress(plain: &[u8], params: &DeflateParams) -> Result<Vec<u8>, ApplyError> {
    params.validate()?;

    let zlib_header = params.window_bits > 0;
    let window_bits = params.window_bits.unsigned_abs() as u8;
    let mut deflater = Compress::new_with_window_bits(
        Compression::new(params.level as u32),
        zlib_header,
        window_bits,
    );

    let mut out = Vec::with_capacity(plain.len() / 2 + CHUNK_OUT);
    loop {
        let consumed = deflater.total_in() as usize;
        if consumed == plain.len() {
            break;
        }
        if out.len() == out.capacity() {
            out.reserve(CHUNK_OUT);
        }
        deflater.compress_vec(&plain[consumed..], &mut out, FlushCompress::None)?;
    }

    Ok(out)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
