// Error taxonomy for patch application.
//
// Every variant is fatal: a patch engine must never emit a partially
// reconstructed image, so the run either completes all chunks or aborts
// at the first failure.

use std::io;

use thiserror::Error;

/// Errors raised while parsing or applying an IMGDIFF2 patch.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The patch stream does not start with the IMGDIFF2 magic token.
    #[error("not an IMGDIFF2 patch (header {found:02X?})")]
    BadMagic {
        /// The 8 bytes found where the magic token was expected.
        found: [u8; 8],
    },

    /// The directory declares a negative chunk count.
    #[error("invalid chunk count: {0}")]
    InvalidChunkCount(i32),

    /// A chunk record carries a type tag this format does not define.
    #[error("unknown chunk type tag: {0}")]
    UnknownChunkType(i32),

    /// Raw chunks (tag 3) are intentionally unsupported.
    #[error("raw chunks are not supported")]
    UnsupportedChunkType,

    /// A read would run past the end of the patch stream.
    #[error("patch stream truncated: {needed} bytes at offset {offset}, stream is {stream_len} bytes")]
    TruncatedInput {
        offset: u64,
        needed: u64,
        stream_len: u64,
    },

    /// A source-range read would run past the end of the source image.
    #[error("short read: {len} bytes at offset {offset} exceeds source image size {image_len}")]
    ShortRead { offset: u64, len: u64, image_len: u64 },

    /// The decompressed source range (plus bonus data, if any) does not
    /// match the length the patch declared.
    #[error("uncompressed source data is {actual} bytes, patch declares {expected}")]
    ExpansionLengthMismatch { actual: u64, expected: u64 },

    /// The delta-reconstructed plaintext does not match the length the
    /// patch declared.
    #[error("reconstructed data is {actual} bytes, patch declares {expected}")]
    ReconstructionLengthMismatch { actual: u64, expected: u64 },

    /// The recorded recompression parameters cannot be replayed
    /// bit-identically by the deflate backend.
    #[error(
        "cannot replay deflate parameters \
         (level={level}, method={method}, window_bits={window_bits}, \
         mem_level={mem_level}, strategy={strategy})"
    )]
    UnsupportedDeflateParams {
        level: i32,
        method: i32,
        window_bits: i32,
        mem_level: i32,
        strategy: i32,
    },

    /// The compressed source range is not a valid raw-deflate stream.
    #[error("raw-deflate decompression failed")]
    Inflate(#[from] flate2::DecompressError),

    /// The recompression pass failed.
    #[error("raw-deflate recompression failed")]
    Deflate(#[from] flate2::CompressError),

    /// The delta engine rejected a chunk payload.
    #[error("delta reconstruction failed")]
    Delta(#[source] io::Error),

    /// I/O error on the output sink or an input file.
    #[error("I/O error")]
    Io(#[from] io::Error),

    /// OTA archive could not be opened or is missing an entry.
    #[error("archive error")]
    Archive(#[from] zip::result::ZipError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_lengths() {
        let err = ApplyError::ExpansionLengthMismatch {
            actual: 10,
            expected: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("10"), "{msg}");
        assert!(msg.contains("12"), "{msg}");

        let err = ApplyError::ShortRead {
            offset: 96,
            len: 8,
            image_len: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("96"), "{msg}");
        assert!(msg.contains("100"), "{msg}");
    }

    #[test]
    fn delta_errors_expose_their_source() {
        use std::error::Error;
        let inner = io::Error::new(io::ErrorKind::InvalidData, "bad bsdiff header");
        let err = ApplyError::Delta(inner);
        assert!(err.source().is_some());
    }
}
