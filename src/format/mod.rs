// IMGDIFF2 wire format: magic token, chunk type tags, cursor reader and
// directory parser.
//
// All multi-byte integers are little-endian. Offsets and lengths are
// decoded as u64, the 32-bit fields (chunk count, type tags, deflate
// parameters) as i32; `window_bits` is negative for raw streams.

pub mod cursor;
pub mod directory;

pub use cursor::PatchCursor;
pub use directory::{ChunkRecord, DeflateChunk, NormalChunk, PatchDirectory};

/// Fixed 8-byte token at the start of every patch stream.
pub const MAGIC: [u8; 8] = *b"IMGDIFF2";

/// Type tag for a normal (uncompressed-region) chunk.
pub const CHUNK_NORMAL: i32 = 0;

/// Type tag for a deflate (compressed-region) chunk.
pub const CHUNK_DEFLATE: i32 = 2;

/// Type tag for a raw chunk. Present in the format, unsupported here.
pub const CHUNK_RAW: i32 = 3;
