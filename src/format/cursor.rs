// Sequential, position-addressable reader over an in-memory patch stream.
//
// Reads advance the cursor monotonically; `seek` is the only way to move
// it elsewhere, which the engine uses to jump to each chunk record's
// stored `patch_offset`.

use crate::error::ApplyError;

/// Cursor over the raw bytes of a patch stream.
#[derive(Debug)]
pub struct PatchCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> PatchCursor<'a> {
    /// Wrap a patch stream, positioned at offset 0.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Total stream length in bytes.
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// Whether the stream is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current cursor position.
    pub fn position(&self) -> u64 {
        self.pos as u64
    }

    /// Absolute seek. Positions past the end of the stream are rejected.
    pub fn seek(&mut self, pos: u64) -> Result<(), ApplyError> {
        if pos > self.data.len() as u64 {
            return Err(ApplyError::TruncatedInput {
                offset: pos,
                needed: 0,
                stream_len: self.len(),
            });
        }
        self.pos = pos as usize;
        Ok(())
    }

    /// Consume exactly `n` bytes, advancing the cursor.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ApplyError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or(ApplyError::TruncatedInput {
                offset: self.pos as u64,
                needed: n as u64,
                stream_len: self.len(),
            })?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Consume 4 bytes as a little-endian i32.
    pub fn read_i32(&mut self) -> Result<i32, ApplyError> {
        let bytes = self.read_bytes(4)?;
        Ok(i32::from_le_bytes(bytes.try_into().unwrap()))
    }

    /// Consume 8 bytes as a little-endian u64.
    pub fn read_u64(&mut self) -> Result<u64, ApplyError> {
        let bytes = self.read_bytes(8)?;
        Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
    }

    /// Consume everything from the current position to the end of the
    /// stream. Chunk delta payloads are read this way: each payload is
    /// self-terminating, so trailing bytes belonging to later chunks are
    /// handed along and ignored by the delta engine.
    pub fn read_remaining(&mut self) -> &'a [u8] {
        let bytes = &self.data[self.pos..];
        self.pos = self.data.len();
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_advance_the_cursor() {
        let data = [0x01, 0x00, 0x00, 0x00, 0xFF, 0xEE];
        let mut cur = PatchCursor::new(&data);
        assert_eq!(cur.read_i32().unwrap(), 1);
        assert_eq!(cur.position(), 4);
        assert_eq!(cur.read_bytes(2).unwrap(), &[0xFF, 0xEE]);
        assert_eq!(cur.position(), 6);
    }

    #[test]
    fn integers_are_little_endian() {
        let mut data = Vec::new();
        data.extend_from_slice(&(-2i32).to_le_bytes());
        data.extend_from_slice(&0x0123_4567_89AB_CDEFu64.to_le_bytes());
        let mut cur = PatchCursor::new(&data);
        assert_eq!(cur.read_i32().unwrap(), -2);
        assert_eq!(cur.read_u64().unwrap(), 0x0123_4567_89AB_CDEF);
    }

    #[test]
    fn read_past_end_is_truncated_input() {
        let mut cur = PatchCursor::new(&[0u8; 3]);
        let err = cur.read_i32().unwrap_err();
        assert!(matches!(err, ApplyError::TruncatedInput { .. }), "{err}");
        // Position is untouched on failure.
        assert_eq!(cur.position(), 0);
    }

    #[test]
    fn seek_then_read_remaining() {
        let data = [1, 2, 3, 4, 5];
        let mut cur = PatchCursor::new(&data);
        cur.seek(3).unwrap();
        assert_eq!(cur.read_remaining(), &[4, 5]);
        assert_eq!(cur.position(), 5);
        // A second read yields an empty payload, not an error.
        assert_eq!(cur.read_remaining(), &[] as &[u8]);
    }

    #[test]
    fn seek_past_end_is_rejected() {
        let mut cur = PatchCursor::new(&[0u8; 4]);
        assert!(cur.seek(4).is_ok());
        assert!(matches!(
            cur.seek(5),
            Err(ApplyError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn empty_stream() {
        let mut cur = PatchCursor::new(&[]);
        assert!(cur.is_empty());
        assert_eq!(cur.len(), 0);
        assert_eq!(cur.read_remaining(), &[] as &[u8]);
        assert!(cur.read_bytes(1).is_err());
    }
}
