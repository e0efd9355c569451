// Read-only views over the source image and the optional bonus blob.
//
// Source reads never alias output writes: the output sink is seeded with
// a copy of the source and then overwritten, while every chunk's input
// bytes come from this untouched view. That separation is what makes the
// seed-then-overwrite output protocol correct.

use crate::error::ApplyError;

// ---------------------------------------------------------------------------
// SourceImage
// ---------------------------------------------------------------------------

/// Random-access view over the immutable source image.
#[derive(Debug, Clone, Copy)]
pub struct SourceImage<'a> {
    data: &'a [u8],
}

impl<'a> SourceImage<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Image length in bytes.
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The whole image, used to seed the output sink.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Exactly `len` bytes starting at `offset`.
    pub fn read(&self, offset: u64, len: u64) -> Result<&'a [u8], ApplyError> {
        let end = offset.checked_add(len);
        match end {
            Some(end) if end <= self.len() => Ok(&self.data[offset as usize..end as usize]),
            _ => Err(ApplyError::ShortRead {
                offset,
                len,
                image_len: self.len(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// BonusData
// ---------------------------------------------------------------------------

/// The optional bonus blob, consumed to exhaustion at most once.
///
/// The reference behavior appends the remaining bonus bytes to every
/// deflate chunk's decompressed source; since the first append drains
/// the stream, only one chunk ever receives data. `take_remaining`
/// models that: the first call returns everything, later calls return an
/// empty slice.
#[derive(Debug)]
pub struct BonusData<'a> {
    data: &'a [u8],
    consumed: bool,
}

impl<'a> BonusData<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            consumed: false,
        }
    }

    /// An empty bonus stream, for runs without a bonus file.
    pub fn empty() -> Self {
        Self::new(&[])
    }

    /// Remaining length in bytes.
    pub fn remaining(&self) -> u64 {
        if self.consumed { 0 } else { self.data.len() as u64 }
    }

    /// Drain the stream: full contents on first call, empty afterwards.
    pub fn take_remaining(&mut self) -> &'a [u8] {
        if self.consumed {
            &[]
        } else {
            self.consumed = true;
            self.data
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
