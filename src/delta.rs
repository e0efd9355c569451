// Delta engine capability boundary.
//
// The binary-delta algorithm is consumed, never reimplemented: the
// engine needs exactly one operation, "apply payload to base, get
// target". Payloads are self-terminating — each encodes its own section
// lengths — so an applier must tolerate trailing bytes that belong to
// later chunks interleaved in the same patch stream.

use std::io;

use qbsdiff::Bspatch;

/// Applies a previously produced binary delta to a base byte sequence.
pub trait DeltaApplier {
    /// Reconstruct the target from `base` and a delta `payload`.
    ///
    /// `payload` may extend past the logical end of the delta; the
    /// trailing bytes must be ignored.
    fn apply(&self, base: &[u8], payload: &[u8]) -> io::Result<Vec<u8>>;
}

/// BSDIFF40 applier backed by `qbsdiff`, the format the image patch
/// encoder embeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct BsdiffApplier;

impl DeltaApplier for BsdiffApplier {
    fn apply(&self, base: &[u8], payload: &[u8]) -> io::Result<Vec<u8>> {
        let patcher = Bspatch::new(payload)?;
        let mut target = Vec::with_capacity(patcher.hint_target_size() as usize);
        patcher.apply(base, &mut target)?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbsdiff::Bsdiff;

    fn diff(base: &[u8], target: &[u8]) -> Vec<u8> {
        let mut payload = Vec::new();
        Bsdiff::new(base, target)
            .compare(std::io::Cursor::new(&mut payload))
            .unwrap();
        payload
    }

    #[test]
    fn applies_a_generated_delta() {
        let base = b"The quick brown fox jumps over the lazy dog.".to_vec();
        let target = b"The quick brown cat sits on the lazy mat!".to_vec();
        let payload = diff(&base, &target);
        let out = BsdiffApplier.apply(&base, &payload).unwrap();
        assert_eq!(out, target);
    }

    #[test]
    fn ignores_trailing_bytes_after_the_payload() {
        let base: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let mut target = base.clone();
        target[17] = 0xAB;
        target.extend_from_slice(b"appended tail");

        let mut payload = diff(&base, &target);
        // Interleave a second chunk's worth of bytes after this payload,
        // the way the patch stream lays consecutive chunks out.
        payload.extend_from_slice(&diff(&target, &base));

        let out = BsdiffApplier.apply(&base, &payload).unwrap();
        assert_eq!(out, target);
    }

    #[test]
    fn rejects_a_non_delta_payload() {
        let result = BsdiffApplier.apply(b"base", b"definitely not a bsdiff stream");
        assert!(result.is_err());
    }

    #[test]
    fn empty_target_delta() {
        let base = b"something".to_vec();
        let payload = diff(&base, b"");
        let out = BsdiffApplier.apply(&base, &payload).unwrap();
        assert!(out.is_empty());
    }
}
