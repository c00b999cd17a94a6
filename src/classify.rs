//! classify.rs - payload classification for the netboot dispatch loop.
//!
//! A completed transfer is either a standalone firmware image to chainload
//! or a kernel payload to boot directly. The distinction is a magic-byte
//! sniff, not a format parse: two bytes at offset 0 and two at offset 0x80.
//! A payload that coincidentally carries both pairs is routed to chainload;
//! that is an accepted limitation of the scheme, as is the minimum-size
//! gate below, which only guards against classifying an in-progress
//! transfer and is not validated against the sender.

/// Transfers below this size are treated as still in flight.
pub const MIN_KERNEL_SIZE: usize = 32 * 1024;

/// First signature pair, at offset 0.
pub const SIG_HEAD: [u8; 2] = [b'M', b'Z'];
/// Second signature pair offset.
pub const SIG_TAIL_OFFSET: usize = 0x80;
/// Second signature pair.
pub const SIG_TAIL: [u8; 2] = [b'P', b'E'];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PayloadKind {
    /// A loadable firmware image; hand it to the firmware image loader and
    /// resume listening if it returns.
    ChainloadImage,
    /// Anything else: boot it as the kernel.
    KernelPayload,
}

/// True once a transfer is plausibly complete. Heuristic only.
pub fn plausibly_complete(len: usize) -> bool {
    len >= MIN_KERNEL_SIZE
}

/// Classify a received payload by its header bytes. Pure function of the
/// four signature bytes; length only matters for being able to read them.
pub fn classify(payload: &[u8]) -> PayloadKind {
    if payload.len() >= SIG_TAIL_OFFSET + SIG_TAIL.len()
        && payload[..2] == SIG_HEAD
        && payload[SIG_TAIL_OFFSET..SIG_TAIL_OFFSET + 2] == SIG_TAIL
    {
        PayloadKind::ChainloadImage
    } else {
        PayloadKind::KernelPayload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_with(head: [u8; 2], tail: [u8; 2]) -> alloc::vec::Vec<u8> {
        let mut p = alloc::vec![0u8; 40_000];
        p[..2].copy_from_slice(&head);
        p[SIG_TAIL_OFFSET..SIG_TAIL_OFFSET + 2].copy_from_slice(&tail);
        p
    }

    #[test]
    fn signature_selects_chainload() {
        let p = payload_with([0x4D, 0x5A], [0x50, 0x45]);
        assert_eq!(classify(&p), PayloadKind::ChainloadImage);
    }

    #[test]
    fn anything_else_is_kernel() {
        assert_eq!(
            classify(&payload_with([0x4D, 0x5A], [0x00, 0x00])),
            PayloadKind::KernelPayload
        );
        assert_eq!(
            classify(&payload_with([0x7F, b'E'], [0x50, 0x45])),
            PayloadKind::KernelPayload
        );
        assert_eq!(classify(&[]), PayloadKind::KernelPayload);
    }

    #[test]
    fn classification_ignores_length_beyond_signature() {
        let mut p = payload_with(SIG_HEAD, SIG_TAIL);
        p.truncate(SIG_TAIL_OFFSET + 2);
        assert_eq!(classify(&p), PayloadKind::ChainloadImage);
        p.extend_from_slice(&[0xFF; 4096]);
        assert_eq!(classify(&p), PayloadKind::ChainloadImage);
    }

    #[test]
    fn size_gate() {
        assert!(!plausibly_complete(0));
        assert!(!plausibly_complete(MIN_KERNEL_SIZE - 1));
        assert!(plausibly_complete(MIN_KERNEL_SIZE));
    }
}
