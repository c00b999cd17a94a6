//! buffers.rs - transfer buffers for the netboot session.
//!
//! Three named buffers back a session: the kernel payload, the ramdisk and
//! the command line. Each tracks a fixed capacity and a fill length; the
//! base address is stable for the buffer's lifetime and writes are
//! append-only from the network receive path. `len <= capacity` holds at
//! every observation point - `write_at` refuses anything that would cross
//! the capacity instead of truncating.
//!
//! The buffers are owned by an explicit [`NetbootBuffers`] context created
//! at netboot entry, never by process-wide globals; the single writer (the
//! receive path) and single reader (dispatch loop + handoff) are interleaved
//! by polling, so no locking exists or is needed.

use core::ptr::NonNull;
use core::{fmt, ptr, slice};

/// Named-buffer identifiers, matched exactly.
pub const KERNEL_BUFFER: &str = "kernel.bin";
pub const RAMDISK_BUFFER: &str = "ramdisk.bin";
pub const CMDLINE_BUFFER: &str = "cmdline";

/// Payload buffer capacity.
pub const KERNEL_BUF_CAPACITY: usize = 32 * 1024 * 1024;
/// Ramdisk buffer capacity.
pub const RAMDISK_BUF_CAPACITY: usize = 256 * 1024 * 1024;
/// Command-line buffer capacity.
pub const CMDLINE_BUF_CAPACITY: usize = 4096;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BufferError {
    /// Write would cross the buffer capacity.
    OutOfRange,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::OutOfRange => f.write_str("write beyond buffer capacity"),
        }
    }
}

/// A fixed-capacity byte region with a stable base address.
pub struct TransferBuffer {
    name: &'static str,
    base: NonNull<u8>,
    capacity: usize,
    len: usize,
}

impl TransferBuffer {
    /// Wrap a raw region.
    ///
    /// # Safety
    /// `base` must point to `capacity` writable bytes that outlive the
    /// buffer and are not aliased by another `TransferBuffer`.
    pub unsafe fn from_raw(name: &'static str, base: NonNull<u8>, capacity: usize) -> Self {
        Self {
            name,
            base,
            capacity,
            len: 0,
        }
    }

    /// Wrap a borrowed-forever slice. Used for host tests and for
    /// statically backed buffers.
    pub fn from_slice(name: &'static str, region: &'static mut [u8]) -> Self {
        let capacity = region.len();
        let base = NonNull::from(region).cast::<u8>();
        Self {
            name,
            base,
            capacity,
            len: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stable base address, for releasing the region or for handoff.
    pub fn base_ptr(&self) -> NonNull<u8> {
        self.base
    }

    /// The received bytes.
    pub fn bytes(&self) -> &[u8] {
        // Region validity is a construction invariant; len never exceeds it.
        unsafe { slice::from_raw_parts(self.base.as_ptr(), self.len) }
    }

    /// Copy `data` in at `offset`, growing the fill length if the write
    /// extends past it. Rejects writes that would cross the capacity.
    pub fn write_at(&mut self, offset: usize, data: &[u8]) -> Result<usize, BufferError> {
        let end = offset.checked_add(data.len()).ok_or(BufferError::OutOfRange)?;
        if end > self.capacity {
            return Err(BufferError::OutOfRange);
        }
        unsafe {
            ptr::copy_nonoverlapping(data.as_ptr(), self.base.as_ptr().add(offset), data.len());
        }
        if end > self.len {
            self.len = end;
        }
        Ok(data.len())
    }

    /// Drop the fill length; the region itself stays allocated.
    pub fn reset(&mut self) {
        self.len = 0;
    }

    /// Zero the whole region and reset the fill length. Used for the
    /// command-line buffer at session start.
    pub fn zero(&mut self) {
        unsafe {
            ptr::write_bytes(self.base.as_ptr(), 0, self.capacity);
        }
        self.len = 0;
    }

    /// NUL-terminate text content at the recorded length so downstream
    /// consumers can treat it as a C string. No-op when full to capacity.
    pub fn terminate_text(&mut self) {
        if self.len < self.capacity {
            unsafe {
                self.base.as_ptr().add(self.len).write(0);
            }
        }
    }
}

// Single execution context at boot: the buffers are only ever touched from
// the one cooperative thread.
unsafe impl Send for TransferBuffer {}

/// The per-session buffer context: the three named transfer buffers,
/// resolved by exact name for the receive path.
pub struct NetbootBuffers {
    kernel: TransferBuffer,
    ramdisk: TransferBuffer,
    cmdline: TransferBuffer,
}

impl NetbootBuffers {
    pub fn new(kernel: TransferBuffer, ramdisk: TransferBuffer, mut cmdline: TransferBuffer) -> Self {
        cmdline.zero();
        Self {
            kernel,
            ramdisk,
            cmdline,
        }
    }

    /// Resolve a transfer target by name. Unknown names are not an error;
    /// the sender is free to push files this loader does not care about.
    pub fn buffer_for(&mut self, name: &str) -> Option<&mut TransferBuffer> {
        match name {
            KERNEL_BUFFER => Some(&mut self.kernel),
            RAMDISK_BUFFER => Some(&mut self.ramdisk),
            CMDLINE_BUFFER => Some(&mut self.cmdline),
            _ => None,
        }
    }

    pub fn kernel(&self) -> &TransferBuffer {
        &self.kernel
    }

    pub fn ramdisk(&self) -> &TransferBuffer {
        &self.ramdisk
    }

    pub fn cmdline(&self) -> &TransferBuffer {
        &self.cmdline
    }

    pub fn cmdline_mut(&mut self) -> &mut TransferBuffer {
        &mut self.cmdline
    }

    /// Tear the context apart for releasing the regions.
    pub fn into_parts(self) -> (TransferBuffer, TransferBuffer, TransferBuffer) {
        (self.kernel, self.ramdisk, self.cmdline)
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    /// Heap-backed buffers for host tests. Regions are leaked on purpose;
    /// test processes are short-lived.
    pub fn test_buffers(kernel_cap: usize, ramdisk_cap: usize) -> NetbootBuffers {
        let kernel = TransferBuffer::from_slice(KERNEL_BUFFER, alloc::vec![0u8; kernel_cap].leak());
        let ramdisk =
            TransferBuffer::from_slice(RAMDISK_BUFFER, alloc::vec![0u8; ramdisk_cap].leak());
        let cmdline =
            TransferBuffer::from_slice(CMDLINE_BUFFER, alloc::vec![0u8; CMDLINE_BUF_CAPACITY].leak());
        NetbootBuffers::new(kernel, ramdisk, cmdline)
    }
}
