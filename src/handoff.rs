//! handoff.rs - the kernel handoff package and its staged descriptor.
//!
//! Whatever the boot source was, the kernel receives the same descriptor:
//! image, ramdisk and two command-line regions by physical base and length.
//! The descriptor is `repr(C)` with a magic so the kernel can sanity-check
//! what the loader staged before trusting any field.

use crate::errors::BootError;
use bitflags::bitflags;

/// "NBOOT001", little-endian.
pub const BOOTINFO_MAGIC: u64 = 0x3130_3054_4F4F_424E;

bitflags! {
    /// How the kernel was delivered.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct BootFlags: u32 {
        /// Image arrived over the network.
        const NETBOOT = 1 << 0;
        /// The ramdisk region is populated.
        const HAVE_RAMDISK = 1 << 1;
    }
}

/// Staged descriptor handed to the kernel. Layout is ABI; field order and
/// widths must not change.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct BootInfo {
    pub magic: u64,
    pub flags: u32,
    pub _reserved0: u32,
    pub kernel_base: u64,
    pub kernel_len: u64,
    pub ramdisk_base: u64,
    pub ramdisk_len: u64,
    pub cmdline_base: u64,
    pub cmdline_len: u64,
    pub cmdline_extra_base: u64,
    pub cmdline_extra_len: u64,
}

/// The regions a boot source produced, before staging. Empty slices stage
/// as zero base and length.
pub struct HandoffPackage<'a> {
    pub kernel: &'a [u8],
    pub ramdisk: &'a [u8],
    pub cmdline: &'a [u8],
    pub cmdline_extra: &'a [u8],
}

fn region(bytes: &[u8]) -> (u64, u64) {
    if bytes.is_empty() {
        (0, 0)
    } else {
        (bytes.as_ptr() as u64, bytes.len() as u64)
    }
}

impl HandoffPackage<'_> {
    /// Reject packages no kernel could run.
    pub fn validate(&self) -> Result<(), BootError> {
        if self.kernel.is_empty() {
            return Err(BootError::InvalidMedia);
        }
        Ok(())
    }

    /// Build the descriptor. The pointers are only meaningful while the
    /// backing regions stay mapped, which holds until the jump.
    pub fn to_boot_info(&self, mut flags: BootFlags) -> BootInfo {
        if !self.ramdisk.is_empty() {
            flags |= BootFlags::HAVE_RAMDISK;
        }
        let (kernel_base, kernel_len) = region(self.kernel);
        let (ramdisk_base, ramdisk_len) = region(self.ramdisk);
        let (cmdline_base, cmdline_len) = region(self.cmdline);
        let (cmdline_extra_base, cmdline_extra_len) = region(self.cmdline_extra);
        BootInfo {
            magic: BOOTINFO_MAGIC,
            flags: flags.bits(),
            _reserved0: 0,
            kernel_base,
            kernel_len,
            ramdisk_base,
            ramdisk_len,
            cmdline_base,
            cmdline_len,
            cmdline_extra_base,
            cmdline_extra_len,
        }
    }
}
