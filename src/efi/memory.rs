//! memory.rs - transfer buffer allocation.
//!
//! All three buffers are page allocations capped below 4 GiB so the
//! staged regions stay addressable by downstream consumers with 32-bit
//! physical expectations.

use crate::buffers::{
    NetbootBuffers, TransferBuffer, CMDLINE_BUFFER, CMDLINE_BUF_CAPACITY, KERNEL_BUFFER,
    KERNEL_BUF_CAPACITY, RAMDISK_BUFFER, RAMDISK_BUF_CAPACITY,
};
use crate::errors::BootError;
use crate::logger::log_info;
use uefi::boot::{self, AllocateType, MemoryType};

/// Highest address a transfer buffer may occupy.
pub const BUFFER_ADDRESS_CEILING: u64 = 0xFFFF_FFFF;

const PAGE_SIZE: usize = 4096;

fn pages_for(bytes: usize) -> usize {
    bytes.div_ceil(PAGE_SIZE)
}

fn allocate_transfer_buffer(
    name: &'static str,
    capacity: usize,
) -> Result<TransferBuffer, BootError> {
    let base = boot::allocate_pages(
        AllocateType::MaxAddress(BUFFER_ADDRESS_CEILING),
        MemoryType::LOADER_DATA,
        pages_for(capacity),
    )
    .map_err(|_| BootError::ResourceExhausted(name))?;
    // Page allocations cover whole pages; the buffer only ever uses
    // `capacity` of them.
    Ok(unsafe { TransferBuffer::from_raw(name, base, capacity) })
}

fn release_transfer_buffer(buf: TransferBuffer) {
    let pages = pages_for(buf.capacity());
    unsafe {
        let _ = boot::free_pages(buf.base_ptr(), pages);
    }
}

/// Allocate the full buffer set for a netboot session. Partial failure
/// releases whatever was already allocated before reporting which buffer
/// could not be had.
pub fn allocate_buffers() -> Result<NetbootBuffers, BootError> {
    let kernel = allocate_transfer_buffer(KERNEL_BUFFER, KERNEL_BUF_CAPACITY)?;
    let ramdisk = match allocate_transfer_buffer(RAMDISK_BUFFER, RAMDISK_BUF_CAPACITY) {
        Ok(buf) => buf,
        Err(err) => {
            release_transfer_buffer(kernel);
            return Err(err);
        }
    };
    let cmdline = match allocate_transfer_buffer(CMDLINE_BUFFER, CMDLINE_BUF_CAPACITY) {
        Ok(buf) => buf,
        Err(err) => {
            release_transfer_buffer(kernel);
            release_transfer_buffer(ramdisk);
            return Err(err);
        }
    };
    log_info("netboot", "transfer buffers allocated below 4GiB");
    Ok(NetbootBuffers::new(kernel, ramdisk, cmdline))
}

/// Release a session's buffers once it is certain no kernel will take
/// them, i.e. the handoff failed pre-flight.
pub fn release_buffers(bufs: NetbootBuffers) {
    let (kernel, ramdisk, cmdline) = bufs.into_parts();
    release_transfer_buffer(kernel);
    release_transfer_buffer(ramdisk);
    release_transfer_buffer(cmdline);
    log_info("netboot", "session buffers released");
}
